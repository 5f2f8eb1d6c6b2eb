//! Simplified XML canonicalization used before hashing and signing.
//!
//! This is NOT W3C Exclusive XML Canonicalization: attributes are not
//! reordered and namespace declarations are not rewritten. It only makes
//! the byte stream independent of line-ending style and of formatting
//! whitespace between tags, which is what signer and verifier need to
//! agree on.

/// Normalize line endings to `\n`, drop whitespace runs that sit between
/// a `>` and the next `<`, and trim the result.
pub fn canonicalize(xml: &str) -> String {
    let normalized = normalize_line_endings(xml);
    let mut out = String::with_capacity(normalized.len());
    let mut chars = normalized.chars().peekable();

    while let Some(c) = chars.next() {
        out.push(c);
        if c != '>' {
            continue;
        }
        let mut pending = String::new();
        while let Some(&ws) = chars.peek() {
            if !ws.is_whitespace() {
                break;
            }
            pending.push(ws);
            chars.next();
        }
        // Whitespace only disappears when another tag follows it.
        if chars.peek() != Some(&'<') {
            out.push_str(&pending);
        }
    }

    out.trim().to_string()
}

fn normalize_line_endings(xml: &str) -> String {
    xml.replace("\r\n", "\n").replace('\r', "\n")
}
