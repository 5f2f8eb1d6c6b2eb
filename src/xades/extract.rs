//! Pattern-based extraction of signature parts from serialized XML.
//!
//! Signed documents are inspected textually so the bytes that were
//! digested and signed are exactly the bytes examined here.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

static SIGNATURE_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<(?:[A-Za-z_][\w.-]*:)?Signature\b[^>]*>.*?</(?:[A-Za-z_][\w.-]*:)?Signature>")
        .expect("signature block pattern")
});

static SIGNED_INFO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<(?:[A-Za-z_][\w.-]*:)?SignedInfo\b[^>]*>.*?</(?:[A-Za-z_][\w.-]*:)?SignedInfo>")
        .expect("SignedInfo pattern")
});

static SIGNATURE_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<(?:[A-Za-z_][\w.-]*:)?SignatureValue\b[^>]*>(.*?)</(?:[A-Za-z_][\w.-]*:)?SignatureValue>")
        .expect("SignatureValue pattern")
});

static X509_CERTIFICATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<(?:[A-Za-z_][\w.-]*:)?X509Certificate\b[^>]*>(.*?)</(?:[A-Za-z_][\w.-]*:)?X509Certificate>")
        .expect("X509Certificate pattern")
});

static REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<(?:[A-Za-z_][\w.-]*:)?Reference\b([^>]*)>(.*?)</(?:[A-Za-z_][\w.-]*:)?Reference>")
        .expect("Reference pattern")
});

static URI_ATTRIBUTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\bURI\s*=\s*["']([^"']*)["']"#).expect("URI pattern"));

static DIGEST_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<(?:[A-Za-z_][\w.-]*:)?DigestValue\b[^>]*>(.*?)</(?:[A-Za-z_][\w.-]*:)?DigestValue>")
        .expect("DigestValue pattern")
});

static CLOSING_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</[^>]+>").expect("closing tag pattern"));

/// A `ds:Reference` as found in `SignedInfo`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ReferenceEntry {
    pub uri: String,
    pub digest_value: Option<String>,
}

/// Byte range of the last signature block; the one this crate appends.
pub(crate) fn signature_block(xml: &str) -> Option<Range<usize>> {
    SIGNATURE_BLOCK.find_iter(xml).last().map(|m| m.range())
}

pub(crate) fn signed_info(signature: &str) -> Option<&str> {
    SIGNED_INFO.find(signature).map(|m| m.as_str())
}

pub(crate) fn signature_value(signature: &str) -> Option<&str> {
    inner_text(&SIGNATURE_VALUE, signature)
}

pub(crate) fn x509_certificate(signature: &str) -> Option<&str> {
    inner_text(&X509_CERTIFICATE, signature)
}

pub(crate) fn references(signed_info: &str) -> Vec<ReferenceEntry> {
    REFERENCE
        .captures_iter(signed_info)
        .map(|caps| {
            let attributes = caps.get(1).map_or("", |m| m.as_str());
            let body = caps.get(2).map_or("", |m| m.as_str());
            ReferenceEntry {
                uri: URI_ATTRIBUTE
                    .captures(attributes)
                    .and_then(|c| c.get(1))
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_default(),
                digest_value: inner_text(&DIGEST_VALUE, body).map(str::to_string),
            }
        })
        .collect()
}

/// Offset of the document's final closing tag, where a signature goes.
pub(crate) fn last_closing_tag(xml: &str) -> Option<usize> {
    CLOSING_TAG.find_iter(xml).last().map(|m| m.start())
}

/// The serialized element whose `Id` attribute equals `id`.
///
/// Elements of the same name nested inside the target are not expected
/// in signature blocks, so the first matching end tag closes it.
pub(crate) fn element_with_id<'a>(xml: &'a str, id: &str) -> Option<&'a str> {
    for needle in [format!(" Id=\"{id}\""), format!(" Id='{id}'")] {
        let Some(attr_at) = xml.find(&needle) else {
            continue;
        };
        let start = xml[..attr_at].rfind('<')?;
        let name_end = xml[start + 1..]
            .find(|c: char| c.is_whitespace() || c == '>' || c == '/')
            .map(|i| start + 1 + i)?;
        let name = &xml[start + 1..name_end];

        let open_end = start + xml[start..].find('>')?;
        if xml[..open_end].ends_with('/') {
            return Some(&xml[start..=open_end]);
        }
        let close = format!("</{name}>");
        let close_at = open_end + xml[open_end..].find(&close)?;
        return Some(&xml[start..close_at + close.len()]);
    }
    None
}

fn inner_text<'a>(pattern: &Regex, haystack: &'a str) -> Option<&'a str> {
    pattern
        .captures(haystack)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
}
