//! Owned element tree built from quick-xml events, with parser
//! diagnostics collected instead of returned as errors.

use std::collections::{HashMap, HashSet};

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::core::ValidationError;

/// Deepest element nesting the parser accepts. Real invoices stay far
/// below this; anything deeper is rejected before the tree grows.
pub(crate) const MAX_DEPTH: usize = 512;

/// One XML element with resolved namespace.
#[derive(Debug, Clone, Default)]
pub(crate) struct Element {
    pub qname: String,
    pub prefix: Option<String>,
    pub local_name: String,
    pub namespace: Option<String>,
    pub attributes: Vec<(String, String)>,
    /// `xmlns` declarations made on this element, as `(prefix, uri)`;
    /// the default namespace has an empty prefix.
    pub namespace_decls: Vec<(String, String)>,
    pub children: Vec<Element>,
    pub text: String,
}

impl Element {
    /// Value of an unprefixed attribute.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Pre-order traversal of all descendants (not including `self`).
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: self.children.iter().rev().collect(),
        }
    }
}

pub(crate) struct Descendants<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.stack.pop()?;
        self.stack.extend(next.children.iter().rev());
        Some(next)
    }
}

/// Result of parsing: the (possibly partial) root and every diagnostic.
#[derive(Debug, Default)]
pub(crate) struct ParsedDocument {
    pub root: Option<Element>,
    pub diagnostics: Vec<ValidationError>,
}

impl ParsedDocument {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(ValidationError::is_error)
    }
}

/// Byte offset → 1-based (line, column), the column counted in characters.
struct LineIndex<'x> {
    text: &'x str,
    starts: Vec<usize>,
}

impl<'x> LineIndex<'x> {
    fn new(text: &'x str) -> Self {
        let mut starts = vec![0];
        starts.extend(text.match_indices('\n').map(|(i, _)| i + 1));
        Self { text, starts }
    }

    fn locate(&self, offset: usize) -> (u32, u32) {
        let line = match self.starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        let start = self.starts[line];
        let column = self
            .text
            .get(start..offset)
            .map_or(offset - start, |prefix| prefix.chars().count());
        (line as u32 + 1, column as u32 + 1)
    }
}

struct TreeBuilder<'x> {
    lines: LineIndex<'x>,
    source: &'x str,
    stack: Vec<Element>,
    /// In-scope URIs per prefix, innermost last.
    bindings: HashMap<String, Vec<String>>,
    /// Prefixes declared by each open element, popped on close.
    declared: Vec<Vec<String>>,
    root: Option<Element>,
    diagnostics: Vec<ValidationError>,
    unbound_prefixes: HashSet<String>,
}

impl<'x> TreeBuilder<'x> {
    fn new(source: &'x str) -> Self {
        Self {
            lines: LineIndex::new(source),
            source,
            stack: Vec::new(),
            bindings: HashMap::new(),
            declared: Vec::new(),
            root: None,
            diagnostics: Vec::new(),
            unbound_prefixes: HashSet::new(),
        }
    }

    fn diagnostic(&mut self, finding: ValidationError, offset: usize) {
        let (line, column) = self.lines.locate(offset.min(self.source.len()));
        self.diagnostics.push(finding.at_position(line, column));
    }

    fn resolve(&self, prefix: &str) -> Option<String> {
        self.bindings.get(prefix)?.last().cloned()
    }

    fn depth(&self) -> usize {
        self.stack.len()
    }

    fn open(&mut self, start: &BytesStart<'_>, offset: usize) {
        let qname = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let (prefix, local_name) = match qname.split_once(':') {
            Some((p, l)) => (Some(p.to_string()), l.to_string()),
            None => (None, qname.clone()),
        };

        let mut attributes = Vec::new();
        let mut decls = Vec::new();
        for attr in start.attributes() {
            let attr = match attr {
                Ok(a) => a,
                Err(e) => {
                    self.diagnostic(
                        ValidationError::error(format!("malformed attribute on <{qname}>: {e}")),
                        offset,
                    );
                    continue;
                }
            };
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = match attr.unescape_value() {
                Ok(v) => v.into_owned(),
                Err(e) => {
                    self.diagnostic(
                        ValidationError::error(format!(
                            "invalid value for attribute '{key}' on <{qname}>: {e}"
                        )),
                        offset,
                    );
                    String::from_utf8_lossy(&attr.value).into_owned()
                }
            };
            if key == "xmlns" {
                decls.push((String::new(), value.clone()));
            } else if let Some(p) = key.strip_prefix("xmlns:") {
                decls.push((p.to_string(), value.clone()));
            }
            attributes.push((key, value));
        }

        for (p, uri) in &decls {
            self.bindings.entry(p.clone()).or_default().push(uri.clone());
        }
        self.declared.push(decls.iter().map(|(p, _)| p.clone()).collect());
        let lookup = prefix.as_deref().unwrap_or("");
        let namespace = self.resolve(lookup).filter(|uri| !uri.is_empty());
        if let Some(p) = &prefix {
            if namespace.is_none() && p != "xml" && self.unbound_prefixes.insert(p.clone()) {
                self.diagnostic(
                    ValidationError::warning(format!("namespace prefix '{p}' is not declared")),
                    offset,
                );
            }
        }

        self.stack.push(Element {
            qname,
            prefix,
            local_name,
            namespace,
            attributes,
            namespace_decls: decls,
            children: Vec::new(),
            text: String::new(),
        });
    }

    fn close(&mut self) {
        for prefix in self.declared.pop().unwrap_or_default() {
            if let Some(uris) = self.bindings.get_mut(&prefix) {
                uris.pop();
            }
        }
        let Some(done) = self.stack.pop() else {
            return;
        };
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(done),
            None => self.root = Some(done),
        }
    }

    fn text(&mut self, text: &str, offset: usize) {
        if let Some(current) = self.stack.last_mut() {
            current.text.push_str(text);
        } else if !text.trim().is_empty() {
            self.diagnostic(
                ValidationError::error("text content outside the document element"),
                offset,
            );
        }
    }

    fn too_deep(&mut self, offset: usize) {
        self.diagnostic(
            ValidationError::error(format!(
                "element nesting exceeds {MAX_DEPTH} levels; parsing stopped"
            )),
            offset,
        );
    }

    /// Fold still-open elements into a partial tree.
    fn finish(mut self) -> ParsedDocument {
        while !self.stack.is_empty() {
            self.close();
        }
        ParsedDocument {
            root: self.root,
            diagnostics: self.diagnostics,
        }
    }
}

/// Parse `xml` into an element tree. Never fails: problems become
/// diagnostics, and whatever was read before a fatal syntax error is kept.
pub(crate) fn parse(xml: &str) -> ParsedDocument {
    let mut reader = Reader::from_str(xml);
    let mut builder = TreeBuilder::new(xml);

    loop {
        let offset = reader.buffer_position() as usize;
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                if builder.stack.is_empty() && builder.root.is_some() {
                    builder.diagnostic(
                        ValidationError::error("extra content after the document element"),
                        offset,
                    );
                    break;
                }
                if builder.depth() >= MAX_DEPTH {
                    builder.too_deep(offset);
                    break;
                }
                builder.open(e, offset);
            }
            Ok(Event::Empty(ref e)) => {
                if builder.stack.is_empty() && builder.root.is_some() {
                    builder.diagnostic(
                        ValidationError::error("extra content after the document element"),
                        offset,
                    );
                    break;
                }
                if builder.depth() >= MAX_DEPTH {
                    builder.too_deep(offset);
                    break;
                }
                builder.open(e, offset);
                builder.close();
            }
            Ok(Event::End(_)) => builder.close(),
            Ok(Event::Text(ref e)) => {
                let text = match e.unescape() {
                    Ok(t) => t.into_owned(),
                    Err(err) => {
                        builder.diagnostic(
                            ValidationError::error(format!("invalid character data: {err}")),
                            offset,
                        );
                        String::from_utf8_lossy(e).into_owned()
                    }
                };
                builder.text(&text, offset);
            }
            Ok(Event::CData(ref e)) => {
                let text = String::from_utf8_lossy(e).into_owned();
                builder.text(&text, offset);
            }
            Ok(Event::Decl(ref decl)) => {
                if let Some(Ok(encoding)) = decl.encoding() {
                    let encoding = String::from_utf8_lossy(&encoding).into_owned();
                    if !encoding.eq_ignore_ascii_case("utf-8") {
                        builder.diagnostic(
                            ValidationError::warning(format!(
                                "document declares encoding '{encoding}' but was read as UTF-8"
                            )),
                            offset,
                        );
                    }
                }
            }
            Ok(Event::Eof) => {
                if let Some(open) = builder.stack.last() {
                    let message = format!(
                        "unexpected end of document: <{}> is not closed",
                        open.qname
                    );
                    builder.diagnostic(ValidationError::error(message), xml.len());
                }
                break;
            }
            Err(e) => {
                let position = reader.error_position() as usize;
                builder.diagnostic(
                    ValidationError::error(format!("malformed XML: {e}")),
                    position,
                );
                break;
            }
            _ => {}
        }
    }

    builder.finish()
}
