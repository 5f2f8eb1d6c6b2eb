//! Minimal document templates: `{{name}}` placeholders substituted with
//! XML-escaped values.

use std::collections::BTreeMap;

use super::error::ComplianceError;

/// A parsed template made of literal text and named placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentTemplate {
    parts: Vec<Part>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Literal(String),
    Placeholder(String),
}

impl DocumentTemplate {
    /// Parse a template. Fails on an unterminated `{{` or an empty placeholder.
    pub fn new(source: &str) -> Result<Self, ComplianceError> {
        let mut parts = Vec::new();
        let mut rest = source;

        while let Some(start) = rest.find("{{") {
            if start > 0 {
                parts.push(Part::Literal(rest[..start].to_string()));
            }
            let after = &rest[start + 2..];
            let end = after.find("}}").ok_or_else(|| {
                let offset = source.len() - rest.len() + start;
                ComplianceError::Template(format!("unterminated placeholder at byte {offset}"))
            })?;
            let name = after[..end].trim();
            if name.is_empty() {
                return Err(ComplianceError::Template("empty placeholder name".into()));
            }
            parts.push(Part::Placeholder(name.to_string()));
            rest = &after[end + 2..];
        }
        if !rest.is_empty() {
            parts.push(Part::Literal(rest.to_string()));
        }

        Ok(Self { parts })
    }

    /// Distinct placeholder names, in order of first appearance.
    pub fn placeholders(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for part in &self.parts {
            if let Part::Placeholder(name) = part {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
        }
        names
    }

    /// Substitute every placeholder. A placeholder without a value is an error.
    pub fn render<V: AsRef<str>>(
        &self,
        values: &BTreeMap<&str, V>,
    ) -> Result<String, ComplianceError> {
        let mut out = String::new();
        for part in &self.parts {
            match part {
                Part::Literal(text) => out.push_str(text),
                Part::Placeholder(name) => {
                    let value = values.get(name.as_str()).ok_or_else(|| {
                        ComplianceError::Template(format!("no value for placeholder '{name}'"))
                    })?;
                    out.push_str(&escape_xml(value.as_ref()));
                }
            }
        }
        Ok(out)
    }
}

fn escape_xml(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
