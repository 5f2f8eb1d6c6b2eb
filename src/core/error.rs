use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised inside the compliance core.
///
/// Template rendering returns these directly. Signing folds them into a
/// failed [`SignatureResult`](super::SignatureResult) instead.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ComplianceError {
    /// A certificate or key file could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The X.509 certificate is malformed or unsupported.
    #[error("certificate error: {0}")]
    Certificate(String),

    /// The private key cannot be decoded or decrypted.
    #[error("private key error: {0}")]
    PrivateKey(String),

    /// Computing or assembling the signature failed.
    #[error("signature error: {0}")]
    Signature(String),

    /// A document template could not be rendered.
    #[error("template error: {0}")]
    Template(String),
}

/// Severity of a [`ValidationError`]. Only errors make a document invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
        }
    }
}

/// A single validation finding with optional source position and locator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    /// Human-readable description.
    pub message: String,
    /// Whether this finding invalidates the document.
    pub severity: Severity,
    /// 1-based line in the source document, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    /// 1-based column in the source document, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
    /// Approximate XPath-like locator (e.g. `/Invoice/cbc:IssueDate`).
    /// Meant for diagnostics only; it is not guaranteed to resolve.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] ", self.severity.as_str())?;
        if let Some(path) = &self.path {
            write!(f, "{path}: ")?;
        }
        write!(f, "{}", self.message)?;
        match (self.line, self.column) {
            (Some(line), Some(column)) => write!(f, " ({line}:{column})"),
            (Some(line), None) => write!(f, " (line {line})"),
            _ => Ok(()),
        }
    }
}

impl ValidationError {
    /// Create an error-severity finding.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Error,
            line: None,
            column: None,
            path: None,
        }
    }

    /// Create a warning-severity finding.
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(message)
        }
    }

    /// Attach a locator path.
    pub fn at(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Attach a source position.
    pub fn at_position(mut self, line: u32, column: u32) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}
