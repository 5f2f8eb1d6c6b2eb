use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

use super::error::{Severity, ValidationError};

/// The closed set of electronic invoice formats this crate understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EInvoiceFormat {
    /// OASIS UBL 2.1 Invoice.
    #[serde(rename = "UBL")]
    Ubl,
    /// UN/CEFACT Cross Industry Invoice D16B.
    #[serde(rename = "CII")]
    Cii,
    /// Factur-X (French/German hybrid CII profile).
    #[serde(rename = "FACTURX")]
    FacturX,
    /// ZUGFeRD 2.x (CII profile).
    #[serde(rename = "ZUGFERD")]
    Zugferd,
    /// Italian FatturaPA 1.2 (SdI).
    #[serde(rename = "FATTURAPA")]
    FatturaPa,
    /// Spanish Facturae 3.2.x.
    #[serde(rename = "FACTURAE")]
    Facturae,
    /// German XRechnung 3.0 (UBL syntax).
    #[serde(rename = "XRECHNUNG")]
    XRechnung,
    /// Peppol BIS Billing 3.0 (UBL syntax).
    #[serde(rename = "PEPPOL")]
    Peppol,
}

/// Syntax family a format belongs to. Formats in one family share a
/// root element and namespace and differ only in document content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatFamily {
    Ubl,
    Cii,
    FatturaPa,
    Facturae,
}

impl EInvoiceFormat {
    /// All formats, in registry order.
    pub const ALL: [EInvoiceFormat; 8] = [
        Self::Ubl,
        Self::Cii,
        Self::FacturX,
        Self::Zugferd,
        Self::FatturaPa,
        Self::Facturae,
        Self::XRechnung,
        Self::Peppol,
    ];

    /// Upper-case format tag (e.g. `"FATTURAPA"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ubl => "UBL",
            Self::Cii => "CII",
            Self::FacturX => "FACTURX",
            Self::Zugferd => "ZUGFERD",
            Self::FatturaPa => "FATTURAPA",
            Self::Facturae => "FACTURAE",
            Self::XRechnung => "XRECHNUNG",
            Self::Peppol => "PEPPOL",
        }
    }

    pub fn family(&self) -> FormatFamily {
        match self {
            Self::Ubl | Self::XRechnung | Self::Peppol => FormatFamily::Ubl,
            Self::Cii | Self::FacturX | Self::Zugferd => FormatFamily::Cii,
            Self::FatturaPa => FormatFamily::FatturaPa,
            Self::Facturae => FormatFamily::Facturae,
        }
    }

    /// Whether the tax authority requires an embedded qualified signature.
    pub fn requires_signature(&self) -> bool {
        matches!(self, Self::FatturaPa | Self::Facturae)
    }
}

impl std::fmt::Display for EInvoiceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not one of the registered format tags.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported e-invoice format: {0}")]
pub struct UnknownFormat(pub String);

impl std::str::FromStr for EInvoiceFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_ascii_uppercase();
        let format = match tag.as_str() {
            "UBL" => Self::Ubl,
            "CII" => Self::Cii,
            "FACTURX" | "FACTUR-X" => Self::FacturX,
            "ZUGFERD" => Self::Zugferd,
            "FATTURAPA" => Self::FatturaPa,
            "FACTURAE" => Self::Facturae,
            "XRECHNUNG" => Self::XRechnung,
            "PEPPOL" => Self::Peppol,
            _ => return Err(UnknownFormat(s.to_string())),
        };
        Ok(format)
    }
}

/// Structural fingerprint of a format, as held by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaDefinition {
    pub format: EInvoiceFormat,
    /// Canonical namespace URI of the document root.
    pub namespace: &'static str,
    /// Expected local name of the document root.
    pub root_element: &'static str,
    /// Informational schema version.
    pub version: &'static str,
}

/// A must-have or should-have element checked by structural validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequiredElement {
    /// Local element name.
    pub name: &'static str,
    /// Diagnostic locator reported when the element is missing.
    pub path: &'static str,
    /// `true` → missing is an error; `false` → missing is a warning.
    pub required: bool,
}

/// Outcome of validating one document. Built fresh per call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaValidationResult {
    /// `true` iff `errors` is empty.
    pub valid: bool,
    pub format: EInvoiceFormat,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<String>,
    pub validated_at: DateTime<Utc>,
}

impl SchemaValidationResult {
    /// Split findings by severity and derive `valid` from the error list.
    pub fn from_findings(
        format: EInvoiceFormat,
        findings: Vec<ValidationError>,
        schema_version: Option<String>,
    ) -> Self {
        let (errors, warnings): (Vec<_>, Vec<_>) = findings
            .into_iter()
            .partition(|f| f.severity == Severity::Error);
        Self {
            valid: errors.is_empty(),
            format,
            errors,
            warnings,
            schema_version,
            validated_at: Utc::now(),
        }
    }

    /// A result carrying exactly one fatal error.
    pub fn fatal(format: EInvoiceFormat, error: ValidationError) -> Self {
        Self::from_findings(format, vec![error], None)
    }
}

/// Outcome of a signing call. Exactly one of the signed document or the
/// error message exists.
///
/// Serializes as `{"success": true, "signedXml": ...}` or
/// `{"success": false, "error": ...}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureResult {
    Signed { signed_xml: String },
    Failed { error: String },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignatureRecord<'a> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    signed_xml: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

impl Serialize for SignatureResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        SignatureRecord {
            success: self.success(),
            signed_xml: self.signed_xml(),
            error: self.error(),
        }
        .serialize(serializer)
    }
}

impl SignatureResult {
    pub fn success(&self) -> bool {
        matches!(self, Self::Signed { .. })
    }

    pub fn signed_xml(&self) -> Option<&str> {
        match self {
            Self::Signed { signed_xml } => Some(signed_xml),
            Self::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Signed { .. } => None,
            Self::Failed { error } => Some(error),
        }
    }

    /// Convert into a `Result`, for callers that prefer `?`.
    pub fn into_result(self) -> Result<String, String> {
        match self {
            Self::Signed { signed_xml } => Ok(signed_xml),
            Self::Failed { error } => Err(error),
        }
    }
}
