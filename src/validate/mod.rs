//! Schema Validator: structural, namespace and format-specific checks.
//!
//! This is deliberately not XSD validation: documents are checked for the
//! right root, the elements each format cannot do without, expected
//! namespace declarations, and a handful of format rules.
//!
//! # Example
//!
//! ```
//! use einvoice::EInvoiceFormat;
//! use einvoice::validate::{detect_format, validate};
//!
//! let xml = r#"<p:FatturaElettronica versione="FPR12"
//!     xmlns:p="http://ivaservizi.agenziaentrate.gov.it/docs/xsd/fatture/v1.2"/>"#;
//!
//! assert_eq!(detect_format(xml), Some(EInvoiceFormat::FatturaPa));
//! let result = validate(xml, EInvoiceFormat::FatturaPa);
//! assert!(!result.valid); // header and body are missing
//! ```

mod batch;
mod detect;
pub(crate) mod document;
pub(crate) mod lookup;
mod rules;
mod structure;

use std::panic::{AssertUnwindSafe, catch_unwind};

use tracing::debug;

pub use batch::{BatchItem, BatchOptions, validate_batch, validate_batch_with};
pub use detect::detect_format;
pub use rules::{FATTURAPA_VERSIONE_PATH, FATTURAPA_VERSIONS};

use crate::core::*;

/// Validate `xml` as a document of `format`.
///
/// Never fails and never panics on bad input: parser problems, structural
/// errors and advisory warnings all end up in the returned result.
pub fn validate(xml: &str, format: EInvoiceFormat) -> SchemaValidationResult {
    let definition = get_schema_definition(format);

    let outcome = catch_unwind(AssertUnwindSafe(|| {
        let parsed = document::parse(xml);
        let Some(root) = parsed.root else {
            let reason = parsed
                .diagnostics
                .iter()
                .find(|d| d.is_error())
                .map(|d| d.message.clone())
                .unwrap_or_else(|| "document is empty".into());
            return Err(ValidationError::error(format!(
                "document has no usable root element: {reason}"
            ))
            .at("/"));
        };

        let mut findings = parsed.diagnostics;
        findings.extend(structure::check_structure(&root, format));
        findings.extend(structure::check_namespaces(&root, format));
        findings.extend(rules::check_format_rules(&root, format));
        Ok(findings)
    }));

    let result = match outcome {
        Ok(Ok(findings)) => SchemaValidationResult::from_findings(
            format,
            findings,
            Some(definition.version.to_string()),
        ),
        Ok(Err(fatal)) => SchemaValidationResult::fatal(format, fatal),
        Err(_) => SchemaValidationResult::fatal(
            format,
            ValidationError::error("internal error while validating document"),
        ),
    };

    debug!(
        %format,
        valid = result.valid,
        errors = result.errors.len(),
        warnings = result.warnings.len(),
        "validated document"
    );
    result
}
