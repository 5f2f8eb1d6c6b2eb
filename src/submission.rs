//! Validate-then-sign pipeline for documents headed to a tax authority.

use serde::Serialize;
use tracing::debug;

use crate::core::{EInvoiceFormat, SchemaValidationResult, SignatureResult};
use crate::validate::validate;
use crate::xades::{SignOptions, sign_xml};

/// Outcome of [`prepare_submission`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub validation: SchemaValidationResult,
    /// Present when signing was attempted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<SignatureResult>,
    #[serde(skip)]
    source: String,
}

impl Submission {
    /// The document is valid and, where the format demands it, signed.
    pub fn is_ready(&self) -> bool {
        if !self.validation.valid {
            return false;
        }
        if self.validation.format.requires_signature() {
            return self.signature.as_ref().is_some_and(SignatureResult::success);
        }
        self.signature.as_ref().is_none_or(SignatureResult::success)
    }

    /// The XML to hand on: signed when a signature was produced.
    pub fn document(&self) -> &str {
        self.signature
            .as_ref()
            .and_then(SignatureResult::signed_xml)
            .unwrap_or(&self.source)
    }
}

/// Validate `xml` as `format` and sign it when the format requires a
/// signature.
///
/// Invalid documents are never signed. A format that requires a signature
/// but gets no `sign_options` yields a failed signature result.
pub fn prepare_submission(
    xml: &str,
    format: EInvoiceFormat,
    sign_options: Option<&SignOptions>,
) -> Submission {
    let validation = validate(xml, format);

    let signature = if !validation.valid || !format.requires_signature() {
        None
    } else {
        Some(match sign_options {
            Some(options) => sign_xml(xml, options),
            None => SignatureResult::Failed {
                error: format!("{format} requires a signature but no signing credentials were given"),
            },
        })
    };

    debug!(
        %format,
        valid = validation.valid,
        signed = signature.as_ref().is_some_and(SignatureResult::success),
        "prepared submission"
    );

    Submission {
        validation,
        signature,
        source: xml.to_string(),
    }
}
