use tracing::debug;

use super::document::{Element, parse};
use super::lookup::{find_element, find_text};
use crate::core::registry::{SCHEMA_DEFINITIONS, namespace_matches};
use crate::core::*;

/// Guess the format of a document from its root element and namespace.
///
/// Formats sharing a syntax are told apart by content: CII documents by
/// the guideline ID (`factur-x`, `zugferd`), UBL documents by the
/// `CustomizationID` (`xrechnung`, `peppol`). Returns `None` for
/// malformed XML or an unknown root.
pub fn detect_format(xml: &str) -> Option<EInvoiceFormat> {
    let parsed = parse(xml);
    if parsed.has_errors() {
        debug!("format detection skipped: document is not well-formed");
        return None;
    }
    let root = parsed.root?;
    let observed = root.namespace.as_deref().unwrap_or("");

    let definition = SCHEMA_DEFINITIONS.iter().find(|d| {
        d.root_element == root.local_name && namespace_matches(observed, d.namespace)
    })?;

    let format = match definition.format.family() {
        FormatFamily::Cii => disambiguate_cii(&root),
        FormatFamily::Ubl => disambiguate_ubl(&root),
        _ => definition.format,
    };
    debug!(%format, root = %root.qname, "detected e-invoice format");
    Some(format)
}

fn disambiguate_cii(root: &Element) -> EInvoiceFormat {
    let namespaces = get_expected_namespaces(EInvoiceFormat::Cii);
    let guideline = find_element(root, "GuidelineSpecifiedDocumentContextParameter", namespaces)
        .and_then(|p| find_text(p, "ID", namespaces))
        .map(str::to_lowercase)
        .unwrap_or_default();

    if guideline.contains("factur-x") {
        EInvoiceFormat::FacturX
    } else if guideline.contains("zugferd") {
        EInvoiceFormat::Zugferd
    } else {
        EInvoiceFormat::Cii
    }
}

fn disambiguate_ubl(root: &Element) -> EInvoiceFormat {
    let namespaces = get_expected_namespaces(EInvoiceFormat::Ubl);
    let customization = find_text(root, "CustomizationID", namespaces)
        .map(str::to_lowercase)
        .unwrap_or_default();

    if customization.contains("xrechnung") {
        EInvoiceFormat::XRechnung
    } else if customization.contains("peppol") {
        EInvoiceFormat::Peppol
    } else {
        EInvoiceFormat::Ubl
    }
}
