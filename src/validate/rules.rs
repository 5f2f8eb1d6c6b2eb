//! Format-specific rule sets. Exactly one family branch runs per document.

use super::document::Element;
use super::lookup::{find_element, find_text};
use crate::core::*;

/// FatturaPA transmission format versions accepted by SdI.
pub const FATTURAPA_VERSIONS: [&str; 2] = ["FPR12", "FPA12"];

/// Locator used for every `versione` finding.
pub const FATTURAPA_VERSIONE_PATH: &str = "/FatturaElettronica/@versione";

pub(crate) fn check_format_rules(root: &Element, format: EInvoiceFormat) -> Vec<ValidationError> {
    let mut findings = Vec::new();
    let namespaces = get_expected_namespaces(format);
    let mut require = |name: &str, path: &str| {
        if find_element(root, name, namespaces).is_none() {
            findings.push(ValidationError::error(format!("{name} is required")).at(path));
        }
    };

    match format.family() {
        FormatFamily::Ubl => {
            require("CustomizationID", "/Invoice/cbc:CustomizationID");
            require(
                "AccountingSupplierParty",
                "/Invoice/cac:AccountingSupplierParty",
            );
            require(
                "AccountingCustomerParty",
                "/Invoice/cac:AccountingCustomerParty",
            );
            require("LegalMonetaryTotal", "/Invoice/cac:LegalMonetaryTotal");
            check_ubl_profile(root, format, &mut findings);
        }
        FormatFamily::Cii => {
            require(
                "ExchangedDocumentContext",
                "/rsm:CrossIndustryInvoice/rsm:ExchangedDocumentContext",
            );
            require(
                "SupplyChainTradeTransaction",
                "/rsm:CrossIndustryInvoice/rsm:SupplyChainTradeTransaction",
            );
            check_cii_guideline(root, format, &mut findings);
        }
        FormatFamily::FatturaPa => {
            require(
                "FatturaElettronicaHeader",
                "/FatturaElettronica/FatturaElettronicaHeader",
            );
            require(
                "FatturaElettronicaBody",
                "/FatturaElettronica/FatturaElettronicaBody",
            );
            require(
                "CedentePrestatore",
                "/FatturaElettronica/FatturaElettronicaHeader/CedentePrestatore",
            );
            require(
                "CessionarioCommittente",
                "/FatturaElettronica/FatturaElettronicaHeader/CessionarioCommittente",
            );
            check_fatturapa_versione(root, &mut findings);
        }
        FormatFamily::Facturae => {
            require("FileHeader", "/Facturae/FileHeader");
            require("Parties", "/Facturae/Parties");
            require("Invoices", "/Facturae/Invoices");
            check_facturae_version(root, namespaces, &mut findings);
        }
    }

    findings
}

fn check_ubl_profile(root: &Element, format: EInvoiceFormat, findings: &mut Vec<ValidationError>) {
    let namespaces = get_expected_namespaces(format);

    if find_element(root, "ProfileID", namespaces).is_none() {
        findings.push(
            ValidationError::warning("ProfileID is recommended").at("/Invoice/cbc:ProfileID"),
        );
    }

    // The declared target should agree with what the document says it is.
    let customization = find_text(root, "CustomizationID", namespaces).map(str::to_lowercase);
    if let Some(id) = &customization {
        let marker = match format {
            EInvoiceFormat::XRechnung => Some("xrechnung"),
            EInvoiceFormat::Peppol => Some("peppol"),
            _ => None,
        };
        if let Some(marker) = marker.filter(|m| !id.contains(m)) {
            findings.push(
                ValidationError::warning(format!(
                    "CustomizationID does not reference {marker} although the document is validated as {format}"
                ))
                .at("/Invoice/cbc:CustomizationID"),
            );
        }
    }

    // BR-DE-15: XRechnung needs the Leitweg-ID in BuyerReference.
    if format == EInvoiceFormat::XRechnung
        && find_text(root, "BuyerReference", namespaces).is_none()
    {
        findings.push(
            ValidationError::warning("XRechnung expects a buyer reference / Leitweg-ID (BT-10)")
                .at("/Invoice/cbc:BuyerReference"),
        );
    }
}

fn check_cii_guideline(
    root: &Element,
    format: EInvoiceFormat,
    findings: &mut Vec<ValidationError>,
) {
    let namespaces = get_expected_namespaces(format);
    let Some(parameter) = find_element(root, "GuidelineSpecifiedDocumentContextParameter", namespaces)
    else {
        findings.push(
            ValidationError::warning("no GuidelineSpecifiedDocumentContextParameter found").at(
                "/rsm:CrossIndustryInvoice/rsm:ExchangedDocumentContext/ram:GuidelineSpecifiedDocumentContextParameter",
            ),
        );
        return;
    };

    let guideline = find_text(parameter, "ID", namespaces).map(str::to_lowercase);
    let marker = match format {
        EInvoiceFormat::FacturX => Some("factur-x"),
        EInvoiceFormat::Zugferd => Some("zugferd"),
        _ => None,
    };
    if let (Some(id), Some(marker)) = (guideline, marker) {
        if !id.contains(marker) {
            findings.push(
                ValidationError::warning(format!(
                    "guideline ID does not reference {marker} although the document is validated as {format}"
                ))
                .at("/rsm:CrossIndustryInvoice/rsm:ExchangedDocumentContext/ram:GuidelineSpecifiedDocumentContextParameter/ram:ID"),
            );
        }
    }
}

fn check_fatturapa_versione(root: &Element, findings: &mut Vec<ValidationError>) {
    match root.attribute("versione") {
        Some(v) if FATTURAPA_VERSIONS.contains(&v) => {}
        Some(v) => findings.push(
            ValidationError::error(format!(
                "versione '{v}' is not one of {}",
                FATTURAPA_VERSIONS.join(", ")
            ))
            .at(FATTURAPA_VERSIONE_PATH),
        ),
        None => findings.push(
            ValidationError::error(format!(
                "versione attribute is required (one of {})",
                FATTURAPA_VERSIONS.join(", ")
            ))
            .at(FATTURAPA_VERSIONE_PATH),
        ),
    }
}

fn check_facturae_version(
    root: &Element,
    namespaces: &[&str],
    findings: &mut Vec<ValidationError>,
) {
    if let Some(version) = find_text(root, "SchemaVersion", namespaces) {
        if !version.starts_with("3.2") {
            findings.push(
                ValidationError::warning(format!(
                    "SchemaVersion {version} differs from the supported 3.2 line"
                ))
                .at("/Facturae/FileHeader/SchemaVersion"),
            );
        }
    }
}
