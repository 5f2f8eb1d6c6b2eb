//! Structural validation of realistic documents in every format family.
//!
//! Run with: `cargo test --test validator_tests`

#![cfg(feature = "validate")]

mod common;

use common::*;
use einvoice::validate::*;
use einvoice::*;

fn error_paths(result: &SchemaValidationResult) -> Vec<&str> {
    result
        .errors
        .iter()
        .filter_map(|e| e.path.as_deref())
        .collect()
}

// --- Well-formed documents ---

#[test]
fn complete_documents_are_valid_without_warnings() {
    let cases = [
        (ubl_invoice(UBL_CUSTOMIZATION), EInvoiceFormat::Ubl),
        (ubl_invoice(XRECHNUNG_CUSTOMIZATION), EInvoiceFormat::XRechnung),
        (ubl_invoice(PEPPOL_CUSTOMIZATION), EInvoiceFormat::Peppol),
        (cii_invoice(CII_GUIDELINE), EInvoiceFormat::Cii),
        (cii_invoice(FACTURX_GUIDELINE), EInvoiceFormat::FacturX),
        (cii_invoice(ZUGFERD_GUIDELINE), EInvoiceFormat::Zugferd),
        (fatturapa("FPR12"), EInvoiceFormat::FatturaPa),
        (fatturapa("FPA12"), EInvoiceFormat::FatturaPa),
        (facturae("3.2.2"), EInvoiceFormat::Facturae),
    ];
    for (xml, format) in cases {
        let result = validate(&xml, format);
        assert!(result.valid, "{format}: {:?}", result.errors);
        assert!(result.warnings.is_empty(), "{format}: {:?}", result.warnings);
        assert_eq!(
            result.schema_version.as_deref(),
            Some(get_schema_definition(format).version)
        );
    }
}

#[test]
fn validation_is_idempotent() {
    let xml = without_element(&ubl_invoice(UBL_CUSTOMIZATION), "cbc:DueDate");
    let first = validate(&xml, EInvoiceFormat::Ubl);
    let second = validate(&xml, EInvoiceFormat::Ubl);
    assert_eq!(first.valid, second.valid);
    assert_eq!(first.errors, second.errors);
    assert_eq!(first.warnings, second.warnings);
}

// --- Mandatory elements ---

#[test]
fn missing_supplier_party_invalidates_ubl() {
    for format in [
        EInvoiceFormat::Ubl,
        EInvoiceFormat::XRechnung,
        EInvoiceFormat::Peppol,
    ] {
        let xml = without_element(
            &ubl_invoice(XRECHNUNG_CUSTOMIZATION),
            "cac:AccountingSupplierParty",
        );
        let result = validate(&xml, format);
        assert!(!result.valid);
        assert!(
            error_paths(&result)
                .iter()
                .any(|p| p.contains("AccountingSupplierParty")),
            "{format}: {:?}",
            result.errors
        );
    }
}

#[test]
fn missing_required_registry_element_is_error_at_its_path() {
    let xml = without_element(&ubl_invoice(UBL_CUSTOMIZATION), "cbc:IssueDate");
    let result = validate(&xml, EInvoiceFormat::Ubl);
    assert!(!result.valid);
    assert_eq!(error_paths(&result), ["/Invoice/cbc:IssueDate"]);
}

#[test]
fn missing_recommended_element_is_only_a_warning() {
    let xml = without_element(&ubl_invoice(UBL_CUSTOMIZATION), "cbc:DueDate");
    let result = validate(&xml, EInvoiceFormat::Ubl);
    assert!(result.valid);
    assert_eq!(result.warnings.len(), 1);
    assert!(result.warnings[0].message.contains("DueDate"));
}

#[test]
fn cii_requires_document_context_and_transaction() {
    let xml = without_element(
        &cii_invoice(CII_GUIDELINE),
        "rsm:SupplyChainTradeTransaction",
    );
    let result = validate(&xml, EInvoiceFormat::Cii);
    assert!(!result.valid);
    assert!(
        error_paths(&result)
            .iter()
            .any(|p| p.ends_with("rsm:SupplyChainTradeTransaction"))
    );
}

#[test]
fn facturae_requires_parties() {
    let xml = without_element(&facturae("3.2.2"), "Parties");
    let result = validate(&xml, EInvoiceFormat::Facturae);
    assert!(!result.valid);
    assert_eq!(error_paths(&result), ["/Facturae/Parties"]);
}

#[test]
fn fatturapa_requires_buyer() {
    let xml = without_element(&fatturapa("FPR12"), "CessionarioCommittente");
    let result = validate(&xml, EInvoiceFormat::FatturaPa);
    assert!(!result.valid);
    assert!(
        result
            .errors
            .iter()
            .any(|e| e.message == "CessionarioCommittente is required")
    );
}

// --- Root element ---

#[test]
fn wrong_root_is_reported() {
    let result = validate(&fatturapa("FPR12"), EInvoiceFormat::Ubl);
    assert!(!result.valid);
    let root_error = result
        .errors
        .iter()
        .find(|e| e.path.as_deref() == Some("/") && e.message.starts_with("root element"))
        .unwrap();
    insta::assert_snapshot!(
        root_error.message.as_str(),
        @"root element <p:FatturaElettronica> does not match <Invoice> expected for UBL"
    );
}

// --- Namespaces ---

#[test]
fn missing_namespaces_only_warn() {
    let xml = fatturapa("FPR12")
        .replace(
            r#"xmlns:p="http://ivaservizi.agenziaentrate.gov.it/docs/xsd/fatture/v1.2""#,
            r#"xmlns:p="urn:example:other""#,
        )
        .replace(r#"xmlns:ds="http://www.w3.org/2000/09/xmldsig#""#, "");
    let result = validate(&xml, EInvoiceFormat::FatturaPa);
    assert!(result.valid, "{:?}", result.errors);
    assert_eq!(result.warnings.len(), 2, "{:?}", result.warnings);
    assert!(
        result
            .warnings
            .iter()
            .all(|w| w.message.starts_with("expected namespace"))
    );
}

#[test]
fn namespace_versions_match_fuzzily() {
    let xml = ubl_invoice(UBL_CUSTOMIZATION).replace(
        "urn:oasis:names:specification:ubl:schema:xsd:Invoice-2",
        "urn:oasis:names:specification:ubl:schema:xsd:Invoice-2.1",
    );
    let result = validate(&xml, EInvoiceFormat::Ubl);
    assert!(result.valid);
    assert!(result.warnings.is_empty(), "{:?}", result.warnings);
}

// --- FatturaPA versione ---

#[test]
fn fatturapa_versione_contract() {
    let versione_errors = |xml: &str| {
        validate(xml, EInvoiceFormat::FatturaPa)
            .errors
            .into_iter()
            .filter(|e| e.path.as_deref() == Some(FATTURAPA_VERSIONE_PATH))
            .count()
    };

    assert_eq!(versione_errors(&fatturapa("FPR12")), 0);
    assert_eq!(versione_errors(&fatturapa("FPA12")), 0);
    assert_eq!(versione_errors(&fatturapa("XXXX")), 1);
    assert_eq!(versione_errors(&fatturapa("fpr12")), 1);

    let absent = fatturapa("FPR12").replace(r#"versione="FPR12""#, "");
    assert_eq!(versione_errors(&absent), 1);
}

// --- Facturae schema version ---

#[test]
fn old_facturae_schema_version_warns() {
    let result = validate(&facturae("3.1"), EInvoiceFormat::Facturae);
    assert!(result.valid);
    assert_eq!(result.warnings.len(), 1);
    assert!(result.warnings[0].message.contains("3.1"));
}

// --- Profile hints ---

#[test]
fn customization_mismatch_warns() {
    let result = validate(&ubl_invoice(UBL_CUSTOMIZATION), EInvoiceFormat::XRechnung);
    assert!(result.valid);
    assert!(
        result
            .warnings
            .iter()
            .any(|w| w.path.as_deref() == Some("/Invoice/cbc:CustomizationID"))
    );
}

#[test]
fn xrechnung_without_buyer_reference_warns() {
    let xml = without_element(
        &ubl_invoice(XRECHNUNG_CUSTOMIZATION),
        "cbc:BuyerReference",
    );
    let result = validate(&xml, EInvoiceFormat::XRechnung);
    assert!(result.valid);
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(
        result.warnings[0].path.as_deref(),
        Some("/Invoice/cbc:BuyerReference")
    );
}

// --- Malformed input ---

#[test]
fn malformed_xml_reports_position() {
    let xml = fatturapa("FPR12").replace("</CedentePrestatore>", "</Cedente>");
    let result = validate(&xml, EInvoiceFormat::FatturaPa);
    assert!(!result.valid);
    let parse_error = result
        .errors
        .iter()
        .find(|e| e.message.starts_with("malformed XML"))
        .unwrap();
    assert!(parse_error.line.is_some());
    assert!(parse_error.column.is_some());
}

#[test]
fn garbage_yields_single_fatal_error() {
    let result = validate("%PDF-1.7 not an xml document", EInvoiceFormat::Ubl);
    assert!(!result.valid);
    assert_eq!(result.errors.len(), 1);
    assert!(result.warnings.is_empty());
}

fn deeply_nested_invoice(depth: usize) -> String {
    format!(
        "<Invoice xmlns=\"urn:oasis:names:specification:ubl:schema:xsd:Invoice-2\">{}{}</Invoice>",
        "<a>".repeat(depth),
        "</a>".repeat(depth)
    )
}

#[test]
fn deeply_nested_document_is_rejected_not_fatal() {
    let xml = deeply_nested_invoice(100_000);
    let result = validate(&xml, EInvoiceFormat::Ubl);
    assert!(!result.valid);
    assert!(
        result
            .errors
            .iter()
            .any(|e| e.message.contains("nesting exceeds")),
        "{:?}",
        result.errors
    );
    assert_eq!(detect_format(&xml), None);
}

// --- Batches ---

#[test]
fn batch_survives_deeply_nested_sibling() {
    let deep = deeply_nested_invoice(100_000);
    let good = ubl_invoice(UBL_CUSTOMIZATION);
    let items = [
        BatchItem::new(&deep, EInvoiceFormat::Ubl),
        BatchItem::new(&good, EInvoiceFormat::Ubl),
    ];
    let results = validate_batch(&items);
    assert!(!results[0].valid);
    assert!(results[1].valid, "{:?}", results[1].errors);
}

#[test]
fn batch_isolates_bad_documents() {
    let good = ubl_invoice(UBL_CUSTOMIZATION);
    let items = [
        BatchItem::new("<Invoice><unclosed>", EInvoiceFormat::Ubl),
        BatchItem::new(&good, EInvoiceFormat::Ubl),
    ];
    let results = validate_batch(&items);
    assert_eq!(results.len(), 2);
    assert!(!results[0].valid);
    assert!(results[1].valid, "{:?}", results[1].errors);
}

#[test]
fn batch_preserves_input_order_across_workers() {
    let documents: Vec<(String, EInvoiceFormat)> = (0..24)
        .map(|i| match i % 3 {
            0 => (fatturapa("FPR12"), EInvoiceFormat::FatturaPa),
            1 => (facturae("3.2.2"), EInvoiceFormat::Facturae),
            _ => ("<broken".to_string(), EInvoiceFormat::Cii),
        })
        .collect();
    let items: Vec<BatchItem<'_>> = documents
        .iter()
        .map(|(xml, format)| BatchItem::new(xml, *format))
        .collect();

    let options = BatchOptions {
        workers: std::num::NonZeroUsize::new(4),
    };
    let results = validate_batch_with(&items, &options);
    assert_eq!(results.len(), items.len());
    for (i, result) in results.iter().enumerate() {
        assert_eq!(result.format, items[i].format);
        assert_eq!(result.valid, i % 3 != 2, "document {i}");
    }
}
