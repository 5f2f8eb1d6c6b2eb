//! Format Registry: the static table of known e-invoice formats.
//!
//! Everything here is a `const`; there is no initialization step and no
//! mutation API.

use super::types::{EInvoiceFormat, FormatFamily, RequiredElement, SchemaDefinition};

/// UBL 2.1 namespace URIs.
pub mod ubl_ns {
    pub const INVOICE: &str = "urn:oasis:names:specification:ubl:schema:xsd:Invoice-2";
    pub const CAC: &str =
        "urn:oasis:names:specification:ubl:schema:xsd:CommonAggregateComponents-2";
    pub const CBC: &str = "urn:oasis:names:specification:ubl:schema:xsd:CommonBasicComponents-2";
}

/// CII D16B namespace URIs.
pub mod cii_ns {
    pub const RSM: &str = "urn:un:unece:uncefact:data:standard:CrossIndustryInvoice:100";
    pub const RAM: &str =
        "urn:un:unece:uncefact:data:standard:ReusableAggregateBusinessInformationEntity:100";
    pub const UDT: &str = "urn:un:unece:uncefact:data:standard:UnqualifiedDataType:100";
}

/// FatturaPA 1.2 namespace.
pub const FATTURAPA_NS: &str = "http://ivaservizi.agenziaentrate.gov.it/docs/xsd/fatture/v1.2";

/// Facturae 3.2.2 namespace.
pub const FACTURAE_NS: &str = "http://www.facturae.gob.es/formato/Versiones/Facturaev3_2_2.xml";

/// W3C XML Signature namespace.
pub const XMLDSIG_NS: &str = "http://www.w3.org/2000/09/xmldsig#";

/// ETSI XAdES 1.3.2 namespace.
pub const XADES_NS: &str = "http://uri.etsi.org/01903/v1.3.2#";

/// Prefixes conventionally used by e-invoice producers, tried in this
/// order when an element is looked up by local name.
pub const CONVENTIONAL_PREFIXES: [&str; 6] = ["cbc", "cac", "ram", "rsm", "udt", "p"];

/// Registry entries in registration order.
pub const SCHEMA_DEFINITIONS: [SchemaDefinition; 8] = [
    SchemaDefinition {
        format: EInvoiceFormat::Ubl,
        namespace: ubl_ns::INVOICE,
        root_element: "Invoice",
        version: "2.1",
    },
    SchemaDefinition {
        format: EInvoiceFormat::Cii,
        namespace: cii_ns::RSM,
        root_element: "CrossIndustryInvoice",
        version: "D16B",
    },
    SchemaDefinition {
        format: EInvoiceFormat::FacturX,
        namespace: cii_ns::RSM,
        root_element: "CrossIndustryInvoice",
        version: "1.0.07",
    },
    SchemaDefinition {
        format: EInvoiceFormat::Zugferd,
        namespace: cii_ns::RSM,
        root_element: "CrossIndustryInvoice",
        version: "2.3",
    },
    SchemaDefinition {
        format: EInvoiceFormat::FatturaPa,
        namespace: FATTURAPA_NS,
        root_element: "FatturaElettronica",
        version: "1.2.2",
    },
    SchemaDefinition {
        format: EInvoiceFormat::Facturae,
        namespace: FACTURAE_NS,
        root_element: "Facturae",
        version: "3.2.2",
    },
    SchemaDefinition {
        format: EInvoiceFormat::XRechnung,
        namespace: ubl_ns::INVOICE,
        root_element: "Invoice",
        version: "3.0",
    },
    SchemaDefinition {
        format: EInvoiceFormat::Peppol,
        namespace: ubl_ns::INVOICE,
        root_element: "Invoice",
        version: "3.0",
    },
];

const UBL_REQUIRED: [RequiredElement; 6] = [
    RequiredElement {
        name: "ID",
        path: "/Invoice/cbc:ID",
        required: true,
    },
    RequiredElement {
        name: "IssueDate",
        path: "/Invoice/cbc:IssueDate",
        required: true,
    },
    RequiredElement {
        name: "InvoiceTypeCode",
        path: "/Invoice/cbc:InvoiceTypeCode",
        required: true,
    },
    RequiredElement {
        name: "DocumentCurrencyCode",
        path: "/Invoice/cbc:DocumentCurrencyCode",
        required: true,
    },
    RequiredElement {
        name: "DueDate",
        path: "/Invoice/cbc:DueDate",
        required: false,
    },
    RequiredElement {
        name: "InvoiceLine",
        path: "/Invoice/cac:InvoiceLine",
        required: false,
    },
];

const CII_REQUIRED: [RequiredElement; 3] = [
    RequiredElement {
        name: "ExchangedDocument",
        path: "/rsm:CrossIndustryInvoice/rsm:ExchangedDocument",
        required: true,
    },
    RequiredElement {
        name: "IssueDateTime",
        path: "/rsm:CrossIndustryInvoice/rsm:ExchangedDocument/ram:IssueDateTime",
        required: false,
    },
    RequiredElement {
        name: "ApplicableHeaderTradeSettlement",
        path: "/rsm:CrossIndustryInvoice/rsm:SupplyChainTradeTransaction/ram:ApplicableHeaderTradeSettlement",
        required: false,
    },
];

const FATTURAPA_REQUIRED: [RequiredElement; 3] = [
    RequiredElement {
        name: "DatiTrasmissione",
        path: "/FatturaElettronica/FatturaElettronicaHeader/DatiTrasmissione",
        required: true,
    },
    RequiredElement {
        name: "DatiGeneraliDocumento",
        path: "/FatturaElettronica/FatturaElettronicaBody/DatiGenerali/DatiGeneraliDocumento",
        required: true,
    },
    RequiredElement {
        name: "DatiBeniServizi",
        path: "/FatturaElettronica/FatturaElettronicaBody/DatiBeniServizi",
        required: false,
    },
];

const FACTURAE_REQUIRED: [RequiredElement; 2] = [
    RequiredElement {
        name: "FileHeader",
        path: "/Facturae/FileHeader",
        required: true,
    },
    RequiredElement {
        name: "Batch",
        path: "/Facturae/FileHeader/Batch",
        required: false,
    },
];

const UBL_NAMESPACES: [&str; 3] = [ubl_ns::INVOICE, ubl_ns::CAC, ubl_ns::CBC];
const CII_NAMESPACES: [&str; 3] = [cii_ns::RSM, cii_ns::RAM, cii_ns::UDT];
const FATTURAPA_NAMESPACES: [&str; 2] = [FATTURAPA_NS, XMLDSIG_NS];
const FACTURAE_NAMESPACES: [&str; 2] = [FACTURAE_NS, XMLDSIG_NS];

/// Case-insensitive membership test against the registry.
pub fn is_format_supported(tag: &str) -> bool {
    tag.parse::<EInvoiceFormat>().is_ok()
}

/// All registered formats, in registry order.
pub fn get_supported_formats() -> Vec<EInvoiceFormat> {
    SCHEMA_DEFINITIONS.iter().map(|d| d.format).collect()
}

pub fn get_schema_definition(format: EInvoiceFormat) -> &'static SchemaDefinition {
    let index = match format {
        EInvoiceFormat::Ubl => 0,
        EInvoiceFormat::Cii => 1,
        EInvoiceFormat::FacturX => 2,
        EInvoiceFormat::Zugferd => 3,
        EInvoiceFormat::FatturaPa => 4,
        EInvoiceFormat::Facturae => 5,
        EInvoiceFormat::XRechnung => 6,
        EInvoiceFormat::Peppol => 7,
    };
    &SCHEMA_DEFINITIONS[index]
}

/// Must-have and should-have child elements for structural validation.
pub fn get_required_elements(format: EInvoiceFormat) -> &'static [RequiredElement] {
    match format.family() {
        FormatFamily::Ubl => &UBL_REQUIRED,
        FormatFamily::Cii => &CII_REQUIRED,
        FormatFamily::FatturaPa => &FATTURAPA_REQUIRED,
        FormatFamily::Facturae => &FACTURAE_REQUIRED,
    }
}

/// Namespaces a well-formed document of this format is expected to declare.
pub fn get_expected_namespaces(format: EInvoiceFormat) -> &'static [&'static str] {
    match format.family() {
        FormatFamily::Ubl => &UBL_NAMESPACES,
        FormatFamily::Cii => &CII_NAMESPACES,
        FormatFamily::FatturaPa => &FATTURAPA_NAMESPACES,
        FormatFamily::Facturae => &FACTURAE_NAMESPACES,
    }
}

/// The last path segment of a namespace URI or URN, used for fuzzy
/// namespace matching (`...:Invoice-2` → `Invoice-2`, `.../v1.2` → `v1.2`).
pub fn namespace_tail(namespace: &str) -> &str {
    let trimmed = namespace.trim_end_matches('/');
    match trimmed.rfind(['/', ':']) {
        Some(idx) => &trimmed[idx + 1..],
        None => trimmed,
    }
}

/// Fuzzy namespace match: the observed URI contains the expected tail.
pub fn namespace_matches(observed: &str, expected: &str) -> bool {
    let tail = namespace_tail(expected);
    !tail.is_empty() && observed.contains(tail)
}
