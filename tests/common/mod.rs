use std::collections::BTreeMap;
use std::path::PathBuf;

use einvoice::DocumentTemplate;

pub const UBL_CUSTOMIZATION: &str = "urn:cen.eu:en16931:2017";
pub const XRECHNUNG_CUSTOMIZATION: &str =
    "urn:cen.eu:en16931:2017#compliant#urn:xeinkauf.de:kosit:xrechnung_3.0";
pub const PEPPOL_CUSTOMIZATION: &str =
    "urn:cen.eu:en16931:2017#compliant#urn:fdc:peppol.eu:2017:poacc:billing:3.0";

pub const CII_GUIDELINE: &str = "urn:cen.eu:en16931:2017";
pub const FACTURX_GUIDELINE: &str = "urn:cen.eu:en16931:2017#conformant#urn:factur-x.eu:1p0:basic";
pub const ZUGFERD_GUIDELINE: &str = "urn:cen.eu:en16931:2017#conformant#urn:zugferd.de:2p1:extended";

pub fn fixture_path(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(relative)
}

fn render(file: &str, name: &str, value: &str) -> String {
    let source = std::fs::read_to_string(fixture_path(file)).unwrap();
    let template = DocumentTemplate::new(&source).unwrap();
    template
        .render(&BTreeMap::from([(name, value)]))
        .unwrap()
}

#[allow(dead_code)]
pub fn ubl_invoice(customization: &str) -> String {
    render("xml/ubl_invoice.xml", "customization", customization)
}

#[allow(dead_code)]
pub fn cii_invoice(guideline: &str) -> String {
    render("xml/cii_invoice.xml", "guideline", guideline)
}

#[allow(dead_code)]
pub fn fatturapa(versione: &str) -> String {
    render("xml/fatturapa.xml", "versione", versione)
}

#[allow(dead_code)]
pub fn facturae(schema_version: &str) -> String {
    render("xml/facturae.xml", "schema_version", schema_version)
}

/// Remove the first element named `qname`, including its content.
#[allow(dead_code)]
pub fn without_element(xml: &str, qname: &str) -> String {
    let open = format!("<{qname}>");
    let close = format!("</{qname}>");
    let start = xml.find(&open).unwrap();
    let end = xml[start..].find(&close).unwrap() + start + close.len();
    format!("{}{}", &xml[..start], &xml[end..])
}
