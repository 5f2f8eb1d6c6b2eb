//! Format-independent checks: root element, required elements, namespaces.

use super::document::Element;
use super::lookup::find_element;
use crate::core::registry::namespace_matches;
use crate::core::*;

/// Root name and registry-listed required/recommended elements.
pub(crate) fn check_structure(root: &Element, format: EInvoiceFormat) -> Vec<ValidationError> {
    let mut findings = Vec::new();
    let definition = get_schema_definition(format);

    if root.local_name != definition.root_element {
        findings.push(
            ValidationError::error(format!(
                "root element <{}> does not match <{}> expected for {format}",
                root.qname, definition.root_element
            ))
            .at("/"),
        );
    }

    let namespaces = get_expected_namespaces(format);
    for element in get_required_elements(format) {
        if find_element(root, element.name, namespaces).is_some() {
            continue;
        }
        let finding = if element.required {
            ValidationError::error(format!("required element {} is missing", element.name))
        } else {
            ValidationError::warning(format!("recommended element {} is missing", element.name))
        };
        findings.push(finding.at(element.path));
    }

    findings
}

/// Expected namespaces must appear among those declared on the root.
/// Missing ones are warnings only.
pub(crate) fn check_namespaces(root: &Element, format: EInvoiceFormat) -> Vec<ValidationError> {
    let mut declared: Vec<&str> = root
        .namespace_decls
        .iter()
        .map(|(_, uri)| uri.as_str())
        .collect();
    if let Some(ns) = &root.namespace {
        declared.push(ns);
    }

    get_expected_namespaces(format)
        .iter()
        .filter(|expected| !declared.iter().any(|d| namespace_matches(d, expected)))
        .map(|expected| {
            ValidationError::warning(format!(
                "expected namespace {expected} is not declared on the root element"
            ))
            .at("/")
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::document::parse;

    fn root(xml: &str) -> Element {
        parse(xml).root.expect("root")
    }

    #[test]
    fn wrong_root_is_error_at_slash() {
        let r = root("<CreditNote/>");
        let findings = check_structure(&r, EInvoiceFormat::Ubl);
        let err = findings.iter().find(|f| f.path.as_deref() == Some("/")).unwrap();
        assert!(err.is_error());
        assert!(err.message.contains("<CreditNote>"));
    }

    #[test]
    fn missing_recommended_is_warning() {
        let r = root(
            "<Invoice><ID>1</ID><IssueDate>d</IssueDate><InvoiceTypeCode>380</InvoiceTypeCode>\
             <DocumentCurrencyCode>EUR</DocumentCurrencyCode></Invoice>",
        );
        let findings = check_structure(&r, EInvoiceFormat::Ubl);
        assert!(findings.iter().all(|f| !f.is_error()), "{findings:?}");
        assert!(findings
            .iter()
            .any(|f| f.path.as_deref() == Some("/Invoice/cbc:DueDate")));
    }

    #[test]
    fn missing_required_is_error_with_path() {
        let r = root("<FatturaElettronica/>");
        let findings = check_structure(&r, EInvoiceFormat::FatturaPa);
        assert!(findings.iter().any(|f| f.is_error()
            && f.path.as_deref()
                == Some("/FatturaElettronica/FatturaElettronicaHeader/DatiTrasmissione")));
    }

    #[test]
    fn namespace_missing_is_only_a_warning() {
        let r = root("<Invoice xmlns=\"urn:example:something-else\"/>");
        let findings = check_namespaces(&r, EInvoiceFormat::Ubl);
        assert_eq!(findings.len(), 3);
        assert!(findings.iter().all(|f| !f.is_error()));
    }

    #[test]
    fn namespace_variant_accepted() {
        let r = root(
            "<p:FatturaElettronica \
               xmlns:p=\"https://ivaservizi.agenziaentrate.gov.it/docs/xsd/fatture/v1.2\" \
               xmlns:ds=\"http://www.w3.org/2000/09/xmldsig#\"/>",
        );
        assert!(check_namespaces(&r, EInvoiceFormat::FatturaPa).is_empty());
    }
}
