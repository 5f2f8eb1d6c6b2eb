//! XAdES-BES signing and verification against the fixture certificates.
//!
//! Run with: `cargo test --test signing_tests`

#![cfg(feature = "xades")]

mod common;

use common::*;
use einvoice::xades::*;

fn options() -> SignOptions {
    SignOptions::new(
        fixture_path("certs/cert.pem"),
        fixture_path("certs/key.pem"),
    )
}

fn signed_fattura() -> String {
    sign_xml(&fatturapa("FPR12"), &options())
        .into_result()
        .unwrap()
}

// --- Signing ---

#[test]
fn signed_document_carries_one_complete_signature() {
    let signed = signed_fattura();

    assert_eq!(signed.matches("<ds:Signature ").count(), 1);
    assert_eq!(signed.matches("<ds:Reference ").count(), 3);
    assert!(signed.contains("<xades:QualifyingProperties"));
    assert!(signed.contains("<ds:X509SerialNumber>4660</ds:X509SerialNumber>"));

    let value_start = signed.find("<ds:SignatureValue>").unwrap() + "<ds:SignatureValue>".len();
    let value_end = signed.find("</ds:SignatureValue>").unwrap();
    assert!(value_end > value_start + 300, "2048-bit signature expected");
}

#[test]
fn signature_is_spliced_before_root_close() {
    let source = fatturapa("FPR12");
    let signed = signed_fattura();

    let block_start = signed.find("<ds:Signature ").unwrap();
    let block_end = signed.find("</ds:Signature>").unwrap() + "</ds:Signature>".len();
    assert!(signed[block_end..].starts_with("</p:FatturaElettronica>"));

    let unsigned = format!("{}{}", &signed[..block_start], &signed[block_end..]);
    assert_eq!(unsigned, source);
}

#[test]
fn ids_reference_each_other() {
    let signed = signed_fattura();
    let signature_id = attribute_after(&signed, "<ds:Signature ", "Id");
    let properties_id = attribute_after(&signed, "<xades:SignedProperties ", "Id");
    let key_info_id = attribute_after(&signed, "<ds:KeyInfo ", "Id");

    assert!(signature_id.starts_with("Signature-"));
    assert!(signed.contains(&format!("Target=\"#{signature_id}\"")));
    assert!(signed.contains(&format!("URI=\"#{properties_id}\"")));
    assert!(signed.contains(&format!("URI=\"#{key_info_id}\"")));
}

fn attribute_after<'a>(xml: &'a str, tag: &str, name: &str) -> &'a str {
    let tag_at = xml.find(tag).unwrap();
    let needle = format!(" {name}=\"");
    let start = tag_at + xml[tag_at..].find(&needle).unwrap() + needle.len();
    let end = start + xml[start..].find('"').unwrap();
    &xml[start..end]
}

#[test]
fn pkcs1_and_encrypted_keys_sign() {
    let source = fatturapa("FPR12");
    let pkcs1 = SignOptions::new(
        fixture_path("certs/cert.pem"),
        fixture_path("certs/key_pkcs1.pem"),
    );
    let encrypted = SignOptions::new(
        fixture_path("certs/cert.pem"),
        fixture_path("certs/key_encrypted.pem"),
    )
    .with_password("correct-horse");

    for options in [pkcs1, encrypted] {
        let result = sign_xml(&source, &options);
        assert!(result.success(), "{options:?}: {:?}", result.error());
        assert!(verify_signature(result.signed_xml().unwrap()));
    }
}

#[test]
fn signing_failures_are_reported() {
    let source = fatturapa("FPR12");
    let cases = [
        (
            SignOptions::new(fixture_path("certs/missing.pem"), fixture_path("certs/key.pem")),
            "missing.pem",
        ),
        (
            SignOptions::new(
                fixture_path("certs/cert.pem"),
                fixture_path("certs/key_encrypted.pem"),
            ),
            "no password",
        ),
        (
            SignOptions::new(
                fixture_path("certs/cert.pem"),
                fixture_path("certs/key_encrypted.pem"),
            )
            .with_password("wrong"),
            "cannot decrypt",
        ),
        (
            SignOptions::new(
                fixture_path("certs/cert.pem"),
                fixture_path("certs/other_key.pem"),
            ),
            "does not match",
        ),
        (
            SignOptions::new(fixture_path("certs/key.pem"), fixture_path("certs/key.pem")),
            "certificate",
        ),
    ];

    for (options, expected) in cases {
        let result = sign_xml(&source, &options);
        assert!(!result.success());
        let error = result.error().unwrap();
        assert!(error.contains(expected), "{error}");
    }
}

#[test]
fn failure_serializes_with_success_flag() {
    let result = sign_xml(
        "<r/>",
        &SignOptions::new("/nonexistent/cert.pem", "/nonexistent/key.pem"),
    );
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["success"], false);
    assert!(json.get("signedXml").is_none());
    assert!(json["error"].as_str().unwrap().contains("/nonexistent/cert.pem"));
}

// --- Verification ---

#[test]
fn success_serializes_with_signed_xml() {
    let result = sign_xml(&fatturapa("FPR12"), &options());
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["success"], true);
    assert!(json["signedXml"].as_str().unwrap().contains("<ds:Signature "));
    assert!(json.get("error").is_none());
}

#[test]
fn signed_document_verifies() {
    assert!(verify_signature(&signed_fattura()));
}

#[test]
fn tampered_body_fails_verification() {
    let tampered = signed_fattura().replace("Mario Rossi", "Mario Rosso");
    assert!(!verify_signature(&tampered));
    assert_eq!(
        verify_signature_detailed(&tampered),
        Err(VerificationFailure::DigestMismatch { uri: String::new() })
    );
}

#[test]
fn tampered_amount_fails_verification() {
    let tampered = signed_fattura().replace("<PrezzoTotale>100.00", "<PrezzoTotale>10.00");
    assert!(!verify_signature(&tampered));
}

#[test]
fn line_ending_changes_still_verify() {
    let signed = signed_fattura().replace('\n', "\r\n");
    assert!(verify_signature(&signed));
}

#[test]
fn unsigned_document_fails_verification() {
    assert_eq!(
        verify_signature_detailed(&fatturapa("FPR12")),
        Err(VerificationFailure::MissingSignature)
    );
}

#[test]
fn resigned_document_verifies_last_signature() {
    let once = signed_fattura();
    let twice = sign_xml(&once, &options()).into_result().unwrap();
    assert_eq!(twice.matches("<ds:Signature ").count(), 2);
    assert!(verify_signature(&twice));
}

#[test]
fn removed_key_info_is_detected() {
    let signed = signed_fattura();
    let start = signed.find("<ds:KeyInfo ").unwrap();
    let end = signed.find("</ds:KeyInfo>").unwrap() + "</ds:KeyInfo>".len();
    let stripped = format!("{}{}", &signed[..start], &signed[end..]);
    assert_eq!(
        verify_signature_detailed(&stripped),
        Err(VerificationFailure::MissingCertificate)
    );
}
