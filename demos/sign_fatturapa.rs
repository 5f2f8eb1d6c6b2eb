//! Validate, sign and verify a FatturaPA document with the test certificate.
//!
//! ```sh
//! cargo run --example sign_fatturapa --features all
//! ```

use std::collections::BTreeMap;

use einvoice::submission::prepare_submission;
use einvoice::xades::{SignOptions, verify_signature_detailed};
use einvoice::{DocumentTemplate, EInvoiceFormat};

fn main() {
    let fixtures = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

    // ── 1. Render a document ──────────────────────────────────────────
    let source = std::fs::read_to_string(format!("{fixtures}/xml/fatturapa.xml"))
        .expect("fixture template");
    let xml = DocumentTemplate::new(&source)
        .and_then(|t| t.render(&BTreeMap::from([("versione", "FPR12")])))
        .expect("render template");

    // ── 2. Validate and sign ──────────────────────────────────────────
    let options = SignOptions::new(
        format!("{fixtures}/certs/cert.pem"),
        format!("{fixtures}/certs/key_encrypted.pem"),
    )
    .with_password("correct-horse");

    let submission = prepare_submission(&xml, EInvoiceFormat::FatturaPa, Some(&options));
    println!("valid: {}", submission.validation.valid);
    for warning in &submission.validation.warnings {
        println!("  {warning}");
    }
    match &submission.signature {
        Some(signature) if signature.success() => println!("signed"),
        Some(signature) => println!("signing failed: {}", signature.error().unwrap_or("?")),
        None => println!("not signed"),
    }
    println!("ready for submission: {}", submission.is_ready());

    // ── 3. Verify, then tamper ────────────────────────────────────────
    let signed = submission.document();
    println!("verification: {:?}", verify_signature_detailed(signed));

    let tampered = signed.replace("Mario Rossi", "Mario Rosso");
    match verify_signature_detailed(&tampered) {
        Ok(()) => println!("tampered document verified (unexpected)"),
        Err(reason) => println!("tampered document rejected: {reason}"),
    }
}
