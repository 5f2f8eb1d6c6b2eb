//! Detect and validate an e-invoice document.
//!
//! ```sh
//! cargo run --example validate_document -- invoice.xml [FORMAT]
//! ```

use einvoice::EInvoiceFormat;
use einvoice::validate::{detect_format, validate};

fn main() {
    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        eprintln!("usage: validate_document <file.xml> [FORMAT]");
        std::process::exit(2);
    };
    let xml = match std::fs::read_to_string(&path) {
        Ok(xml) => xml,
        Err(e) => {
            eprintln!("cannot read {path}: {e}");
            std::process::exit(2);
        }
    };

    // ── 1. Format: explicit, or detected ──────────────────────────────
    let format = match args.next() {
        Some(tag) => match tag.parse::<EInvoiceFormat>() {
            Ok(format) => format,
            Err(e) => {
                eprintln!("{e}");
                std::process::exit(2);
            }
        },
        None => match detect_format(&xml) {
            Some(format) => {
                println!("Detected format: {format}");
                format
            }
            None => {
                eprintln!("could not detect the document format");
                std::process::exit(1);
            }
        },
    };

    // ── 2. Validation ─────────────────────────────────────────────────
    let result = validate(&xml, format);
    println!(
        "{format} (schema {}): {}",
        result.schema_version.as_deref().unwrap_or("?"),
        if result.valid { "valid" } else { "INVALID" }
    );
    for finding in result.errors.iter().chain(&result.warnings) {
        println!("  {finding}");
    }
    if format.requires_signature() {
        println!("  note: {format} must be signed before submission");
    }

    std::process::exit(if result.valid { 0 } else { 1 });
}
