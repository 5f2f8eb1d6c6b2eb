//! # einvoice
//!
//! Compliance core for structured electronic invoices: a static registry
//! of the supported formats, a structural validator with format
//! detection, and an XAdES-BES signer/verifier for the formats that
//! mandate a signature (FatturaPA, Facturae).
//!
//! Supported formats: UBL, CII, Factur-X, ZUGFeRD, FatturaPA, Facturae,
//! XRechnung and Peppol BIS Billing 3.0.
//!
//! ## Quick Start
//!
//! ```rust
//! use einvoice::*;
//! use einvoice::validate::{detect_format, validate};
//!
//! let xml = r#"<Invoice xmlns="urn:oasis:names:specification:ubl:schema:xsd:Invoice-2">
//!     <cbc:CustomizationID>urn:cen.eu:en16931:2017#compliant#urn:xeinkauf.de:kosit:xrechnung_3.0</cbc:CustomizationID>
//! </Invoice>"#;
//!
//! let format = detect_format(xml).unwrap();
//! assert_eq!(format, EInvoiceFormat::XRechnung);
//!
//! let result = validate(xml, format);
//! assert!(!result.valid);
//! for error in &result.errors {
//!     println!("{error}");
//! }
//! ```
//!
//! No entry point returns an error or panics on bad input: validation
//! failures are reported inside [`SchemaValidationResult`], signing
//! failures inside [`SignatureResult`], and verification collapses to a
//! boolean.
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` | Format registry, canonicalizer, result types, templates |
//! | `validate` (default) | Structural validation, format detection, batches |
//! | `xades` (default) | XAdES-BES signing and verification |
//! | `all` | Everything, including the submission pipeline |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "validate")]
pub mod validate;

#[cfg(feature = "xades")]
pub mod xades;

#[cfg(all(feature = "validate", feature = "xades"))]
pub mod submission;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;
