//! XAdES-BES enveloped signatures.
//!
//! [`sign_xml`] embeds a `ds:Signature` block carrying three references
//! (the document, the XAdES `SignedProperties` and the `KeyInfo`) and
//! [`verify_signature`] checks such a block: RSA-SHA256 over `SignedInfo`
//! plus every reference digest.
//!
//! Canonicalization is the simplified form from
//! [`canonicalize`](crate::core::canonicalize), not W3C Exclusive C14N.
//! Signatures produced here verify here; third-party verifiers that
//! apply full C14N may disagree on documents with unusual formatting.
//!
//! ```no_run
//! use einvoice::xades::{SignOptions, sign_xml, verify_signature};
//!
//! let options = SignOptions::new("certs/firma.pem", "certs/firma.key")
//!     .with_password("segreto");
//! let xml = std::fs::read_to_string("IT01234567890_00001.xml").unwrap();
//!
//! let result = sign_xml(&xml, &options);
//! let signed = result.signed_xml().expect("signing failed");
//! assert!(verify_signature(signed));
//! ```

mod certificate;
mod extract;
mod sign;
mod verify;
mod xml_utils;

use std::path::PathBuf;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::Deserialize;
use sha2::{Digest, Sha256};

pub use certificate::CertificateInfo;
pub use sign::sign_xml;
pub use verify::{VerificationFailure, verify_signature, verify_signature_detailed};

/// Algorithm and type URIs written into the signature block.
pub mod algorithms {
    pub const SHA256: &str = "http://www.w3.org/2001/04/xmlenc#sha256";
    pub const RSA_SHA256: &str = "http://www.w3.org/2001/04/xmldsig-more#rsa-sha256";
    pub const EXC_C14N: &str = "http://www.w3.org/2001/10/xml-exc-c14n#";
    pub const ENVELOPED_SIGNATURE: &str = "http://www.w3.org/2000/09/xmldsig#enveloped-signature";
    pub const SIGNED_PROPERTIES_TYPE: &str = "http://uri.etsi.org/01903#SignedProperties";
}

/// Where to find the signing credentials.
///
/// Key material is only ever passed by path. Deserializes from a config
/// file as `{ "certificatePath": ..., "privateKeyPath": ..., "password": ... }`.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignOptions {
    /// PEM (or DER) X.509 certificate.
    pub certificate_path: PathBuf,
    /// PEM private key: PKCS#8, encrypted PKCS#8 or PKCS#1.
    pub private_key_path: PathBuf,
    /// Passphrase for an encrypted PKCS#8 key.
    #[serde(default)]
    pub password: Option<String>,
}

impl SignOptions {
    pub fn new(certificate_path: impl Into<PathBuf>, private_key_path: impl Into<PathBuf>) -> Self {
        Self {
            certificate_path: certificate_path.into(),
            private_key_path: private_key_path.into(),
            password: None,
        }
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }
}

impl std::fmt::Debug for SignOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignOptions")
            .field("certificate_path", &self.certificate_path)
            .field("private_key_path", &self.private_key_path)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Base64 SHA-256 digest.
pub(crate) fn digest_base64(data: impl AsRef<[u8]>) -> String {
    STANDARD.encode(Sha256::digest(data.as_ref()))
}
