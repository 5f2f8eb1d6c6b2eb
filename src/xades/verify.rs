use base64::{Engine as _, engine::general_purpose::STANDARD};
use rsa::pkcs1v15::{Signature, VerifyingKey};
use rsa::signature::Verifier;
use sha2::Sha256;
use thiserror::Error;
use tracing::{debug, warn};

use super::certificate::{certificate_from_base64, public_key};
use super::{digest_base64, extract};
use crate::core::canonicalize;

/// Why a signed document failed verification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum VerificationFailure {
    #[error("no ds:Signature block found")]
    MissingSignature,

    #[error("signature has no SignedInfo")]
    MissingSignedInfo,

    #[error("signature has no SignatureValue")]
    MissingSignatureValue,

    #[error("signature has no embedded X509Certificate")]
    MissingCertificate,

    #[error("embedded certificate is unusable: {0}")]
    InvalidCertificate(String),

    #[error("SignatureValue does not match SignedInfo")]
    BadSignature,

    #[error("digest mismatch for reference URI \"{uri}\"")]
    DigestMismatch { uri: String },

    #[error("reference target \"{uri}\" not found")]
    ReferenceTargetMissing { uri: String },

    #[error("malformed signature: {0}")]
    Malformed(String),
}

/// `true` when the last signature in `signed_xml` is intact.
///
/// The reason for a `false` is logged; use [`verify_signature_detailed`]
/// to get it as a value.
pub fn verify_signature(signed_xml: &str) -> bool {
    match verify_signature_detailed(signed_xml) {
        Ok(()) => true,
        Err(reason) => {
            warn!(%reason, "signature verification failed");
            false
        }
    }
}

/// Verify the last signature block in `signed_xml`.
///
/// Checks the RSA-SHA256 `SignatureValue` over the canonicalized
/// `SignedInfo` with the key of the embedded certificate, then recomputes
/// every reference digest. `URI=""` covers the document with the signature
/// block removed; `URI="#id"` covers the element carrying that `Id`.
pub fn verify_signature_detailed(signed_xml: &str) -> Result<(), VerificationFailure> {
    let block = extract::signature_block(signed_xml).ok_or(VerificationFailure::MissingSignature)?;
    let signature = &signed_xml[block.clone()];

    let signed_info =
        extract::signed_info(signature).ok_or(VerificationFailure::MissingSignedInfo)?;
    let signature_value =
        extract::signature_value(signature).ok_or(VerificationFailure::MissingSignatureValue)?;
    let certificate =
        extract::x509_certificate(signature).ok_or(VerificationFailure::MissingCertificate)?;

    let certificate = certificate_from_base64(certificate)
        .map_err(|e| VerificationFailure::InvalidCertificate(e.to_string()))?;
    let key = public_key(&certificate)
        .map_err(|e| VerificationFailure::InvalidCertificate(e.to_string()))?;

    let compact: String = signature_value.chars().filter(|c| !c.is_whitespace()).collect();
    let raw = STANDARD
        .decode(compact)
        .map_err(|e| VerificationFailure::Malformed(format!("SignatureValue is not base64: {e}")))?;
    let signature_bytes = Signature::try_from(raw.as_slice())
        .map_err(|_| VerificationFailure::BadSignature)?;

    VerifyingKey::<Sha256>::new(key)
        .verify(canonicalize(signed_info).as_bytes(), &signature_bytes)
        .map_err(|_| VerificationFailure::BadSignature)?;

    let references = extract::references(signed_info);
    if references.is_empty() {
        return Err(VerificationFailure::Malformed(
            "SignedInfo carries no references".into(),
        ));
    }

    for reference in references {
        let target = if reference.uri.is_empty() {
            let mut unsigned = String::with_capacity(signed_xml.len() - block.len());
            unsigned.push_str(&signed_xml[..block.start]);
            unsigned.push_str(&signed_xml[block.end..]);
            unsigned
        } else {
            let id = reference.uri.strip_prefix('#').ok_or_else(|| {
                VerificationFailure::Malformed(format!(
                    "unsupported reference URI \"{}\"",
                    reference.uri
                ))
            })?;
            extract::element_with_id(signed_xml, id)
                .ok_or_else(|| VerificationFailure::ReferenceTargetMissing {
                    uri: reference.uri.clone(),
                })?
                .to_string()
        };

        if reference.digest_value.as_deref() != Some(digest_base64(canonicalize(&target)).as_str())
        {
            return Err(VerificationFailure::DigestMismatch { uri: reference.uri });
        }
    }

    debug!("signature verified");
    Ok(())
}
