use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::{DateTime, SecondsFormat, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use super::algorithms::*;
use super::certificate::CertificateInfo;
use super::xml_utils::XmlWriter;
use super::{SignOptions, digest_base64, extract};
use crate::core::registry::{XADES_NS, XMLDSIG_NS};
use crate::core::{ComplianceError, SignatureResult, canonicalize};

/// Identifiers of one signature's elements.
#[derive(Debug)]
struct SignatureIds {
    signature: String,
    signed_properties: String,
    key_info: String,
    reference: String,
}

impl SignatureIds {
    fn generate() -> Self {
        Self {
            signature: format!("Signature-{}", Uuid::new_v4()),
            signed_properties: format!("SignedProperties-{}", Uuid::new_v4()),
            key_info: format!("KeyInfo-{}", Uuid::new_v4()),
            reference: format!("Reference-{}", Uuid::new_v4()),
        }
    }
}

/// Sign `xml` with an enveloped XAdES-BES signature.
///
/// The certificate and key are read from disk on every call. Any failure,
/// from a missing file to a wrong password, comes back as
/// [`SignatureResult::Failed`].
pub fn sign_xml(xml: &str, options: &SignOptions) -> SignatureResult {
    let outcome = CertificateInfo::load(options)
        .and_then(|cert| sign_with_certificate(xml, &cert, Utc::now()));

    match outcome {
        Ok(signed_xml) => SignatureResult::Signed { signed_xml },
        Err(e) => {
            warn!(
                certificate = %options.certificate_path.display(),
                error = %e,
                "signing failed"
            );
            SignatureResult::Failed {
                error: e.to_string(),
            }
        }
    }
}

pub(crate) fn sign_with_certificate(
    xml: &str,
    cert: &CertificateInfo,
    signing_time: DateTime<Utc>,
) -> Result<String, ComplianceError> {
    let ids = SignatureIds::generate();

    let document_digest = digest_base64(canonicalize(xml));

    let signed_properties = signed_properties_xml(&ids, cert, signing_time)?;
    let signed_properties_digest = digest_base64(canonicalize(&signed_properties));

    let key_info = key_info_xml(&ids, cert)?;
    let key_info_digest = digest_base64(canonicalize(&key_info));

    let signed_info = signed_info_xml(
        &ids,
        &document_digest,
        &signed_properties_digest,
        &key_info_digest,
    )?;
    let signature_value = STANDARD.encode(cert.sign(canonicalize(&signed_info).as_bytes())?);

    let target = format!("#{}", ids.signature);
    let mut w = XmlWriter::fragment();
    w.start_element_with_attrs(
        "ds:Signature",
        &[("xmlns:ds", XMLDSIG_NS), ("Id", ids.signature.as_str())],
    )?
    .raw(&signed_info)?
    .text_element("ds:SignatureValue", &signature_value)?
    .raw(&key_info)?
    .start_element("ds:Object")?
    .start_element_with_attrs(
        "xades:QualifyingProperties",
        &[
            ("xmlns:xades", XADES_NS),
            ("Target", target.as_str()),
        ],
    )?
    .raw(&signed_properties)?
    .end_element("xades:QualifyingProperties")?
    .end_element("ds:Object")?
    .end_element("ds:Signature")?;
    let block = w.into_string()?;

    let signed = splice(xml, &block);
    info!(
        signature_id = %ids.signature,
        issuer = %cert.issuer_dn,
        serial = %cert.serial_number,
        "document signed"
    );
    Ok(signed)
}

/// Insert `block` before the document's last closing tag, or append it
/// when there is none.
fn splice(xml: &str, block: &str) -> String {
    match extract::last_closing_tag(xml) {
        Some(at) => {
            let mut out = String::with_capacity(xml.len() + block.len());
            out.push_str(&xml[..at]);
            out.push_str(block);
            out.push_str(&xml[at..]);
            out
        }
        None => format!("{xml}{block}"),
    }
}

fn signed_properties_xml(
    ids: &SignatureIds,
    cert: &CertificateInfo,
    signing_time: DateTime<Utc>,
) -> Result<String, ComplianceError> {
    let certificate_digest = digest_base64(cert.certificate_der());
    let signing_time = signing_time.to_rfc3339_opts(SecondsFormat::Secs, true);

    let mut w = XmlWriter::fragment();
    w.start_element_with_attrs(
        "xades:SignedProperties",
        &[
            ("xmlns:xades", XADES_NS),
            ("xmlns:ds", XMLDSIG_NS),
            ("Id", ids.signed_properties.as_str()),
        ],
    )?
    .start_element("xades:SignedSignatureProperties")?
    .text_element("xades:SigningTime", &signing_time)?
    .start_element("xades:SigningCertificate")?
    .start_element("xades:Cert")?
    .start_element("xades:CertDigest")?
    .empty_element_with_attrs("ds:DigestMethod", &[("Algorithm", SHA256)])?
    .text_element("ds:DigestValue", &certificate_digest)?
    .end_element("xades:CertDigest")?
    .start_element("xades:IssuerSerial")?
    .text_element("ds:X509IssuerName", &cert.issuer_dn)?
    .text_element("ds:X509SerialNumber", &cert.serial_number)?
    .end_element("xades:IssuerSerial")?
    .end_element("xades:Cert")?
    .end_element("xades:SigningCertificate")?
    .end_element("xades:SignedSignatureProperties")?
    .end_element("xades:SignedProperties")?;
    w.into_string()
}

fn key_info_xml(ids: &SignatureIds, cert: &CertificateInfo) -> Result<String, ComplianceError> {
    let mut w = XmlWriter::fragment();
    w.start_element_with_attrs("ds:KeyInfo", &[("Id", ids.key_info.as_str())])?
        .start_element("ds:X509Data")?
        .text_element("ds:X509Certificate", &cert.certificate_base64)?
        .end_element("ds:X509Data")?
        .end_element("ds:KeyInfo")?;
    w.into_string()
}

fn signed_info_xml(
    ids: &SignatureIds,
    document_digest: &str,
    signed_properties_digest: &str,
    key_info_digest: &str,
) -> Result<String, ComplianceError> {
    let signed_properties_uri = format!("#{}", ids.signed_properties);
    let key_info_uri = format!("#{}", ids.key_info);

    let mut w = XmlWriter::fragment();
    w.start_element_with_attrs("ds:SignedInfo", &[("xmlns:ds", XMLDSIG_NS)])?
        .empty_element_with_attrs("ds:CanonicalizationMethod", &[("Algorithm", EXC_C14N)])?
        .empty_element_with_attrs("ds:SignatureMethod", &[("Algorithm", RSA_SHA256)])?;

    w.start_element_with_attrs("ds:Reference", &[("Id", ids.reference.as_str()), ("URI", "")])?
        .start_element("ds:Transforms")?
        .empty_element_with_attrs("ds:Transform", &[("Algorithm", ENVELOPED_SIGNATURE)])?
        .empty_element_with_attrs("ds:Transform", &[("Algorithm", EXC_C14N)])?
        .end_element("ds:Transforms")?;
    digest_parts(&mut w, document_digest)?;
    w.end_element("ds:Reference")?;

    w.start_element_with_attrs(
        "ds:Reference",
        &[
            ("Type", SIGNED_PROPERTIES_TYPE),
            ("URI", signed_properties_uri.as_str()),
        ],
    )?;
    digest_parts(&mut w, signed_properties_digest)?;
    w.end_element("ds:Reference")?;

    w.start_element_with_attrs("ds:Reference", &[("URI", key_info_uri.as_str())])?;
    digest_parts(&mut w, key_info_digest)?;
    w.end_element("ds:Reference")?;

    w.end_element("ds:SignedInfo")?;
    w.into_string()
}

fn digest_parts(w: &mut XmlWriter, digest: &str) -> Result<(), ComplianceError> {
    w.empty_element_with_attrs("ds:DigestMethod", &[("Algorithm", SHA256)])?
        .text_element("ds:DigestValue", digest)?;
    Ok(())
}
