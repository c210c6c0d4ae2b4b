// src/cert/verification.rs
use super::types::CertificateInfo;
use crate::app::ProvisionError;
use chrono::{DateTime, TimeZone, Utc};
use openssl::{
    hash::{hash, MessageDigest},
    pkey::{PKey, Private},
    x509::X509,
};
use x509_parser::prelude::{FromDer, X509Certificate};

/// Parses the issued certificate (the leaf, if the signer returned a chain)
/// and checks that it certifies the key we generated.
pub fn inspect_certificate(
    certificate_pem: &[u8],
    key: &PKey<Private>,
) -> Result<CertificateInfo, ProvisionError> {
    let parse_err = |e: openssl::error::ErrorStack| ProvisionError::CertificateParse(e.to_string());

    let leaf = X509::from_pem(certificate_pem).map_err(parse_err)?;
    let matches = leaf
        .public_key()
        .map_err(parse_err)?
        .public_eq(key);
    if !matches {
        return Err(ProvisionError::CertificateMismatch);
    }

    let der = leaf.to_der().map_err(parse_err)?;
    let digest = hash(MessageDigest::sha256(), &der).map_err(parse_err)?;
    let (_remainder, cert) = X509Certificate::from_der(&der)
        .map_err(|e| ProvisionError::CertificateParse(e.to_string()))?;

    Ok(CertificateInfo {
        subject: cert.subject().to_string(),
        issuer: cert.issuer().to_string(),
        not_before: timestamp(cert.validity().not_before.timestamp(), "not_before")?,
        not_after: timestamp(cert.validity().not_after.timestamp(), "not_after")?,
        serial: hex::encode(cert.raw_serial()),
        fingerprint: hex::encode(&*digest),
    })
}

fn timestamp(seconds: i64, field: &str) -> Result<DateTime<Utc>, ProvisionError> {
    Utc.timestamp_opt(seconds, 0)
        .single()
        .ok_or_else(|| ProvisionError::CertificateParse(format!("invalid {} timestamp", field)))
}
