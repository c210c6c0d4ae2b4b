// cert/types.rs
use chrono::{DateTime, Utc};
use openssl::pkey::{PKey, Private};

/// Key usages requested for every pod certificate.
pub const REQUESTED_USAGES: [&str; 2] = ["data encipherment", "server auth"];

pub struct GeneratedKey {
    pub pkey: PKey<Private>,
    /// SEC1 PEM of the private key; it also carries the public point.
    pub pem: Vec<u8>,
}

impl std::fmt::Debug for GeneratedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratedKey")
            .field("bits", &self.pkey.bits())
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct CertificateInfo {
    pub subject: String,
    pub issuer: String,
    pub not_before: DateTime<Utc>,
    pub not_after: DateTime<Utc>,
    pub serial: String,
    pub fingerprint: String,
}
