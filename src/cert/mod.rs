// src/cert/mod.rs
mod openssl;
pub mod output;
mod types;
pub mod verification;

pub use self::openssl::{generate_csr, generate_private_key};
pub use output::{write_outputs, OutputPaths};
pub use types::{CertificateInfo, GeneratedKey, REQUESTED_USAGES};
pub use verification::inspect_certificate;
