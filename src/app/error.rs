// src/app/error.rs
use crate::config::ConfigError;
use std::{io, time::Duration};
use thiserror::Error;

pub const EXIT_FATAL: u8 = 1;
pub const EXIT_WORKFLOW: u8 = 2;

#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to load kubeconfig {path}: {source}")]
    Kubeconfig {
        path: String,
        #[source]
        source: kube::config::KubeconfigError,
    },
    #[error("failed to load in-cluster configuration: {0}")]
    InCluster(#[from] kube::config::InClusterError),
    #[error("failed to create API client: {0}")]
    Client(#[source] kube::Error),
    #[error("could not generate private key: {0}")]
    KeyGeneration(#[source] openssl::error::ErrorStack),
    #[error("could not build certificate request: {0}")]
    CsrEncoding(#[source] openssl::error::ErrorStack),

    #[error("failed to submit CSR {name}: {source}")]
    CsrSubmit {
        name: String,
        #[source]
        source: kube::Error,
    },
    #[error("CSR {0} already exists")]
    CsrConflict(String),
    #[error("failed to fetch CSR {name}: {source}")]
    CsrFetch {
        name: String,
        #[source]
        source: kube::Error,
    },
    #[error("CSR {name} was {condition} ({reason}): {message}")]
    CsrDenied {
        name: String,
        condition: String,
        reason: String,
        message: String,
    },
    #[error("CSR {name} not signed after {attempts} attempts in {elapsed:?}")]
    PollTimeout {
        name: String,
        attempts: u32,
        elapsed: Duration,
    },
    #[error("issued certificate could not be parsed: {0}")]
    CertificateParse(String),
    #[error("issued certificate does not match the generated key")]
    CertificateMismatch,
    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: io::Error,
    },
}

impl ProvisionError {
    /// Errors raised before anything was submitted to the cluster.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Config(_)
                | Self::Kubeconfig { .. }
                | Self::InCluster(_)
                | Self::Client(_)
                | Self::KeyGeneration(_)
                | Self::CsrEncoding(_)
        )
    }

    /// `best_effort` keeps the legacy behavior of not failing the pod on
    /// errors that happen once the request is in flight.
    pub fn exit_code(&self, best_effort: bool) -> u8 {
        if self.is_fatal() {
            EXIT_FATAL
        } else if best_effort {
            0
        } else {
            EXIT_WORKFLOW
        }
    }
}
