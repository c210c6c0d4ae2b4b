//! CertificateSigningRequest resources and the API calls made on them.
//!
//! The cluster's `certificates.k8s.io/v1` API is reached through the
//! [`CsrClient`] trait so the workflow can be exercised without a cluster.

mod lease;
pub mod poll;

use async_trait::async_trait;
use k8s_openapi::api::certificates::v1::{CertificateSigningRequest, CertificateSigningRequestSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::ByteString;
use kube::api::{Api, DeleteParams, PostParams};
use kube::Client;
#[cfg(test)]
use mockall::automock;

use crate::cert::REQUESTED_USAGES;
use crate::config::PodIdentity;

pub use lease::CsrLease;
pub use poll::{wait_for_certificate, PollPolicy};

/// Prefix of every CSR name; the pod name is appended verbatim.
pub const CSR_NAME_PREFIX: &str = "init-csr-";

/// The same pod always maps to the same resource name.
pub fn csr_name(pod_name: &str) -> String {
    format!("{}{}", CSR_NAME_PREFIX, pod_name)
}

pub fn build_csr_resource(
    name: &str,
    identity: &PodIdentity,
    request_pem: &[u8],
    signer_name: &str,
) -> CertificateSigningRequest {
    CertificateSigningRequest {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            ..Default::default()
        },
        spec: CertificateSigningRequestSpec {
            request: ByteString(request_pem.to_vec()),
            signer_name: signer_name.to_string(),
            username: Some(identity.name.clone()),
            usages: Some(REQUESTED_USAGES.iter().map(|u| u.to_string()).collect()),
            ..Default::default()
        },
        status: None,
    }
}

/// Cluster-scoped create/get/delete on CSR resources, keyed by name.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CsrClient: Send + Sync {
    async fn create(
        &self,
        csr: &CertificateSigningRequest,
    ) -> Result<CertificateSigningRequest, kube::Error>;

    async fn get(&self, name: &str) -> Result<CertificateSigningRequest, kube::Error>;

    async fn delete(&self, name: &str) -> Result<(), kube::Error>;
}

pub struct KubeCsrClient {
    api: Api<CertificateSigningRequest>,
}

impl KubeCsrClient {
    pub fn new(client: Client) -> Self {
        Self {
            api: Api::all(client),
        }
    }
}

#[async_trait]
impl CsrClient for KubeCsrClient {
    async fn create(
        &self,
        csr: &CertificateSigningRequest,
    ) -> Result<CertificateSigningRequest, kube::Error> {
        self.api.create(&PostParams::default(), csr).await
    }

    async fn get(&self, name: &str) -> Result<CertificateSigningRequest, kube::Error> {
        self.api.get(name).await
    }

    async fn delete(&self, name: &str) -> Result<(), kube::Error> {
        self.api
            .delete(name, &DeleteParams::default())
            .await
            .map(|_| ())
    }
}

/// Builds an API error the way the apiserver reports it.
#[cfg(test)]
pub(crate) fn api_error(code: u16, reason: &str) -> kube::Error {
    kube::Error::Api(kube::error::ErrorResponse {
        status: "Failure".to_string(),
        message: format!("simulated {}", reason),
        reason: reason.to_string(),
        code,
    })
}
