use k8s_openapi::api::certificates::v1::CertificateSigningRequest;

use super::CsrClient;
use crate::app::ProvisionError;
use crate::utils::logging::Logger;

/// A CSR this process created and is responsible for deleting.
///
/// Only [`CsrLease::submit`] hands one out, so holding a lease means the
/// create call succeeded. [`CsrLease::release`] consumes it and issues the
/// single delete.
#[derive(Debug)]
#[must_use = "the CSR stays in the cluster until the lease is released"]
pub struct CsrLease {
    name: String,
}

impl CsrLease {
    pub async fn submit<C: CsrClient + ?Sized>(
        client: &C,
        csr: &CertificateSigningRequest,
        logger: &mut dyn Logger,
    ) -> Result<Self, ProvisionError> {
        let name = csr.metadata.name.clone().unwrap_or_default();
        logger.log(&format!("Submitting CSR {}", name));

        match client.create(csr).await {
            Ok(_) => {
                logger.debug_log(&format!("CSR {} created", name));
                Ok(Self { name })
            }
            Err(kube::Error::Api(response)) if response.code == 409 => {
                logger.log(&format!(
                    "CSR {} already exists: {}",
                    name, response.message
                ));
                Err(ProvisionError::CsrConflict(name))
            }
            Err(source) => {
                logger.log(&format!("Failed to submit CSR {}: {}", name, source));
                Err(ProvisionError::CsrSubmit { name, source })
            }
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Best effort: a failed delete is logged and otherwise ignored.
    pub async fn release<C: CsrClient + ?Sized>(self, client: &C, logger: &mut dyn Logger) {
        match client.delete(&self.name).await {
            Ok(()) => logger.debug_log(&format!("Deleted CSR {}", self.name)),
            Err(e) => logger.debug_log(&format!("Could not delete CSR {}: {}", self.name, e)),
        }
    }
}
