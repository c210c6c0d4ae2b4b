//! Waiting for the signer to approve and issue a CSR.

use std::time::Duration;

use k8s_openapi::api::certificates::v1::CertificateSigningRequest;
use tokio::time::{sleep, Instant};

use super::CsrClient;
use crate::app::ProvisionError;
use crate::config::PollSettings;
use crate::utils::logging::Logger;

/// How often to re-fetch a pending CSR and when to give up.
///
/// Without a deadline or attempt cap the wait is unbounded. At least one
/// fetch is always made.
#[derive(Debug, Clone, PartialEq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub deadline: Option<Duration>,
    pub max_attempts: Option<u32>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            deadline: None,
            max_attempts: None,
        }
    }
}

impl From<&PollSettings> for PollPolicy {
    fn from(settings: &PollSettings) -> Self {
        Self {
            interval: Duration::from_secs(settings.interval_secs),
            deadline: settings.timeout_secs.map(Duration::from_secs),
            max_attempts: settings.max_attempts,
        }
    }
}

impl PollPolicy {
    pub fn is_unbounded(&self) -> bool {
        self.deadline.is_none() && self.max_attempts.is_none()
    }

    fn exhausted(&self, attempts: u32, elapsed: Duration) -> bool {
        self.max_attempts.is_some_and(|max| attempts >= max)
            || self.deadline.is_some_and(|deadline| elapsed >= deadline)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CsrState {
    Pending,
    Signed(Vec<u8>),
    Rejected {
        condition: String,
        reason: String,
        message: String,
    },
}

/// Certificate bytes only count once the signer has recorded a condition.
pub fn classify(csr: &CertificateSigningRequest) -> CsrState {
    let Some(status) = csr.status.as_ref() else {
        return CsrState::Pending;
    };
    let conditions = status.conditions.as_deref().unwrap_or_default();
    if conditions.is_empty() {
        return CsrState::Pending;
    }

    if let Some(rejected) = conditions
        .iter()
        .find(|c| c.type_ == "Denied" || c.type_ == "Failed")
    {
        return CsrState::Rejected {
            condition: rejected.type_.clone(),
            reason: rejected.reason.clone().unwrap_or_default(),
            message: rejected.message.clone().unwrap_or_default(),
        };
    }

    match status.certificate.as_ref() {
        Some(certificate) if !certificate.0.is_empty() => CsrState::Signed(certificate.0.clone()),
        _ => CsrState::Pending,
    }
}

/// Re-fetches `name` every `policy.interval` until it is signed. Any fetch
/// error ends the wait immediately.
pub async fn wait_for_certificate<C: CsrClient + ?Sized>(
    client: &C,
    name: &str,
    policy: &PollPolicy,
    logger: &mut dyn Logger,
) -> Result<Vec<u8>, ProvisionError> {
    if policy.is_unbounded() {
        logger.debug_log("No poll deadline configured; waiting until the CSR is signed");
    }

    let started = Instant::now();
    let mut attempts: u32 = 0;

    loop {
        attempts += 1;
        let csr = client.get(name).await.map_err(|source| {
            logger.log(&format!("Failed to fetch CSR {}: {}", name, source));
            ProvisionError::CsrFetch {
                name: name.to_string(),
                source,
            }
        })?;

        match classify(&csr) {
            CsrState::Signed(certificate) => {
                logger.log(&format!(
                    "CSR {} signed after {} attempt(s)",
                    name, attempts
                ));
                return Ok(certificate);
            }
            CsrState::Rejected {
                condition,
                reason,
                message,
            } => {
                logger.log(&format!("CSR {} was {}: {}", name, condition, message));
                return Err(ProvisionError::CsrDenied {
                    name: name.to_string(),
                    condition,
                    reason,
                    message,
                });
            }
            CsrState::Pending => {}
        }

        let elapsed = started.elapsed();
        if policy.exhausted(attempts, elapsed) {
            logger.log(&format!(
                "Gave up waiting for CSR {} after {} attempt(s)",
                name, attempts
            ));
            return Err(ProvisionError::PollTimeout {
                name: name.to_string(),
                attempts,
                elapsed,
            });
        }

        logger.debug_log(&format!(
            "CSR {} pending (attempt {}), retrying in {:?}",
            name, attempts, policy.interval
        ));
        sleep(policy.interval).await;
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use k8s_openapi::api::certificates::v1::{
        CertificateSigningRequest, CertificateSigningRequestCondition,
        CertificateSigningRequestStatus,
    };
    use k8s_openapi::ByteString;

    pub fn condition(type_: &str) -> CertificateSigningRequestCondition {
        CertificateSigningRequestCondition {
            type_: type_.to_string(),
            status: "True".to_string(),
            reason: Some(format!("Auto{}", type_)),
            message: Some(format!("{} by test", type_)),
            ..Default::default()
        }
    }

    pub fn csr_with(conditions: Vec<CertificateSigningRequestCondition>, certificate: &[u8]) -> CertificateSigningRequest {
        CertificateSigningRequest {
            status: Some(CertificateSigningRequestStatus {
                conditions: Some(conditions),
                certificate: Some(ByteString(certificate.to_vec())),
            }),
            ..Default::default()
        }
    }

    pub fn pending() -> CertificateSigningRequest {
        csr_with(vec![], b"")
    }

    pub fn signed(certificate: &[u8]) -> CertificateSigningRequest {
        csr_with(vec![condition("Approved")], certificate)
    }
}
