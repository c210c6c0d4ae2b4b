// src/app/provisioner.rs
use super::ProvisionError;
use crate::cert::{
    generate_csr, generate_private_key, inspect_certificate, write_outputs, CertificateInfo,
    GeneratedKey, OutputPaths,
};
use crate::config::{PodIdentity, Settings};
use crate::csr::{build_csr_resource, csr_name, wait_for_certificate, CsrClient, CsrLease, PollPolicy};
use crate::utils::logging::Logger;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ProvisionReport {
    pub csr_name: String,
    pub paths: OutputPaths,
    pub certificate: CertificateInfo,
}

/// Drives one pod's certificate request from key generation to files on disk.
pub struct Provisioner<'a, C: CsrClient> {
    client: C,
    identity: PodIdentity,
    signer_name: String,
    poll: PollPolicy,
    output_dir: PathBuf,
    logger: &'a mut dyn Logger,
}

impl<'a, C: CsrClient> Provisioner<'a, C> {
    pub fn new(
        client: C,
        identity: PodIdentity,
        settings: &Settings,
        logger: &'a mut dyn Logger,
    ) -> Self {
        Self {
            client,
            identity,
            signer_name: settings.signer_name.clone(),
            poll: PollPolicy::from(&settings.poll),
            output_dir: settings.output_path(),
            logger,
        }
    }

    pub fn log(&mut self, message: &str) {
        self.logger.log(message);
    }

    pub fn debug_log(&mut self, message: &str) {
        self.logger.debug_log(message);
    }

    pub async fn provision(&mut self) -> Result<ProvisionReport, ProvisionError> {
        let name = csr_name(&self.identity.name);
        self.log(&format!(
            "Requesting certificate for {} via signer {}",
            self.identity.name, self.signer_name
        ));

        let key = generate_private_key(&mut *self.logger)?;
        let request = generate_csr(&self.identity, &key.pkey, &mut *self.logger)?;
        let resource = build_csr_resource(&name, &self.identity, &request, &self.signer_name);

        let lease = CsrLease::submit(&self.client, &resource, &mut *self.logger).await?;
        let outcome = self.complete(lease.name(), &key).await;
        lease.release(&self.client, &mut *self.logger).await;

        outcome
    }

    /// Everything after a successful submit; the caller releases the lease
    /// whatever this returns.
    async fn complete(
        &mut self,
        name: &str,
        key: &GeneratedKey,
    ) -> Result<ProvisionReport, ProvisionError> {
        let certificate = wait_for_certificate(&self.client, name, &self.poll, &mut *self.logger).await?;

        let info = inspect_certificate(&certificate, &key.pkey).map_err(|e| {
            self.logger.log(&format!("Rejecting issued certificate: {}", e));
            e
        })?;
        self.debug_log(&format!(
            "Issued certificate: subject={} issuer={} serial={} sha256={} valid {} to {}",
            info.subject,
            info.issuer,
            info.serial,
            info.fingerprint,
            info.not_before.to_rfc3339(),
            info.not_after.to_rfc3339()
        ));

        let paths = write_outputs(&self.output_dir, &certificate, &key.pem, &mut *self.logger)?;
        self.log(&format!(
            "Wrote {} and {}",
            paths.certificate.display(),
            paths.key.display()
        ));

        Ok(ProvisionReport {
            csr_name: name.to_string(),
            paths,
            certificate: info,
        })
    }
}
