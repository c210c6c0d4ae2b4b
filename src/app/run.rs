use super::{ProvisionError, ProvisionReport, Provisioner};
use crate::config::{PodIdentity, Settings};
use crate::csr::KubeCsrClient;
use crate::kubeconfig::{build_client, default_kubeconfig_path, load_config, resolve_source};
use crate::utils::logging::Logger;

/// Connects to the cluster named by `settings` and provisions `identity`.
pub async fn run_app(
    settings: &Settings,
    identity: PodIdentity,
    logger: &mut dyn Logger,
) -> Result<ProvisionReport, ProvisionError> {
    let default_path = default_kubeconfig_path();
    let source = resolve_source(settings.kubeconfig.as_deref(), default_path.as_deref());
    logger.log(&format!("Using cluster credentials from {}", source));

    let config = load_config(&source).await.map_err(|e| {
        logger.log(&format!("Could not load cluster configuration: {}", e));
        e
    })?;
    logger.debug_log(&format!("API server: {}", config.cluster_url));

    let client = build_client(config)?;
    Provisioner::new(KubeCsrClient::new(client), identity, settings, logger)
        .provision()
        .await
}
