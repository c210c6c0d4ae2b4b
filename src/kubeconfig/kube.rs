use crate::app::ProvisionError;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use std::fmt;
use std::path::{Path, PathBuf};

/// Where cluster credentials come from.
#[derive(Debug, Clone, PartialEq)]
pub enum KubeconfigSource {
    File(PathBuf),
    InCluster,
}

impl fmt::Display for KubeconfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::InCluster => write!(f, "in-cluster service account"),
        }
    }
}

pub fn default_kubeconfig_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".kube").join("config"))
}

/// A non-blank explicit path always wins. Otherwise `~/.kube/config` is used
/// when it exists, and the pod's service account when it does not.
pub fn resolve_source(explicit: Option<&str>, default_path: Option<&Path>) -> KubeconfigSource {
    if let Some(path) = explicit.filter(|p| !p.trim().is_empty()) {
        return KubeconfigSource::File(PathBuf::from(shellexpand::tilde(path).to_string()));
    }
    match default_path {
        Some(path) if path.exists() => KubeconfigSource::File(path.to_path_buf()),
        _ => KubeconfigSource::InCluster,
    }
}

pub async fn load_config(source: &KubeconfigSource) -> Result<Config, ProvisionError> {
    match source {
        KubeconfigSource::File(path) => {
            let kubeconfig_err = |source| ProvisionError::Kubeconfig {
                path: path.display().to_string(),
                source,
            };
            let kubeconfig = Kubeconfig::read_from(path).map_err(kubeconfig_err)?;
            Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
                .await
                .map_err(kubeconfig_err)
        }
        KubeconfigSource::InCluster => Ok(Config::incluster()?),
    }
}

pub fn build_client(config: Config) -> Result<Client, ProvisionError> {
    Client::try_from(config).map_err(ProvisionError::Client)
}
