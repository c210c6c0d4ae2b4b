// config/types.rs
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::{fs, io, path::PathBuf};
use thiserror::Error;

pub const DEFAULT_SIGNER_NAME: &str = "example.com/pod-serving";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("pod name is not set (KUBERNETES_POD_NAME or --pod-name)")]
    MissingPodName,
    #[error("pod IP is not set (KUBERNETES_POD_IP or --pod-ip)")]
    MissingPodIp,
    #[error("pod IP {0:?} is not a valid IP address")]
    InvalidPodIp(String),
    #[error("poll interval must be greater than zero")]
    ZeroPollInterval,
    #[error("max attempts must be at least one")]
    ZeroMaxAttempts,
    #[error("signer name {0:?} must look like <domain>/<path>")]
    InvalidSignerName(String),
}

/// What to do when the pod IP is absent or cannot be parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MissingIpPolicy {
    /// Refuse to start.
    #[default]
    Reject,
    /// Request a certificate without an IP subject alternative name.
    Omit,
    /// Put the unspecified address `0.0.0.0` in the SAN list.
    Unspecified,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollSettings {
    #[serde(default = "default_poll_interval_secs")]
    pub interval_secs: u64,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub max_attempts: Option<u32>,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval_secs: default_poll_interval_secs(),
            timeout_secs: None,
            max_attempts: None,
        }
    }
}

fn default_poll_interval_secs() -> u64 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub kubeconfig: Option<String>,
    #[serde(default = "default_signer_name")]
    pub signer_name: String,
    #[serde(default)]
    pub missing_ip: MissingIpPolicy,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    #[serde(default)]
    pub poll: PollSettings,
}

fn default_signer_name() -> String {
    DEFAULT_SIGNER_NAME.to_string()
}

fn default_output_dir() -> String {
    ".".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            kubeconfig: None,
            signer_name: default_signer_name(),
            missing_ip: MissingIpPolicy::default(),
            output_dir: default_output_dir(),
            poll: PollSettings::default(),
        }
    }
}

impl Settings {
    pub fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let config_str = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        serde_json::from_str(&config_str).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll.interval_secs == 0 {
            return Err(ConfigError::ZeroPollInterval);
        }
        if self.poll.max_attempts == Some(0) {
            return Err(ConfigError::ZeroMaxAttempts);
        }
        match self.signer_name.split_once('/') {
            Some((domain, path)) if !domain.is_empty() && !path.is_empty() => Ok(()),
            _ => Err(ConfigError::InvalidSignerName(self.signer_name.clone())),
        }
    }

    pub fn output_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.output_dir).to_string())
    }
}
