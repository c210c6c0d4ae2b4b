// config/identity.rs
use super::types::{ConfigError, MissingIpPolicy};
use std::{
    env,
    net::{IpAddr, Ipv4Addr},
};

pub const POD_NAME_ENV: &str = "KUBERNETES_POD_NAME";
pub const POD_IP_ENV: &str = "KUBERNETES_POD_IP";

/// Who the certificate is requested for. Resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodIdentity {
    pub name: String,
    pub ip: Option<IpAddr>,
}

impl PodIdentity {
    /// Reads the downward-API variables, letting explicit values win.
    pub fn from_env(
        name_override: Option<String>,
        ip_override: Option<String>,
        policy: MissingIpPolicy,
    ) -> Result<Self, ConfigError> {
        let name = name_override.or_else(|| env::var(POD_NAME_ENV).ok());
        let ip = ip_override.or_else(|| env::var(POD_IP_ENV).ok());
        Self::resolve(name, ip, policy)
    }

    pub fn resolve(
        name: Option<String>,
        ip: Option<String>,
        policy: MissingIpPolicy,
    ) -> Result<Self, ConfigError> {
        // The name is used verbatim for the CN and the CSR resource name.
        let name = name
            .filter(|n| !n.trim().is_empty())
            .ok_or(ConfigError::MissingPodName)?;

        let raw_ip = ip.map(|i| i.trim().to_string()).filter(|i| !i.is_empty());
        let parsed = raw_ip.as_deref().map(str::parse::<IpAddr>);

        let ip = match (parsed, policy) {
            (Some(Ok(ip)), _) => Some(ip),
            (_, MissingIpPolicy::Omit) => None,
            (_, MissingIpPolicy::Unspecified) => Some(IpAddr::V4(Ipv4Addr::UNSPECIFIED)),
            (None, MissingIpPolicy::Reject) => return Err(ConfigError::MissingPodIp),
            (Some(Err(_)), MissingIpPolicy::Reject) => {
                return Err(ConfigError::InvalidPodIp(raw_ip.unwrap_or_default()))
            }
        };

        Ok(Self { name, ip })
    }
}
