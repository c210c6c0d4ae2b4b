mod identity;
mod types;

pub use identity::PodIdentity;
pub use types::{ConfigError, MissingIpPolicy, PollSettings, Settings};
