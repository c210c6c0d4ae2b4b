mod error;
mod provisioner;
mod run;

pub use error::{ProvisionError, EXIT_FATAL};
pub use provisioner::{ProvisionReport, Provisioner};
pub use run::run_app;
