// src/main.rs
mod app;
mod cert;
mod config;
mod csr;
mod kubeconfig;
mod utils;

use app::{ProvisionError, EXIT_FATAL};
use clap::Parser;
use config::{ConfigError, MissingIpPolicy, PodIdentity, Settings};
use std::process::ExitCode;
use utils::logging::{build_logger, Logger};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Requests a TLS certificate for this pod from the cluster's CSR API",
    long_about = None
)]
pub struct Args {
    /// Kubeconfig to use (default: ~/.kube/config, then in-cluster credentials)
    #[arg(long)]
    pub kubeconfig: Option<String>,

    /// Optional JSON settings file; flags override its values
    #[arg(short, long)]
    pub config: Option<String>,

    /// Pod name (default: $KUBERNETES_POD_NAME)
    #[arg(long)]
    pub pod_name: Option<String>,

    /// Pod IP (default: $KUBERNETES_POD_IP)
    #[arg(long)]
    pub pod_ip: Option<String>,

    /// What to do when the pod IP is missing or invalid
    #[arg(long, value_enum)]
    pub missing_ip: Option<MissingIpPolicy>,

    /// signerName put on the CSR
    #[arg(long)]
    pub signer_name: Option<String>,

    #[arg(long)]
    pub poll_interval_secs: Option<u64>,

    /// Give up waiting for a signature after this many seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Give up waiting for a signature after this many fetches
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Directory for tls.crt and tls.key
    #[arg(short, long)]
    pub output_dir: Option<String>,

    /// Exit 0 even if the request fails after it was submitted
    #[arg(long)]
    pub best_effort: bool,

    #[arg(short, long)]
    pub debug: bool,

    /// Also append log lines to this file
    #[arg(long)]
    pub log_file: Option<String>,
}

fn build_settings(args: &Args) -> Result<Settings, ConfigError> {
    let mut settings = match &args.config {
        Some(path) => Settings::load_from_file(path)?,
        None => Settings::default(),
    };

    if let Some(kubeconfig) = &args.kubeconfig {
        settings.kubeconfig = Some(kubeconfig.clone());
    }
    if let Some(policy) = args.missing_ip {
        settings.missing_ip = policy;
    }
    if let Some(signer_name) = &args.signer_name {
        settings.signer_name = signer_name.clone();
    }
    if let Some(interval) = args.poll_interval_secs {
        settings.poll.interval_secs = interval;
    }
    if args.timeout_secs.is_some() {
        settings.poll.timeout_secs = args.timeout_secs;
    }
    if args.max_attempts.is_some() {
        settings.poll.max_attempts = args.max_attempts;
    }
    if let Some(output_dir) = &args.output_dir {
        settings.output_dir = output_dir.clone();
    }

    settings.validate()?;
    Ok(settings)
}

async fn provision(args: &Args, logger: &mut dyn Logger) -> Result<app::ProvisionReport, ProvisionError> {
    let settings = build_settings(args)?;
    let identity = PodIdentity::from_env(
        args.pod_name.clone(),
        args.pod_ip.clone(),
        settings.missing_ip,
    )?;
    logger.debug_log(&format!("Resolved identity: {:?}", identity));

    app::run_app(&settings, identity, logger).await
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    let mut logger = match build_logger(args.debug, args.log_file.as_deref()) {
        Ok(logger) => logger,
        Err(e) => {
            eprintln!("Failed to open log file: {}", e);
            return ExitCode::from(EXIT_FATAL);
        }
    };

    match provision(&args, logger.as_mut()).await {
        Ok(report) => {
            logger.log(&format!(
                "Certificate from CSR {} written to {} (key {}), valid until {}",
                report.csr_name,
                report.paths.certificate.display(),
                report.paths.key.display(),
                report.certificate.not_after.to_rfc3339()
            ));
            ExitCode::SUCCESS
        }
        Err(e) => {
            if e.is_fatal() {
                logger.log(&format!("Fatal: {}", e));
            } else {
                logger.log(&format!("Certificate provisioning failed: {}", e));
            }
            ExitCode::from(e.exit_code(args.best_effort))
        }
    }
}
