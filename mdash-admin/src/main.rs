//! Ministry Dashboard admin tool (mdash-admin) - Main entry point
//!
//! Command-line front end for the ministry backend: attendance review,
//! evangelism and follow-up tracking, study-group grading and prayer
//! sessions.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use mdash_admin::{ApiClient, ClientError, ControllerError};
use mdash_common::config::{load_toml_config, LoggingConfig, SettingsResolver};
use mdash_common::credentials::FileCredentialStore;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;

use commands::Command;

/// Exit code when the backend ended the session
const EXIT_SESSION_EXPIRED: i32 = 2;

/// Command-line arguments for mdash-admin
#[derive(Parser, Debug)]
#[command(name = "mdash-admin")]
#[command(about = "Ministry dashboard administration")]
#[command(version)]
struct Args {
    /// Backend API base URL
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Credential file location
    #[arg(long, global = true)]
    credentials: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// TOML config file (default: platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level when RUST_LOG is unset
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let toml_config = load_toml_config(args.config.as_deref());
    init_tracing(&toml_config.logging, args.log_level.as_deref())?;

    info!(
        "mdash-admin v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let resolver = SettingsResolver::new(toml_config);
    let settings = resolver.client_settings(
        args.api_url.as_deref(),
        args.credentials.as_deref(),
        args.timeout,
    );
    info!("Backend: {}", settings.api_base_url);
    info!("Credentials: {}", settings.credentials_path.display());

    let store = Arc::new(FileCredentialStore::new(&settings.credentials_path));
    let client = ApiClient::new(&settings, store).context("Failed to create API client")?;

    match commands::run(args.command, &client, &resolver).await {
        Ok(()) => Ok(()),
        Err(e) if is_session_expired(&e) => {
            eprintln!("Your session has expired. Log in again with `mdash-admin login`.");
            std::process::exit(EXIT_SESSION_EXPIRED);
        }
        Err(e) => Err(e),
    }
}

/// Stderr logging, plus a plain-text file when one is configured
fn init_tracing(logging: &LoggingConfig, cli_level: Option<&str>) -> Result<()> {
    let level = cli_level.unwrap_or(&logging.level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let file_layer = match &logging.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Arc::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();
    Ok(())
}

fn is_session_expired(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<ClientError>()
            .is_some_and(ClientError::is_session_expired)
            || cause
                .downcast_ref::<ControllerError>()
                .is_some_and(ControllerError::is_session_expired)
    })
}
