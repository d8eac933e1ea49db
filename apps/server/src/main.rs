//! IFTTT Remote Server - standalone headless remote-control service.
//!
//! Drives a Kodi instance over JSON-RPC from IFTTT webhook requests and keeps
//! the host's dynamic-DNS record current. Runs until Ctrl+C or SIGTERM.

mod config;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use ifttt_remote_core::protocol_constants::JSONRPC_TIMEOUT_SECS;
use ifttt_remote_core::{
    Collaborators, JsonSettingsStore, KodiClient, RemoteService, ServiceState, SpdynProvider,
    TokenAbortSignal,
};
use tokio::signal;

use crate::config::ServerConfig;

/// IFTTT Remote Server - control a media host from IFTTT webhooks.
#[derive(Parser, Debug)]
#[command(name = "ifttt-remote-server")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file (YAML).
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(short, long, default_value = "info", env = "IFTTT_REMOTE_LOG_LEVEL")]
    log_level: log::LevelFilter,

    /// Kodi JSON-RPC endpoint (overrides config file).
    #[arg(short = 'k', long, env = "IFTTT_REMOTE_KODI_URL")]
    kodi_url: Option<String>,

    /// Data directory holding settings.json (overrides config file).
    #[arg(short = 'd', long, env = "IFTTT_REMOTE_DATA_DIR")]
    data_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    env_logger::Builder::new()
        .filter_level(args.log_level)
        .format_timestamp_millis()
        .init();

    log::info!("IFTTT Remote Server v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let mut config =
        ServerConfig::load(args.config.as_deref()).context("Failed to load configuration")?;

    // Apply CLI overrides
    if let Some(kodi_url) = args.kodi_url {
        config.kodi_url = kodi_url;
    }
    if let Some(data_dir) = args.data_dir {
        config.data_dir = data_dir;
    }

    log::info!(
        "Configuration: kodi_url={}, data_dir={}",
        config.kodi_url,
        config.data_dir.display()
    );

    let settings = JsonSettingsStore::open(&config.data_dir)
        .with_context(|| format!("Failed to open settings in {}", config.data_dir.display()))?;
    log::info!("Using settings file: {}", settings.path().display());

    // Media host calls are bounded; the one-shot DNS sync is not.
    let kodi_http = reqwest::Client::builder()
        .timeout(Duration::from_secs(JSONRPC_TIMEOUT_SECS))
        .build()
        .context("Failed to build Kodi HTTP client")?;
    let dns_http = reqwest::Client::builder()
        .build()
        .context("Failed to build DNS HTTP client")?;

    let mut kodi = KodiClient::new(kodi_http, config.kodi_url.clone());
    if let Some(username) = config.kodi_username.clone() {
        kodi = kodi.with_credentials(username, config.kodi_password.clone());
    }
    let kodi = Arc::new(kodi);

    let abort = TokenAbortSignal::new();
    let mut service = RemoteService::new(Collaborators {
        settings: Arc::new(settings),
        player: kodi.clone(),
        host: kodi.clone(),
        notifier: kodi,
        dns_provider: Arc::new(SpdynProvider::new(dns_http, config.dns_endpoints())),
        abort: Arc::new(abort.clone()),
    });

    // Translate process signals into the service abort signal
    let signal_task = tokio::spawn(async move {
        shutdown_signal().await;
        log::info!("Shutdown signal received, cleaning up...");
        abort.trigger();
    });

    let state = service.run().await;
    signal_task.abort();

    match state {
        ServiceState::NotStarted => {
            log::warn!("Service not started; check the settings in the data directory")
        }
        _ => log::info!("Shutdown complete"),
    }
    Ok(())
}

/// Waits for a shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            log::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                log::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
