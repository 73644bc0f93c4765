//! Icecast Exporter CLI
//!
//! Polls an Icecast status endpoint and serves listener counts for
//! Prometheus to scrape.

use clap::Parser;
use icecast_exporter::metrics::ServerError;
use icecast_exporter::{
    ConfigError, ExporterConfig, FileConfig, GaugeRegistry, LegacyNotifier, MetricsServer,
    PollScheduler,
};
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Prometheus exporter for Icecast listener counts.
#[derive(Debug, Parser)]
#[command(name = "icecast-exporter", version, about)]
struct Cli {
    /// Icecast status endpoint (normally: http://icecast.example.com/status-json.xsl)
    #[arg(long, env = "ICECAST_EXPORTER_URL")]
    url: Option<String>,

    /// Port to listen on for metrics [default: 2112]
    #[arg(long, env = "ICECAST_EXPORTER_PORT")]
    port: Option<u16>,

    /// Metrics endpoint to listen on [default: /metrics]
    #[arg(long, env = "ICECAST_EXPORTER_ENDPOINT")]
    endpoint: Option<String>,

    /// Interval in seconds to update statistics from Icecast [default: 15]
    #[arg(long, env = "ICECAST_EXPORTER_INTERVAL")]
    interval: Option<u64>,

    /// Host of the legacy clock to push listener counts to
    #[arg(long, env = "ICECAST_EXPORTER_CLOCK")]
    clock: Option<String>,

    /// Only streams with this server_name will be collected
    #[arg(long, env = "ICECAST_EXPORTER_FILTER")]
    filter: Option<String>,

    /// Make label values compatible with Prometheus < 3.0 (space and dot become underscore)
    #[arg(long, env = "ICECAST_EXPORTER_LEGACY_LABEL")]
    legacy_label: bool,

    /// Timeout in seconds for one status fetch [default: 10]
    #[arg(long, env = "ICECAST_EXPORTER_TIMEOUT")]
    timeout: Option<u64>,

    /// TOML configuration file with an [exporter] table
    #[arg(long, env = "ICECAST_EXPORTER_CONFIG")]
    config: Option<PathBuf>,
}

impl Cli {
    /// Resolves defaults, the config file, and flags into one configuration.
    fn resolve(self) -> Result<ExporterConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => FileConfig::from_file(path)?.exporter,
            None => ExporterConfig::default(),
        };

        if let Some(url) = self.url {
            config.url = url;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(endpoint) = self.endpoint {
            config.endpoint = endpoint;
        }
        if let Some(interval) = self.interval {
            config.interval = interval;
        }
        if let Some(clock) = self.clock {
            config.clock = clock;
        }
        if let Some(filter) = self.filter {
            config.filter = filter;
        }
        if self.legacy_label {
            config.legacy_label = true;
        }
        if let Some(timeout) = self.timeout {
            config.timeout = timeout;
        }

        config.validate()?;
        Ok(config)
    }
}

/// Reasons the exporter stops serving.
#[derive(Debug, Error)]
enum RunError {
    #[error("metrics server failed: {0}")]
    Server(#[from] ServerError),
    #[error("poll task stopped: {0}")]
    Poller(String),
}

/// Serves until either the metrics server or the poll task stops.
async fn supervise<F>(poller: JoinHandle<()>, server: F) -> Result<(), RunError>
where
    F: Future<Output = Result<(), ServerError>>,
{
    tokio::select! {
        result = server => result.map_err(RunError::from),
        result = poller => Err(RunError::Poller(match result {
            Ok(()) => "loop exited".to_string(),
            Err(e) => e.to_string(),
        })),
    }
}

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = match Cli::parse().resolve() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Invalid configuration: {}, see '{} --help' for information",
                e,
                std::env::args().next().unwrap_or_else(|| "icecast-exporter".into())
            );
            std::process::exit(1);
        }
    };

    info!("Starting Icecast Exporter v{}", icecast_exporter::VERSION);

    if !config.filter.is_empty() {
        info!(filter = %config.filter, "Filtering streams by server_name");
    }
    if config.legacy_label {
        info!("Using legacy label values");
    }

    let registry = match GaugeRegistry::new() {
        Ok(registry) => Arc::new(registry),
        Err(e) => {
            error!("Failed to create metrics registry: {}", e);
            std::process::exit(1);
        }
    };

    let notifier = match LegacyNotifier::new(config.clock.clone()) {
        Ok(notifier) => notifier,
        Err(e) => {
            error!("Failed to create legacy push client: {}", e);
            std::process::exit(1);
        }
    };
    if notifier.is_enabled() {
        info!(clock = %config.clock, "Pushing listener counts to legacy clock");
    }

    let scheduler = match PollScheduler::new(config.poll_config(), Arc::clone(&registry), notifier)
    {
        Ok(scheduler) => scheduler,
        Err(e) => {
            error!("Failed to create poller: {}", e);
            std::process::exit(1);
        }
    };

    info!(
        url = %config.url,
        interval_secs = config.interval,
        "Polling Icecast status"
    );
    let poller = scheduler.spawn();

    let server = MetricsServer::new(config.server_config(), registry);
    if let Err(e) = supervise(poller, server.run()).await {
        error!("{}", e);
        std::process::exit(1);
    }
}
