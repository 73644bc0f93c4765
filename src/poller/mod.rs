//! Status polling loop.
//!
//! One cycle fetches the status document, decodes it, and publishes every
//! stream that passes the server-name filter. Cycles never overlap: the
//! next fetch starts a full interval after the previous cycle finished.
//! A failed cycle is logged and leaves the listener gauges untouched.

use crate::labels::LabelNormalizer;
use crate::metrics::GaugeRegistry;
use crate::notify::LegacyNotifier;
use crate::status::{DecodeError, StatusDecoder, StatusSnapshot, StreamRecord};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;

/// Errors that abandon a poll cycle.
#[derive(Debug, Error)]
pub enum PollError {
    /// Request could not be sent or the body could not be read.
    #[error("failed to fetch status: {0}")]
    Transport(#[from] reqwest::Error),
    /// Status endpoint answered with a non-success code.
    #[error("status endpoint returned {0}")]
    Status(reqwest::StatusCode),
    /// Body could not be decoded as a status document.
    #[error("failed to decode status: {0}")]
    Decode(#[from] DecodeError),
}

impl PollError {
    /// Failure reason used as a metric label.
    pub fn reason(&self) -> &'static str {
        match self {
            PollError::Transport(_) | PollError::Status(_) => "transport",
            PollError::Decode(_) => "decode",
        }
    }
}

/// Poller settings.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Icecast `status-json.xsl` URL.
    pub status_url: String,
    /// Idle time between cycles.
    pub interval: Duration,
    /// Only publish streams with exactly this server name; empty publishes all.
    pub server_filter: String,
    /// Produce legacy-safe label values.
    pub legacy_labels: bool,
    /// Timeout for one status fetch.
    pub request_timeout: Duration,
}

impl PollConfig {
    /// Default settings for polling `status_url`.
    pub fn new(status_url: impl Into<String>) -> Self {
        Self {
            status_url: status_url.into(),
            interval: Duration::from_secs(15),
            server_filter: String::new(),
            legacy_labels: false,
            request_timeout: Duration::from_secs(10),
        }
    }

    /// Returns true if the record passes the server-name filter.
    pub fn accepts(&self, record: &StreamRecord) -> bool {
        self.server_filter.is_empty() || record.server_name == self.server_filter
    }
}

/// Outcome of a successful cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    /// Streams present in the status document.
    pub streams_seen: usize,
    /// Streams that passed the filter and were published.
    pub streams_published: usize,
}

/// Drives the fetch, decode, and publish cycle.
pub struct PollScheduler {
    config: PollConfig,
    client: reqwest::Client,
    decoder: StatusDecoder,
    normalizer: LabelNormalizer,
    registry: Arc<GaugeRegistry>,
    notifier: LegacyNotifier,
}

impl PollScheduler {
    /// Creates a scheduler writing into `registry`.
    pub fn new(
        config: PollConfig,
        registry: Arc<GaugeRegistry>,
        notifier: LegacyNotifier,
    ) -> Result<Self, PollError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("icecast-exporter/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            normalizer: LabelNormalizer::new(config.legacy_labels),
            decoder: StatusDecoder::new(),
            config,
            client,
            registry,
            notifier,
        })
    }

    /// Fetches and decodes the current status document.
    pub async fn fetch(&self) -> Result<StatusSnapshot, PollError> {
        let response = self.client.get(&self.config.status_url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PollError::Status(status));
        }

        let body = response.bytes().await?;
        Ok(self.decoder.decode(&body)?)
    }

    /// Publishes a decoded snapshot into the registry.
    ///
    /// Legacy pushes are only dispatched when called inside a tokio runtime.
    pub fn publish(&self, snapshot: &StatusSnapshot) -> CycleReport {
        let mut published = 0;

        for record in snapshot.iter().filter(|r| self.config.accepts(r)) {
            let key = self.normalizer.key(record);
            self.registry.update(&key, record.listener_count);
            self.notifier.notify(record.listener_count);
            published += 1;

            tracing::debug!(
                server_name = %key.server_label,
                stream_url = %key.url_label,
                listeners = record.listener_count,
                "Updated listener gauge"
            );
        }

        CycleReport {
            streams_seen: snapshot.len(),
            streams_published: published,
        }
    }

    /// Runs one complete cycle.
    pub async fn poll_once(&self) -> Result<CycleReport, PollError> {
        match self.fetch().await {
            Ok(snapshot) => {
                let report = self.publish(&snapshot);
                self.registry.record_success();
                Ok(report)
            }
            Err(e) => {
                self.registry.record_failure(&e);
                Err(e)
            }
        }
    }

    /// Polls forever.
    pub async fn run(self) {
        let interval = self.config.interval;

        loop {
            match self.poll_once().await {
                Ok(report) => {
                    tracing::trace!(
                        seen = report.streams_seen,
                        published = report.streams_published,
                        "Poll cycle complete"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        retry_in_secs = interval.as_secs(),
                        "Error polling Icecast endpoint"
                    );
                }
            }

            tokio::time::sleep(interval).await;
        }
    }

    /// Spawns [`run`](Self::run) on a background task.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }
}
