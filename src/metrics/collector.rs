//! Listener gauge registry.

use crate::labels::MetricKey;
use crate::poller::PollError;
use prometheus::core::Collector;
use prometheus::{Encoder, Gauge, GaugeVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use thiserror::Error;

const SERVER_LABEL: &str = "server_name";
const URL_LABEL: &str = "stream_url";

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// Metric creation, registration, or encoding failed.
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

/// Current listener counts keyed by [`MetricKey`], plus exporter health.
///
/// Gauge values are stored atomically, so any number of scrapes may read
/// while the poller writes. Entries are never removed; a stream that
/// disappears keeps its last published value.
pub struct GaugeRegistry {
    registry: Registry,

    listeners: GaugeVec,

    // Exporter self-metrics
    polls_total: IntCounter,
    poll_failures_total: IntCounterVec,
    last_success_timestamp: Gauge,
}

impl GaugeRegistry {
    /// Creates a registry with all exporter metrics registered.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let listeners = GaugeVec::new(
            Opts::new(
                "icecast_listeners",
                "Gauge representing current Icecast stream listeners",
            ),
            &[SERVER_LABEL, URL_LABEL],
        )?;

        let polls_total = IntCounter::new(
            "icecast_exporter_polls_total",
            "Total number of Icecast status polls attempted",
        )?;
        let poll_failures_total = IntCounterVec::new(
            Opts::new(
                "icecast_exporter_poll_failures_total",
                "Total number of failed Icecast status polls",
            ),
            &["reason"],
        )?;
        let last_success_timestamp = Gauge::new(
            "icecast_exporter_last_success_timestamp_seconds",
            "Unix time of the last successful Icecast status poll",
        )?;

        registry.register(Box::new(listeners.clone()))?;
        registry.register(Box::new(polls_total.clone()))?;
        registry.register(Box::new(poll_failures_total.clone()))?;
        registry.register(Box::new(last_success_timestamp.clone()))?;

        Ok(Self {
            registry,
            listeners,
            polls_total,
            poll_failures_total,
            last_success_timestamp,
        })
    }

    /// Sets the listener count for a key, creating the gauge if absent.
    pub fn update(&self, key: &MetricKey, listeners: u64) {
        self.listeners
            .with_label_values(&[key.server_label.as_str(), key.url_label.as_str()])
            .set(listeners as f64);
    }

    /// Returns the current value for a key without creating it.
    pub fn get(&self, key: &MetricKey) -> Option<f64> {
        self.snapshot()
            .into_iter()
            .find(|(k, _)| k == key)
            .map(|(_, value)| value)
    }

    /// Returns every published listener gauge, sorted by key.
    pub fn snapshot(&self) -> Vec<(MetricKey, f64)> {
        let mut entries: Vec<(MetricKey, f64)> = self
            .listeners
            .collect()
            .iter()
            .flat_map(|family| family.get_metric())
            .map(|metric| {
                let mut key = MetricKey::new("", "");
                for pair in metric.get_label() {
                    match pair.get_name() {
                        SERVER_LABEL => key.server_label = pair.get_value().to_string(),
                        URL_LABEL => key.url_label = pair.get_value().to_string(),
                        _ => {}
                    }
                }
                (key, metric.get_gauge().get_value())
            })
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    /// Records a completed poll cycle that published a snapshot.
    pub fn record_success(&self) {
        self.polls_total.inc();
        self.last_success_timestamp
            .set(chrono::Utc::now().timestamp() as f64);
    }

    /// Records a failed poll cycle under the error's reason label.
    pub fn record_failure(&self, error: &PollError) {
        self.polls_total.inc();
        self.poll_failures_total
            .with_label_values(&[error.reason()])
            .inc();
    }

    /// Returns the underlying Prometheus registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Encodes all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
