//! Prometheus exposition of Icecast listener counts.
//!
//! # Metrics Exposed
//!
//! - `icecast_listeners{server_name, stream_url}` - Current listeners per stream
//! - `icecast_exporter_polls_total` - Status polls attempted
//! - `icecast_exporter_poll_failures_total{reason}` - Failed polls (`transport` or `decode`)
//! - `icecast_exporter_last_success_timestamp_seconds` - Unix time of the last good poll
//!
//! # Example
//!
//! ```no_run
//! use icecast_exporter::labels::MetricKey;
//! use icecast_exporter::metrics::GaugeRegistry;
//!
//! let registry = GaugeRegistry::new().expect("Failed to create registry");
//! registry.update(&MetricKey::new("Radio One", "live.mp3"), 42);
//! println!("{}", registry.encode().unwrap());
//! ```

mod collector;
mod server;

pub use collector::{GaugeRegistry, MetricsError};
pub use server::{MetricsServer, MetricsServerConfig, ServerError};
