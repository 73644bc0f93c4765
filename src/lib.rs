//! Icecast Prometheus Exporter Library
//!
//! Polls an Icecast `status-json.xsl` endpoint on a fixed interval and
//! republishes per-stream listener counts as labeled Prometheus gauges.
//!
//! # Architecture
//!
//! ```text
//! poller → status (decode) → labels (normalize) → metrics (gauges) ← scrape
//!                                      ↓
//!                              notify (legacy push)
//! ```
//!
//! The poller is the only writer to the [`GaugeRegistry`]; the metrics
//! server reads it on every scrape. A failed poll leaves the last published
//! values in place.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use icecast_exporter::{GaugeRegistry, LegacyNotifier, PollConfig, PollScheduler};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = Arc::new(GaugeRegistry::new()?);
//! let config = PollConfig::new("http://icecast.example.com/status-json.xsl");
//! let scheduler = PollScheduler::new(config, Arc::clone(&registry), LegacyNotifier::disabled())?;
//!
//! let report = scheduler.poll_once().await?;
//! println!("published {} streams", report.streams_published);
//! print!("{}", registry.encode()?);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod config;
pub mod labels;
pub mod metrics;
pub mod notify;
pub mod poller;
pub mod status;

// Re-export commonly used types at crate root
pub use config::{ConfigError, ExporterConfig, FileConfig};
pub use labels::{LabelNormalizer, MetricKey};
pub use metrics::{GaugeRegistry, MetricsServer, MetricsServerConfig};
pub use notify::LegacyNotifier;
pub use poller::{CycleReport, PollConfig, PollError, PollScheduler};
pub use status::{DecodeError, StatusDecoder, StatusSnapshot, StreamRecord};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
