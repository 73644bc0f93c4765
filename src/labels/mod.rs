//! Metric label derivation.
//!
//! Each stream is published under a `(server_name, stream_url)` label pair.
//! The URL label is the last path segment of the listen URL. In legacy mode
//! both labels are reduced to characters accepted by Prometheus releases
//! before 3.0: `.` and space become `_`, and everything outside
//! `[a-zA-Z_:][a-zA-Z0-9_:]*` runs is dropped.

use crate::status::StreamRecord;
use regex::Regex;
use std::sync::OnceLock;

static LEGACY_LABEL: OnceLock<Regex> = OnceLock::new();

fn legacy_pattern() -> &'static Regex {
    LEGACY_LABEL.get_or_init(|| {
        Regex::new(r"[a-zA-Z_:][a-zA-Z0-9_:]*").expect("legacy label pattern is valid")
    })
}

/// Identity of a published listener gauge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MetricKey {
    /// Value of the `server_name` label.
    pub server_label: String,
    /// Value of the `stream_url` label.
    pub url_label: String,
}

impl MetricKey {
    /// Creates a key from its two label values.
    pub fn new(server_label: impl Into<String>, url_label: impl Into<String>) -> Self {
        Self {
            server_label: server_label.into(),
            url_label: url_label.into(),
        }
    }
}

/// Returns the text after the last `/`, or the whole string if there is none.
pub fn url_to_label(url: &str) -> &str {
    match url.rfind('/') {
        Some(i) => &url[i + 1..],
        None => url,
    }
}

/// Rewrites a label so it only contains identifier-safe characters.
///
/// An empty result is valid output.
pub fn make_legacy_label(label: &str) -> String {
    let replaced = label.replace(['.', ' '], "_");
    legacy_pattern()
        .find_iter(&replaced)
        .map(|m| m.as_str())
        .collect()
}

/// Derives [`MetricKey`]s from stream records.
#[derive(Debug, Clone, Copy, Default)]
pub struct LabelNormalizer {
    legacy: bool,
}

impl LabelNormalizer {
    /// Creates a normalizer; `legacy` enables legacy-safe labels.
    pub fn new(legacy: bool) -> Self {
        Self { legacy }
    }

    /// Returns true if legacy-safe labels are produced.
    pub fn is_legacy(&self) -> bool {
        self.legacy
    }

    /// Computes the metric key for a stream.
    pub fn key(&self, record: &StreamRecord) -> MetricKey {
        let server = record.server_name.as_str();
        let url = url_to_label(&record.listen_url);

        if self.legacy {
            MetricKey::new(make_legacy_label(server), make_legacy_label(url))
        } else {
            MetricKey::new(server, url)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_url_last_segment() {
        assert_eq!(url_to_label("http://host/stream.mp3"), "stream.mp3");
        assert_eq!(url_to_label("http://host:8000/a/b/live"), "live");
        assert_eq!(url_to_label("stream.mp3"), "stream.mp3");
        assert_eq!(url_to_label("http://host/"), "");
    }

    #[test]
    fn test_legacy_replaces_dot_and_space() {
        assert_eq!(make_legacy_label("Radio One.mp3"), "Radio_One_mp3");
    }

    #[test]
    fn test_legacy_drops_invalid_characters() {
        assert_eq!(make_legacy_label("live-128k"), "livek");
        assert_eq!(make_legacy_label("live_128k"), "live_128k");
        assert_eq!(make_legacy_label("9live"), "live");
        assert_eq!(make_legacy_label("Zürich FM"), "Zrich_FM");
        assert_eq!(make_legacy_label("a/b"), "ab");
    }

    #[test]
    fn test_legacy_empty_result() {
        assert_eq!(make_legacy_label(""), "");
        assert_eq!(make_legacy_label("123-456"), "");
    }

    #[test]
    fn test_key_default_mode() {
        let record = StreamRecord::new("Radio One", "http://radio.example:8000/live.mp3", 4);
        let key = LabelNormalizer::new(false).key(&record);
        assert_eq!(key, MetricKey::new("Radio One", "live.mp3"));
    }

    #[test]
    fn test_key_legacy_mode() {
        let record = StreamRecord::new("Radio One", "http://radio.example:8000/live.mp3", 4);
        let key = LabelNormalizer::new(true).key(&record);
        assert_eq!(key, MetricKey::new("Radio_One", "live_mp3"));
    }

    proptest! {
        #[test]
        fn prop_legacy_label_is_identifier_safe(input in ".*") {
            let label = make_legacy_label(&input);
            prop_assert!(label
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':'));
            if let Some(first) = label.chars().next() {
                prop_assert!(!first.is_ascii_digit());
            }
        }

        #[test]
        fn prop_legacy_label_is_idempotent(input in ".*") {
            let once = make_legacy_label(&input);
            prop_assert_eq!(make_legacy_label(&once), once);
        }

        #[test]
        fn prop_url_label_has_no_slash(input in ".*") {
            prop_assert!(!url_to_label(&input).contains('/'));
        }
    }
}
