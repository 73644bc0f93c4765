//! Stream records decoded from a status document.

use serde::{Deserialize, Serialize};

/// One live stream on the Icecast server at poll time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamRecord {
    /// Configured server name of the mount; empty if Icecast omits it.
    #[serde(default)]
    pub server_name: String,
    /// Public listen URL of the mount; empty if Icecast omits it.
    #[serde(rename = "listenurl", default)]
    pub listen_url: String,
    /// Current number of connected listeners.
    #[serde(rename = "listeners")]
    pub listener_count: u64,
}

impl StreamRecord {
    /// Creates a record from its parts.
    pub fn new(
        server_name: impl Into<String>,
        listen_url: impl Into<String>,
        listener_count: u64,
    ) -> Self {
        Self {
            server_name: server_name.into(),
            listen_url: listen_url.into(),
            listener_count,
        }
    }
}

/// Ordered sequence of stream records decoded from one status document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusSnapshot {
    records: Vec<StreamRecord>,
}

impl StatusSnapshot {
    /// Creates a snapshot from records in document order.
    pub fn new(records: Vec<StreamRecord>) -> Self {
        Self { records }
    }

    /// Number of streams in the snapshot.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the snapshot holds no streams.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterates records in document order.
    pub fn iter(&self) -> std::slice::Iter<'_, StreamRecord> {
        self.records.iter()
    }

    /// Consumes the snapshot, returning its records.
    pub fn into_records(self) -> Vec<StreamRecord> {
        self.records
    }
}

impl<'a> IntoIterator for &'a StatusSnapshot {
    type Item = &'a StreamRecord;
    type IntoIter = std::slice::Iter<'a, StreamRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
