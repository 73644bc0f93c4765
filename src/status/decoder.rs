//! Status document decoder.
//!
//! Accepts `{"icestats": {"source": ...}}` where `source` is either an
//! array of stream objects or one stream object. The array shape is tried
//! first; a bare object is wrapped into a one-element snapshot.

use super::{StatusSnapshot, StreamRecord};
use serde::Deserialize;
use thiserror::Error;

/// Errors produced while decoding a status document.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Body is not JSON or has no `icestats` object.
    #[error("malformed status document: {0}")]
    Envelope(#[from] serde_json::Error),
    /// `source` is neither a stream object nor an array of them.
    #[error("unrecognized status schema")]
    UnrecognizedSchema,
}

#[derive(Deserialize)]
struct StatusRoot {
    icestats: IcecastStats,
}

#[derive(Deserialize)]
struct IcecastStats {
    #[serde(default)]
    source: serde_json::Value,
}

/// Decodes Icecast `status-json.xsl` documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusDecoder;

impl StatusDecoder {
    /// Creates a decoder.
    pub fn new() -> Self {
        Self
    }

    /// Decodes raw body bytes into a snapshot.
    pub fn decode(&self, body: &[u8]) -> Result<StatusSnapshot, DecodeError> {
        let root: StatusRoot = serde_json::from_slice(body)?;
        Self::decode_source(root.icestats.source)
    }

    fn decode_source(source: serde_json::Value) -> Result<StatusSnapshot, DecodeError> {
        if let Ok(records) = Vec::<StreamRecord>::deserialize(&source) {
            return Ok(StatusSnapshot::new(records));
        }

        if let Ok(record) = StreamRecord::deserialize(&source) {
            return Ok(StatusSnapshot::new(vec![record]));
        }

        tracing::debug!(source = %source, "status source matched neither shape");
        Err(DecodeError::UnrecognizedSchema)
    }
}
