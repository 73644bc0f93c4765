//! Icecast status document decoding.
//!
//! Icecast reports a single mount as a bare object under
//! `icestats.source` and several mounts as an array. Both shapes are
//! normalized into one ordered [`StatusSnapshot`].

mod decoder;
mod stream;

pub use decoder::{DecodeError, StatusDecoder};
pub use stream::{StatusSnapshot, StreamRecord};
