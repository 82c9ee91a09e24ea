//! sa_io: offline I/O for the seat engine.
//!
//! - `loader`: bounded reads of the snapshot and params JSON documents
//! - `store`: in-memory `Repository` with the write operations of the
//!   administration side (upsert/remove)
//! - `canonical_json`: sorted-key compact bytes and atomic file writes
//! - `hasher`: lowercase SHA-256 digests of raw bytes and canonical JSON

#![forbid(unsafe_code)]

use thiserror::Error;

/// Unified error for sa_io.
#[derive(Debug, Error)]
pub enum IoError {
    /// Input could not be read.
    #[error("read error: {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization errors with a JSON Pointer.
    #[error("json error at {pointer}: {msg}")]
    Json { pointer: String, msg: String },

    /// Filesystem / path errors on output (create_dir_all, rename, fsync).
    #[error("io/path error: {0}")]
    Path(String),

    #[error("hash error: {0}")]
    Hash(String),

    /// Size limits, URL inputs, parameter domains.
    #[error("invalid: {0}")]
    Invalid(String),
}

pub type IoResult<T> = Result<T, IoError>;

impl From<std::io::Error> for IoError {
    fn from(e: std::io::Error) -> Self {
        IoError::Path(e.to_string())
    }
}

impl From<serde_json::Error> for IoError {
    fn from(e: serde_json::Error) -> Self {
        // serde_json reports line/column, not a pointer.
        IoError::Json { pointer: "/".to_string(), msg: e.to_string() }
    }
}

pub mod canonical_json;
pub mod hasher;
pub mod loader;
pub mod store;

pub use loader::{load_params, load_snapshot, parse_params, parse_snapshot, read_input, SnapshotDoc, MAX_INPUT_BYTES};
pub use store::SnapshotStore;

/// Returns true if `s` looks like a URL (any `<scheme>://`, including `file://`).
#[inline]
pub fn looks_like_url_strict(s: &str) -> bool {
    s.trim().contains("://")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_detection() {
        assert!(looks_like_url_strict("https://example.org/data.json"));
        assert!(looks_like_url_strict(" file:///tmp/x.json"));
        assert!(!looks_like_url_strict("data/snapshot.json"));
        assert!(!looks_like_url_strict("C:\\data\\snapshot.json"));
    }
}
