//! Error types for the record store and the command-line layer.

use std::path::PathBuf;
use thiserror::Error;

/// Failures raised by [`crate::store::RecordStore`].
///
/// The store never exits the process; every failure comes back to the caller
/// as one of these variants.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing file (or its directory) could not be created, read or written.
    #[error("failed to access store file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backing file does not hold a valid envelope.
    #[error("store file {} is malformed: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The envelope could not be serialized.
    #[error("failed to encode store envelope: {0}")]
    Encode(#[source] serde_json::Error),

    /// An update addressed a record that does not exist.
    #[error("record {id} not found")]
    NotFound { id: u64 },

    /// The id counter has reached `u64::MAX`; no further inserts are possible.
    #[error("no ids left to assign (counter at {current})")]
    IdExhausted { current: u64 },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn decode(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        StoreError::Decode {
            path: path.into(),
            source,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Argument problems caught before the store is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("description not provided")]
    EmptyDescription,

    #[error("invalid task id '{0}': expected a positive integer")]
    InvalidId(String),

    #[error("unknown status '{0}': expected one of todo, in-progress, done")]
    UnknownStatus(String),

    #[error("unknown output format '{0}': expected one of table, markdown, json")]
    UnknownFormat(String),
}
