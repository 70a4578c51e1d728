//! Error types for image-fetcher
//!
//! Every failure the pipeline can report is a variant of [`Error`]. Batch
//! operations never return these for individual items; they are logged and
//! collected into a [`BatchReport`](crate::types::BatchReport) instead.
//! Single-item operations propagate them directly.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for image-fetcher operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for image-fetcher
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "concurrency")
        key: Option<String>,
    },

    /// The retrieval could not complete (connection failure, timeout, body read)
    #[error("transport error fetching {location}: {message}")]
    Transport {
        /// The location being fetched
        location: String,
        /// What went wrong
        message: String,
    },

    /// The transport completed but the server answered with a non-success status
    #[error("HTTP status {status} fetching {location}")]
    HttpStatus {
        /// The location being fetched
        location: String,
        /// The HTTP status code returned
        status: u16,
    },

    /// Format identifier is not one of png, jpeg, gif, bmp
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// Bytes could not be parsed as the claimed format
    #[error("corrupt {format} data: {message}")]
    CorruptData {
        /// The format the bytes were decoded as
        format: String,
        /// Decoder message
        message: String,
    },

    /// The encoder rejected the image
    #[error("failed to encode {format}: {message}")]
    Encode {
        /// Target format
        format: String,
        /// Encoder message
        message: String,
    },

    /// Directory creation or file write failed
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        /// The path involved in the failed operation
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Accessor index beyond the number of records
    #[error("index {index} out of range for {len} images")]
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// Number of records in the store
        len: usize,
    },

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Build a configuration error for a specific key
    pub(crate) fn config(key: &str, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.to_string()),
        }
    }

    /// Build an I/O error tagged with the path it happened at
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// Short machine-readable name of the error kind, used as a log field
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Config { .. } => "configuration",
            Error::Transport { .. } => "transport",
            Error::HttpStatus { .. } => "http_status",
            Error::UnsupportedFormat(_) => "unsupported_format",
            Error::CorruptData { .. } => "corrupt_data",
            Error::Encode { .. } => "encode",
            Error::Io { .. } => "io",
            Error::IndexOutOfRange { .. } => "index_out_of_range",
            Error::Serialization(_) => "serialization",
        }
    }
}
