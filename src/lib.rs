//! # image-fetcher
//!
//! Fetch images from a list of remote locations and save them to disk,
//! optionally re-encoding each into PNG, JPEG, GIF or BMP.
//!
//! Batch operations run one task per location on a bounded worker pool.
//! A failing item is logged and reported in the returned [`BatchReport`];
//! it never aborts its siblings or the batch.
//!
//! ## Quick Start
//!
//! ```no_run
//! use image_fetcher::ImageFetcher;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut fetcher = ImageFetcher::from_locations(
//!         [
//!             "https://example.com/images/cat.png",
//!             "https://example.com/images/dog.jpg",
//!         ],
//!         4,
//!     )?;
//!
//!     // Writes ./out/cat.gif and ./out/dog.gif
//!     let report = fetcher.save_all_as("./out", "gif").await;
//!     for failure in &report.failures {
//!         eprintln!("{}: {}", failure.location, failure.error);
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Decode/encode adapter
pub mod codec;
/// Configuration types
pub mod config;
/// Shared task context
pub mod context;
/// Error types
pub mod error;
/// Fetch unit
pub mod fetch;
/// Image store
pub mod fetcher;
/// Format identifiers and sniffing
pub mod format;
/// Persistence unit
pub mod persist;
/// Bounded worker pool
pub mod pool;
/// Network transport seam
pub mod transport;
/// Core types
pub mod types;

// Re-export commonly used types
pub use codec::EncodeOptions;
pub use config::FetcherConfig;
pub use context::PipelineContext;
pub use error::{Error, Result};
pub use fetcher::ImageFetcher;
pub use format::ImageFormat;
pub use pool::WorkerPool;
pub use transport::{HttpTransport, Transport, TransportResponse};
pub use types::{BatchReport, FetchState, FetchedImage, ImageRecord, TaskError, TaskFailure};
