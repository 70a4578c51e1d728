//! The image store: a fixed set of locations and their records
//!
//! [`ImageFetcher`] owns one record per location, in construction order, and
//! runs batch operations over them through a [`WorkerPool`]. Each task works
//! on its own copy of a record and the store writes a fetched copy back into
//! the same slot once the task returns, so the collection needs no lock. A
//! slot is never overwritten by a task that panicked, failed to fetch, or was
//! aborted because the batch future was dropped.

use crate::codec::EncodeOptions;
use crate::config::FetcherConfig;
use crate::context::PipelineContext;
use crate::error::{Error, Result};
use crate::fetch::fetch_record;
use crate::format::ImageFormat;
use crate::persist::save_record;
use crate::pool::WorkerPool;
use crate::transport::{HttpTransport, Transport};
use crate::types::{BatchReport, ImageRecord, TaskError, TaskFailure};
use std::path::{Path, PathBuf};
use std::sync::Arc;


/// What each task in a batch does with its record
#[derive(Debug, Clone)]
enum BatchOp {
    Fetch,
    Save {
        dir: PathBuf,
        target: Option<ImageFormat>,
    },
}

impl BatchOp {
    fn name(&self) -> &'static str {
        match self {
            BatchOp::Fetch => "fetch",
            BatchOp::Save { target: None, .. } => "save",
            BatchOp::Save { target: Some(_), .. } => "save_as",
        }
    }
}

/// A batch job over a fixed, ordered set of image locations
///
/// # Example
///
/// ```no_run
/// use image_fetcher::ImageFetcher;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut fetcher = ImageFetcher::from_locations(
///     ["https://example.com/a.png", "https://example.com/b.jpg"],
///     2,
/// )?;
///
/// let report = fetcher.save_all_as("./out", "gif").await;
/// println!("{} of {} saved", report.succeeded, report.total);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ImageFetcher {
    locations: Vec<String>,
    records: Vec<ImageRecord>,
    pool: WorkerPool,
    ctx: PipelineContext,
}

impl ImageFetcher {
    /// Store for a single location, processed one task at a time
    pub fn new(location: impl Into<String>) -> Result<Self> {
        Self::from_locations([location], 1)
    }

    /// Store for `locations` with a concurrency ceiling and default settings
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `concurrency` is zero.
    pub fn from_locations<I, S>(locations: I, concurrency: usize) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let config = FetcherConfig {
            concurrency,
            ..Default::default()
        };
        Self::with_config(locations, config)
    }

    /// Store for `locations` using the HTTP transport configured by `config`
    pub fn with_config<I, S>(locations: I, config: FetcherConfig) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        config.validate()?;
        let transport = Arc::new(HttpTransport::new(&config)?);
        Self::with_transport(locations, config, transport)
    }

    /// Store for `locations` retrieving through a caller-supplied transport
    pub fn with_transport<I, S>(
        locations: I,
        config: FetcherConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        config.validate()?;
        let pool = WorkerPool::new(config.concurrency)?;
        let locations: Vec<String> = locations.into_iter().map(Into::into).collect();
        let records = locations.iter().map(ImageRecord::new).collect();

        tracing::debug!(
            images = locations.len(),
            concurrency = pool.limit(),
            transport = transport.name(),
            "Image fetcher created"
        );

        Ok(Self {
            locations,
            records,
            pool,
            ctx: PipelineContext::new(transport, EncodeOptions::from(&config)),
        })
    }

    /// Locations in construction order
    pub fn locations(&self) -> &[String] {
        &self.locations
    }

    /// Number of images in the store
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no images
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Concurrency ceiling for batch operations
    pub fn concurrency(&self) -> usize {
        self.pool.limit()
    }

    /// Every record, fetched or not, in location order
    pub fn get_all(&self) -> &[ImageRecord] {
        &self.records
    }

    /// Record at `index`
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`] if `index >= self.len()`.
    pub fn get(&self, index: usize) -> Result<&ImageRecord> {
        self.records.get(index).ok_or(Error::IndexOutOfRange {
            index,
            len: self.records.len(),
        })
    }

    /// First record
    pub fn first(&self) -> Result<&ImageRecord> {
        self.get(0)
    }

    /// Bytes of the first record; `None` until it has been fetched
    pub fn first_bytes(&self) -> Result<Option<&[u8]>> {
        Ok(self.first()?.bytes())
    }

    /// Fetch every location without saving
    ///
    /// Records that were already fetched are fetched again.
    pub async fn fetch_all(&mut self) -> BatchReport {
        self.run_batch(BatchOp::Fetch).await
    }

    /// Fetch (if needed) and save every image in its detected format
    pub async fn save_all(&mut self, dir: impl AsRef<Path>) -> BatchReport {
        self.run_batch(BatchOp::Save {
            dir: dir.as_ref().to_path_buf(),
            target: None,
        })
        .await
    }

    /// Fetch (if needed) and save every image re-encoded as `format`
    ///
    /// An unsupported `format` fails every item with
    /// [`Error::UnsupportedFormat`] without fetching or writing anything.
    pub async fn save_all_as(&mut self, dir: impl AsRef<Path>, format: &str) -> BatchReport {
        match ImageFormat::parse(format) {
            Ok(target) => {
                self.run_batch(BatchOp::Save {
                    dir: dir.as_ref().to_path_buf(),
                    target: Some(target),
                })
                .await
            }
            Err(_) => self.reject_all(format),
        }
    }

    /// Fetch the record at `index`
    pub async fn fetch_one(&mut self, index: usize) -> Result<()> {
        let transport = Arc::clone(&self.ctx.transport);
        let record = self.slot_mut(index)?;
        fetch_record(transport.as_ref(), record).await
    }

    /// Save the record at `index` in its detected format, fetching it if needed
    pub async fn save_one(&mut self, index: usize, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let ctx = self.ctx.clone();
        let record = self.slot_mut(index)?;
        save_record(&ctx, record, dir.as_ref(), None).await
    }

    /// Save the record at `index` re-encoded as `format`, fetching it if needed
    pub async fn save_one_as(
        &mut self,
        index: usize,
        dir: impl AsRef<Path>,
        format: &str,
    ) -> Result<PathBuf> {
        let target = ImageFormat::parse(format)?;
        let ctx = self.ctx.clone();
        let record = self.slot_mut(index)?;
        save_record(&ctx, record, dir.as_ref(), Some(target)).await
    }

    fn slot_mut(&mut self, index: usize) -> Result<&mut ImageRecord> {
        let len = self.records.len();
        self.records
            .get_mut(index)
            .ok_or(Error::IndexOutOfRange { index, len })
    }

    async fn run_batch(&mut self, op: BatchOp) -> BatchReport {
        let total = self.records.len();
        let operation = op.name();
        tracing::info!(
            operation,
            images = total,
            concurrency = self.pool.effective_limit(total),
            "Starting batch"
        );

        // Fetch always starts from scratch; save reuses bytes already held
        let inputs: Vec<ImageRecord> = match &op {
            BatchOp::Fetch => self.locations.iter().map(ImageRecord::new).collect(),
            BatchOp::Save { .. } => self.records.clone(),
        };

        let ctx = self.ctx.clone();
        let outputs = self
            .pool
            .run(inputs, move |_, mut record| {
                let ctx = ctx.clone();
                let op = op.clone();
                async move {
                    let result = match &op {
                        BatchOp::Fetch => fetch_record(ctx.transport.as_ref(), &mut record).await,
                        BatchOp::Save { dir, target } => {
                            save_record(&ctx, &mut record, dir, *target).await.map(|_| ())
                        }
                    };
                    (record, result)
                }
            })
            .await;

        let mut report = BatchReport {
            total,
            ..Default::default()
        };
        for (index, output) in outputs.into_iter().enumerate() {
            let location = &self.locations[index];
            let error = match output {
                Some((record, result)) => {
                    if record.is_fetched() {
                        self.records[index] = record;
                    }
                    match result {
                        Ok(()) => {
                            report.succeeded += 1;
                            tracing::debug!(operation, index, location = %location, "Image done");
                            continue;
                        }
                        Err(e) => TaskError::Failed(e),
                    }
                }
                None => TaskError::Panicked,
            };
            log_failure(operation, index, location, &error);
            report.failures.push(TaskFailure {
                index,
                location: location.clone(),
                error,
            });
        }

        tracing::info!(
            operation,
            images = total,
            succeeded = report.succeeded,
            failed = report.failed(),
            "Batch finished"
        );
        report
    }

    /// Report every item as failed because the target format is unsupported
    fn reject_all(&self, format: &str) -> BatchReport {
        let failures = self
            .locations
            .iter()
            .enumerate()
            .map(|(index, location)| {
                let error = TaskError::Failed(Error::UnsupportedFormat(format.to_string()));
                log_failure("save_as", index, location, &error);
                TaskFailure {
                    index,
                    location: location.clone(),
                    error,
                }
            })
            .collect();
        BatchReport {
            total: self.locations.len(),
            succeeded: 0,
            failures,
        }
    }
}

fn log_failure(operation: &str, index: usize, location: &str, error: &TaskError) {
    let kind = match error {
        TaskError::Failed(e) => e.kind(),
        TaskError::Panicked => "panic",
    };
    tracing::warn!(
        operation,
        index,
        location = %location,
        file = %crate::fetch::base_name(location),
        kind,
        error = %error,
        "Image failed"
    );
}
