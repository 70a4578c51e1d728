//! Core types: image records and batch outcomes

use crate::error::Error;

/// Bytes and identity of a successfully fetched image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedImage {
    /// Raw response body
    pub bytes: Vec<u8>,
    /// Content type sniffed from `bytes` (e.g. `image/png`)
    pub detected_format: String,
    /// Output file stem derived from the location
    pub base_name: String,
}

/// Fetch state of a record
///
/// The only transition is `NotFetched -> Fetched`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FetchState {
    /// Nothing retrieved yet
    #[default]
    NotFetched,
    /// Retrieved; bytes, format and base name are populated together
    Fetched(FetchedImage),
}

/// One fetchable image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRecord {
    location: String,
    state: FetchState,
}

impl ImageRecord {
    /// Create an unfetched record for `location`
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            state: FetchState::NotFetched,
        }
    }

    /// Source address
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Current fetch state
    pub fn state(&self) -> &FetchState {
        &self.state
    }

    /// Whether a fetch has succeeded for this record
    pub fn is_fetched(&self) -> bool {
        matches!(self.state, FetchState::Fetched(_))
    }

    /// The fetched image, if any
    pub fn fetched(&self) -> Option<&FetchedImage> {
        match &self.state {
            FetchState::Fetched(image) => Some(image),
            FetchState::NotFetched => None,
        }
    }

    /// Raw bytes, once fetched
    pub fn bytes(&self) -> Option<&[u8]> {
        self.fetched().map(|image| image.bytes.as_slice())
    }

    /// Sniffed content type, once fetched
    pub fn detected_format(&self) -> Option<&str> {
        self.fetched().map(|image| image.detected_format.as_str())
    }

    /// Output file stem, once fetched
    pub fn base_name(&self) -> Option<&str> {
        self.fetched().map(|image| image.base_name.as_str())
    }

    /// Record a successful fetch. Refetching replaces the previous image.
    pub(crate) fn mark_fetched(&mut self, image: FetchedImage) {
        self.state = FetchState::Fetched(image);
    }
}

/// One item that failed during a batch operation
#[derive(Debug)]
pub struct TaskFailure {
    /// Index of the record in the store
    pub index: usize,
    /// Location of the record
    pub location: String,
    /// What went wrong
    pub error: TaskError,
}

/// Why a batch item failed
#[derive(Debug)]
pub enum TaskError {
    /// The fetch or persist step returned an error
    Failed(Error),
    /// The task panicked before completing
    Panicked,
}

impl std::fmt::Display for TaskError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskError::Failed(e) => write!(f, "{e}"),
            TaskError::Panicked => f.write_str("task panicked"),
        }
    }
}

/// Summary of one batch operation
///
/// `succeeded + failures.len() == total` always holds; failures are sorted by
/// index.
#[must_use]
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Number of items attempted
    pub total: usize,
    /// Number of items that completed without error
    pub succeeded: usize,
    /// Items that failed, in index order
    pub failures: Vec<TaskFailure>,
}

impl BatchReport {
    /// Number of failed items
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Whether every item succeeded
    pub fn is_complete_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Failure for a given index, if that item failed
    pub fn failure_for(&self, index: usize) -> Option<&TaskFailure> {
        self.failures.iter().find(|f| f.index == index)
    }
}
