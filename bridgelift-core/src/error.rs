//! Error types for bridgelift.

use thiserror::Error;

/// Errors that can occur in bridgelift operations.
#[derive(Error, Debug)]
pub enum BridgeLiftError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Fetch failed: {0}")]
    Fetch(String),

    #[error("Fetch timed out after {0}s")]
    FetchTimeout(u64),

    #[error("Could not parse lift schedule: {0}")]
    Parse(String),

    #[error("Fetched schedule contains no lifts, refusing to reconcile against it")]
    EmptySnapshot,

    #[error("Failed to load lift data from {path}: {reason}")]
    StoreLoad { path: String, reason: String },

    #[error("Failed to save lift data to {path}: {reason}")]
    StoreSave { path: String, reason: String },

    #[error("Another update is already running (lock held on {0})")]
    Locked(String),

    #[error("Could not open lock file {path}: {reason}")]
    LockFile { path: String, reason: String },

    #[error("ICS generation error: {0}")]
    Ics(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl BridgeLiftError {
    pub fn store_load(path: &std::path::Path, reason: impl ToString) -> Self {
        Self::StoreLoad {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn store_save(path: &std::path::Path, reason: impl ToString) -> Self {
        Self::StoreSave {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }

    /// True for failures on the fetch side, where the stored dataset was not touched.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            Self::Fetch(_) | Self::FetchTimeout(_) | Self::Parse(_) | Self::EmptySnapshot
        )
    }
}

/// Result type alias for bridgelift operations.
pub type BridgeLiftResult<T> = Result<T, BridgeLiftError>;

/// A lift row that could not be turned into an event.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedEvent {
    #[error("missing {0}")]
    MissingField(&'static str),

    #[error("unparseable timestamp '{0}'")]
    BadTimestamp(String),

    #[error("expected {expected} cells, found {found}")]
    CellCount { expected: usize, found: usize },
}
