//! Error types for folio-core

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Result type used throughout the view-state machine
pub type Result<T> = std::result::Result<T, ViewError>;

/// Conditions reported by viewer commands.
///
/// None of these are fatal: a command that fails leaves the view state
/// exactly as it was.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ViewError {
    #[error("no document is open")]
    NoDocument,

    #[error("page {requested} is out of range (document has {page_count} pages)")]
    OutOfRange { requested: i64, page_count: usize },

    #[error("cannot {operation} while continuous mode is active")]
    InvalidModeCombination { operation: &'static str },

    #[error("'{0}' is not a page number")]
    InvalidPageNumber(String),
}

/// Failure of the external renderer for a single page
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("failed to render page {}: {message}", page_index + 1)]
    Backend { page_index: usize, message: String },

    #[error("rendering page {} timed out after {timeout:?}", page_index + 1)]
    Timeout { page_index: usize, timeout: Duration },

    #[error("render worker for page {} stopped: {message}", page_index + 1)]
    Worker { page_index: usize, message: String },
}

impl RenderError {
    /// Zero-based index of the page that failed
    pub fn page_index(&self) -> usize {
        match self {
            Self::Backend { page_index, .. }
            | Self::Timeout { page_index, .. }
            | Self::Worker { page_index, .. } => *page_index,
        }
    }
}

/// Errors raised while loading a [`crate::ViewerConfig`]
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
