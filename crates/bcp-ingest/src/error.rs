//! Error types for the ingestion pipeline

use thiserror::Error;

/// Result type alias for ingestion operations
pub type Result<T> = std::result::Result<T, IngestError>;

/// Failure taxonomy for one ingestion run.
///
/// Everything here is fatal to the run. Per-cell interpretation problems are
/// absorbed by [`crate::coerce`] with documented defaults and never become an
/// `IngestError`.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Feed fetch failed for {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("Too many redirects fetching {url} (limit {limit})")]
    TooManyRedirects { url: String, limit: usize },

    #[error("Malformed CSV in feed: {0}")]
    MalformedCsv(#[from] csv_async::Error),

    #[error("Feed header is missing required column '{0}'")]
    MissingColumn(String),

    #[error("Database error: {0}")]
    Store(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IngestError {
    /// Attach fetch context to a transport-level error
    pub fn fetch(url: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Fetch {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}
