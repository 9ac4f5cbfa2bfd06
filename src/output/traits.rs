//! Output sink trait and error types
//!
//! Every edge a worker discovers is handed to an `EdgeSink`, whether or not
//! the destination is admitted to the frontier.

use thiserror::Error;
use url::Url;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Append-only receiver of discovered edges
///
/// Called concurrently by all workers; implementations should buffer rather
/// than stall the crawl.
pub trait EdgeSink: Send + Sync {
    /// Records one `source -> dest` edge
    fn emit(&self, source: &Url, dest: &Url) -> OutputResult<()>;

    /// Flushes buffered edges
    fn flush(&self) -> OutputResult<()> {
        Ok(())
    }
}
