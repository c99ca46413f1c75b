//! Output handler trait and error type

use crate::state::LinkGraph;
use thiserror::Error;

/// Errors that can occur while persisting crawl results
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Persists the link graph while and after a crawl runs
///
/// Every write must leave a complete, well-formed artifact behind, even if
/// the process dies right after it.
pub trait OutputHandler: Send {
    /// Called after every successfully crawled page with the graph so far
    fn save_intermediate(&mut self, graph: &LinkGraph) -> OutputResult<()>;

    /// Called exactly once when the crawl loop exits, however it exits
    fn save_final(&mut self, graph: &LinkGraph) -> OutputResult<()>;
}
