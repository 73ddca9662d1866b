// Error types for route discovery and documentation loading

use std::path::PathBuf;

pub type DocsResult<T> = Result<T, DocsError>;

/// Failure to obtain a parsed API specification
#[derive(Debug, thiserror::Error)]
pub enum DocsError {
    #[error("Failed to parse API documentation: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Failed to read API documentation from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("API documentation is empty")]
    Empty,

    #[error("API documentation unavailable: {0}")]
    Unavailable(String),
}
