use std::io;
use std::path::PathBuf;

/// Errors from an optimization run. Every variant aborts the run.
#[derive(Debug, thiserror::Error)]
pub enum OptimizeError {
    #[error("Input file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read {}: {source}", path.display())]
    ReadError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse GeoJSON: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Invalid GeoJSON format ({0})")]
    InvalidFormat(String),

    #[error("Invalid option: {0}")]
    InvalidOption(String),

    #[error("Failed to write {}: {source}", path.display())]
    WriteError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, OptimizeError>;
