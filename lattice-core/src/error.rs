//! Error types for loading the input graph.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for input loading.
pub type Result<T> = std::result::Result<T, LoadError>;

/// Errors that make the input graph unusable.
///
/// Every variant is fatal for a run: nothing is written to any destination
/// once loading has failed.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The input file does not exist.
    #[error("input file not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// The input file exists but could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The input is not a qname -> entity JSON object.
    #[error("malformed input {}: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
