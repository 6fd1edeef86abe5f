use thiserror::Error;

/// Errors raised by a destination.
///
/// Inside a run these are absorbed per batch by the writer. Only connection
/// and provisioning failures, which happen before the run, reach the caller.
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("HTTP error: {0}")]
    Http(#[from] ureq::Error),

    #[error("{destination} rejected request: {message}")]
    Rejected {
        destination: &'static str,
        message: String,
    },

    #[error("Database error: {0}")]
    Sled(#[from] sled::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("document in `{collection}` has no key field")]
    MissingKey { collection: String },
}
