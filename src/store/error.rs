//! Query error type
//!
//! Everything that can go wrong while answering an API request. The
//! dispatch boundary turns each variant into a JSON error body.

use hyper::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// No endpoint is registered under this name
    #[error("Unknown endpoint: {0}")]
    UnknownEndpoint(String),

    /// The store could not be opened or a statement failed
    #[error("{0}")]
    Store(#[from] rusqlite::Error),

    /// A stored oil payload is not valid JSON
    #[error("malformed {column} payload: {source}")]
    Payload {
        column: &'static str,
        source: serde_json::Error,
    },

    /// The blocking worker running the lookup panicked or was cancelled
    #[error("query worker failed: {0}")]
    Worker(String),

    /// The shaped result could not be turned into JSON
    #[error("failed to encode result: {0}")]
    Encode(serde_json::Error),
}

impl QueryError {
    /// HTTP status reported to the client
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::UnknownEndpoint(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
