//! Error types for the XenServer API client

use thiserror::Error;

use crate::object_class::ObjectClass;

/// Errors that can occur when talking to the XenServer API
#[derive(Error, Debug)]
pub enum ClientError {
    /// Login or transport failure while establishing the session
    #[error("failed to connect to Xen Orchestra: {0}")]
    Connection(String),

    /// A specific object-class fetch failed after a successful login
    #[error("failed to retrieve {class} objects: {detail}")]
    Fetch {
        /// Object class whose fetch failed
        class: ObjectClass,
        /// Remote diagnostic detail
        detail: String,
    },

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid URL
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// API returned a non-success HTTP status
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error message from server
        message: String,
    },

    /// The remote API reported a JSON-RPC failure
    #[error("API failure ({code}): {message}")]
    Rpc {
        /// JSON-RPC error code
        code: i64,
        /// Remote diagnostic message
        message: String,
    },

    /// Snapshot cache error
    #[error("cache error: {0}")]
    Cache(String),
}

/// Result type for client operations
pub type Result<T> = std::result::Result<T, ClientError>;
