//! Loader error types.

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid base URL {url}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("Request to {path} failed with status {status}")]
    Status { path: String, status: u16 },

    #[error("Response from {path} is not valid JSON: {source}")]
    InvalidJson {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Response from {path} is not a track list (got {found})")]
    UnexpectedPayload { path: String, found: &'static str },

    #[error("Genome browser is not ready yet")]
    BrowserNotReady,

    #[error("Genome browser failed to initialize: {0}")]
    BrowserUnavailable(String),

    #[error("Genome browser is already initialized")]
    AlreadyInitialized,

    #[error("Widget error: {0}")]
    Widget(String),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),
}

pub type Result<T> = std::result::Result<T, LoaderError>;

/// JSON type name used in payload errors.
pub(crate) fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
