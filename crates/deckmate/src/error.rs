//! Error types for AnkiConnect operations.

use thiserror::Error;

/// The error type for AnkiConnect operations.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP/network error from reqwest.
    ///
    /// Connection-level failures are reported as [`Error::ConnectionRefused`]
    /// instead.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// AnkiConnect returned an error message.
    ///
    /// The message carries AnkiConnect's own description, e.g.
    /// "deck was not found" or "cannot create note because it is a duplicate".
    #[error("AnkiConnect error: {0}")]
    AnkiConnect(String),

    /// Response carried neither a result nor an error.
    #[error("AnkiConnect returned an empty response")]
    EmptyResponse,

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Could not connect - Anki is likely not running, or the AnkiConnect
    /// add-on is not installed or listens on a different port.
    #[error("Could not connect to Anki. Is Anki running with AnkiConnect installed?")]
    ConnectionRefused,

    /// AnkiConnect rejected the request for lack of permission.
    ///
    /// An API key is required or incorrect, or the request needs approval
    /// in the Anki UI.
    #[error("Permission denied. Check the API key or approve the request in Anki.")]
    PermissionDenied,
}

/// A specialized Result type for AnkiConnect operations.
pub type Result<T> = std::result::Result<T, Error>;
