//! Error types for deckmate-engine.
//!
//! Two failure modes abort a run before any remote mutation: bad local
//! content ([`Error::Validation`]) and an unreachable Anki instance
//! ([`Error::Client`] wrapping `ConnectionRefused`). Per-card failures
//! during a sync run do not surface here; they are collected into the
//! [`SyncReport`](crate::sync::SyncReport).

use thiserror::Error;

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during engine operations.
#[derive(Debug, Error)]
pub enum Error {
    /// An error from the underlying AnkiConnect client.
    #[error(transparent)]
    Client(#[from] deckmate::Error),

    /// Local content failed validation.
    #[error("validation error: {0}")]
    Validation(String),

    /// No card with the given uid exists in the content directory.
    #[error("card not found: {0}")]
    CardNotFound(String),

    /// No lesson file exists for the given lesson number.
    #[error("lesson {0:02} not found")]
    LessonNotFound(u32),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
