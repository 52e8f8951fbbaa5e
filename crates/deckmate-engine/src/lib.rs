//! Lesson loading and deck reconciliation for Anki via AnkiConnect.
//!
//! This crate turns a directory of hand-authored lesson files into the
//! desired state of an Anki deck and reconciles a running Anki instance
//! against it through the [`deckmate`] client.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::path::Path;
//! use deckmate::AnkiClient;
//! use deckmate_engine::{DeckConfig, SyncEngine, SyncOptions, load_lessons};
//!
//! # async fn example() -> deckmate_engine::Result<()> {
//! let content = Path::new("content");
//! let config = DeckConfig::load(content)?;
//! let lessons = load_lessons(content, &config)?;
//!
//! let client = AnkiClient::new();
//! let engine = SyncEngine::new(&client, &config, content);
//! let report = engine.sync(&lessons, SyncOptions::default()).await?;
//! println!(
//!     "created {} updated {} deleted {} unchanged {}",
//!     report.created, report.updated, report.deleted, report.unchanged
//! );
//! # Ok(())
//! # }
//! ```
//!
//! # Identity
//!
//! Every card carries a stable uid (`[<prefix>-]<NN>-<NNN>`). Remotely the
//! uid lives in a `uid:` tag, which is the sole join key between local and
//! remote state: content edits update notes in place and never touch review
//! history. Tags outside the managed patterns (`uid:*`, `ch<NN>`) belong to
//! the user and are preserved untouched.

pub mod config;
pub mod content;
mod error;
pub mod media;
pub mod moves;
pub mod sync;

pub use config::DeckConfig;
pub use content::{Card, Lesson, load_lessons};
pub use error::{Error, Result};
pub use moves::{MoveEngine, MoveOutcome};
pub use sync::{SyncEngine, SyncOptions, SyncPlan, SyncReport};
