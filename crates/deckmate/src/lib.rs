//! A minimal async client for the AnkiConnect API.
//!
//! This crate covers the slice of AnkiConnect needed to keep a locally
//! authored deck in sync with a running Anki instance: deck creation and
//! lookup, note CRUD, tag replacement, and media storage. It is not a
//! complete binding.
//!
//! # Quick Start
//!
//! ```no_run
//! use deckmate::AnkiClient;
//!
//! # async fn example() -> deckmate::Result<()> {
//! let client = AnkiClient::new();
//!
//! // Probe connectivity before doing anything destructive.
//! let version = client.misc().version().await?;
//! println!("AnkiConnect version: {}", version);
//!
//! let decks = client.decks().names().await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Action Groups
//!
//! Operations are grouped the way AnkiConnect documents them:
//!
//! - [`AnkiClient::misc`] - version probe
//! - [`AnkiClient::decks`] - deck names, creation, moving cards
//! - [`AnkiClient::notes`] - find, info, add, update, delete, tags
//! - [`AnkiClient::media`] - store, list, delete media files

mod actions;
mod client;
mod error;
pub mod query;
mod types;

pub use actions::{DeckActions, MediaActions, MiscActions, NoteActions};
pub use client::{AnkiClient, ClientBuilder};
pub use error::{Error, Result};
pub use types::{Note, NoteField, NoteInfo, NoteOptions, StoreMediaParams};
