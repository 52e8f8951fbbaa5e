//! AnkiConnect actions, grouped by concern.

mod decks;
mod media;
mod misc;
mod notes;

pub use decks::DeckActions;
pub use media::MediaActions;
pub use misc::MiscActions;
pub use notes::NoteActions;
