//! Helpers for building Anki search query strings.
//!
//! AnkiConnect's `findNotes` uses Anki's search syntax; values containing
//! spaces or `::` separators need quoting. These helpers cover the handful
//! of query shapes the sync engine issues.

/// Query for every note under a deck, including its subdecks.
pub fn deck_scope(root: &str) -> String {
    format!("deck:\"{}*\"", escape(root))
}

/// Query for notes under a deck carrying a specific tag.
pub fn deck_tag(root: &str, tag: &str) -> String {
    format!("deck:\"{}*\" tag:\"{}\"", escape(root), escape(tag))
}

fn escape(value: &str) -> String {
    value.replace('"', "\\\"")
}
