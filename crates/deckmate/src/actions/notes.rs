//! Note-related AnkiConnect actions.

use std::collections::HashMap;

use serde::Serialize;

use crate::client::AnkiClient;
use crate::error::Result;
use crate::types::{Note, NoteInfo};

/// Provides access to note-related AnkiConnect operations.
///
/// Obtained via [`AnkiClient::notes()`].
#[derive(Debug)]
pub struct NoteActions<'a> {
    pub(crate) client: &'a AnkiClient,
}

#[derive(Serialize)]
struct AddNoteParams {
    note: Note,
}

#[derive(Serialize)]
struct FindNotesParams<'a> {
    query: &'a str,
}

#[derive(Serialize)]
struct NotesParams<'a> {
    notes: &'a [i64],
}

#[derive(Serialize)]
struct UpdateNoteFieldsParams<'a> {
    note: UpdateNoteFieldsInner<'a>,
}

#[derive(Serialize)]
struct UpdateNoteFieldsInner<'a> {
    id: i64,
    fields: &'a HashMap<String, String>,
}

#[derive(Serialize)]
struct UpdateNoteTagsParams<'a> {
    note: i64,
    tags: &'a [String],
}

#[derive(Serialize)]
struct TagsParams<'a> {
    notes: &'a [i64],
    tags: &'a str,
}

impl<'a> NoteActions<'a> {
    /// Find notes matching an Anki search query.
    ///
    /// Returns note IDs; use [`info()`](Self::info) for full details.
    /// See [`crate::query`] for building query strings.
    pub async fn find(&self, query: &str) -> Result<Vec<i64>> {
        self.client
            .invoke("findNotes", FindNotesParams { query })
            .await
    }

    /// Get field values, tags, and generated card IDs for notes.
    pub async fn info(&self, note_ids: &[i64]) -> Result<Vec<NoteInfo>> {
        self.client
            .invoke("notesInfo", NotesParams { notes: note_ids })
            .await
    }

    /// Add a new note. Returns the ID of the created note.
    pub async fn add(&self, note: Note) -> Result<i64> {
        self.client.invoke("addNote", AddNoteParams { note }).await
    }

    /// Delete notes and all cards generated from them.
    pub async fn delete(&self, note_ids: &[i64]) -> Result<()> {
        self.client
            .invoke_void("deleteNotes", NotesParams { notes: note_ids })
            .await
    }

    /// Update a note's field values.
    ///
    /// Only the fields present in the map are touched; tags and scheduling
    /// state are left alone.
    pub async fn update_fields(
        &self,
        note_id: i64,
        fields: &HashMap<String, String>,
    ) -> Result<()> {
        self.client
            .invoke_void(
                "updateNoteFields",
                UpdateNoteFieldsParams {
                    note: UpdateNoteFieldsInner {
                        id: note_id,
                        fields,
                    },
                },
            )
            .await
    }

    /// Replace all tags on a note atomically.
    pub async fn set_tags(&self, note_id: i64, tags: &[String]) -> Result<()> {
        self.client
            .invoke_void(
                "updateNoteTags",
                UpdateNoteTagsParams {
                    note: note_id,
                    tags,
                },
            )
            .await
    }

    /// Add tags to notes. Tags are space-separated.
    pub async fn add_tags(&self, note_ids: &[i64], tags: &str) -> Result<()> {
        self.client
            .invoke_void(
                "addTags",
                TagsParams {
                    notes: note_ids,
                    tags,
                },
            )
            .await
    }

    /// Remove tags from notes. Tags are space-separated.
    pub async fn remove_tags(&self, note_ids: &[i64], tags: &str) -> Result<()> {
        self.client
            .invoke_void(
                "removeTags",
                TagsParams {
                    notes: note_ids,
                    tags,
                },
            )
            .await
    }
}
