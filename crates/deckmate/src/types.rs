//! Wire types shared by the action groups.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A new note to be added to Anki.
///
/// Field values are HTML; field names are case-sensitive and must match the
/// model's field names exactly.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// The deck to add the note to.
    pub deck_name: String,
    /// The note type (model) name.
    pub model_name: String,
    /// Field values, keyed by field name.
    pub fields: HashMap<String, String>,
    /// Tags for the note.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Options for duplicate handling.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<NoteOptions>,
}

impl Note {
    /// Create a note with two fields named `Front` and `Back`.
    pub fn basic(
        deck: impl Into<String>,
        model: impl Into<String>,
        front: impl Into<String>,
        back: impl Into<String>,
    ) -> Self {
        let mut fields = HashMap::new();
        fields.insert("Front".to_string(), front.into());
        fields.insert("Back".to_string(), back.into());
        Self {
            deck_name: deck.into(),
            model_name: model.into(),
            fields,
            tags: Vec::new(),
            options: None,
        }
    }

    /// Set the note's tags.
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Allow AnkiConnect to create the note even when another note has the
    /// same first field.
    pub fn allow_duplicate(mut self) -> Self {
        self.options = Some(NoteOptions {
            allow_duplicate: Some(true),
        });
        self
    }
}

/// Options for adding notes.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteOptions {
    /// Allow duplicate notes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_duplicate: Option<bool>,
}

/// Information about an existing note, as returned by `notesInfo`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteInfo {
    /// The note ID.
    pub note_id: i64,
    /// The note type (model) name.
    pub model_name: String,
    /// Tags on the note.
    pub tags: Vec<String>,
    /// Field values and metadata.
    pub fields: HashMap<String, NoteField>,
    /// Card IDs generated from this note.
    #[serde(default)]
    pub cards: Vec<i64>,
}

impl NoteInfo {
    /// The value of a named field, if present.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(|f| f.value.as_str())
    }
}

/// A field value with its position in the note type.
#[derive(Debug, Clone, Deserialize)]
pub struct NoteField {
    /// The field value (HTML).
    pub value: String,
    /// The field's position in the note type.
    pub order: i32,
}

/// Parameters for `storeMediaFile`.
#[derive(Debug, Clone, Serialize)]
pub struct StoreMediaParams {
    /// Filename to save the media as.
    pub filename: String,
    /// Base64-encoded file contents.
    pub data: String,
}

impl StoreMediaParams {
    /// Store a file from base64-encoded bytes.
    pub fn from_base64(filename: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            data: data.into(),
        }
    }
}
