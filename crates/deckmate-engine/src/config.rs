//! Per-deck configuration.
//!
//! Each content directory carries a `config.json` naming the root deck and
//! the conventions used to derive uids and subdeck names.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::content::Lesson;
use crate::error::{Error, Result};

/// Configuration for one deck's content directory.
///
/// ```json
/// {
///   "deck": "Deep Learning",
///   "uid_prefix": "dl",
///   "model": "Basic"
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct DeckConfig {
    /// Root deck name in Anki. Lessons become subdecks underneath it.
    pub deck: String,
    /// Optional prefix embedded in every uid (`<prefix>-<NN>-<NNN>`).
    /// With an empty prefix uids are plain `<NN>-<NNN>`.
    #[serde(default)]
    pub uid_prefix: String,
    /// Note type used for all cards.
    #[serde(default = "default_model")]
    pub model: String,
    /// Media directory, relative to the content directory.
    #[serde(default = "default_media_dir")]
    pub media_dir: String,
}

fn default_model() -> String {
    "Basic".to_string()
}

fn default_media_dir() -> String {
    "media".to_string()
}

impl DeckConfig {
    /// Load `config.json` from a content directory.
    pub fn load(content_dir: &Path) -> Result<Self> {
        let path = content_dir.join("config.json");
        let raw = fs::read_to_string(&path)?;
        let config: DeckConfig = serde_json::from_str(&raw)
            .map_err(|e| Error::Validation(format!("{}: {}", path.display(), e)))?;
        if config.deck.trim().is_empty() {
            return Err(Error::Validation(format!(
                "{}: deck name must not be empty",
                path.display()
            )));
        }
        Ok(config)
    }

    /// The Anki subdeck a lesson's cards live in.
    pub fn subdeck(&self, lesson: &Lesson) -> String {
        format!("{}::{}", self.deck, lesson.title)
    }
}
