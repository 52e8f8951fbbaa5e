//! Lesson content loading and validation.
//!
//! A content directory holds one JSON file per lesson (`lesson_01.json`,
//! `lesson_02.json`, ...), each an ordered list of cards. Loading is a pure
//! read: files are parsed fresh on every run and validated up front so the
//! sync engine never sees a malformed card.
//!
//! Uids follow the `[<prefix>-]<NN>-<NNN>` convention, where the optional
//! prefix comes from [`DeckConfig::uid_prefix`](crate::DeckConfig). The uid
//! is the card's stable identity: it is never regenerated once assigned.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::DeckConfig;
use crate::error::{Error, Result};

/// A single flashcard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Card {
    /// Stable identity key, `[<prefix>-]<NN>-<NNN>`.
    pub uid: String,
    /// Question side (HTML, may embed math markup and media references).
    pub front: String,
    /// Answer side.
    pub back: String,
    /// Chapter tag (`ch<NN>`) plus free-form topic tags.
    #[serde(default)]
    pub tags: Vec<String>,
}

/// The on-disk shape of a lesson file.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct LessonFile {
    title: String,
    #[serde(default)]
    objectives: Vec<String>,
    #[serde(default)]
    cards: Vec<Card>,
}

/// A named, ordered group of cards, read from one lesson file.
#[derive(Debug, Clone)]
pub struct Lesson {
    /// Two-digit lesson number, taken from the filename.
    pub id: u32,
    /// Display title; embeds the lesson number for sort order.
    pub title: String,
    /// Descriptive objectives; not used by the sync logic.
    pub objectives: Vec<String>,
    /// Cards in file order.
    pub cards: Vec<Card>,
    path: PathBuf,
}

impl Lesson {
    pub(crate) fn new(
        id: u32,
        title: String,
        objectives: Vec<String>,
        cards: Vec<Card>,
        path: PathBuf,
    ) -> Self {
        Self {
            id,
            title,
            objectives,
            cards,
            path,
        }
    }

    /// Path of the lesson file this was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the lesson back to its file (pretty JSON, trailing newline).
    pub fn save(&self) -> Result<()> {
        let file = LessonFile {
            title: self.title.clone(),
            objectives: self.objectives.clone(),
            cards: self.cards.clone(),
        };
        let mut out = serde_json::to_string_pretty(&file)
            .map_err(|e| Error::Validation(format!("{}: {}", self.path.display(), e)))?;
        out.push('\n');
        fs::write(&self.path, out)?;
        Ok(())
    }
}

/// Build a uid from its parts.
pub fn make_uid(prefix: &str, lesson: u32, card: u32) -> String {
    if prefix.is_empty() {
        format!("{:02}-{:03}", lesson, card)
    } else {
        format!("{}-{:02}-{:03}", prefix, lesson, card)
    }
}

/// Parse a uid into `(lesson, card)` numbers, checking the prefix.
pub fn parse_uid(uid: &str, prefix: &str) -> Option<(u32, u32)> {
    let rest = if prefix.is_empty() {
        uid
    } else {
        uid.strip_prefix(prefix)?.strip_prefix('-')?
    };
    let (lesson, card) = rest.split_once('-')?;
    if lesson.len() != 2 || card.len() != 3 {
        return None;
    }
    if !lesson.bytes().all(|b| b.is_ascii_digit()) || !card.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((lesson.parse().ok()?, card.parse().ok()?))
}

/// The chapter tag for a lesson number.
pub fn chapter_tag(lesson: u32) -> String {
    format!("ch{:02}", lesson)
}

/// True for tags matching the managed chapter pattern `ch<NN>`.
pub fn is_chapter_tag(tag: &str) -> bool {
    tag.len() == 4
        && tag.starts_with("ch")
        && tag.as_bytes()[2..].iter().all(|b| b.is_ascii_digit())
}

/// The identity tag carried by a remote note for a given uid.
pub fn identity_tag(uid: &str) -> String {
    format!("uid:{}", uid)
}

/// Extract the uid from an identity tag, if it is one.
pub fn parse_identity_tag(tag: &str) -> Option<&str> {
    tag.strip_prefix("uid:")
}

/// Load and validate every lesson in a content directory.
///
/// Returns lessons sorted by numeric id, cards in file order. Fails with
/// [`Error::Validation`] on the first malformed file, missing required
/// field, uid/lesson mismatch, missing chapter tag, or uid duplicated
/// anywhere in the set.
pub fn load_lessons(content_dir: &Path, config: &DeckConfig) -> Result<Vec<Lesson>> {
    let mut lessons = Vec::new();

    for entry in fs::read_dir(content_dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(id) = lesson_file_id(&name.to_string_lossy()) else {
            continue;
        };
        let path = entry.path();
        let raw = fs::read_to_string(&path)?;
        let file: LessonFile = serde_json::from_str(&raw)
            .map_err(|e| Error::Validation(format!("{}: {}", path.display(), e)))?;
        if file.title.trim().is_empty() {
            return Err(Error::Validation(format!(
                "{}: lesson title must not be empty",
                path.display()
            )));
        }
        lessons.push(Lesson::new(
            id,
            file.title,
            file.objectives,
            file.cards,
            path,
        ));
    }

    lessons.sort_by_key(|l| l.id);

    let mut seen: HashSet<String> = HashSet::new();
    for lesson in &lessons {
        for card in &lesson.cards {
            validate_card(card, lesson, config)?;
            if !seen.insert(card.uid.clone()) {
                return Err(Error::Validation(format!(
                    "duplicate uid {} in {}",
                    card.uid,
                    lesson.path.display()
                )));
            }
        }
    }

    Ok(lessons)
}

/// Parse `lesson_NN.json` filenames; anything else is not a lesson file.
fn lesson_file_id(name: &str) -> Option<u32> {
    let digits = name.strip_prefix("lesson_")?.strip_suffix(".json")?;
    if digits.len() != 2 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

fn validate_card(card: &Card, lesson: &Lesson, config: &DeckConfig) -> Result<()> {
    let where_ = |what: &str| {
        Error::Validation(format!(
            "{}: card {}: {}",
            lesson.path.display(),
            if card.uid.is_empty() {
                "<no uid>"
            } else {
                card.uid.as_str()
            },
            what
        ))
    };

    let Some((uid_lesson, _)) = parse_uid(&card.uid, &config.uid_prefix) else {
        return Err(where_("uid does not match the expected format"));
    };
    if uid_lesson != lesson.id {
        return Err(where_("uid lesson number does not match the lesson file"));
    }
    if card.front.trim().is_empty() {
        return Err(where_("front must not be empty"));
    }
    if card.back.trim().is_empty() {
        return Err(where_("back must not be empty"));
    }
    if card.tags.is_empty() {
        return Err(where_("tags must not be empty"));
    }
    let chapter = chapter_tag(lesson.id);
    if !card.tags.iter().any(|t| t == &chapter) {
        return Err(where_(&format!("missing chapter tag {}", chapter)));
    }
    Ok(())
}
