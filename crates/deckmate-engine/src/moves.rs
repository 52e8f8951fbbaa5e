//! Relocating a card from one lesson to another.
//!
//! A move rewrites both lesson files and re-tags the remote note in place:
//! the card gets the next free number in the destination lesson, its uid and
//! chapter tags are swapped, and its Anki cards are moved to the destination
//! subdeck. Review history is preserved because the note itself is never
//! deleted.
//!
//! The remote half is best effort: if the note cannot be found or Anki is
//! unreachable, the files are still rewritten and a later sync run
//! reconciles the remote store.

use std::path::Path;

use deckmate::{AnkiClient, query};
use tracing::{info, warn};

use crate::config::DeckConfig;
use crate::content::{chapter_tag, identity_tag, load_lessons, make_uid, parse_uid, Lesson};
use crate::error::{Error, Result};

/// Moves cards between lessons.
#[derive(Debug)]
pub struct MoveEngine<'a> {
    client: &'a AnkiClient,
    config: &'a DeckConfig,
}

/// What a move did (or, under dry-run, would do).
#[derive(Debug, Clone)]
pub struct MoveOutcome {
    /// The card's uid before the move.
    pub old_uid: String,
    /// The uid assigned in the destination lesson.
    pub new_uid: String,
    /// The destination subdeck.
    pub deck: String,
    /// The card's front text, for display.
    pub front: String,
    /// Whether the remote note was found and re-tagged.
    pub remote_updated: bool,
    /// Remote error, when the Anki update failed after the files were saved.
    pub remote_error: Option<String>,
    /// Whether this was a dry run.
    pub dry_run: bool,
}

impl<'a> MoveEngine<'a> {
    /// Create a move engine.
    pub fn new(client: &'a AnkiClient, config: &'a DeckConfig) -> Self {
        Self { client, config }
    }

    /// Move a card to another lesson.
    pub async fn move_card(
        &self,
        content_dir: &Path,
        uid: &str,
        dest_lesson: u32,
        dry_run: bool,
    ) -> Result<MoveOutcome> {
        let prefix = &self.config.uid_prefix;
        let Some((src_lesson, _)) = parse_uid(uid, prefix) else {
            return Err(Error::Validation(format!("invalid uid format: {}", uid)));
        };
        if src_lesson == dest_lesson {
            return Err(Error::Validation(format!(
                "card {} is already in lesson {:02}",
                uid, dest_lesson
            )));
        }

        let mut lessons = load_lessons(content_dir, self.config)?;

        let mut located = None;
        for (li, lesson) in lessons.iter().enumerate() {
            if let Some(ci) = lesson.cards.iter().position(|c| c.uid == uid) {
                located = Some((li, ci));
                break;
            }
        }
        let (src_idx, card_idx) = located.ok_or_else(|| Error::CardNotFound(uid.to_string()))?;
        let dest_idx = lessons
            .iter()
            .position(|l| l.id == dest_lesson)
            .ok_or(Error::LessonNotFound(dest_lesson))?;

        let new_uid = make_uid(prefix, dest_lesson, next_card_number(&lessons[dest_idx], prefix));
        let deck = self.config.subdeck(&lessons[dest_idx]);
        let old_chapter = chapter_tag(src_lesson);
        let new_chapter = chapter_tag(dest_lesson);
        let front = lessons[src_idx].cards[card_idx].front.clone();

        info!(%uid, %new_uid, %deck, dry_run, "moving card");

        if dry_run {
            return Ok(MoveOutcome {
                old_uid: uid.to_string(),
                new_uid,
                deck,
                front,
                remote_updated: false,
                remote_error: None,
                dry_run: true,
            });
        }

        let mut card = lessons[src_idx].cards.remove(card_idx);
        card.uid = new_uid.clone();
        card.tags.retain(|t| t != &old_chapter);
        if !card.tags.iter().any(|t| t == &new_chapter) {
            // chapter tag comes first by convention
            card.tags.insert(0, new_chapter.clone());
        }
        lessons[dest_idx].cards.push(card);

        lessons[src_idx].save()?;
        lessons[dest_idx].save()?;

        let mut remote_updated = false;
        let mut remote_error = None;
        match self
            .update_remote(uid, &new_uid, &old_chapter, &new_chapter, &deck)
            .await
        {
            Ok(true) => remote_updated = true,
            Ok(false) => warn!(%uid, "note not found in Anki, run sync to reconcile"),
            Err(e) => {
                warn!(%uid, error = %e, "could not update Anki, run sync to reconcile");
                remote_error = Some(e.to_string());
            }
        }

        Ok(MoveOutcome {
            old_uid: uid.to_string(),
            new_uid,
            deck,
            front,
            remote_updated,
            remote_error,
            dry_run: false,
        })
    }

    /// Swap the uid and chapter tags on the remote note and move its cards
    /// to the destination subdeck. Returns `false` when the note is absent.
    async fn update_remote(
        &self,
        old_uid: &str,
        new_uid: &str,
        old_chapter: &str,
        new_chapter: &str,
        deck: &str,
    ) -> Result<bool> {
        let q = query::deck_tag(&self.config.deck, &identity_tag(old_uid));
        let ids = self.client.notes().find(&q).await?;
        let Some(&note_id) = ids.first() else {
            return Ok(false);
        };

        let infos = self.client.notes().info(&[note_id]).await?;
        let cards: Vec<i64> = infos.first().map(|i| i.cards.clone()).unwrap_or_default();

        let notes = [note_id];
        self.client
            .notes()
            .remove_tags(&notes, &identity_tag(old_uid))
            .await?;
        self.client
            .notes()
            .add_tags(&notes, &identity_tag(new_uid))
            .await?;
        self.client.notes().remove_tags(&notes, old_chapter).await?;
        self.client.notes().add_tags(&notes, new_chapter).await?;

        if !cards.is_empty() {
            self.client.decks().move_cards(&cards, deck).await?;
        }
        Ok(true)
    }
}

/// The next free card number in a lesson.
fn next_card_number(lesson: &Lesson, prefix: &str) -> u32 {
    lesson
        .cards
        .iter()
        .filter_map(|c| parse_uid(&c.uid, prefix))
        .map(|(_, card)| card)
        .max()
        .unwrap_or(0)
        + 1
}
