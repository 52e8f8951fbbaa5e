//! Deck reconciliation against a running Anki instance.
//!
//! The sync engine computes the minimal set of create/update/delete
//! operations that makes the remote deck match the local lessons, keyed by
//! the `uid:` identity tag embedded in each note's tag set. Notes are
//! updated in place so Anki's review history survives content edits, and
//! remote notes without a parseable identity tag are left alone entirely.
//!
//! A run is two stages: a pure [`SyncPlan`] built from desired and observed
//! state, then an ordered application (deletes, then creates, then updates)
//! in which every uid's operations are isolated. One rejected card cannot
//! abort the rest of the deck; failures land in the [`SyncReport`].

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use deckmate::{AnkiClient, Note, NoteInfo, StoreMediaParams, query};
use tracing::{debug, info, warn};

use crate::config::DeckConfig;
use crate::content::{Card, Lesson, identity_tag, is_chapter_tag, parse_identity_tag};
use crate::error::Result;
use crate::media::{asset_owner, encode_asset, media_references};

/// `notesInfo` batch size.
const NOTES_INFO_BATCH: usize = 100;

/// A previously synced card as observed in the remote store.
#[derive(Debug, Clone)]
pub struct RemoteCard {
    /// Remote note identifier.
    pub note_id: i64,
    /// The uid carried by the note's identity tag.
    pub uid: String,
    /// Current front field value.
    pub front: String,
    /// Current back field value.
    pub back: String,
    /// Full remote tag set, identity tag included.
    pub tags: Vec<String>,
}

impl RemoteCard {
    /// Build from a `notesInfo` entry. Returns `None` when the note carries
    /// no identity tag; such notes are not managed by this tool.
    pub fn from_info(info: &NoteInfo) -> Option<Self> {
        let uid = info.tags.iter().find_map(|t| parse_identity_tag(t))?;
        Some(Self {
            note_id: info.note_id,
            uid: uid.to_string(),
            front: info.field("Front").unwrap_or_default().to_string(),
            back: info.field("Back").unwrap_or_default().to_string(),
            tags: info.tags.clone(),
        })
    }
}

/// A planned update for one existing note.
#[derive(Debug, Clone)]
pub struct PlannedUpdate {
    /// The card's uid.
    pub uid: String,
    /// Remote note identifier.
    pub note_id: i64,
    /// New field values, when front or back changed.
    pub fields: Option<HashMap<String, String>>,
    /// Full replacement tag set, when the managed tags drifted.
    pub tags: Option<Vec<String>>,
}

/// A planned deletion of a remote note whose uid vanished locally.
#[derive(Debug, Clone)]
pub struct PlannedDelete {
    /// The stale uid.
    pub uid: String,
    /// Remote note identifier.
    pub note_id: i64,
}

/// The diff between desired and observed state.
#[derive(Debug, Clone, Default)]
pub struct SyncPlan {
    /// Uids present locally but not remotely, in loader order.
    pub creates: Vec<String>,
    /// Notes present on both sides whose content drifted, in loader order.
    pub updates: Vec<PlannedUpdate>,
    /// Remote notes whose uid vanished locally, sorted by uid.
    pub deletes: Vec<PlannedDelete>,
    /// Uids present on both sides with identical content.
    pub unchanged: Vec<String>,
}

impl SyncPlan {
    /// Classify every uid into exactly one of create/update/unchanged/delete.
    ///
    /// Content equality compares front, back, and the managed tag set;
    /// review history never participates.
    pub fn build(lessons: &[Lesson], remote: &[RemoteCard]) -> Self {
        let mut remote_map: HashMap<&str, &RemoteCard> =
            remote.iter().map(|r| (r.uid.as_str(), r)).collect();
        let mut plan = SyncPlan::default();

        for lesson in lessons {
            for card in &lesson.cards {
                let Some(observed) = remote_map.remove(card.uid.as_str()) else {
                    plan.creates.push(card.uid.clone());
                    continue;
                };
                let fields = diff_fields(card, observed);
                let tags = diff_tags(&desired_tags(card), &observed.tags, &card.uid);
                if fields.is_none() && tags.is_none() {
                    plan.unchanged.push(card.uid.clone());
                } else {
                    plan.updates.push(PlannedUpdate {
                        uid: card.uid.clone(),
                        note_id: observed.note_id,
                        fields,
                        tags,
                    });
                }
            }
        }

        plan.deletes = remote_map
            .into_values()
            .map(|r| PlannedDelete {
                uid: r.uid.clone(),
                note_id: r.note_id,
            })
            .collect();
        plan.deletes.sort_by(|a, b| a.uid.cmp(&b.uid));

        plan
    }

    /// True when applying the plan would perform no remote mutation.
    pub fn is_noop(&self) -> bool {
        self.creates.is_empty() && self.updates.is_empty() && self.deletes.is_empty()
    }
}

/// The full remote tag set a card should carry, identity tag first.
fn desired_tags(card: &Card) -> Vec<String> {
    let mut tags = Vec::with_capacity(card.tags.len() + 1);
    tags.push(identity_tag(&card.uid));
    tags.extend(card.tags.iter().cloned());
    tags
}

fn diff_fields(card: &Card, observed: &RemoteCard) -> Option<HashMap<String, String>> {
    if card.front == observed.front && card.back == observed.back {
        return None;
    }
    let mut fields = HashMap::new();
    fields.insert("Front".to_string(), card.front.clone());
    fields.insert("Back".to_string(), card.back.clone());
    Some(fields)
}

/// Compute the replacement tag set, or `None` when nothing drifted.
///
/// Only identity tags and chapter tags are exclusively managed by this
/// tool. Remote tags outside those patterns are preserved verbatim, so tags
/// a user added in Anki never trigger updates and are never stripped.
fn diff_tags(desired: &[String], remote: &[String], uid: &str) -> Option<Vec<String>> {
    let identity = identity_tag(uid);
    let stale = |tag: &str| {
        (parse_identity_tag(tag).is_some() && tag != identity)
            || (is_chapter_tag(tag) && !desired.iter().any(|d| d == tag))
    };

    let missing = desired.iter().any(|d| !remote.iter().any(|r| r == d));
    let has_stale = remote.iter().any(|r| stale(r));
    if !missing && !has_stale {
        return None;
    }

    let mut merged: Vec<String> = remote.iter().filter(|r| !stale(r)).cloned().collect();
    for tag in desired {
        if !merged.contains(tag) {
            merged.push(tag.clone());
        }
    }
    Some(merged)
}

/// Options for a sync run.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
    /// Compute and report the plan without mutating the remote store.
    pub dry_run: bool,
}

/// What a sync run did (or, under dry-run, would do).
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    /// Notes created.
    pub created: usize,
    /// Notes updated in place.
    pub updated: usize,
    /// Notes deleted.
    pub deleted: usize,
    /// Notes already matching the desired state.
    pub unchanged: usize,
    /// Per-uid operation failures; the run continued past each.
    pub failures: Vec<SyncFailure>,
    /// Referenced assets missing on disk; their cards synced without them.
    pub missing_assets: Vec<MissingAsset>,
    /// Whether this was a dry run.
    pub dry_run: bool,
}

impl SyncReport {
    fn fail(&mut self, uid: &str, operation: SyncOperation, error: impl fmt::Display) {
        warn!(uid, %operation, %error, "operation failed, continuing");
        self.failures.push(SyncFailure {
            uid: uid.to_string(),
            operation,
            error: error.to_string(),
        });
    }
}

/// A single failed remote operation.
#[derive(Debug, Clone)]
pub struct SyncFailure {
    /// The uid whose operation failed.
    pub uid: String,
    /// Which phase failed.
    pub operation: SyncOperation,
    /// The remote store's reason.
    pub error: String,
}

/// The phase a failure occurred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOperation {
    Create,
    Update,
    Delete,
    Media,
}

impl fmt::Display for SyncOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncOperation::Create => write!(f, "create"),
            SyncOperation::Update => write!(f, "update"),
            SyncOperation::Delete => write!(f, "delete"),
            SyncOperation::Media => write!(f, "media"),
        }
    }
}

/// A media reference whose local file is gone.
#[derive(Debug, Clone)]
pub struct MissingAsset {
    /// The referencing card's uid.
    pub uid: String,
    /// The referenced filename.
    pub filename: String,
}

/// Reconciles local lessons into the remote deck.
#[derive(Debug)]
pub struct SyncEngine<'a> {
    client: &'a AnkiClient,
    config: &'a DeckConfig,
    media_dir: PathBuf,
}

impl<'a> SyncEngine<'a> {
    /// Create a sync engine for one content directory.
    pub fn new(client: &'a AnkiClient, config: &'a DeckConfig, content_dir: &Path) -> Self {
        Self {
            client,
            config,
            media_dir: content_dir.join(&config.media_dir),
        }
    }

    /// Run a full reconciliation.
    ///
    /// Connectivity is probed before anything else; an unreachable Anki
    /// aborts with zero mutations. Running twice over unchanged content
    /// performs zero mutations on the second run.
    pub async fn sync(&self, lessons: &[Lesson], options: SyncOptions) -> Result<SyncReport> {
        self.client.misc().version().await?;

        let remote = self.fetch_remote().await?;
        let plan = SyncPlan::build(lessons, &remote);
        info!(
            creates = plan.creates.len(),
            updates = plan.updates.len(),
            deletes = plan.deletes.len(),
            unchanged = plan.unchanged.len(),
            dry_run = options.dry_run,
            "computed sync plan"
        );

        let mut report = SyncReport {
            unchanged: plan.unchanged.len(),
            dry_run: options.dry_run,
            ..Default::default()
        };

        if options.dry_run {
            report.created = plan.creates.len();
            report.updated = plan.updates.len();
            report.deleted = plan.deletes.len();
            return Ok(report);
        }

        let index: HashMap<&str, (&Lesson, &Card)> = lessons
            .iter()
            .flat_map(|l| l.cards.iter().map(move |c| (c.uid.as_str(), (l, c))))
            .collect();

        // Deletions first: stale cards and their now-orphaned media.
        for del in &plan.deletes {
            match self.client.notes().delete(&[del.note_id]).await {
                Ok(()) => {
                    debug!(uid = %del.uid, note_id = del.note_id, "deleted note");
                    report.deleted += 1;
                    self.remove_remote_media(&del.uid, &mut report).await;
                }
                Err(e) => report.fail(&del.uid, SyncOperation::Delete, e),
            }
        }

        self.ensure_subdecks(&plan, &index).await?;

        for uid in &plan.creates {
            let (lesson, card) = index[uid.as_str()];
            let note = Note::basic(
                self.config.subdeck(lesson),
                &self.config.model,
                &card.front,
                &card.back,
            )
            .with_tags(desired_tags(card))
            .allow_duplicate();
            match self.client.notes().add(note).await {
                Ok(note_id) => {
                    debug!(uid, note_id, "created note");
                    report.created += 1;
                    self.sync_card_media(uid, card, &mut report).await;
                }
                Err(e) => report.fail(uid, SyncOperation::Create, e),
            }
        }

        for up in &plan.updates {
            let (_, card) = index[up.uid.as_str()];
            let mut failed = false;
            if let Some(fields) = &up.fields {
                if let Err(e) = self.client.notes().update_fields(up.note_id, fields).await {
                    report.fail(&up.uid, SyncOperation::Update, e);
                    failed = true;
                }
            }
            if !failed {
                if let Some(tags) = &up.tags {
                    if let Err(e) = self.client.notes().set_tags(up.note_id, tags).await {
                        report.fail(&up.uid, SyncOperation::Update, e);
                        failed = true;
                    }
                }
            }
            if !failed {
                debug!(uid = %up.uid, note_id = up.note_id, "updated note");
                report.updated += 1;
                self.sync_card_media(&up.uid, card, &mut report).await;
            }
        }

        Ok(report)
    }

    /// Query the remote store for every managed note under the root deck.
    async fn fetch_remote(&self) -> Result<Vec<RemoteCard>> {
        let scope = query::deck_scope(&self.config.deck);
        let note_ids = self.client.notes().find(&scope).await?;
        debug!(count = note_ids.len(), "found remote notes");

        let mut remote = Vec::with_capacity(note_ids.len());
        for chunk in note_ids.chunks(NOTES_INFO_BATCH) {
            for info in self.client.notes().info(chunk).await? {
                match RemoteCard::from_info(&info) {
                    Some(card) => remote.push(card),
                    None => debug!(note_id = info.note_id, "note has no identity tag, ignoring"),
                }
            }
        }
        Ok(remote)
    }

    /// Create any missing subdecks targeted by creates or updates.
    ///
    /// Deck names are listed once; creating an already existing subdeck is
    /// avoided rather than relied on being a remote no-op.
    async fn ensure_subdecks(
        &self,
        plan: &SyncPlan,
        index: &HashMap<&str, (&Lesson, &Card)>,
    ) -> Result<()> {
        let targeted: BTreeSet<String> = plan
            .creates
            .iter()
            .map(String::as_str)
            .chain(plan.updates.iter().map(|u| u.uid.as_str()))
            .map(|uid| self.config.subdeck(index[uid].0))
            .collect();
        if targeted.is_empty() {
            return Ok(());
        }

        let existing = self.client.decks().names().await?;
        for name in targeted {
            if !existing.contains(&name) {
                info!(deck = %name, "creating subdeck");
                self.client.decks().create(&name).await?;
            }
        }
        Ok(())
    }

    /// Reconcile one card's remote media against the filenames its text
    /// references. Diffing is by filename only.
    async fn sync_card_media(&self, uid: &str, card: &Card, report: &mut SyncReport) {
        let mut referenced: Vec<String> = Vec::new();
        for filename in media_references(&card.front)
            .into_iter()
            .chain(media_references(&card.back))
        {
            match asset_owner(&filename, &self.config.uid_prefix) {
                Some(owner) if owner == uid => {
                    if !referenced.contains(&filename) {
                        referenced.push(filename);
                    }
                }
                _ => warn!(uid, filename, "referenced file is outside the asset convention"),
            }
        }

        let attached = match self.client.media().list(&format!("{}_*", uid)).await {
            Ok(files) => files,
            Err(e) => {
                report.fail(uid, SyncOperation::Media, e);
                return;
            }
        };

        for filename in &referenced {
            if attached.contains(filename) {
                continue;
            }
            let path = self.media_dir.join(filename);
            match encode_asset(&path) {
                Ok(data) => {
                    let params = StoreMediaParams::from_base64(filename.clone(), data);
                    if let Err(e) = self.client.media().store(params).await {
                        report.fail(uid, SyncOperation::Media, e);
                    } else {
                        debug!(uid, filename, "uploaded asset");
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    warn!(uid, filename, "referenced asset missing on disk");
                    report.missing_assets.push(MissingAsset {
                        uid: uid.to_string(),
                        filename: filename.clone(),
                    });
                }
                Err(e) => report.fail(uid, SyncOperation::Media, e),
            }
        }

        for filename in &attached {
            if !referenced.contains(filename) {
                if let Err(e) = self.client.media().delete(filename).await {
                    report.fail(uid, SyncOperation::Media, e);
                } else {
                    debug!(uid, filename, "removed stale asset");
                }
            }
        }
    }

    /// Remove every remote asset owned by a deleted uid.
    async fn remove_remote_media(&self, uid: &str, report: &mut SyncReport) {
        let files = match self.client.media().list(&format!("{}_*", uid)).await {
            Ok(files) => files,
            Err(e) => {
                report.fail(uid, SyncOperation::Media, e);
                return;
            }
        };
        for filename in files {
            if let Err(e) = self.client.media().delete(&filename).await {
                report.fail(uid, SyncOperation::Media, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn lesson(id: u32, cards: Vec<Card>) -> Lesson {
        Lesson::new(
            id,
            format!("Lesson {:02}", id),
            Vec::new(),
            cards,
            PathBuf::from(format!("lesson_{:02}.json", id)),
        )
    }

    fn card(uid: &str, front: &str, back: &str, tags: &[&str]) -> Card {
        Card {
            uid: uid.to_string(),
            front: front.to_string(),
            back: back.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn remote(note_id: i64, uid: &str, front: &str, back: &str, tags: &[&str]) -> RemoteCard {
        RemoteCard {
            note_id,
            uid: uid.to_string(),
            front: front.to_string(),
            back: back.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[test]
    fn new_card_is_planned_as_create() {
        let lessons = vec![lesson(1, vec![card("01-001", "q", "a", &["ch01", "math"])])];
        let plan = SyncPlan::build(&lessons, &[]);
        assert_eq!(plan.creates, vec!["01-001"]);
        assert!(plan.updates.is_empty());
        assert!(plan.deletes.is_empty());
        assert!(plan.unchanged.is_empty());
    }

    #[test]
    fn identical_card_is_unchanged() {
        let lessons = vec![lesson(1, vec![card("01-001", "q", "a", &["ch01", "math"])])];
        let observed = vec![remote(
            9,
            "01-001",
            "q",
            "a",
            &["uid:01-001", "ch01", "math"],
        )];
        let plan = SyncPlan::build(&lessons, &observed);
        assert!(plan.is_noop());
        assert_eq!(plan.unchanged, vec!["01-001"]);
    }

    #[test]
    fn changed_back_is_planned_as_field_update() {
        let lessons = vec![lesson(1, vec![card("01-001", "q", "a2", &["ch01", "math"])])];
        let observed = vec![remote(
            9,
            "01-001",
            "q",
            "a1",
            &["uid:01-001", "ch01", "math"],
        )];
        let plan = SyncPlan::build(&lessons, &observed);
        assert_eq!(plan.updates.len(), 1);
        let up = &plan.updates[0];
        assert_eq!(up.note_id, 9);
        assert_eq!(up.fields.as_ref().unwrap()["Back"], "a2");
        assert!(up.tags.is_none());
    }

    #[test]
    fn tag_drift_is_planned_as_tags_only_update() {
        let lessons = vec![lesson(1, vec![card("01-001", "q", "a", &["ch01", "math"])])];
        // remote is missing the topic tag
        let observed = vec![remote(9, "01-001", "q", "a", &["uid:01-001", "ch01"])];
        let plan = SyncPlan::build(&lessons, &observed);
        assert_eq!(plan.updates.len(), 1);
        let up = &plan.updates[0];
        assert!(up.fields.is_none());
        let tags = up.tags.as_ref().unwrap();
        assert!(tags.contains(&"math".to_string()));
        assert!(tags.contains(&"uid:01-001".to_string()));
    }

    #[test]
    fn unrelated_remote_tags_are_preserved_and_do_not_trigger_updates() {
        let lessons = vec![lesson(1, vec![card("01-001", "q", "a", &["ch01", "math"])])];
        // a tag the user added in Anki
        let observed = vec![remote(
            9,
            "01-001",
            "q",
            "a",
            &["uid:01-001", "ch01", "math", "marked"],
        )];
        let plan = SyncPlan::build(&lessons, &observed);
        assert!(plan.is_noop());
    }

    #[test]
    fn stale_chapter_tag_is_replaced_but_user_tags_survive() {
        let lessons = vec![lesson(2, vec![card("02-001", "q", "a", &["ch02", "math"])])];
        let observed = vec![remote(
            9,
            "02-001",
            "q",
            "a",
            &["uid:02-001", "ch01", "math", "marked"],
        )];
        let plan = SyncPlan::build(&lessons, &observed);
        let tags = plan.updates[0].tags.as_ref().unwrap();
        assert!(!tags.contains(&"ch01".to_string()));
        assert!(tags.contains(&"ch02".to_string()));
        assert!(tags.contains(&"marked".to_string()));
    }

    #[test]
    fn vanished_uid_is_planned_as_delete() {
        let lessons = vec![lesson(1, vec![card("01-001", "q", "a", &["ch01", "math"])])];
        let observed = vec![
            remote(9, "01-001", "q", "a", &["uid:01-001", "ch01", "math"]),
            remote(10, "01-002", "q2", "a2", &["uid:01-002", "ch01"]),
        ];
        let plan = SyncPlan::build(&lessons, &observed);
        assert_eq!(plan.deletes.len(), 1);
        assert_eq!(plan.deletes[0].uid, "01-002");
        assert_eq!(plan.deletes[0].note_id, 10);
        assert_eq!(plan.unchanged, vec!["01-001"]);
    }

    #[test]
    fn deletes_are_sorted_by_uid() {
        let observed = vec![
            remote(2, "02-001", "q", "a", &["uid:02-001"]),
            remote(1, "01-001", "q", "a", &["uid:01-001"]),
        ];
        let plan = SyncPlan::build(&[], &observed);
        let uids: Vec<&str> = plan.deletes.iter().map(|d| d.uid.as_str()).collect();
        assert_eq!(uids, vec!["01-001", "02-001"]);
    }

    #[test]
    fn creates_follow_loader_order() {
        let lessons = vec![
            lesson(
                1,
                vec![
                    card("01-002", "q", "a", &["ch01"]),
                    card("01-001", "q", "a", &["ch01"]),
                ],
            ),
            lesson(2, vec![card("02-001", "q", "a", &["ch02"])]),
        ];
        let plan = SyncPlan::build(&lessons, &[]);
        assert_eq!(plan.creates, vec!["01-002", "01-001", "02-001"]);
    }
}
