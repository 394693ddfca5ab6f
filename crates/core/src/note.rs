//! Personal notes with bidirectional links and version history.
//!
//! Links are a plain adjacency list stored on each note: linking A and B
//! records B in A's `links` and A in B's `links`. Only direct neighbors are
//! ever looked up. Deleting a note does not touch the links other notes
//! hold to it; [`neighbors`] reports those as [`Reference::Dangling`].

use serde::{Deserialize, Serialize};

use crate::entity::{self, Entity, Reference};
use crate::error::CoreError;
use crate::types::{EntityId, Timestamp};
use crate::validation::{normalize_tags, validate_name, validate_tags, validate_text};

/// Number of previous revisions kept per note.
pub const MAX_VERSIONS: usize = 50;

/// A snapshot of a note's text before an edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteVersion {
    pub title: String,
    pub body: String,
    pub saved_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: EntityId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default)]
    pub links: Vec<EntityId>,
    /// Oldest first.
    #[serde(default)]
    pub versions: Vec<NoteVersion>,
}

impl Entity for Note {
    const KIND: &'static str = "Note";

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> Timestamp {
        self.created_at
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNote {
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNote {
    pub title: Option<String>,
    pub body: Option<String>,
    pub tags: Option<Vec<String>>,
    pub pinned: Option<bool>,
}

pub fn validate_create_note(input: &CreateNote) -> Result<(), CoreError> {
    validate_name("Note title", &input.title)?;
    validate_text("Note body", &input.body)?;
    validate_tags(&input.tags)
}

pub fn validate_update_note(input: &UpdateNote) -> Result<(), CoreError> {
    if let Some(title) = &input.title {
        validate_name("Note title", title)?;
    }
    if let Some(body) = &input.body {
        validate_text("Note body", body)?;
    }
    if let Some(tags) = &input.tags {
        validate_tags(tags)?;
    }
    Ok(())
}

impl Note {
    pub fn from_create(id: EntityId, now: Timestamp, input: CreateNote) -> Self {
        Self {
            id,
            created_at: now,
            updated_at: now,
            title: input.title.trim().to_string(),
            body: input.body,
            tags: normalize_tags(&input.tags),
            pinned: false,
            links: Vec::new(),
            versions: Vec::new(),
        }
    }

    /// Apply an edit. A snapshot is recorded only when the text changes.
    pub fn edit(&mut self, input: UpdateNote, now: Timestamp) {
        let new_title = input.title.map(|t| t.trim().to_string());
        let title_changed = new_title.as_ref().is_some_and(|t| *t != self.title);
        let body_changed = input.body.as_ref().is_some_and(|b| *b != self.body);

        if title_changed || body_changed {
            self.snapshot();
        }
        if let Some(title) = new_title {
            self.title = title;
        }
        if let Some(body) = input.body {
            self.body = body;
        }
        if let Some(tags) = input.tags {
            self.tags = normalize_tags(&tags);
        }
        if let Some(pinned) = input.pinned {
            self.pinned = pinned;
        }
        self.updated_at = now;
    }

    /// Restore the text of a previous version. The current text is itself
    /// kept as a new version, so a restore can be undone.
    pub fn restore_version(&mut self, index: usize, now: Timestamp) -> Result<(), CoreError> {
        let version = self.versions.get(index).cloned().ok_or_else(|| {
            CoreError::Validation(format!(
                "Version {index} does not exist (note has {} versions)",
                self.versions.len()
            ))
        })?;
        self.snapshot();
        self.title = version.title;
        self.body = version.body;
        self.updated_at = now;
        Ok(())
    }

    fn snapshot(&mut self) {
        self.versions.push(NoteVersion {
            title: self.title.clone(),
            body: self.body.clone(),
            saved_at: self.updated_at,
        });
        if self.versions.len() > MAX_VERSIONS {
            let excess = self.versions.len() - MAX_VERSIONS;
            self.versions.drain(..excess);
        }
    }

    fn add_link(&mut self, other: &str) {
        if !self.links.iter().any(|l| l == other) {
            self.links.push(other.to_string());
        }
    }
}

// ---------------------------------------------------------------------------
// Graph operations
// ---------------------------------------------------------------------------

/// Link two existing notes in both directions. Linking twice is a no-op.
pub fn link(notes: &mut [Note], a: &str, b: &str) -> Result<(), CoreError> {
    if a == b {
        return Err(CoreError::Validation("A note cannot link to itself".into()));
    }
    for id in [a, b] {
        if entity::find(notes, id).is_none() {
            return Err(CoreError::NotFound {
                entity: Note::KIND,
                id: id.to_string(),
            });
        }
    }
    entity::update(notes, a, |n| n.add_link(b))?;
    entity::update(notes, b, |n| n.add_link(a))
}

/// Remove a link in both directions.
///
/// The far side may already be deleted; removing the near side still
/// succeeds so dangling links can be cleaned up by hand.
pub fn unlink(notes: &mut [Note], a: &str, b: &str) -> Result<(), CoreError> {
    entity::update(notes, a, |n| n.links.retain(|l| l != b))?;
    if entity::find(notes, b).is_some() {
        entity::update(notes, b, |n| n.links.retain(|l| l != a))?;
    }
    Ok(())
}

/// Direct neighbors of a note, in link order, with missing notes reported
/// as dangling. An unknown `id` yields an empty list.
pub fn neighbors<'a>(notes: &'a [Note], id: &str) -> Vec<Reference<'a, Note>> {
    let Some(note) = entity::find(notes, id) else {
        return Vec::new();
    };
    note.links
        .iter()
        .map(|link| entity::resolve(notes, link))
        .collect()
}

/// Notes that list `id` among their links.
pub fn backlinks<'a>(notes: &'a [Note], id: &str) -> Vec<&'a Note> {
    notes
        .iter()
        .filter(|n| n.id != id && n.links.iter().any(|l| l == id))
        .collect()
}

/// Case-insensitive search over titles, bodies and tags.
pub fn search<'a>(notes: &'a [Note], query: &str) -> Vec<&'a Note> {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return notes.iter().collect();
    }
    notes
        .iter()
        .filter(|n| {
            n.title.to_lowercase().contains(&q)
                || n.body.to_lowercase().contains(&q)
                || n.tags.iter().any(|t| t.contains(&q))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::Utc;

    use super::*;

    fn notebook(titles: &[&str]) -> (Vec<Note>, Vec<EntityId>) {
        let mut notes = Vec::new();
        let ids = titles
            .iter()
            .map(|t| {
                entity::append(&mut notes, |id, now| {
                    Note::from_create(
                        id,
                        now,
                        CreateNote {
                            title: t.to_string(),
                            ..Default::default()
                        },
                    )
                })
            })
            .collect();
        (notes, ids)
    }

    #[test]
    fn link_is_bidirectional_and_idempotent() {
        let (mut notes, ids) = notebook(&["a", "b"]);
        link(&mut notes, &ids[0], &ids[1]).unwrap();
        link(&mut notes, &ids[1], &ids[0]).unwrap();

        assert_eq!(entity::find(&notes, &ids[0]).unwrap().links, vec![ids[1].clone()]);
        assert_eq!(entity::find(&notes, &ids[1]).unwrap().links, vec![ids[0].clone()]);
        assert_eq!(backlinks(&notes, &ids[1]).len(), 1);
    }

    #[test]
    fn link_rejects_self_and_missing() {
        let (mut notes, ids) = notebook(&["a"]);
        assert!(link(&mut notes, &ids[0], &ids[0]).is_err());
        assert_matches!(
            link(&mut notes, &ids[0], "ghost"),
            Err(CoreError::NotFound { entity: "Note", .. })
        );
        assert!(notes[0].links.is_empty());
    }

    #[test]
    fn deleted_neighbor_is_reported_as_dangling() {
        let (mut notes, ids) = notebook(&["a", "b", "c"]);
        link(&mut notes, &ids[0], &ids[1]).unwrap();
        link(&mut notes, &ids[0], &ids[2]).unwrap();

        entity::remove(&mut notes, &ids[1]).unwrap();

        let n = neighbors(&notes, &ids[0]);
        assert_eq!(n.len(), 2);
        assert!(n[0].is_dangling());
        assert_eq!(n[1].present().unwrap().title, "c");
        // The link itself is preserved.
        assert!(entity::find(&notes, &ids[0]).unwrap().links.contains(&ids[1]));
    }

    #[test]
    fn unlink_tolerates_missing_far_side() {
        let (mut notes, ids) = notebook(&["a", "b"]);
        link(&mut notes, &ids[0], &ids[1]).unwrap();
        entity::remove(&mut notes, &ids[1]).unwrap();

        unlink(&mut notes, &ids[0], &ids[1]).unwrap();
        assert!(notes[0].links.is_empty());
    }

    #[test]
    fn neighbors_of_unknown_note_is_empty() {
        let (notes, _) = notebook(&["a"]);
        assert!(neighbors(&notes, "ghost").is_empty());
    }

    #[test]
    fn edits_record_versions_only_on_text_change() {
        let (mut notes, _) = notebook(&["draft"]);
        let note = &mut notes[0];

        note.edit(
            UpdateNote {
                pinned: Some(true),
                ..Default::default()
            },
            Utc::now(),
        );
        assert!(note.versions.is_empty());

        note.edit(
            UpdateNote {
                body: Some("first body".into()),
                ..Default::default()
            },
            Utc::now(),
        );
        assert_eq!(note.versions.len(), 1);
        assert_eq!(note.versions[0].body, "");
    }

    #[test]
    fn versions_are_capped() {
        let (mut notes, _) = notebook(&["draft"]);
        let note = &mut notes[0];
        for i in 0..(MAX_VERSIONS + 10) {
            note.edit(
                UpdateNote {
                    body: Some(format!("body {i}")),
                    ..Default::default()
                },
                Utc::now(),
            );
        }
        assert_eq!(note.versions.len(), MAX_VERSIONS);
        assert_eq!(note.versions[0].body, "body 9");
    }

    #[test]
    fn restore_keeps_current_text_as_version() {
        let (mut notes, _) = notebook(&["v1"]);
        let note = &mut notes[0];
        note.edit(
            UpdateNote {
                title: Some("v2".into()),
                ..Default::default()
            },
            Utc::now(),
        );

        note.restore_version(0, Utc::now()).unwrap();
        assert_eq!(note.title, "v1");
        assert_eq!(note.versions.last().unwrap().title, "v2");
        assert!(note.restore_version(99, Utc::now()).is_err());
    }

    #[test]
    fn search_matches_title_body_and_tags() {
        let (mut notes, ids) = notebook(&["Launch plan", "Groceries"]);
        entity::update(&mut notes, &ids[1], |n| n.tags = vec!["personal".into()]).unwrap();
        assert_eq!(search(&notes, "LAUNCH").len(), 1);
        assert_eq!(search(&notes, "personal").len(), 1);
        assert_eq!(search(&notes, "  ").len(), 2);
    }
}
