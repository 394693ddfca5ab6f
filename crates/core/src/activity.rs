//! Activity log entries appended by pages on create/update/delete.

use serde::{Deserialize, Serialize};

use crate::entity::{self, Entity};
use crate::storage_keys::CollectionKey;
use crate::types::{EntityId, Timestamp};

/// Number of most-recent entries kept in the log.
pub const MAX_ACTIVITY_ENTRIES: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    Created,
    Updated,
    Deleted,
}

impl ActivityAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    pub id: EntityId,
    pub created_at: Timestamp,
    pub action: ActivityAction,
    pub collection: CollectionKey,
    /// The affected entity; dangles once that entity is deleted.
    pub entity_id: EntityId,
    pub summary: String,
}

impl Entity for ActivityEntry {
    const KIND: &'static str = "ActivityEntry";

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> Timestamp {
        self.created_at
    }
}

/// Append an entry and trim the log to [`MAX_ACTIVITY_ENTRIES`] (oldest dropped).
pub fn record(
    log: &mut Vec<ActivityEntry>,
    action: ActivityAction,
    collection: CollectionKey,
    entity_id: &str,
    summary: impl Into<String>,
) -> EntityId {
    let summary = summary.into();
    let id = entity::append(log, |id, created_at| ActivityEntry {
        id,
        created_at,
        action,
        collection,
        entity_id: entity_id.to_string(),
        summary,
    });
    if log.len() > MAX_ACTIVITY_ENTRIES {
        let excess = log.len() - MAX_ACTIVITY_ENTRIES;
        log.drain(..excess);
    }
    id
}

/// The `limit` most recent entries, newest first.
pub fn recent(log: &[ActivityEntry], limit: usize) -> Vec<&ActivityEntry> {
    log.iter().rev().take(limit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_is_bounded_and_keeps_newest() {
        let mut log = Vec::new();
        for i in 0..(MAX_ACTIVITY_ENTRIES + 3) {
            record(
                &mut log,
                ActivityAction::Created,
                CollectionKey::Notes,
                &format!("n{i}"),
                format!("Created note {i}"),
            );
        }
        assert_eq!(log.len(), MAX_ACTIVITY_ENTRIES);
        assert_eq!(log[0].entity_id, "n3");
        assert_eq!(recent(&log, 1)[0].entity_id, format!("n{}", MAX_ACTIVITY_ENTRIES + 2));
    }
}
