//! Entity identifier generation.
//!
//! Identifiers are UUID v7 strings: time-ordered, so collections sorted by
//! id are also roughly sorted by creation time. Callers that hold a
//! collection pass a membership check to [`unique_entity_id`] so a freshly
//! generated id can never shadow one that is already stored.

use uuid::Uuid;

use crate::types::EntityId;

/// Upper bound on re-rolls before giving up on the time-ordered generator
/// and falling back to a fully random v4 id.
const MAX_REROLLS: usize = 8;

/// Generate a new time-ordered entity identifier.
pub fn new_entity_id() -> EntityId {
    Uuid::now_v7().to_string()
}

/// Generate an identifier that `is_taken` reports as free.
///
/// The returned id is never empty.
pub fn unique_entity_id(is_taken: impl Fn(&str) -> bool) -> EntityId {
    for _ in 0..MAX_REROLLS {
        let id = new_entity_id();
        if !is_taken(&id) {
            return id;
        }
    }

    loop {
        let id = Uuid::new_v4().to_string();
        if !is_taken(&id) {
            return id;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
