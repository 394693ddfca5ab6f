//! Generic operations over an in-memory entity collection.
//!
//! Every page keeps its records in a plain `Vec<T>` that is persisted as one
//! JSON array. The helpers here are the only place records are created,
//! replaced, or removed, so identifier uniqueness and "missing is absent"
//! lookups are enforced once instead of per page.
//!
//! Cross-entity references (a note linking another note, a content item
//! pointing at a brand) are never cascaded. Deleting an entity leaves every
//! reference to it in place; readers go through [`resolve`] and handle
//! [`Reference::Dangling`] explicitly.

use chrono::Utc;

use crate::error::CoreError;
use crate::ids::unique_entity_id;
use crate::types::{EntityId, Timestamp};

/// A record with a stable identifier and creation timestamp.
pub trait Entity {
    /// Human-readable kind used in error messages (e.g. `"Brand"`).
    const KIND: &'static str;

    fn id(&self) -> &str;

    fn created_at(&self) -> Timestamp;
}

/// Result of following a stored identifier into a collection.
#[derive(Debug, PartialEq)]
pub enum Reference<'a, T> {
    /// The referenced entity still exists.
    Present(&'a T),
    /// The referenced entity is gone; the raw identifier is kept for display.
    Dangling(&'a str),
}

impl<'a, T> Reference<'a, T> {
    /// The entity, if it still exists.
    pub fn present(&self) -> Option<&'a T> {
        match self {
            Self::Present(item) => Some(item),
            Self::Dangling(_) => None,
        }
    }

    pub fn is_dangling(&self) -> bool {
        matches!(self, Self::Dangling(_))
    }
}

/// Append a new entity built from a fresh identifier and the current time.
///
/// The identifier is guaranteed to differ from every id already present.
pub fn append<T: Entity>(
    items: &mut Vec<T>,
    build: impl FnOnce(EntityId, Timestamp) -> T,
) -> EntityId {
    let id = unique_entity_id(|candidate| items.iter().any(|item| item.id() == candidate));
    let entity = build(id.clone(), Utc::now());
    items.push(entity);
    id
}

/// Find an entity by id. A missing id is `None`, never an error.
pub fn find<'a, T: Entity>(items: &'a [T], id: &str) -> Option<&'a T> {
    items.iter().find(|item| item.id() == id)
}

/// Follow a stored reference into `items`.
pub fn resolve<'a, T: Entity>(items: &'a [T], id: &'a str) -> Reference<'a, T> {
    match find(items, id) {
        Some(item) => Reference::Present(item),
        None => Reference::Dangling(id),
    }
}

/// Apply `f` to the entity with the given id.
///
/// Returns [`CoreError::NotFound`] when no entity matches; the collection is
/// left untouched in that case.
pub fn update<T: Entity>(
    items: &mut [T],
    id: &str,
    f: impl FnOnce(&mut T),
) -> Result<(), CoreError> {
    let item = items
        .iter_mut()
        .find(|item| item.id() == id)
        .ok_or_else(|| CoreError::NotFound {
            entity: T::KIND,
            id: id.to_string(),
        })?;
    f(item);
    Ok(())
}

/// Remove exactly the entity with the given id and return it.
///
/// Other entities are not inspected or modified, including any that hold a
/// reference to the removed one.
pub fn remove<T: Entity>(items: &mut Vec<T>, id: &str) -> Option<T> {
    let idx = items.iter().position(|item| item.id() == id)?;
    Some(items.remove(idx))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use assert_matches::assert_matches;

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Card {
        id: EntityId,
        created_at: Timestamp,
        label: String,
        points_to: Option<EntityId>,
    }

    impl Entity for Card {
        const KIND: &'static str = "Card";

        fn id(&self) -> &str {
            &self.id
        }

        fn created_at(&self) -> Timestamp {
            self.created_at
        }
    }

    fn card(label: &str) -> impl FnOnce(EntityId, Timestamp) -> Card + '_ {
        move |id, created_at| Card {
            id,
            created_at,
            label: label.to_string(),
            points_to: None,
        }
    }

    #[test]
    fn appended_ids_are_non_empty_and_distinct() {
        let mut items = Vec::new();
        for i in 0..200 {
            let label = format!("card {i}");
            let id = append(&mut items, card(&label));
            assert!(!id.is_empty());
        }
        let ids: HashSet<_> = items.iter().map(|c| c.id.clone()).collect();
        assert_eq!(ids.len(), 200);
    }

    #[test]
    fn find_missing_is_none() {
        let mut items = Vec::new();
        append(&mut items, card("a"));
        assert!(find(&items, "nope").is_none());
    }

    #[test]
    fn update_replaces_matching_entity_only() {
        let mut items = Vec::new();
        let a = append(&mut items, card("a"));
        let b = append(&mut items, card("b"));

        update(&mut items, &a, |c| c.label = "renamed".into()).unwrap();

        assert_eq!(find(&items, &a).unwrap().label, "renamed");
        assert_eq!(find(&items, &b).unwrap().label, "b");
    }

    #[test]
    fn update_missing_returns_not_found() {
        let mut items: Vec<Card> = Vec::new();
        let err = update(&mut items, "ghost", |_| {}).unwrap_err();
        assert_matches!(err, CoreError::NotFound { entity: "Card", .. });
    }

    #[test]
    fn remove_leaves_dangling_references_in_place() {
        let mut items = Vec::new();
        let target = append(&mut items, card("target"));
        let holder = append(&mut items, card("holder"));
        let other = append(&mut items, card("other"));
        update(&mut items, &holder, |c| c.points_to = Some(target.clone())).unwrap();

        let removed = remove(&mut items, &target).unwrap();
        assert_eq!(removed.id, target);
        assert_eq!(items.len(), 2);
        assert!(find(&items, &other).is_some());

        let holder_card = find(&items, &holder).unwrap();
        assert_eq!(holder_card.points_to.as_deref(), Some(target.as_str()));

        let link = holder_card.points_to.as_deref().unwrap();
        assert_matches!(resolve(&items, link), Reference::Dangling(id) if id == target);
    }

    #[test]
    fn remove_missing_is_noop() {
        let mut items = Vec::new();
        append(&mut items, card("a"));
        assert!(remove(&mut items, "ghost").is_none());
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn resolve_present_returns_entity() {
        let mut items = Vec::new();
        let a = append(&mut items, card("a"));
        let reference = resolve(&items, &a);
        assert!(!reference.is_dangling());
        assert_eq!(reference.present().unwrap().label, "a");
    }
}
