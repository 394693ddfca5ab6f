//! Typed CRUD over one persisted entity collection.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use studioos_core::entity::{self, Entity, Reference};
use studioos_core::error::CoreError;
use studioos_core::storage_keys::{storage_key, CollectionKey};
use studioos_core::types::{EntityId, Timestamp};

use crate::backend::KvBackend;
use crate::binding::{StorageWarning, StoreBinding};

/// A `Vec<T>` bound to `"<namespace>.<collection>"`.
#[derive(Debug)]
pub struct CollectionStore<T> {
    collection: CollectionKey,
    binding: StoreBinding<Vec<T>>,
}

impl<T> CollectionStore<T>
where
    T: Entity + Serialize + DeserializeOwned + Clone,
{
    /// Hydrate the collection; an absent or unreadable key starts empty.
    pub fn open(backend: Arc<dyn KvBackend>, namespace: &str, collection: CollectionKey) -> Self {
        let binding = StoreBinding::hydrate(backend, storage_key(namespace, collection), Vec::new());
        Self {
            collection,
            binding,
        }
    }

    pub fn collection(&self) -> CollectionKey {
        self.collection
    }

    /// Append a new entity and persist. Returns its fresh id.
    pub fn create(&mut self, build: impl FnOnce(EntityId, Timestamp) -> T) -> EntityId {
        self.binding.update(|items| entity::append(items, build))
    }

    /// Mutate an existing entity in place.
    pub fn update(&mut self, id: &str, f: impl FnOnce(&mut T)) -> Result<(), CoreError> {
        if self.get(id).is_none() {
            return Err(CoreError::NotFound {
                entity: T::KIND,
                id: id.to_string(),
            });
        }
        self.binding.update(|items| entity::update(items, id, f))
    }

    /// Like [`Self::update`], for mutations that can be rejected. Nothing is
    /// persisted when `f` fails.
    pub fn try_update<R>(
        &mut self,
        id: &str,
        f: impl FnOnce(&mut T) -> Result<R, CoreError>,
    ) -> Result<R, CoreError> {
        self.modify(|items| {
            let item = items
                .iter_mut()
                .find(|item| item.id() == id)
                .ok_or_else(|| CoreError::NotFound {
                    entity: T::KIND,
                    id: id.to_string(),
                })?;
            f(item)
        })
    }

    /// Remove exactly one entity. References held elsewhere are untouched.
    pub fn delete(&mut self, id: &str) -> Option<T> {
        self.get(id)?;
        self.binding.update(|items| entity::remove(items, id))
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        entity::find(self.binding.get(), id)
    }

    pub fn resolve<'a>(&'a self, id: &'a str) -> Reference<'a, T> {
        entity::resolve(self.binding.get(), id)
    }

    /// Every entity in insertion order.
    pub fn all(&self) -> &[T] {
        self.binding.get()
    }

    pub fn len(&self) -> usize {
        self.binding.get().len()
    }

    pub fn is_empty(&self) -> bool {
        self.binding.get().is_empty()
    }

    /// Run a fallible operation over the whole collection and persist only
    /// when it succeeds.
    pub fn modify<R>(
        &mut self,
        f: impl FnOnce(&mut Vec<T>) -> Result<R, CoreError>,
    ) -> Result<R, CoreError> {
        let mut items = self.binding.get().clone();
        let out = f(&mut items)?;
        self.binding.set(items);
        Ok(out)
    }

    pub fn take_warning(&mut self) -> Option<StorageWarning> {
        self.binding.take_warning()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use studioos_core::note::{self, CreateNote, Note};

    use super::*;
    use crate::backend::MemoryBackend;

    fn notes(backend: Arc<dyn KvBackend>) -> CollectionStore<Note> {
        CollectionStore::open(backend, "test", CollectionKey::Notes)
    }

    fn new_note(store: &mut CollectionStore<Note>, title: &str) -> EntityId {
        store.create(|id, now| {
            Note::from_create(
                id,
                now,
                CreateNote {
                    title: title.into(),
                    ..Default::default()
                },
            )
        })
    }

    #[test]
    fn create_persists_under_namespaced_key() {
        let backend = Arc::new(MemoryBackend::new());
        let mut store = notes(backend.clone());
        let id = new_note(&mut store, "First");

        let raw = backend.get("test.notes").unwrap().expect("persisted");
        assert!(raw.contains(&id));

        let reopened = notes(backend);
        assert_eq!(reopened.get(&id).map(|n| n.title.as_str()), Some("First"));
    }

    #[test]
    fn update_missing_is_not_found() {
        let mut store = notes(Arc::new(MemoryBackend::new()));
        assert_matches!(
            store.update("nope", |n| n.pinned = true),
            Err(CoreError::NotFound { entity: "Note", .. })
        );
    }

    #[test]
    fn delete_removes_one_and_leaves_links_dangling() {
        let backend = Arc::new(MemoryBackend::new());
        let mut store = notes(backend.clone());
        let a = new_note(&mut store, "A");
        let b = new_note(&mut store, "B");
        store.modify(|items| note::link(items, &a, &b)).unwrap();

        let removed = store.delete(&b).expect("b existed");
        assert_eq!(removed.id, b);
        assert_eq!(store.len(), 1);
        assert!(store.delete(&b).is_none());

        let reopened = notes(backend);
        let a_note = reopened.get(&a).unwrap();
        assert_eq!(a_note.links, vec![b.clone()]);
        assert!(reopened.resolve(&b).is_dangling());
    }

    #[test]
    fn failed_modify_does_not_persist() {
        let backend = Arc::new(MemoryBackend::new());
        let mut store = notes(backend.clone());
        let a = new_note(&mut store, "A");

        let err = store.modify(|items| note::link(items, &a, "ghost"));
        assert!(err.is_err());
        assert!(store.get(&a).unwrap().links.is_empty());
    }
}
