//! All dashboard collections opened against one backend.
//!
//! Each page mutation goes through here so that validation runs first and
//! an activity entry is appended afterwards. Only the dashboard settings
//! blob is synced remotely.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::Value;
use studioos_core::activity::{self, ActivityAction, ActivityEntry};
use studioos_core::asset::{validate_create_asset, validate_update_asset, CreateMediaAsset, MediaAsset, UpdateMediaAsset};
use studioos_core::brand::{validate_create_brand, validate_update_brand, Brand, CreateBrand, UpdateBrand};
use studioos_core::content::{
    validate_create_content, validate_update_content, ContentItem, CreateContentItem,
    UpdateContentItem,
};
use studioos_core::entity::{Entity, Reference};
use studioos_core::error::CoreError;
use studioos_core::experiment::{
    validate_create_experiment, validate_update_experiment, CreateExperiment, Experiment,
    UpdateExperiment,
};
use studioos_core::note::{self, validate_create_note, validate_update_note, CreateNote, Note, UpdateNote};
use studioos_core::settings::DashboardSettings;
use studioos_core::storage_keys::{storage_key, CollectionKey};
use studioos_core::types::{EntityId, UserId};

use crate::backend::{FileBackend, KvBackend};
use crate::binding::{StorageWarning, StoreBinding};
use crate::collection::CollectionStore;
use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::http::HttpModuleSink;
use crate::sync::{merge_remote, DebouncedSync, ModuleSink};

fn not_found<T: Entity>(id: &str) -> CoreError {
    CoreError::NotFound {
        entity: T::KIND,
        id: id.to_string(),
    }
}

pub struct Workspace {
    brands: CollectionStore<Brand>,
    content: CollectionStore<ContentItem>,
    experiments: CollectionStore<Experiment>,
    assets: CollectionStore<MediaAsset>,
    notes: CollectionStore<Note>,
    activity: CollectionStore<ActivityEntry>,
    settings: StoreBinding<DashboardSettings>,
    sync: Option<DebouncedSync>,
}

impl Workspace {
    /// Hydrate every collection under `namespace`.
    pub fn open(backend: Arc<dyn KvBackend>, namespace: &str) -> Self {
        Self {
            brands: CollectionStore::open(backend.clone(), namespace, CollectionKey::Brands),
            content: CollectionStore::open(backend.clone(), namespace, CollectionKey::Content),
            experiments: CollectionStore::open(backend.clone(), namespace, CollectionKey::Experiments),
            assets: CollectionStore::open(backend.clone(), namespace, CollectionKey::Assets),
            notes: CollectionStore::open(backend.clone(), namespace, CollectionKey::Notes),
            activity: CollectionStore::open(backend.clone(), namespace, CollectionKey::Activity),
            settings: StoreBinding::hydrate(
                backend,
                storage_key(namespace, CollectionKey::Dashboard),
                DashboardSettings::default(),
            ),
            sync: None,
        }
    }

    /// Open a file-backed workspace from configuration.
    pub fn from_config(config: &StoreConfig) -> Result<Self, StoreError> {
        let backend = FileBackend::open(&config.data_dir, config.quota_bytes)?;
        tracing::info!(
            data_dir = %config.data_dir.display(),
            namespace = %config.namespace,
            "Workspace opened"
        );
        Ok(Self::open(Arc::new(backend), &config.namespace))
    }

    /// Open from configuration and, when `sync_url` is set, sync the
    /// settings of `user_id` through the server's module endpoints.
    pub async fn connect(
        config: &StoreConfig,
        user_id: UserId,
        token: &str,
    ) -> Result<Self, StoreError> {
        let mut workspace = Self::from_config(config)?;
        match &config.sync_url {
            Some(url) => {
                let sink = HttpModuleSink::new(url.clone(), token)?;
                workspace
                    .start_sync(Arc::new(sink), user_id, config.sync_debounce)
                    .await;
            }
            None => tracing::info!("Remote sync disabled"),
        }
        Ok(workspace)
    }

    /// Pull the remote settings once, then push later changes through a
    /// debounced sync with the given quiet period.
    ///
    /// A failed pull is logged and local settings are kept.
    pub async fn start_sync(&mut self, sink: Arc<dyn ModuleSink>, user_id: UserId, quiet: Duration) {
        let module_key = CollectionKey::Dashboard.as_str();
        match sink.fetch(user_id, module_key).await {
            Ok(remote) => {
                self.apply_remote_settings(remote.as_ref());
            }
            Err(e) => {
                tracing::warn!(user_id, module_key, error = %e, "Failed to pull remote settings");
            }
        }
        self.attach_sync(DebouncedSync::spawn(sink, user_id, module_key, quiet));
    }

    /// Whether settings changes are being synced remotely.
    pub fn is_syncing(&self) -> bool {
        self.sync.is_some()
    }

    /// Push every future settings change through `sync`.
    pub fn attach_sync(&mut self, sync: DebouncedSync) {
        self.sync = Some(sync);
    }

    /// Detach and stop the sync task, sending any pending change first.
    pub async fn shutdown(&mut self) {
        if let Some(sync) = self.sync.take() {
            sync.shutdown().await;
        }
    }

    pub fn brands(&self) -> &CollectionStore<Brand> {
        &self.brands
    }

    pub fn content(&self) -> &CollectionStore<ContentItem> {
        &self.content
    }

    pub fn experiments(&self) -> &CollectionStore<Experiment> {
        &self.experiments
    }

    pub fn assets(&self) -> &CollectionStore<MediaAsset> {
        &self.assets
    }

    pub fn notes(&self) -> &CollectionStore<Note> {
        &self.notes
    }

    /// Newest first.
    pub fn recent_activity(&self, limit: usize) -> Vec<&ActivityEntry> {
        activity::recent(self.activity.all(), limit)
    }

    /// Every persistence warning not yet shown, one per failing key.
    pub fn take_warnings(&mut self) -> Vec<StorageWarning> {
        [
            self.brands.take_warning(),
            self.content.take_warning(),
            self.experiments.take_warning(),
            self.assets.take_warning(),
            self.notes.take_warning(),
            self.activity.take_warning(),
            self.settings.take_warning(),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    fn log(&mut self, action: ActivityAction, collection: CollectionKey, id: &str, label: &str) {
        let summary = format!("{} {} '{label}'", capitalize(action.as_str()), singular(collection));
        let recorded = self
            .activity
            .modify(|log| Ok(activity::record(log, action, collection, id, summary)));
        if let Err(e) = recorded {
            tracing::error!(error = %e, "Failed to record activity");
        }
    }

    // -----------------------------------------------------------------------
    // Brands
    // -----------------------------------------------------------------------

    pub fn create_brand(&mut self, input: CreateBrand) -> Result<EntityId, CoreError> {
        validate_create_brand(&input)?;
        let id = self.brands.create(|id, now| Brand::from_create(id, now, input));
        let name = self.brand_label(&id);
        self.log(ActivityAction::Created, CollectionKey::Brands, &id, &name);
        Ok(id)
    }

    pub fn update_brand(&mut self, id: &str, input: UpdateBrand) -> Result<(), CoreError> {
        validate_update_brand(&input)?;
        self.brands.update(id, |b| b.apply(input, Utc::now()))?;
        let name = self.brand_label(id);
        self.log(ActivityAction::Updated, CollectionKey::Brands, id, &name);
        Ok(())
    }

    pub fn delete_brand(&mut self, id: &str) -> Result<Brand, CoreError> {
        let brand = self.brands.delete(id).ok_or_else(|| not_found::<Brand>(id))?;
        self.log(ActivityAction::Deleted, CollectionKey::Brands, id, &brand.name);
        Ok(brand)
    }

    fn brand_label(&self, id: &str) -> String {
        self.brands.get(id).map(|b| b.name.clone()).unwrap_or_default()
    }

    // -----------------------------------------------------------------------
    // Content
    // -----------------------------------------------------------------------

    /// Create a content item and count it as a use of every attached asset
    /// that still exists.
    pub fn create_content(&mut self, input: CreateContentItem) -> Result<EntityId, CoreError> {
        validate_create_content(&input)?;
        let asset_ids = input.asset_ids.clone();
        let id = self
            .content
            .create(|id, now| ContentItem::from_create(id, now, input));
        for asset_id in &asset_ids {
            // Missing assets are ignored; the content item keeps the id.
            let _ = self.assets.update(asset_id, |a| a.usage_count = a.usage_count.saturating_add(1));
        }
        let title = self.content_label(&id);
        self.log(ActivityAction::Created, CollectionKey::Content, &id, &title);
        Ok(id)
    }

    pub fn update_content(&mut self, id: &str, input: UpdateContentItem) -> Result<(), CoreError> {
        let current = self.content.get(id).ok_or_else(|| not_found::<ContentItem>(id))?;
        validate_update_content(current, &input)?;
        self.content.update(id, |c| c.apply(input, Utc::now()))?;
        let title = self.content_label(id);
        self.log(ActivityAction::Updated, CollectionKey::Content, id, &title);
        Ok(())
    }

    pub fn delete_content(&mut self, id: &str) -> Result<ContentItem, CoreError> {
        let item = self
            .content
            .delete(id)
            .ok_or_else(|| not_found::<ContentItem>(id))?;
        self.log(ActivityAction::Deleted, CollectionKey::Content, id, &item.title);
        Ok(item)
    }

    /// The brand a content item belongs to, if it names one.
    pub fn content_brand<'a>(&'a self, item: &'a ContentItem) -> Option<Reference<'a, Brand>> {
        item.brand_id.as_deref().map(|id| self.brands.resolve(id))
    }

    fn content_label(&self, id: &str) -> String {
        self.content.get(id).map(|c| c.title.clone()).unwrap_or_default()
    }

    // -----------------------------------------------------------------------
    // Experiments
    // -----------------------------------------------------------------------

    pub fn create_experiment(&mut self, input: CreateExperiment) -> Result<EntityId, CoreError> {
        validate_create_experiment(&input)?;
        let id = self
            .experiments
            .create(|id, now| Experiment::from_create(id, now, input));
        let name = self.experiment_label(&id);
        self.log(ActivityAction::Created, CollectionKey::Experiments, &id, &name);
        Ok(id)
    }

    pub fn update_experiment(&mut self, id: &str, input: UpdateExperiment) -> Result<(), CoreError> {
        validate_update_experiment(&input)?;
        self.experiments.update(id, |e| e.apply(input, Utc::now()))?;
        let name = self.experiment_label(id);
        self.log(ActivityAction::Updated, CollectionKey::Experiments, id, &name);
        Ok(())
    }

    /// Append one daily observation to an experiment's series.
    pub fn record_experiment_value(&mut self, id: &str, value: f64) -> Result<(), CoreError> {
        self.experiments
            .try_update(id, |e| e.record_daily_value(value, Utc::now()))?;
        let name = self.experiment_label(id);
        self.log(ActivityAction::Updated, CollectionKey::Experiments, id, &name);
        Ok(())
    }

    pub fn delete_experiment(&mut self, id: &str) -> Result<Experiment, CoreError> {
        let exp = self
            .experiments
            .delete(id)
            .ok_or_else(|| not_found::<Experiment>(id))?;
        self.log(ActivityAction::Deleted, CollectionKey::Experiments, id, &exp.name);
        Ok(exp)
    }

    fn experiment_label(&self, id: &str) -> String {
        self.experiments.get(id).map(|e| e.name.clone()).unwrap_or_default()
    }

    // -----------------------------------------------------------------------
    // Assets
    // -----------------------------------------------------------------------

    pub fn create_asset(&mut self, input: CreateMediaAsset) -> Result<EntityId, CoreError> {
        validate_create_asset(&input)?;
        let id = self.assets.create(|id, now| MediaAsset::from_create(id, now, input));
        let name = self.asset_label(&id);
        self.log(ActivityAction::Created, CollectionKey::Assets, &id, &name);
        Ok(id)
    }

    pub fn update_asset(&mut self, id: &str, input: UpdateMediaAsset) -> Result<(), CoreError> {
        validate_update_asset(&input)?;
        self.assets.update(id, |a| a.apply(input))?;
        let name = self.asset_label(id);
        self.log(ActivityAction::Updated, CollectionKey::Assets, id, &name);
        Ok(())
    }

    pub fn delete_asset(&mut self, id: &str) -> Result<MediaAsset, CoreError> {
        let asset = self.assets.delete(id).ok_or_else(|| not_found::<MediaAsset>(id))?;
        self.log(ActivityAction::Deleted, CollectionKey::Assets, id, &asset.name);
        Ok(asset)
    }

    fn asset_label(&self, id: &str) -> String {
        self.assets.get(id).map(|a| a.name.clone()).unwrap_or_default()
    }

    // -----------------------------------------------------------------------
    // Notes
    // -----------------------------------------------------------------------

    pub fn create_note(&mut self, input: CreateNote) -> Result<EntityId, CoreError> {
        validate_create_note(&input)?;
        let id = self.notes.create(|id, now| Note::from_create(id, now, input));
        let title = self.note_label(&id);
        self.log(ActivityAction::Created, CollectionKey::Notes, &id, &title);
        Ok(id)
    }

    pub fn update_note(&mut self, id: &str, input: UpdateNote) -> Result<(), CoreError> {
        validate_update_note(&input)?;
        self.notes.update(id, |n| n.edit(input, Utc::now()))?;
        let title = self.note_label(id);
        self.log(ActivityAction::Updated, CollectionKey::Notes, id, &title);
        Ok(())
    }

    /// Delete a note. Links other notes hold to it are left dangling.
    pub fn delete_note(&mut self, id: &str) -> Result<Note, CoreError> {
        let removed = self.notes.delete(id).ok_or_else(|| not_found::<Note>(id))?;
        self.log(ActivityAction::Deleted, CollectionKey::Notes, id, &removed.title);
        Ok(removed)
    }

    /// Link `a` to `b`. Logged as an update of `a`, the note holding the link.
    pub fn link_notes(&mut self, a: &str, b: &str) -> Result<(), CoreError> {
        self.notes.modify(|notes| note::link(notes, a, b))?;
        let title = self.note_label(a);
        self.log(ActivityAction::Updated, CollectionKey::Notes, a, &title);
        Ok(())
    }

    pub fn unlink_notes(&mut self, a: &str, b: &str) -> Result<(), CoreError> {
        self.notes.modify(|notes| note::unlink(notes, a, b))?;
        let title = self.note_label(a);
        self.log(ActivityAction::Updated, CollectionKey::Notes, a, &title);
        Ok(())
    }

    pub fn restore_note_version(&mut self, id: &str, index: usize) -> Result<(), CoreError> {
        self.notes
            .try_update(id, |n| n.restore_version(index, Utc::now()))?;
        let title = self.note_label(id);
        self.log(ActivityAction::Updated, CollectionKey::Notes, id, &title);
        Ok(())
    }

    pub fn note_neighbors(&self, id: &str) -> Vec<Reference<'_, Note>> {
        note::neighbors(self.notes.all(), id)
    }

    pub fn note_backlinks(&self, id: &str) -> Vec<&Note> {
        note::backlinks(self.notes.all(), id)
    }

    fn note_label(&self, id: &str) -> String {
        self.notes.get(id).map(|n| n.title.clone()).unwrap_or_default()
    }

    // -----------------------------------------------------------------------
    // Settings
    // -----------------------------------------------------------------------

    pub fn settings(&self) -> &DashboardSettings {
        self.settings.get()
    }

    /// Mutate the settings, persist locally, and schedule a remote sync.
    pub fn update_settings(&mut self, f: impl FnOnce(&mut DashboardSettings)) {
        self.settings.update(f);
        self.push_settings();
    }

    /// Replace local settings with a remote payload merged over the
    /// defaults. Returns the remote fields that were rejected.
    ///
    /// Without a remote row (`None` or a non-object) local settings are kept.
    pub fn apply_remote_settings(&mut self, remote: Option<&Value>) -> Vec<String> {
        if !matches!(remote, Some(Value::Object(_))) {
            tracing::debug!("No remote settings row, keeping local settings");
            return Vec::new();
        }
        let merged = merge_remote(DashboardSettings::default(), remote);
        self.settings.set(merged.value);
        merged.rejected_fields
    }

    fn push_settings(&self) {
        let Some(sync) = &self.sync else {
            return;
        };
        match serde_json::to_value(self.settings.get()) {
            Ok(payload) => sync.push(payload),
            Err(e) => tracing::error!(error = %e, "Failed to serialize settings for sync"),
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn singular(collection: CollectionKey) -> &'static str {
    match collection {
        CollectionKey::Brands => "brand",
        CollectionKey::Content => "content",
        CollectionKey::Experiments => "experiment",
        CollectionKey::Assets => "asset",
        CollectionKey::Notes => "note",
        CollectionKey::Activity => "activity entry",
        CollectionKey::Dashboard => "settings",
    }
}
