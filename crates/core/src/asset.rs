//! Media asset library records.

use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::error::CoreError;
use crate::types::{EntityId, Timestamp};
use crate::validation::{normalize_tags, validate_name, validate_tags};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    Image,
    Video,
    Audio,
    Document,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaAsset {
    pub id: EntityId,
    pub created_at: Timestamp,
    pub name: String,
    pub kind: AssetKind,
    pub url: String,
    #[serde(default)]
    pub size_bytes: u64,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub alt_text: Option<String>,
    #[serde(default)]
    pub brand_id: Option<EntityId>,
    #[serde(default)]
    pub usage_count: u32,
}

impl Entity for MediaAsset {
    const KIND: &'static str = "MediaAsset";

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> Timestamp {
        self.created_at
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMediaAsset {
    pub name: String,
    pub kind: AssetKind,
    pub url: String,
    #[serde(default)]
    pub size_bytes: u64,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub alt_text: Option<String>,
    #[serde(default)]
    pub brand_id: Option<EntityId>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMediaAsset {
    pub name: Option<String>,
    pub tags: Option<Vec<String>>,
    pub alt_text: Option<Option<String>>,
    pub brand_id: Option<Option<EntityId>>,
}

/// Accept absolute http(s) URLs and `data:` / `blob:` URLs produced by uploads.
pub fn validate_asset_url(url: &str) -> Result<(), CoreError> {
    const PREFIXES: &[&str] = &["https://", "http://", "data:", "blob:"];
    if !PREFIXES.iter().any(|p| url.starts_with(p)) {
        return Err(CoreError::Validation(format!(
            "Asset URL must start with one of: {}",
            PREFIXES.join(", ")
        )));
    }
    Ok(())
}

pub fn validate_create_asset(input: &CreateMediaAsset) -> Result<(), CoreError> {
    validate_name("Asset name", &input.name)?;
    validate_asset_url(&input.url)?;
    validate_tags(&input.tags)
}

pub fn validate_update_asset(input: &UpdateMediaAsset) -> Result<(), CoreError> {
    if let Some(name) = &input.name {
        validate_name("Asset name", name)?;
    }
    if let Some(tags) = &input.tags {
        validate_tags(tags)?;
    }
    Ok(())
}

impl MediaAsset {
    pub fn from_create(id: EntityId, now: Timestamp, input: CreateMediaAsset) -> Self {
        Self {
            id,
            created_at: now,
            name: input.name.trim().to_string(),
            kind: input.kind,
            url: input.url,
            size_bytes: input.size_bytes,
            tags: normalize_tags(&input.tags),
            alt_text: input.alt_text,
            brand_id: input.brand_id,
            usage_count: 0,
        }
    }

    pub fn apply(&mut self, input: UpdateMediaAsset) {
        if let Some(name) = input.name {
            self.name = name.trim().to_string();
        }
        if let Some(tags) = input.tags {
            self.tags = normalize_tags(&tags);
        }
        if let Some(alt) = input.alt_text {
            self.alt_text = alt;
        }
        if let Some(brand_id) = input.brand_id {
            self.brand_id = brand_id;
        }
    }

    /// Whether the asset carries accessibility text (images and video only).
    pub fn needs_alt_text(&self) -> bool {
        matches!(self.kind, AssetKind::Image | AssetKind::Video)
            && self.alt_text.as_deref().map_or(true, |t| t.trim().is_empty())
    }
}
