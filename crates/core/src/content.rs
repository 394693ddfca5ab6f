//! Content planning: ideas, drafts, and scheduled/published posts.

use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::error::CoreError;
use crate::types::{EntityId, Timestamp};
use crate::validation::{normalize_tags, validate_name, validate_tags, validate_text};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Instagram,
    Tiktok,
    Youtube,
    Linkedin,
    X,
    Blog,
    Newsletter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentStatus {
    #[default]
    Idea,
    Drafting,
    Scheduled,
    Published,
}

/// Engagement numbers recorded after publishing.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContentPerformance {
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
    pub shares: u64,
    pub saves: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub id: EntityId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub title: String,
    pub channel: Channel,
    #[serde(default)]
    pub status: ContentStatus,
    #[serde(default)]
    pub caption: String,
    #[serde(default)]
    pub hashtags: Vec<String>,
    #[serde(default)]
    pub scheduled_for: Option<Timestamp>,
    #[serde(default)]
    pub brand_id: Option<EntityId>,
    #[serde(default)]
    pub asset_ids: Vec<EntityId>,
    #[serde(default)]
    pub performance: Option<ContentPerformance>,
}

impl Entity for ContentItem {
    const KIND: &'static str = "ContentItem";

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> Timestamp {
        self.created_at
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateContentItem {
    pub title: String,
    pub channel: Channel,
    #[serde(default)]
    pub status: ContentStatus,
    #[serde(default)]
    pub caption: String,
    #[serde(default)]
    pub hashtags: Vec<String>,
    #[serde(default)]
    pub scheduled_for: Option<Timestamp>,
    #[serde(default)]
    pub brand_id: Option<EntityId>,
    #[serde(default)]
    pub asset_ids: Vec<EntityId>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateContentItem {
    pub title: Option<String>,
    pub channel: Option<Channel>,
    pub status: Option<ContentStatus>,
    pub caption: Option<String>,
    pub hashtags: Option<Vec<String>>,
    pub scheduled_for: Option<Option<Timestamp>>,
    pub brand_id: Option<Option<EntityId>>,
    pub asset_ids: Option<Vec<EntityId>>,
    pub performance: Option<ContentPerformance>,
}

/// A scheduled item needs a date; publishing is recorded separately.
fn validate_schedule(status: ContentStatus, scheduled_for: Option<Timestamp>) -> Result<(), CoreError> {
    if status == ContentStatus::Scheduled && scheduled_for.is_none() {
        return Err(CoreError::Validation(
            "Scheduled content requires a scheduled date".into(),
        ));
    }
    Ok(())
}

pub fn validate_create_content(input: &CreateContentItem) -> Result<(), CoreError> {
    validate_name("Title", &input.title)?;
    validate_text("Caption", &input.caption)?;
    validate_tags(&input.hashtags)?;
    validate_schedule(input.status, input.scheduled_for)
}

/// Validate an update against the item it will be applied to.
pub fn validate_update_content(
    current: &ContentItem,
    input: &UpdateContentItem,
) -> Result<(), CoreError> {
    if let Some(title) = &input.title {
        validate_name("Title", title)?;
    }
    if let Some(caption) = &input.caption {
        validate_text("Caption", caption)?;
    }
    if let Some(tags) = &input.hashtags {
        validate_tags(tags)?;
    }
    let status = input.status.unwrap_or(current.status);
    let scheduled_for = input.scheduled_for.unwrap_or(current.scheduled_for);
    validate_schedule(status, scheduled_for)
}

fn clean_hashtags(tags: &[String]) -> Vec<String> {
    let stripped: Vec<String> = tags
        .iter()
        .map(|t| t.trim().trim_start_matches('#').to_string())
        .collect();
    normalize_tags(&stripped)
}

impl ContentItem {
    pub fn from_create(id: EntityId, now: Timestamp, input: CreateContentItem) -> Self {
        Self {
            id,
            created_at: now,
            updated_at: now,
            title: input.title.trim().to_string(),
            channel: input.channel,
            status: input.status,
            caption: input.caption,
            hashtags: clean_hashtags(&input.hashtags),
            scheduled_for: input.scheduled_for,
            brand_id: input.brand_id,
            asset_ids: input.asset_ids,
            performance: None,
        }
    }

    pub fn apply(&mut self, input: UpdateContentItem, now: Timestamp) {
        if let Some(title) = input.title {
            self.title = title.trim().to_string();
        }
        if let Some(channel) = input.channel {
            self.channel = channel;
        }
        if let Some(status) = input.status {
            self.status = status;
        }
        if let Some(caption) = input.caption {
            self.caption = caption;
        }
        if let Some(tags) = input.hashtags {
            self.hashtags = clean_hashtags(&tags);
        }
        if let Some(scheduled_for) = input.scheduled_for {
            self.scheduled_for = scheduled_for;
        }
        if let Some(brand_id) = input.brand_id {
            self.brand_id = brand_id;
        }
        if let Some(asset_ids) = input.asset_ids {
            self.asset_ids = asset_ids;
        }
        if let Some(performance) = input.performance {
            self.performance = Some(performance);
        }
        self.updated_at = now;
    }
}
