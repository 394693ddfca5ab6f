//! Brand identity records.

use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::error::CoreError;
use crate::types::{EntityId, Timestamp};
use crate::validation::{
    normalize_tags, validate_hex_color, validate_name, validate_rating, validate_tags,
    validate_text,
};

/// Maximum number of palette colors per brand.
pub const MAX_PALETTE_COLORS: usize = 12;

/// Severity and frequency are rated on a 1..=5 scale.
pub const PAIN_RATING_MAX: u8 = 5;

/// A problem the brand's audience experiences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudiencePain {
    pub description: String,
    pub severity: u8,
    pub frequency: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Brand {
    pub id: EntityId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub name: String,
    #[serde(default)]
    pub tagline: String,
    #[serde(default)]
    pub mission: String,
    #[serde(default)]
    pub audience: String,
    #[serde(default)]
    pub voice: Vec<String>,
    #[serde(default)]
    pub values: Vec<String>,
    #[serde(default)]
    pub palette: Vec<String>,
    /// Media asset used as the logo. May dangle after the asset is deleted.
    #[serde(default)]
    pub logo_asset_id: Option<EntityId>,
    #[serde(default)]
    pub audience_pains: Vec<AudiencePain>,
}

impl Entity for Brand {
    const KIND: &'static str = "Brand";

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> Timestamp {
        self.created_at
    }
}

/// DTO for creating a brand.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBrand {
    pub name: String,
    #[serde(default)]
    pub tagline: String,
    #[serde(default)]
    pub mission: String,
    #[serde(default)]
    pub audience: String,
    #[serde(default)]
    pub voice: Vec<String>,
    #[serde(default)]
    pub values: Vec<String>,
    #[serde(default)]
    pub palette: Vec<String>,
    #[serde(default)]
    pub logo_asset_id: Option<EntityId>,
    #[serde(default)]
    pub audience_pains: Vec<AudiencePain>,
}

/// DTO for updating a brand. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBrand {
    pub name: Option<String>,
    pub tagline: Option<String>,
    pub mission: Option<String>,
    pub audience: Option<String>,
    pub voice: Option<Vec<String>>,
    pub values: Option<Vec<String>>,
    pub palette: Option<Vec<String>>,
    pub logo_asset_id: Option<Option<EntityId>>,
    pub audience_pains: Option<Vec<AudiencePain>>,
}

fn validate_palette(palette: &[String]) -> Result<(), CoreError> {
    if palette.len() > MAX_PALETTE_COLORS {
        return Err(CoreError::Validation(format!(
            "A maximum of {MAX_PALETTE_COLORS} palette colors is allowed"
        )));
    }
    palette.iter().try_for_each(|c| validate_hex_color(c))
}

fn validate_pains(pains: &[AudiencePain]) -> Result<(), CoreError> {
    for pain in pains {
        validate_name("Pain description", &pain.description)?;
        validate_rating("Severity", pain.severity, PAIN_RATING_MAX)?;
        validate_rating("Frequency", pain.frequency, PAIN_RATING_MAX)?;
    }
    Ok(())
}

pub fn validate_create_brand(input: &CreateBrand) -> Result<(), CoreError> {
    validate_name("Brand name", &input.name)?;
    validate_text("Mission", &input.mission)?;
    validate_tags(&input.voice)?;
    validate_tags(&input.values)?;
    validate_palette(&input.palette)?;
    validate_pains(&input.audience_pains)
}

pub fn validate_update_brand(input: &UpdateBrand) -> Result<(), CoreError> {
    if let Some(name) = &input.name {
        validate_name("Brand name", name)?;
    }
    if let Some(mission) = &input.mission {
        validate_text("Mission", mission)?;
    }
    if let Some(voice) = &input.voice {
        validate_tags(voice)?;
    }
    if let Some(values) = &input.values {
        validate_tags(values)?;
    }
    if let Some(palette) = &input.palette {
        validate_palette(palette)?;
    }
    if let Some(pains) = &input.audience_pains {
        validate_pains(pains)?;
    }
    Ok(())
}

impl Brand {
    pub fn from_create(id: EntityId, now: Timestamp, input: CreateBrand) -> Self {
        Self {
            id,
            created_at: now,
            updated_at: now,
            name: input.name.trim().to_string(),
            tagline: input.tagline,
            mission: input.mission,
            audience: input.audience,
            voice: normalize_tags(&input.voice),
            values: normalize_tags(&input.values),
            palette: input.palette.iter().map(|c| c.to_lowercase()).collect(),
            logo_asset_id: input.logo_asset_id,
            audience_pains: input.audience_pains,
        }
    }

    pub fn apply(&mut self, input: UpdateBrand, now: Timestamp) {
        if let Some(name) = input.name {
            self.name = name.trim().to_string();
        }
        if let Some(tagline) = input.tagline {
            self.tagline = tagline;
        }
        if let Some(mission) = input.mission {
            self.mission = mission;
        }
        if let Some(audience) = input.audience {
            self.audience = audience;
        }
        if let Some(voice) = input.voice {
            self.voice = normalize_tags(&voice);
        }
        if let Some(values) = input.values {
            self.values = normalize_tags(&values);
        }
        if let Some(palette) = input.palette {
            self.palette = palette.iter().map(|c| c.to_lowercase()).collect();
        }
        if let Some(logo) = input.logo_asset_id {
            self.logo_asset_id = logo;
        }
        if let Some(pains) = input.audience_pains {
            self.audience_pains = pains;
        }
        self.updated_at = now;
    }
}
