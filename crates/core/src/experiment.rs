//! Growth experiments: hypothesis, ICE ratings, spend and outcome.

use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::error::CoreError;
use crate::types::{EntityId, Timestamp};
use crate::validation::{validate_amount, validate_name, validate_rating, validate_text};

/// ICE ratings are on a 1..=10 scale.
pub const ICE_RATING_MAX: u8 = 10;

/// Maximum number of daily observations kept per experiment.
pub const MAX_DAILY_VALUES: usize = 366;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperimentStatus {
    #[default]
    Planned,
    Running,
    Completed,
    Abandoned,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experiment {
    pub id: EntityId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub name: String,
    #[serde(default)]
    pub hypothesis: String,
    #[serde(default)]
    pub status: ExperimentStatus,
    pub impact: u8,
    pub confidence: u8,
    pub ease: u8,
    #[serde(default)]
    pub cost: f64,
    #[serde(default)]
    pub revenue: f64,
    /// Invited users per participant, observed.
    #[serde(default)]
    pub invites_per_user: f64,
    /// Fraction of invites that convert, 0..=1.
    #[serde(default)]
    pub invite_conversion: f64,
    /// One observation per day of the tracked metric.
    #[serde(default)]
    pub daily_values: Vec<f64>,
    #[serde(default)]
    pub brand_id: Option<EntityId>,
}

impl Entity for Experiment {
    const KIND: &'static str = "Experiment";

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> Timestamp {
        self.created_at
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateExperiment {
    pub name: String,
    #[serde(default)]
    pub hypothesis: String,
    pub impact: u8,
    pub confidence: u8,
    pub ease: u8,
    #[serde(default)]
    pub cost: f64,
    #[serde(default)]
    pub brand_id: Option<EntityId>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateExperiment {
    pub name: Option<String>,
    pub hypothesis: Option<String>,
    pub status: Option<ExperimentStatus>,
    pub impact: Option<u8>,
    pub confidence: Option<u8>,
    pub ease: Option<u8>,
    pub cost: Option<f64>,
    pub revenue: Option<f64>,
    pub invites_per_user: Option<f64>,
    pub invite_conversion: Option<f64>,
}

fn validate_conversion(value: f64) -> Result<(), CoreError> {
    validate_amount("Invite conversion", value)?;
    if value > 1.0 {
        return Err(CoreError::Validation(
            "Invite conversion must be between 0 and 1".into(),
        ));
    }
    Ok(())
}

pub fn validate_create_experiment(input: &CreateExperiment) -> Result<(), CoreError> {
    validate_name("Experiment name", &input.name)?;
    validate_text("Hypothesis", &input.hypothesis)?;
    validate_rating("Impact", input.impact, ICE_RATING_MAX)?;
    validate_rating("Confidence", input.confidence, ICE_RATING_MAX)?;
    validate_rating("Ease", input.ease, ICE_RATING_MAX)?;
    validate_amount("Cost", input.cost)
}

pub fn validate_update_experiment(input: &UpdateExperiment) -> Result<(), CoreError> {
    if let Some(name) = &input.name {
        validate_name("Experiment name", name)?;
    }
    if let Some(hypothesis) = &input.hypothesis {
        validate_text("Hypothesis", hypothesis)?;
    }
    if let Some(v) = input.impact {
        validate_rating("Impact", v, ICE_RATING_MAX)?;
    }
    if let Some(v) = input.confidence {
        validate_rating("Confidence", v, ICE_RATING_MAX)?;
    }
    if let Some(v) = input.ease {
        validate_rating("Ease", v, ICE_RATING_MAX)?;
    }
    if let Some(v) = input.cost {
        validate_amount("Cost", v)?;
    }
    if let Some(v) = input.revenue {
        validate_amount("Revenue", v)?;
    }
    if let Some(v) = input.invites_per_user {
        validate_amount("Invites per user", v)?;
    }
    if let Some(v) = input.invite_conversion {
        validate_conversion(v)?;
    }
    Ok(())
}

impl Experiment {
    pub fn from_create(id: EntityId, now: Timestamp, input: CreateExperiment) -> Self {
        Self {
            id,
            created_at: now,
            updated_at: now,
            name: input.name.trim().to_string(),
            hypothesis: input.hypothesis,
            status: ExperimentStatus::Planned,
            impact: input.impact,
            confidence: input.confidence,
            ease: input.ease,
            cost: input.cost,
            revenue: 0.0,
            invites_per_user: 0.0,
            invite_conversion: 0.0,
            daily_values: Vec::new(),
            brand_id: input.brand_id,
        }
    }

    pub fn apply(&mut self, input: UpdateExperiment, now: Timestamp) {
        if let Some(name) = input.name {
            self.name = name.trim().to_string();
        }
        if let Some(hypothesis) = input.hypothesis {
            self.hypothesis = hypothesis;
        }
        if let Some(status) = input.status {
            self.status = status;
        }
        if let Some(v) = input.impact {
            self.impact = v;
        }
        if let Some(v) = input.confidence {
            self.confidence = v;
        }
        if let Some(v) = input.ease {
            self.ease = v;
        }
        if let Some(v) = input.cost {
            self.cost = v;
        }
        if let Some(v) = input.revenue {
            self.revenue = v;
        }
        if let Some(v) = input.invites_per_user {
            self.invites_per_user = v;
        }
        if let Some(v) = input.invite_conversion {
            self.invite_conversion = v;
        }
        self.updated_at = now;
    }

    /// Record one daily observation, dropping the oldest beyond the cap.
    pub fn record_daily_value(&mut self, value: f64, now: Timestamp) -> Result<(), CoreError> {
        if !value.is_finite() {
            return Err(CoreError::Validation(
                "Daily value must be a finite number".into(),
            ));
        }
        self.daily_values.push(value);
        if self.daily_values.len() > MAX_DAILY_VALUES {
            let excess = self.daily_values.len() - MAX_DAILY_VALUES;
            self.daily_values.drain(..excess);
        }
        self.updated_at = now;
        Ok(())
    }
}
