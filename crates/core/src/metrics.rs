//! Derived display metrics.
//!
//! Every function here is pure and total: same input, same output, and the
//! result is always inside the documented range. Nothing in this module is
//! persisted; pages recompute scores from the current entity on every read.
//!
//! `viral_coefficient` and `detect_anomalies` are deterministic heuristics,
//! not model output. Anything that needs a language model goes through the
//! API's proxy endpoints instead.

use serde::Serialize;

use crate::asset::MediaAsset;
use crate::brand::{AudiencePain, Brand, PAIN_RATING_MAX};
use crate::content::ContentItem;
use crate::experiment::{Experiment, ICE_RATING_MAX};

/// Upper bound of every 0..=100 score.
pub const SCORE_MAX: u8 = 100;

/// Viral coefficients are clamped to this ceiling.
pub const VIRAL_COEFFICIENT_MAX: f64 = 10.0;

/// ROI percentages outside this window saturate the ROI score.
pub const ROI_FLOOR_PCT: f64 = -100.0;
pub const ROI_CEILING_PCT: f64 = 300.0;

/// Default z-score above which a daily value is flagged.
pub const DEFAULT_ANOMALY_THRESHOLD: f64 = 2.0;

/// Minimum observations before anomaly detection says anything.
pub const MIN_ANOMALY_SAMPLES: usize = 3;

/// Clamp any float into `0..=100` and round. `NaN` maps to 0.
pub fn clamp_score(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, SCORE_MAX as f64) as u8
}

/// Fraction of `target` reached by `count`, capped at 1.
fn fill_ratio(count: usize, target: usize) -> f64 {
    if target == 0 {
        return 1.0;
    }
    (count as f64 / target as f64).min(1.0)
}

fn present(text: &str) -> bool {
    !text.trim().is_empty()
}

// ---------------------------------------------------------------------------
// Brand
// ---------------------------------------------------------------------------

/// How much of the brand profile is filled in, 0..=100.
pub fn brand_completeness(brand: &Brand) -> u8 {
    let mut score = 0.0;
    if present(&brand.name) {
        score += 10.0;
    }
    if present(&brand.tagline) {
        score += 10.0;
    }
    if present(&brand.mission) {
        score += 15.0;
    }
    if present(&brand.audience) {
        score += 15.0;
    }
    score += 15.0 * fill_ratio(brand.voice.len(), 3);
    score += 10.0 * fill_ratio(brand.values.len(), 3);
    score += 10.0 * fill_ratio(brand.palette.len(), 3);
    if brand.logo_asset_id.is_some() {
        score += 10.0;
    }
    if !brand.audience_pains.is_empty() {
        score += 5.0;
    }
    clamp_score(score)
}

/// Audience pain intensity, 0..=100. Weighted toward the worst pain so one
/// severe, frequent problem is not diluted by many mild ones.
pub fn pain_score(pains: &[AudiencePain]) -> u8 {
    if pains.is_empty() {
        return 0;
    }
    let max_product = (PAIN_RATING_MAX as f64).powi(2);
    let intensities: Vec<f64> = pains
        .iter()
        .map(|p| {
            let severity = p.severity.min(PAIN_RATING_MAX) as f64;
            let frequency = p.frequency.min(PAIN_RATING_MAX) as f64;
            severity * frequency / max_product
        })
        .collect();
    let worst = intensities.iter().copied().fold(0.0, f64::max);
    let mean = intensities.iter().sum::<f64>() / intensities.len() as f64;
    clamp_score((0.7 * worst + 0.3 * mean) * 100.0)
}

// ---------------------------------------------------------------------------
// Content
// ---------------------------------------------------------------------------

/// Minimum caption length that counts as "written".
const MIN_CAPTION_CHARS: usize = 50;

/// How ready a content item is to publish, 0..=100.
pub fn content_readiness(item: &ContentItem) -> u8 {
    let mut score = 0.0;
    if present(&item.title) {
        score += 20.0;
    }
    score += 25.0 * fill_ratio(item.caption.trim().chars().count(), MIN_CAPTION_CHARS);
    score += 15.0 * fill_ratio(item.hashtags.len(), 3);
    if !item.asset_ids.is_empty() {
        score += 20.0;
    }
    if item.scheduled_for.is_some() {
        score += 20.0;
    }
    clamp_score(score)
}

/// Engagement rate of a published item in percent of views, 0..=100.
pub fn engagement_rate(item: &ContentItem) -> u8 {
    let Some(perf) = item.performance else {
        return 0;
    };
    if perf.views == 0 {
        return 0;
    }
    let interactions = perf
        .likes
        .saturating_add(perf.comments)
        .saturating_add(perf.shares)
        .saturating_add(perf.saves);
    clamp_score(interactions as f64 / perf.views as f64 * 100.0)
}

// ---------------------------------------------------------------------------
// Experiments
// ---------------------------------------------------------------------------

/// Mean of the ICE ratings scaled to 0..=100.
pub fn ice_score(exp: &Experiment) -> u8 {
    let max = ICE_RATING_MAX as f64;
    let sum: f64 = [exp.impact, exp.confidence, exp.ease]
        .iter()
        .map(|v| (*v).min(ICE_RATING_MAX) as f64)
        .sum();
    clamp_score(sum / (3.0 * max) * 100.0)
}

/// Return on investment in percent. `None` when nothing was spent.
pub fn roi_percent(cost: f64, revenue: f64) -> Option<f64> {
    if !cost.is_finite() || !revenue.is_finite() || cost <= 0.0 {
        return None;
    }
    Some((revenue - cost) / cost * 100.0)
}

/// ROI mapped onto 0..=100: -100% is 0, +300% or better is 100.
///
/// Zero-cost experiments score 100 if they produced revenue, 50 otherwise.
pub fn roi_score(exp: &Experiment) -> u8 {
    match roi_percent(exp.cost, exp.revenue) {
        Some(pct) => {
            let clamped = pct.clamp(ROI_FLOOR_PCT, ROI_CEILING_PCT);
            clamp_score((clamped - ROI_FLOOR_PCT) / (ROI_CEILING_PCT - ROI_FLOOR_PCT) * 100.0)
        }
        None if exp.revenue > 0.0 => SCORE_MAX,
        None => 50,
    }
}

/// Heuristic viral coefficient (invites per user times invite conversion),
/// clamped to `0..=VIRAL_COEFFICIENT_MAX`. Above 1.0 means self-sustaining.
pub fn viral_coefficient(exp: &Experiment) -> f64 {
    let k = exp.invites_per_user * exp.invite_conversion;
    if !k.is_finite() {
        return 0.0;
    }
    k.clamp(0.0, VIRAL_COEFFICIENT_MAX)
}

/// A daily observation that deviates from the series mean.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Anomaly {
    pub index: usize,
    pub value: f64,
    pub z_score: f64,
}

/// Flag values whose absolute z-score exceeds `threshold`.
///
/// Fewer than [`MIN_ANOMALY_SAMPLES`] values, a flat series, or a
/// non-finite value anywhere yields no anomalies.
pub fn detect_anomalies(values: &[f64], threshold: f64) -> Vec<Anomaly> {
    if values.len() < MIN_ANOMALY_SAMPLES || values.iter().any(|v| !v.is_finite()) {
        return Vec::new();
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let std_dev = variance.sqrt();
    if std_dev == 0.0 || !std_dev.is_finite() {
        return Vec::new();
    }

    values
        .iter()
        .enumerate()
        .filter_map(|(index, &value)| {
            let z_score = (value - mean) / std_dev;
            (z_score.abs() > threshold).then_some(Anomaly {
                index,
                value,
                z_score,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Assets
// ---------------------------------------------------------------------------

/// Library hygiene, 0..=100: tagged share (40), alt text on visual media
/// (40), and share of assets actually used somewhere (20). Empty is 0.
pub fn asset_library_health(assets: &[MediaAsset]) -> u8 {
    if assets.is_empty() {
        return 0;
    }
    let total = assets.len() as f64;
    let tagged = assets.iter().filter(|a| !a.tags.is_empty()).count() as f64;
    let used = assets.iter().filter(|a| a.usage_count > 0).count() as f64;

    let visual: Vec<&MediaAsset> = assets
        .iter()
        .filter(|a| {
            matches!(
                a.kind,
                crate::asset::AssetKind::Image | crate::asset::AssetKind::Video
            )
        })
        .collect();
    let alt_ratio = if visual.is_empty() {
        1.0
    } else {
        visual.iter().filter(|a| !a.needs_alt_text()).count() as f64 / visual.len() as f64
    };

    clamp_score(40.0 * tagged / total + 40.0 * alt_ratio + 20.0 * used / total)
}
