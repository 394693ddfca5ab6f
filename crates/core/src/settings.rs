//! The dashboard-wide settings blob, the one value synced across devices.
//!
//! The remote copy is merged field by field over the local default: any
//! field present remotely overrides the default, any field absent falls
//! back to it. A remote field whose value cannot be decoded into the typed
//! settings is reported and skipped instead of failing the whole load.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::EntityId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSettings {
    pub theme: String,
    pub accent_color: String,
    pub weekly_content_goal: u32,
    pub focus_brand_id: Option<EntityId>,
    pub widgets: Vec<String>,
    pub show_onboarding: bool,
    pub display_name: String,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            theme: "dark".to_string(),
            accent_color: "#7c5cff".to_string(),
            weekly_content_goal: 5,
            focus_brand_id: None,
            widgets: vec![
                "brand_health".to_string(),
                "content_calendar".to_string(),
                "experiments".to_string(),
                "recent_activity".to_string(),
            ],
            show_onboarding: true,
            display_name: String::new(),
        }
    }
}

/// Outcome of merging a remote payload field by field over a default.
#[derive(Debug, Clone, PartialEq)]
pub struct Merged<T> {
    pub value: T,
    /// Remote fields that were present but could not be decoded.
    pub rejected_fields: Vec<String>,
}

pub type MergedSettings = Merged<DashboardSettings>;

/// Shallow merge: top-level keys of `remote` replace those of `default`.
///
/// A non-object on either side leaves `default` unchanged.
pub fn merge_over_default(default: &Value, remote: &Value) -> Value {
    match (default, remote) {
        (Value::Object(base), Value::Object(overlay)) => {
            let mut merged = base.clone();
            for (k, v) in overlay {
                merged.insert(k.clone(), v.clone());
            }
            Value::Object(merged)
        }
        _ => default.clone(),
    }
}

/// Overlay each top-level field of `remote` onto `default`, keeping a field
/// only if the result still decodes as `T`.
///
/// `None` or a non-object remote yields `default` with nothing rejected.
pub fn merge_fields<T>(default: T, remote: Option<&Value>) -> Merged<T>
where
    T: Serialize + DeserializeOwned,
{
    let unchanged = |value| Merged {
        value,
        rejected_fields: Vec::new(),
    };
    let Some(Value::Object(overlay)) = remote else {
        return unchanged(default);
    };
    let Ok(mut current) = serde_json::to_value(&default) else {
        return unchanged(default);
    };
    if !current.is_object() {
        return unchanged(default);
    }

    let mut rejected = Vec::new();
    for (key, value) in overlay {
        let mut candidate = current.clone();
        if let Value::Object(map) = &mut candidate {
            map.insert(key.clone(), value.clone());
        }
        if serde_json::from_value::<T>(candidate.clone()).is_ok() {
            current = candidate;
        } else {
            rejected.push(key.clone());
        }
    }

    match serde_json::from_value(current) {
        Ok(value) => Merged {
            value,
            rejected_fields: rejected,
        },
        Err(_) => unchanged(default),
    }
}

impl DashboardSettings {
    /// Build settings from an optional remote payload.
    pub fn merge_remote(remote: Option<&Value>) -> MergedSettings {
        merge_fields(Self::default(), remote)
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    use super::*;

    #[test]
    fn shallow_merge_overrides_and_falls_back() {
        let default = json!({"a": 1, "b": {"x": 1}, "c": 3});
        let remote = json!({"b": {"y": 2}, "d": 4});
        let merged = merge_over_default(&default, &remote);
        assert_eq!(merged, json!({"a": 1, "b": {"y": 2}, "c": 3, "d": 4}));
    }

    #[test]
    fn non_object_remote_is_ignored() {
        let default = json!({"a": 1});
        assert_eq!(merge_over_default(&default, &json!([1, 2])), default);
        assert_eq!(merge_over_default(&default, &Value::Null), default);
    }

    #[test]
    fn missing_remote_yields_default() {
        let merged = DashboardSettings::merge_remote(None);
        assert_eq!(merged.value, DashboardSettings::default());
        assert!(merged.rejected_fields.is_empty());
    }

    #[test]
    fn remote_fields_override_default() {
        let remote = json!({"theme": "light", "weeklyContentGoal": 9});
        let merged = DashboardSettings::merge_remote(Some(&remote));
        assert_eq!(merged.value.theme, "light");
        assert_eq!(merged.value.weekly_content_goal, 9);
        assert_eq!(merged.value.accent_color, "#7c5cff");
    }

    #[test]
    fn mistyped_remote_field_is_skipped() {
        let remote = json!({"theme": "light", "weeklyContentGoal": "lots"});
        let merged = DashboardSettings::merge_remote(Some(&remote));
        assert_eq!(merged.value.theme, "light");
        assert_eq!(merged.value.weekly_content_goal, 5);
        assert_eq!(merged.rejected_fields, vec!["weeklyContentGoal"]);
    }

    // -- merge_fields ---------------------------------------------------------

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Prefs {
        theme: String,
        goal: u32,
    }

    fn prefs() -> Prefs {
        Prefs {
            theme: "dark".into(),
            goal: 5,
        }
    }

    #[test]
    fn valid_fields_survive_a_mistyped_sibling() {
        let merged = merge_fields(prefs(), Some(&json!({"theme": "light", "goal": "many"})));
        assert_eq!(
            merged.value,
            Prefs {
                theme: "light".into(),
                goal: 5
            }
        );
        assert_eq!(merged.rejected_fields, vec!["goal"]);
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let merged = merge_fields(prefs(), Some(&json!({"goal": 9, "extra": true})));
        assert_eq!(merged.value.goal, 9);
        assert!(merged.rejected_fields.is_empty());
    }

    #[test]
    fn non_object_remote_keeps_default() {
        assert_eq!(merge_fields(prefs(), Some(&json!("light"))).value, prefs());
        assert_eq!(merge_fields(prefs(), None).value, prefs());
    }
}
