//! Central registry of storage key names.
//!
//! Every persisted blob lives under `"<namespace>.<collection>"`. Keeping the
//! collection names in one enum means two pages can never collide on a key
//! by accident, and the remote module rows use the same names.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Default namespace prefix for local keys.
pub const DEFAULT_NAMESPACE: &str = "studioos";

/// Maximum length of a module key accepted by the remote endpoints.
pub const MAX_MODULE_KEY_LENGTH: usize = 64;

/// One logical collection (or settings blob) per page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionKey {
    Brands,
    Content,
    Experiments,
    Assets,
    Notes,
    Activity,
    Dashboard,
}

impl CollectionKey {
    pub const ALL: [CollectionKey; 7] = [
        Self::Brands,
        Self::Content,
        Self::Experiments,
        Self::Assets,
        Self::Notes,
        Self::Activity,
        Self::Dashboard,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Brands => "brands",
            Self::Content => "content",
            Self::Experiments => "experiments",
            Self::Assets => "assets",
            Self::Notes => "notes",
            Self::Activity => "activity",
            Self::Dashboard => "dashboard",
        }
    }

    pub fn from_str_value(s: &str) -> Result<Self, CoreError> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Unknown collection '{s}'. Must be one of: {}",
                    Self::ALL.map(|k| k.as_str()).join(", ")
                ))
            })
    }
}

/// Physical storage key for a collection under a namespace.
pub fn storage_key(namespace: &str, key: CollectionKey) -> String {
    format!("{namespace}.{}", key.as_str())
}

/// Validate a free-form remote module key.
///
/// Module keys are path segments, so they are restricted to lowercase ASCII
/// alphanumerics, `_`, `-` and `.`.
pub fn validate_module_key(key: &str) -> Result<(), CoreError> {
    if key.is_empty() {
        return Err(CoreError::Validation("Module key must not be empty".into()));
    }
    if key.len() > MAX_MODULE_KEY_LENGTH {
        return Err(CoreError::Validation(format!(
            "Module key must be at most {MAX_MODULE_KEY_LENGTH} characters"
        )));
    }
    if !key
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '-' | '.'))
    {
        return Err(CoreError::Validation(
            "Module key must contain only lowercase alphanumerics, '_', '-' or '.'".into(),
        ));
    }
    // "." and ".." collapse out of a URL path.
    if key.chars().all(|c| c == '.') {
        return Err(CoreError::Validation(
            "Module key must not consist only of dots".into(),
        ));
    }
    Ok(())
}
