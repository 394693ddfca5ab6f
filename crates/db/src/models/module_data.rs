//! Synced module row model and DTO.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use studioos_core::types::{Timestamp, UserId};

/// A row from the `module_data` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ModuleData {
    pub id: i64,
    pub user_id: UserId,
    pub module_key: String,
    pub payload: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for replacing a module payload.
#[derive(Debug, Deserialize)]
pub struct SaveModuleData {
    pub payload: serde_json::Value,
}
