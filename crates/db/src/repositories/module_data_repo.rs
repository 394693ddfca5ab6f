//! Repository for the `module_data` table.

use sqlx::PgPool;
use studioos_core::types::UserId;

use crate::models::module_data::ModuleData;

/// Column list for `module_data` queries.
const COLUMNS: &str = "id, user_id, module_key, payload, created_at, updated_at";

/// Per-user, per-module JSON payload storage.
pub struct ModuleDataRepo;

impl ModuleDataRepo {
    /// Find a user's row for a module. Returns `None` if nothing was saved yet.
    pub async fn find(
        pool: &PgPool,
        user_id: UserId,
        module_key: &str,
    ) -> Result<Option<ModuleData>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM module_data WHERE user_id = $1 AND module_key = $2"
        );
        sqlx::query_as::<_, ModuleData>(&query)
            .bind(user_id)
            .bind(module_key)
            .fetch_optional(pool)
            .await
    }

    /// Replace a user's payload for a module, creating the row if absent.
    ///
    /// Uses `ON CONFLICT (user_id, module_key) DO UPDATE`: the previous
    /// payload is discarded, never merged.
    pub async fn upsert(
        pool: &PgPool,
        user_id: UserId,
        module_key: &str,
        payload: &serde_json::Value,
    ) -> Result<ModuleData, sqlx::Error> {
        let query = format!(
            "INSERT INTO module_data (user_id, module_key, payload) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (user_id, module_key) DO UPDATE \
             SET payload = EXCLUDED.payload \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, ModuleData>(&query)
            .bind(user_id)
            .bind(module_key)
            .bind(payload)
            .fetch_one(pool)
            .await?;
        tracing::debug!(user_id, module_key, row_id = row.id, "Module payload upserted");
        Ok(row)
    }

    /// Delete a user's row for a module. Returns `true` if a row was removed.
    pub async fn delete(
        pool: &PgPool,
        user_id: UserId,
        module_key: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM module_data WHERE user_id = $1 AND module_key = $2")
            .bind(user_id)
            .bind(module_key)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List the module keys a user has saved, alphabetically.
    pub async fn list_keys(pool: &PgPool, user_id: UserId) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            "SELECT module_key FROM module_data WHERE user_id = $1 ORDER BY module_key ASC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }
}
