//! Handlers for per-user module rows (`/api/v1/modules`).
//!
//! Each row holds one JSON payload keyed by `(user, module_key)` and is
//! replaced wholesale on every save.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use studioos_core::error::CoreError;
use studioos_core::storage_keys::validate_module_key;
use studioos_db::models::module_data::SaveModuleData;
use studioos_db::repositories::ModuleDataRepo;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/modules
///
/// List the caller's stored module keys.
pub async fn list_modules(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let keys = ModuleDataRepo::list_keys(&state.pool, user.user_id).await?;
    Ok(Json(DataResponse { data: keys }))
}

/// GET /api/v1/modules/{module_key}
///
/// Returns `{ "data": row }`, or `{ "data": null }` when nothing is stored.
pub async fn get_module(
    user: AuthUser,
    State(state): State<AppState>,
    Path(module_key): Path<String>,
) -> AppResult<impl IntoResponse> {
    validate_module_key(&module_key)?;
    let row = ModuleDataRepo::find(&state.pool, user.user_id, &module_key).await?;
    Ok(Json(DataResponse { data: row }))
}

/// PUT /api/v1/modules/{module_key}
///
/// Replace the stored payload (last writer wins).
pub async fn put_module(
    user: AuthUser,
    State(state): State<AppState>,
    Path(module_key): Path<String>,
    body: Result<Json<SaveModuleData>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    validate_module_key(&module_key)?;
    let Json(input) = body?;
    let row = ModuleDataRepo::upsert(&state.pool, user.user_id, &module_key, &input.payload).await?;

    tracing::info!(user_id = user.user_id, module_key = %module_key, "Module payload saved");

    Ok(Json(DataResponse { data: row }))
}

/// DELETE /api/v1/modules/{module_key}
pub async fn delete_module(
    user: AuthUser,
    State(state): State<AppState>,
    Path(module_key): Path<String>,
) -> AppResult<impl IntoResponse> {
    validate_module_key(&module_key)?;
    let deleted = ModuleDataRepo::delete(&state.pool, user.user_id, &module_key).await?;
    if !deleted {
        return Err(CoreError::NotFound {
            entity: "ModuleData",
            id: module_key,
        }
        .into());
    }

    tracing::info!(user_id = user.user_id, module_key = %module_key, "Module payload deleted");

    Ok(StatusCode::NO_CONTENT)
}
