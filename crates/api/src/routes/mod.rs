pub mod ai;
pub mod health;
pub mod modules;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /modules                      list the caller's module keys
/// /modules/{module_key}         get, put (replace), delete
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/modules", modules::router())
}
