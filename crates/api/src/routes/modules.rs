//! Route definitions for per-user module rows.

use axum::routing::get;
use axum::Router;

use crate::handlers::modules;
use crate::state::AppState;

/// Routes mounted at `/api/v1/modules`. Every route requires a Bearer token.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(modules::list_modules)).route(
        "/{module_key}",
        get(modules::get_module)
            .put(modules::put_module)
            .delete(modules::delete_module),
    )
}
