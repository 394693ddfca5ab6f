//! Route definitions for the AI proxy.

use axum::routing::post;
use axum::Router;

use crate::handlers::ai;
use crate::state::AppState;

/// Routes mounted at `/api/ai`. Public; the upstream key never leaves the server.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/assist", post(ai::assist))
        .route("/list", post(ai::list))
}
