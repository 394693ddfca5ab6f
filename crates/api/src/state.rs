use std::sync::Arc;

use crate::config::ServerConfig;
use crate::llm::{ChatCompletion, InflightRequests};

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything shared is behind `Arc` or already `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: studioos_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Upstream language-model client used by the AI proxy.
    pub llm: Arc<dyn ChatCompletion>,
    /// AI proxy calls currently running, keyed for de-duplication.
    pub inflight: Arc<InflightRequests>,
}
