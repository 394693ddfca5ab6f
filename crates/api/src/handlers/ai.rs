//! Handlers for the AI proxy endpoints.
//!
//! Both endpoints take `{ task, ...fields }`, pick a prompt template by
//! task name and forward one chat completion upstream. The body is parsed
//! by hand so that malformed input still answers with `{ "error": ... }`.

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::llm::{strip_list_items, AssistTask, ListTask, ProxyError, ProxyRequest};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct AssistResponse {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub text: String,
    pub items: Vec<String>,
}

/// POST /api/ai/assist
pub async fn assist(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<AssistResponse>, ProxyError> {
    let request = ProxyRequest::parse(&body)?;
    let task = AssistTask::from_name(&request.task)?;
    let prompt = task.prompt(&request.fields);

    let text = complete(&state, "assist", &request, prompt).await?;
    Ok(Json(AssistResponse { text }))
}

/// POST /api/ai/list
pub async fn list(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ListResponse>, ProxyError> {
    let request = ProxyRequest::parse(&body)?;
    let task = ListTask::from_name(&request.task)?;
    let prompt = task.prompt(&request.fields);

    let text = complete(&state, "list", &request, prompt).await?;
    let items = strip_list_items(&text);
    Ok(Json(ListResponse { text, items }))
}

/// Check credentials, then run (or join) the upstream call and trim the reply.
async fn complete(
    state: &AppState,
    endpoint: &str,
    request: &ProxyRequest,
    prompt: String,
) -> Result<String, ProxyError> {
    if !state.llm.has_credentials() {
        return Err(ProxyError::MissingCredentials);
    }

    let llm = state.llm.clone();
    let key = request.dedupe_key(endpoint);
    let raw = state
        .inflight
        .run(key, move || async move { llm.complete(&prompt).await })
        .await?;

    tracing::info!(endpoint, task = %request.task, chars = raw.len(), "AI proxy completed");
    Ok(raw.trim().to_string())
}
