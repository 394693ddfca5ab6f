use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Errors from the AI proxy endpoints.
///
/// Rendered as exactly `{ "error": message }`: 400 for anything the caller
/// or deployment got wrong, 500 for upstream failures with the upstream
/// message passed through.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProxyError {
    #[error("Unknown task: {0}")]
    UnknownTask(String),

    #[error("Missing API key")]
    MissingCredentials,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Network failure, timeout, non-2xx status or unparseable reply.
    #[error("{0}")]
    Upstream(String),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::UnknownTask(_) | Self::MissingCredentials | Self::InvalidRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<reqwest::Error> for ProxyError {
    fn from(err: reqwest::Error) -> Self {
        Self::Upstream(err.to_string())
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "AI proxy upstream failure");
        } else {
            tracing::debug!(error = %self, "AI proxy request rejected");
        }
        (status, axum::Json(json!({ "error": self.to_string() }))).into_response()
    }
}
