//! AI proxy: task dispatch, prompt templates and the upstream client.

pub mod client;
pub mod error;
pub mod inflight;
pub mod tasks;

use serde_json::{Map, Value};

pub use client::{ChatCompletion, OpenAiClient};
pub use error::ProxyError;
pub use inflight::InflightRequests;
pub use tasks::{strip_list_items, AssistTask, ListTask};

/// A parsed proxy request body: `{ "task": ..., ...fields }`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProxyRequest {
    pub task: String,
    /// Optional `entityId` used to de-duplicate concurrent calls.
    pub entity_id: Option<String>,
    /// Every field except `task`.
    pub fields: Map<String, Value>,
}

impl ProxyRequest {
    /// Parse a raw request body. Anything but a JSON object with a string
    /// `task` is a 400.
    pub fn parse(body: &[u8]) -> Result<Self, ProxyError> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| ProxyError::InvalidRequest(format!("Body must be JSON: {e}")))?;
        let Value::Object(mut fields) = value else {
            return Err(ProxyError::InvalidRequest("Body must be a JSON object".into()));
        };

        let task = match fields.remove("task") {
            Some(Value::String(task)) if !task.trim().is_empty() => task.trim().to_string(),
            _ => return Err(ProxyError::InvalidRequest("Missing task".into())),
        };

        let entity_id = match fields.get("entityId") {
            Some(Value::String(id)) if !id.is_empty() => Some(id.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };

        Ok(Self {
            task,
            entity_id,
            fields,
        })
    }

    /// Key under which identical concurrent calls are merged.
    ///
    /// `endpoint:task:entity` when an entity id is given, otherwise
    /// `endpoint:task:` followed by the canonical JSON of the fields.
    pub fn dedupe_key(&self, endpoint: &str) -> String {
        match &self.entity_id {
            Some(id) => format!("{endpoint}:{}:entity:{id}", self.task),
            None => {
                // Map keys serialize in sorted order, so equal bodies give equal keys.
                let canonical = serde_json::to_string(&self.fields).unwrap_or_default();
                format!("{endpoint}:{}:body:{canonical}", self.task)
            }
        }
    }
}
