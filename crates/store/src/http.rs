//! [`ModuleSink`] backed by the server's module endpoints.
//!
//! The bearer token identifies the user; `user_id` is only used for logs.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use studioos_core::settings::Merged;
use studioos_core::storage_keys::validate_module_key;
use studioos_core::types::UserId;

use crate::error::StoreError;
use crate::sync::{merge_remote, ModuleSink};

/// HTTP request timeout for a single module request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Serialize)]
struct SaveBody<'a> {
    payload: &'a Value,
}

#[derive(Deserialize)]
struct RowEnvelope {
    data: Option<Row>,
}

#[derive(Deserialize)]
struct Row {
    payload: Value,
}

pub struct HttpModuleSink {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl HttpModuleSink {
    /// `base_url` is the server root, e.g. `http://localhost:3000`.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    fn module_url(&self, module_key: &str) -> Result<String, StoreError> {
        validate_module_key(module_key)?;
        Ok(format!("{}/api/v1/modules/{module_key}", self.base_url))
    }

    /// Fetch a module payload and merge it field by field over `default`.
    ///
    /// A missing row yields `default` with nothing rejected.
    pub async fn fetch_merged<T>(
        &self,
        user_id: UserId,
        module_key: &str,
        default: T,
    ) -> Result<Merged<T>, StoreError>
    where
        T: Serialize + DeserializeOwned,
    {
        let remote = self.fetch(user_id, module_key).await?;
        Ok(merge_remote(default, remote.as_ref()))
    }
}

fn check_status(response: &reqwest::Response) -> Result<(), StoreError> {
    let status = response.status();
    if !status.is_success() {
        return Err(StoreError::Remote(format!(
            "Module endpoint returned HTTP {}",
            status.as_u16()
        )));
    }
    Ok(())
}

#[async_trait]
impl ModuleSink for HttpModuleSink {
    async fn upsert(
        &self,
        user_id: UserId,
        module_key: &str,
        payload: &Value,
    ) -> Result<(), StoreError> {
        let url = self.module_url(module_key)?;
        let response = self
            .client
            .put(&url)
            .bearer_auth(&self.token)
            .json(&SaveBody { payload })
            .send()
            .await?;
        check_status(&response)?;
        tracing::debug!(user_id, module_key, "Module payload uploaded");
        Ok(())
    }

    async fn fetch(&self, user_id: UserId, module_key: &str) -> Result<Option<Value>, StoreError> {
        let url = self.module_url(module_key)?;
        let response = self.client.get(&url).bearer_auth(&self.token).send().await?;
        check_status(&response)?;
        let envelope: RowEnvelope = response.json().await?;
        tracing::debug!(user_id, module_key, found = envelope.data.is_some(), "Module payload fetched");
        Ok(envelope.data.map(|row| row.payload))
    }
}
