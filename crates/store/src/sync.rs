//! Debounced remote sync of one module payload.
//!
//! [`DebouncedSync`] owns a background task that holds at most one pending
//! payload. Every [`DebouncedSync::push`] replaces the pending payload and
//! restarts the quiet-period timer; when the timer elapses without another
//! change, the latest payload is upserted exactly once. A failed upsert is
//! logged and retried once after a short delay, then dropped. The remote
//! row is overwritten wholesale (last writer wins).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use studioos_core::settings::{merge_fields, Merged};
use studioos_core::types::UserId;
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::StoreError;

/// Delay before the single retry of a failed upsert.
pub const RETRY_DELAY: Duration = Duration::from_millis(500);

/// Remote storage for per-user module payloads.
#[async_trait]
pub trait ModuleSink: Send + Sync {
    /// Replace the payload stored for `(user_id, module_key)`.
    async fn upsert(&self, user_id: UserId, module_key: &str, payload: &Value)
        -> Result<(), StoreError>;

    /// The stored payload, or `None` if the row does not exist.
    async fn fetch(&self, user_id: UserId, module_key: &str) -> Result<Option<Value>, StoreError>;
}

/// Merge a remote payload over `default` field by field.
///
/// Fields absent remotely keep their default; a remote field that does not
/// decode into `T` is skipped, logged and reported in `rejected_fields`.
pub fn merge_remote<T>(default: T, remote: Option<&Value>) -> Merged<T>
where
    T: Serialize + DeserializeOwned,
{
    let merged = merge_fields(default, remote);
    if !merged.rejected_fields.is_empty() {
        tracing::warn!(
            fields = ?merged.rejected_fields,
            "Ignored remote fields with unexpected types"
        );
    }
    merged
}

// ---------------------------------------------------------------------------
// DebouncedSync
// ---------------------------------------------------------------------------

enum Command {
    Change(Value),
    Flush(oneshot::Sender<Result<(), StoreError>>),
}

/// Handle to a running debounced sync task.
pub struct DebouncedSync {
    module_key: String,
    tx: mpsc::UnboundedSender<Command>,
    cancel: CancellationToken,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl std::fmt::Debug for DebouncedSync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DebouncedSync")
            .field("module_key", &self.module_key)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}

impl DebouncedSync {
    /// Start the sync task for one `(user_id, module_key)` row.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn(
        sink: Arc<dyn ModuleSink>,
        user_id: UserId,
        module_key: impl Into<String>,
        quiet: Duration,
    ) -> Self {
        let module_key = module_key.into();
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        let worker = Worker {
            sink,
            user_id,
            module_key: module_key.clone(),
            quiet,
        };
        let handle = tokio::spawn(worker.run(rx, cancel.clone()));

        Self {
            module_key,
            tx,
            cancel,
            handle: Mutex::new(Some(handle)),
        }
    }

    pub fn module_key(&self) -> &str {
        &self.module_key
    }

    /// Record a new local value. Replaces any pending value and restarts
    /// the quiet period.
    pub fn push(&self, payload: Value) {
        if self.tx.send(Command::Change(payload)).is_err() {
            tracing::warn!(module_key = %self.module_key, "Sync task stopped, change dropped");
        }
    }

    /// Send the pending value now, if any, and wait for the result.
    pub async fn flush(&self) -> Result<(), StoreError> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.tx
            .send(Command::Flush(ack_tx))
            .map_err(|_| StoreError::Remote("Sync task is not running".into()))?;
        ack_rx
            .await
            .map_err(|_| StoreError::Remote("Sync task stopped before flushing".into()))?
    }

    /// Flush the pending value and stop the task.
    pub async fn shutdown(&self) {
        if let Err(e) = self.flush().await {
            tracing::warn!(module_key = %self.module_key, error = %e, "Final sync failed");
        }
        self.cancel.cancel();
        if let Some(handle) = self.handle.lock().await.take() {
            if let Err(e) = handle.await {
                tracing::error!(module_key = %self.module_key, error = %e, "Sync task panicked");
            }
        }
    }
}

impl Drop for DebouncedSync {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

struct Worker {
    sink: Arc<dyn ModuleSink>,
    user_id: UserId,
    module_key: String,
    quiet: Duration,
}

impl Worker {
    async fn run(self, mut rx: mpsc::UnboundedReceiver<Command>, cancel: CancellationToken) {
        let mut pending: Option<Value> = None;
        let timer = tokio::time::sleep(self.quiet);
        tokio::pin!(timer);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    if pending.is_some() {
                        tracing::warn!(module_key = %self.module_key, "Sync cancelled with unsent change");
                    }
                    break;
                }
                cmd = rx.recv() => match cmd {
                    Some(Command::Change(value)) => {
                        pending = Some(value);
                        timer.as_mut().reset(Instant::now() + self.quiet);
                    }
                    Some(Command::Flush(ack)) => {
                        let result = match pending.take() {
                            Some(value) => self.send(&value).await,
                            None => Ok(()),
                        };
                        let _ = ack.send(result);
                    }
                    None => break,
                },
                () = &mut timer, if pending.is_some() => {
                    if let Some(value) = pending.take() {
                        // Failure is already logged inside `send`.
                        let _ = self.send(&value).await;
                    }
                }
            }
        }
    }

    /// Upsert with one retry.
    async fn send(&self, payload: &Value) -> Result<(), StoreError> {
        match self.sink.upsert(self.user_id, &self.module_key, payload).await {
            Ok(()) => {
                tracing::debug!(user_id = self.user_id, module_key = %self.module_key, "Module synced");
                return Ok(());
            }
            Err(e) => {
                tracing::warn!(
                    user_id = self.user_id,
                    module_key = %self.module_key,
                    error = %e,
                    "Module sync failed, retrying once"
                );
            }
        }

        tokio::time::sleep(RETRY_DELAY).await;

        let result = self.sink.upsert(self.user_id, &self.module_key, payload).await;
        if let Err(e) = &result {
            tracing::error!(
                user_id = self.user_id,
                module_key = %self.module_key,
                error = %e,
                "Module sync failed after retry"
            );
        }
        result
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
