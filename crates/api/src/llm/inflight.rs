//! De-duplication of identical in-flight proxy calls.
//!
//! While a call for a key is running, further calls with the same key await
//! the same upstream future instead of issuing their own. The entry is
//! removed when the first caller finishes or is dropped, so later calls go
//! upstream again.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::{BoxFuture, FutureExt, Shared};

use super::error::ProxyError;

type SharedCall = Shared<BoxFuture<'static, Result<String, ProxyError>>>;

#[derive(Default)]
pub struct InflightRequests {
    calls: Mutex<HashMap<String, SharedCall>>,
}

impl InflightRequests {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, SharedCall>> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of keys currently in flight.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Run `make()` under `key`, or join the call already running for it.
    ///
    /// `make` is only invoked when no call for `key` is in flight.
    pub async fn run<F, Fut>(self: &Arc<Self>, key: String, make: F) -> Result<String, ProxyError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, ProxyError>> + Send + 'static,
    {
        let (call, _owner) = {
            let mut calls = self.lock();
            match calls.get(&key) {
                Some(existing) => {
                    tracing::debug!(key = %key, "Joining in-flight AI request");
                    (existing.clone(), None)
                }
                None => {
                    let call = make().boxed().shared();
                    calls.insert(key.clone(), call.clone());
                    let owner = OwnerGuard {
                        registry: Arc::clone(self),
                        key,
                    };
                    (call, Some(owner))
                }
            }
        };
        call.await
    }
}

/// Removes the key when the call's originator completes or is cancelled.
struct OwnerGuard {
    registry: Arc<InflightRequests>,
    key: String,
}

impl Drop for OwnerGuard {
    fn drop(&mut self) {
        self.registry.lock().remove(&self.key);
    }
}
