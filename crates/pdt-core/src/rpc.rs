//! Request/response correlation across a message boundary.
//!
//! [`PendingRequests`] is the table of in-flight requests: each entry maps a
//! correlation id to the one-shot sender that completes it. Waiting is always
//! bounded by the table's timeout; an entry that times out is removed, so a
//! reply that never comes cannot leave anything attached.

use crate::protocol::CorrelationId;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tokio::sync::oneshot;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RpcError {
    #[error("TIMEOUT: no response to request {id} after {after:?}")]
    Timeout { id: CorrelationId, after: Duration },
    #[error("request id {0} is already outstanding")]
    Duplicate(CorrelationId),
    #[error("request {0} was dropped before it completed")]
    Dropped(CorrelationId),
}

/// Generates millisecond-timestamp correlation ids.
///
/// Two requests issued within the same millisecond would collide on a plain
/// timestamp, so every id is at least one greater than the previous one.
#[derive(Debug, Default)]
pub struct CorrelationIds {
    last: AtomicU64,
}

impl CorrelationIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> CorrelationId {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();
        let previous = self
            .last
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |last| {
                Some(now.max(last + 1))
            })
            .unwrap_or_else(|last| last);
        CorrelationId::new(now.max(previous + 1).to_string())
    }
}

/// A registered request waiting for its reply.
#[derive(Debug)]
pub struct PendingReply<T> {
    id: CorrelationId,
    rx: oneshot::Receiver<T>,
}

impl<T> PendingReply<T> {
    pub fn id(&self) -> &CorrelationId {
        &self.id
    }
}

/// Table of in-flight requests keyed by correlation id.
#[derive(Debug)]
pub struct PendingRequests<T> {
    ids: CorrelationIds,
    entries: Mutex<HashMap<CorrelationId, oneshot::Sender<T>>>,
    timeout: Duration,
}

impl<T> PendingRequests<T> {
    pub fn new(timeout: Duration) -> Self {
        Self {
            ids: CorrelationIds::new(),
            entries: Mutex::new(HashMap::new()),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Register a request under a fresh id.
    pub fn begin(&self) -> Result<PendingReply<T>, RpcError> {
        self.register(self.ids.next())
    }

    /// Register a request under `id`. Fails if `id` is still outstanding.
    pub fn register(&self, id: CorrelationId) -> Result<PendingReply<T>, RpcError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if entries.contains_key(&id) {
            return Err(RpcError::Duplicate(id));
        }
        let (tx, rx) = oneshot::channel();
        entries.insert(id.clone(), tx);
        Ok(PendingReply { id, rx })
    }

    /// Deliver `value` to the request waiting on `id`.
    /// Returns `false` if no such request is outstanding.
    pub fn complete(&self, id: &CorrelationId, value: T) -> bool {
        let sender = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id);
        match sender {
            Some(tx) => tx.send(value).is_ok(),
            None => false,
        }
    }

    /// Drop the entry for `id`, if any.
    pub fn cancel(&self, id: &CorrelationId) -> bool {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
            .is_some()
    }

    pub fn contains(&self, id: &CorrelationId) -> bool {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Wait for the reply, removing the entry if the timeout elapses first.
    pub async fn wait(&self, pending: PendingReply<T>) -> Result<T, RpcError> {
        let PendingReply { id, rx } = pending;
        match tokio::time::timeout(self.timeout, rx).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(_)) => {
                self.cancel(&id);
                Err(RpcError::Dropped(id))
            }
            Err(_) => {
                self.cancel(&id);
                log::warn!("request {id} timed out after {:?}", self.timeout);
                Err(RpcError::Timeout {
                    id,
                    after: self.timeout,
                })
            }
        }
    }
}
