//! Pending-call registry.
//!
//! Maps each outstanding [`RequestId`] to the oneshot sender of the task
//! waiting for its result. An entry leaves the map exactly once: either
//! [`PendingCalls::resolve`] removes and fills it, or the waiter's
//! [`PendingCall`] handle removes it when dropped (after a timeout, a
//! cancelled future, or a completed wait).

// ============================================================================
// Imports
// ============================================================================

use std::collections::hash_map::Entry;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tokio::sync::oneshot;
use tokio::time::timeout;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::identifiers::RequestId;
use crate::protocol::ActionResponse;

// ============================================================================
// Constants
// ============================================================================

/// Default maximum number of pending calls.
pub const DEFAULT_MAX_PENDING: usize = 1024;

// ============================================================================
// Types
// ============================================================================

/// Map of request IDs to result channels.
type PendingMap = FxHashMap<RequestId, oneshot::Sender<ActionResponse>>;

// ============================================================================
// PendingCalls
// ============================================================================

/// Shared registry of calls awaiting a result.
///
/// Cloning yields another handle to the same registry.
#[derive(Debug, Clone)]
pub struct PendingCalls {
    /// Live entries.
    map: Arc<Mutex<PendingMap>>,
    /// Maximum number of live entries.
    capacity: usize,
}

impl Default for PendingCalls {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_MAX_PENDING)
    }
}

impl PendingCalls {
    /// Creates an empty registry with the given capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            map: Arc::new(Mutex::new(PendingMap::default())),
            capacity,
        }
    }

    /// Registers a waiting call.
    ///
    /// Must happen before the request is sent, so a fast result always
    /// finds its entry.
    ///
    /// # Errors
    ///
    /// - [`Error::DuplicateRequest`] if `id` is already pending
    /// - [`Error::TooManyPending`] if the registry is full
    pub fn register(&self, id: RequestId) -> Result<PendingCall> {
        let (tx, rx) = oneshot::channel();

        {
            let mut map = self.map.lock();
            if map.len() >= self.capacity {
                return Err(Error::TooManyPending {
                    limit: self.capacity,
                });
            }
            match map.entry(id) {
                Entry::Occupied(_) => return Err(Error::DuplicateRequest { request_id: id }),
                Entry::Vacant(slot) => {
                    slot.insert(tx);
                }
            }
        }

        trace!(%id, "Pending call registered");

        Ok(PendingCall {
            id,
            rx,
            registry: self.clone(),
        })
    }

    /// Delivers a result to the call waiting on `id`.
    ///
    /// Returns `false` (and does nothing else) if no such call is waiting:
    /// unknown IDs and late results after a timeout are ignored.
    pub fn resolve(&self, id: RequestId, response: ActionResponse) -> bool {
        let Some(tx) = self.map.lock().remove(&id) else {
            return false;
        };

        let delivered = tx.send(response).is_ok();
        trace!(%id, delivered, "Pending call resolved");
        delivered
    }

    /// Drops every pending entry.
    ///
    /// Waiters observe [`Error::ConnectionClosed`]. Returns the number of
    /// entries dropped.
    pub fn fail_all(&self) -> usize {
        let drained: Vec<_> = self.map.lock().drain().collect();
        let count = drained.len();
        drop(drained);

        if count > 0 {
            debug!(count, "Failed pending calls");
        }
        count
    }

    /// Returns `true` if `id` is pending.
    #[inline]
    #[must_use]
    pub fn contains(&self, id: RequestId) -> bool {
        self.map.lock().contains_key(&id)
    }

    /// Returns the number of pending calls.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.lock().len()
    }

    /// Returns `true` if nothing is pending.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.lock().is_empty()
    }

    /// Returns the configured capacity.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Removes `id` only if its receiver is gone.
    ///
    /// A wrapped-around ID registered by a newer call keeps its live entry.
    fn remove_abandoned(&self, id: RequestId) {
        let mut map = self.map.lock();
        if map.get(&id).is_some_and(oneshot::Sender::is_closed) {
            map.remove(&id);
            trace!(%id, "Abandoned pending call removed");
        }
    }
}

// ============================================================================
// PendingCall
// ============================================================================

/// Handle to a registered call.
///
/// Dropping the handle abandons the call and removes its entry.
#[derive(Debug)]
pub struct PendingCall {
    id: RequestId,
    rx: oneshot::Receiver<ActionResponse>,
    registry: PendingCalls,
}

impl PendingCall {
    /// Returns the request ID.
    #[inline]
    #[must_use]
    pub fn id(&self) -> RequestId {
        self.id
    }

    /// Waits for the result, up to `wait`.
    ///
    /// # Errors
    ///
    /// - [`Error::Timeout`] if no result arrives in time
    /// - [`Error::ConnectionClosed`] if the registry was torn down
    pub async fn await_result(mut self, wait: Duration) -> Result<ActionResponse> {
        match timeout(wait, &mut self.rx).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(_)) => Err(Error::ConnectionClosed),
            Err(_) => {
                debug!(id = %self.id, timeout_ms = wait.as_millis() as u64, "Pending call timed out");
                Err(Error::timeout(self.id, wait.as_millis() as u64))
            }
        }
    }
}

impl Drop for PendingCall {
    fn drop(&mut self) {
        self.rx.close();
        self.registry.remove_abandoned(self.id);
    }
}

// ============================================================================
// Tests
// ============================================================================
