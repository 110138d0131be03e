//! Event fan-out to registered handlers.
//!
//! Each routed event gets one supervisor task. The supervisor spawns every
//! handler into a [`JoinSet`] and logs failures as they complete, so a slow,
//! failing or panicking handler never blocks the read loop or the other
//! handlers.

// ============================================================================
// Imports
// ============================================================================

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{error, trace, warn};

use crate::error::Result;
use crate::protocol::Event;

// ============================================================================
// EventHandler
// ============================================================================

/// Receives events pushed by the client.
///
/// Implemented for any `Fn(Event) -> impl Future<Output = Result<()>>`
/// closure, so most handlers are plain async closures:
///
/// ```ignore
/// bot.on_event(|event: Event| async move {
///     tracing::info!(post_type = %event.post_type(), "event");
///     Ok(())
/// });
/// ```
#[async_trait]
pub trait EventHandler: Send + Sync + 'static {
    /// Handles one event. Errors are logged and otherwise ignored.
    async fn handle(&self, event: Event) -> Result<()>;
}

#[async_trait]
impl<F, Fut> EventHandler for F
where
    F: Fn(Event) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    async fn handle(&self, event: Event) -> Result<()> {
        (self)(event).await
    }
}

// ============================================================================
// RouteReport
// ============================================================================

/// Outcome of delivering one event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteReport {
    /// Handlers that returned `Ok`.
    pub succeeded: usize,
    /// Handlers that returned `Err` or panicked.
    pub failed: usize,
}

// ============================================================================
// EventRouter
// ============================================================================

/// Append-only list of event handlers.
///
/// Cloning yields another handle to the same list.
#[derive(Clone, Default)]
pub struct EventRouter {
    handlers: Arc<RwLock<Vec<Arc<dyn EventHandler>>>>,
}

impl EventRouter {
    /// Creates an empty router.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a handler. Handlers are spawned in registration order.
    pub fn register(&self, handler: impl EventHandler) {
        self.handlers.write().push(Arc::new(handler));
    }

    /// Appends an async closure as a handler.
    pub fn register_fn<F, Fut>(&self, handler: F)
    where
        F: Fn(Event) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.register(handler);
    }

    /// Returns the number of registered handlers.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.read().len()
    }

    /// Returns `true` if no handler is registered.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.read().is_empty()
    }

    /// Delivers `event` to every handler without waiting for them.
    ///
    /// Must be called within a Tokio runtime. The returned handle resolves
    /// once all handlers finished; callers may ignore it.
    pub fn route(&self, event: Event) -> JoinHandle<RouteReport> {
        let handlers: Vec<_> = self.handlers.read().iter().map(Arc::clone).collect();

        tokio::spawn(async move {
            let mut tasks = JoinSet::new();
            for (index, handler) in handlers.into_iter().enumerate() {
                let event = event.clone();
                tasks.spawn(async move { (index, handler.handle(event).await) });
            }

            let mut report = RouteReport::default();
            while let Some(joined) = tasks.join_next().await {
                match joined {
                    Ok((_, Ok(()))) => report.succeeded += 1,
                    Ok((index, Err(e))) => {
                        warn!(handler = index, error = %e, "Event handler failed");
                        report.failed += 1;
                    }
                    Err(e) => {
                        error!(error = %e, "Event handler panicked");
                        report.failed += 1;
                    }
                }
            }

            trace!(
                succeeded = report.succeeded,
                failed = report.failed,
                "Event routed"
            );
            report
        })
    }
}

impl std::fmt::Debug for EventRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventRouter")
            .field("handlers", &self.len())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
