//! Core bot implementation.
//!
//! [`Bot`] owns the correlation state (allocator, pending calls), the
//! handler list, the session guard and the outbound slot of the active
//! session. It is cheap to clone; clones share everything.

// ============================================================================
// Imports
// ============================================================================

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::correlation::{PendingCalls, SequenceAllocator};
use crate::dispatch::{EventHandler, EventRouter};
use crate::error::{Error, Result};
use crate::protocol::{ActionRequest, Event, MessageSegment, MessageTarget};
use crate::transport::BoundServer;
use crate::transport::{SessionGuard, SessionState};
use crate::transport::session::{Outbound, SessionCommand};

use super::builder::BotBuilder;
use super::config::BotConfig;

// ============================================================================
// BotShared
// ============================================================================

/// State shared between the bot handle, the server and the session.
pub(crate) struct BotShared {
    pub(crate) config: BotConfig,
    pub(crate) sequence: SequenceAllocator,
    pub(crate) pending: PendingCalls,
    pub(crate) router: EventRouter,
    pub(crate) guard: SessionGuard,
    pub(crate) outbound: Outbound,
    pub(crate) shutdown: AtomicBool,
}

impl BotShared {
    /// Creates idle shared state for `config`.
    pub(crate) fn new(config: BotConfig) -> Self {
        Self {
            sequence: SequenceAllocator::new(),
            pending: PendingCalls::with_capacity(config.max_pending),
            router: EventRouter::new(),
            guard: SessionGuard::new(config.client_role.clone()),
            outbound: Outbound::default(),
            shutdown: AtomicBool::new(false),
            config,
        }
    }
}

// ============================================================================
// Bot
// ============================================================================

/// Handle to a OneBot v11 reverse WebSocket bridge.
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
///
/// use onebot_bridge::{Bot, Event, MessageSegment, MessageTarget, ParsedEvent, Result};
///
/// # async fn example() -> Result<()> {
/// let bot = Bot::builder().endpoint("/ws/").build()?;
///
/// let replier = bot.clone();
/// bot.on_event(move |event: Event| {
///     let bot = replier.clone();
///     async move {
///         if let ParsedEvent::Message { group_id: Some(group), raw_message, .. } = event.parse() {
///             bot.send_message(MessageTarget::Group(group), &[MessageSegment::text(raw_message)])
///                 .await?;
///         }
///         Ok(())
///     }
/// });
///
/// bot.serve().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Bot {
    shared: Arc<BotShared>,
}

// ============================================================================
// Bot - Constructor
// ============================================================================

impl Bot {
    /// Creates a new bot builder.
    #[inline]
    #[must_use]
    pub fn builder() -> BotBuilder {
        BotBuilder::new()
    }

    /// Creates a bot from a validated configuration.
    pub(crate) fn new(config: BotConfig) -> Self {
        Self {
            shared: Arc::new(BotShared::new(config)),
        }
    }
}

// ============================================================================
// Bot - Accessors
// ============================================================================

impl Bot {
    /// Returns the configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &BotConfig {
        &self.shared.config
    }

    /// Returns `true` once a client session is ready to carry calls.
    #[inline]
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.shared.outbound.sender().is_some()
    }

    /// Returns the session guard state.
    ///
    /// `Connected` from admission until the session has fully torn down.
    #[inline]
    #[must_use]
    pub fn session_state(&self) -> SessionState {
        self.shared.guard.state()
    }

    /// Returns the number of calls awaiting a result.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.shared.pending.len()
    }

    /// Returns the number of registered event handlers.
    #[inline]
    #[must_use]
    pub fn handler_count(&self) -> usize {
        self.shared.router.len()
    }
}

// ============================================================================
// Bot - Event Handlers
// ============================================================================

impl Bot {
    /// Registers an async closure invoked for every event.
    ///
    /// Handlers run concurrently with each other and with the read loop.
    /// An `Err` or panic in one handler is logged and does not affect the
    /// others.
    pub fn on_event<F, Fut>(&self, handler: F)
    where
        F: Fn(Event) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.shared.router.register_fn(handler);
    }

    /// Registers a handler object invoked for every event.
    pub fn add_handler(&self, handler: impl EventHandler) {
        self.shared.router.register(handler);
    }
}

// ============================================================================
// Bot - Actions
// ============================================================================

impl Bot {
    /// Calls a OneBot action and waits for its result.
    ///
    /// Returns the result's `data` (`Value::Null` if absent).
    ///
    /// # Errors
    ///
    /// - [`Error::NotConnected`] if no client is connected
    /// - [`Error::Timeout`] if no result arrives within `timeout`
    /// - [`Error::RemoteFailure`] if the client reports `failed`
    /// - [`Error::ConnectionClosed`] if the session ends while waiting
    /// - [`Error::TooManyPending`] if the pending-call limit is reached
    pub async fn call<P>(&self, action: &str, params: P, timeout: Duration) -> Result<Value>
    where
        P: Serialize,
    {
        let params = serde_json::to_value(params)?;
        let sender = self.shared.outbound.sender().ok_or(Error::NotConnected)?;

        let echo = self.shared.sequence.next();
        let pending = self.shared.pending.register(echo)?;

        let frame = serde_json::to_string(&ActionRequest::new(action, params, echo))?;
        sender
            .send(SessionCommand::Send(frame))
            .map_err(|_| Error::ConnectionClosed)?;

        debug!(action, %echo, "Action sent");

        let response = pending
            .await_result(timeout)
            .await
            .inspect_err(|e| debug!(action, %echo, error = %e, "Action did not complete"))?;

        response.into_result()
    }

    /// Calls a OneBot action with the configured default timeout.
    ///
    /// # Errors
    ///
    /// As [`Bot::call`].
    pub async fn call_default<P>(&self, action: &str, params: P) -> Result<Value>
    where
        P: Serialize,
    {
        self.call(action, params, self.shared.config.default_timeout())
            .await
    }

    /// Sends a message and returns its `message_id`.
    ///
    /// # Errors
    ///
    /// - As [`Bot::call`]
    /// - [`Error::MalformedFrame`] if the result has no `message_id`
    pub async fn send_message(
        &self,
        target: MessageTarget,
        message: &[MessageSegment],
    ) -> Result<i64> {
        let data = self
            .call_default("send_msg", target.send_msg_params(message))
            .await?;

        let message_id = data
            .get("message_id")
            .and_then(Value::as_i64)
            .ok_or_else(|| Error::malformed_frame("send_msg result has no message_id"))?;

        debug!(message_id, ?target, "Message sent");
        Ok(message_id)
    }
}

// ============================================================================
// Bot - Lifecycle
// ============================================================================

impl Bot {
    /// Binds the configured address.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if binding fails.
    pub async fn bind(&self) -> Result<BoundServer> {
        self.bind_to(self.shared.config.bind_addr()).await
    }

    /// Binds a specific address (port 0 for random).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if binding fails.
    pub async fn bind_to(&self, addr: SocketAddr) -> Result<BoundServer> {
        BoundServer::bind(Arc::clone(&self.shared), addr).await
    }

    /// Binds the configured address and serves until [`Bot::shutdown`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if binding fails.
    pub async fn serve(&self) -> Result<()> {
        self.bind().await?.run().await
    }

    /// Stops accepting connections and closes the active session.
    ///
    /// Pending calls fail with [`Error::ConnectionClosed`].
    pub fn shutdown(&self) {
        info!("Bot shutting down");
        self.shared.shutdown.store(true, Ordering::SeqCst);
        self.shared.outbound.close();
    }
}

impl std::fmt::Debug for Bot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bot")
            .field("config", &self.shared.config)
            .field("connected", &self.is_connected())
            .field("pending", &self.pending_count())
            .field("handlers", &self.handler_count())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
