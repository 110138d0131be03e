//! Reverse WebSocket server the OneBot client dials into.
//!
//! # Connection Flow
//!
//! 1. The bot binds a TCP listener (`Bot::bind`)
//! 2. The client connects to `ws://host:port{endpoint}`
//! 3. The handshake callback checks the path, the `X-Client-Role` header and
//!    the session guard, refusing with 404, 403 or 409
//! 4. The admitted connection runs the session loop until it disconnects
//! 5. The guard returns to idle and the next connection may be admitted

// ============================================================================
// Imports
// ============================================================================

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_tungstenite::accept_hdr_async;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::StatusCode;
use tracing::{debug, error, info, warn};

use crate::bot::core::BotShared;
use crate::dispatch::Dispatcher;
use crate::error::{Error, Result};

use super::guard::SessionTicket;
use super::session::run_session;

// ============================================================================
// Constants
// ============================================================================

/// Header carrying the client role.
pub const CLIENT_ROLE_HEADER: &str = "X-Client-Role";

/// Header carrying the bot account ID.
pub const SELF_ID_HEADER: &str = "X-Self-ID";

/// Interval at which the accept loop checks the shutdown flag.
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(100);

// ============================================================================
// BoundServer
// ============================================================================

/// A listener bound for the bot, not yet accepting.
///
/// # Example
///
/// ```ignore
/// let server = bot.bind().await?;
/// println!("Point the client at {}", server.ws_url());
/// server.run().await?;
/// ```
pub struct BoundServer {
    listener: TcpListener,
    local_addr: SocketAddr,
    shared: Arc<BotShared>,
}

impl BoundServer {
    /// Binds a listener to `addr`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if binding fails.
    pub(crate) async fn bind(shared: Arc<BotShared>, addr: SocketAddr) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        shared.shutdown.store(false, Ordering::SeqCst);

        debug!(%local_addr, "Reverse WebSocket server bound");

        Ok(Self {
            listener,
            local_addr,
            shared,
        })
    }

    /// Returns the bound address.
    #[inline]
    #[must_use]
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Returns the URL the client should dial.
    ///
    /// Format: `ws://{addr}{endpoint}`
    #[must_use]
    pub fn ws_url(&self) -> String {
        format!("ws://{}{}", self.local_addr, self.shared.config.endpoint)
    }

    /// Accepts connections until [`Bot::shutdown`](crate::Bot::shutdown).
    ///
    /// # Errors
    ///
    /// Never fails today; per-connection errors are logged.
    pub async fn run(self) -> Result<()> {
        info!(url = %self.ws_url(), "Waiting for OneBot client");

        loop {
            if self.shared.shutdown.load(Ordering::SeqCst) {
                debug!("Accept loop shutting down");
                break;
            }

            // Accept with timeout to allow checking shutdown flag
            match timeout(ACCEPT_POLL_INTERVAL, self.listener.accept()).await {
                Ok(Ok((stream, addr))) => {
                    let shared = Arc::clone(&self.shared);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(shared, stream, addr).await {
                            warn!(error = %e, %addr, "Connection refused");
                        }
                    });
                }
                Ok(Err(e)) => {
                    error!(error = %e, "Accept failed");
                }
                Err(_) => continue,
            }
        }

        Ok(())
    }
}

impl std::fmt::Debug for BoundServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundServer")
            .field("local_addr", &self.local_addr)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Connection Handling
// ============================================================================

/// Upgrades, admits and serves a single connection.
async fn handle_connection(
    shared: Arc<BotShared>,
    stream: TcpStream,
    addr: SocketAddr,
) -> Result<()> {
    debug!(%addr, "New TCP connection");

    let mut admission: Option<Result<SessionTicket>> = None;
    let mut self_id: Option<String> = None;

    let callback = |request: &Request, response: Response| {
        if request.uri().path() != shared.config.endpoint {
            return Err(reject(StatusCode::NOT_FOUND, "unknown endpoint"));
        }

        let header = |name: &str| {
            request
                .headers()
                .get(name)
                .and_then(|value| value.to_str().ok())
        };
        self_id = header(SELF_ID_HEADER).map(str::to_string);

        match shared.guard.admit(header(CLIENT_ROLE_HEADER)) {
            Ok(ticket) => {
                admission = Some(Ok(ticket));
                Ok(response)
            }
            Err(e) => {
                let status = match e {
                    Error::ConnectionRejected => StatusCode::CONFLICT,
                    _ => StatusCode::FORBIDDEN,
                };
                let response = reject(status, &e.to_string());
                admission = Some(Err(e));
                Err(response)
            }
        }
    };

    let upgraded = accept_hdr_async(stream, callback).await;

    let (ws_stream, ticket) = match (upgraded, admission) {
        (Ok(ws_stream), Some(Ok(ticket))) => (ws_stream, ticket),
        (_, Some(Err(e))) => return Err(e),
        (Err(e), _) => return Err(Error::WebSocket(e)),
        (Ok(_), None) => {
            return Err(Error::connection("handshake completed without admission"));
        }
    };

    info!(%addr, self_id = self_id.as_deref().unwrap_or("unknown"), "OneBot client connected");

    let dispatcher = Dispatcher::new(shared.pending.clone(), shared.router.clone());
    run_session(
        ws_stream,
        dispatcher,
        &shared.pending,
        &shared.outbound,
        &shared.shutdown,
    )
    .await;
    drop(ticket);

    info!(%addr, "OneBot client disconnected");
    Ok(())
}

/// Builds a handshake refusal.
fn reject(status: StatusCode, reason: &str) -> ErrorResponse {
    let mut response = ErrorResponse::new(Some(reason.to_string()));
    *response.status_mut() = status;
    response
}

// ============================================================================
// Tests
// ============================================================================
