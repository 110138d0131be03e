//! Active client session and its event loop.
//!
//! One task per session owns both halves of the WebSocket:
//!
//! - Incoming frames are handed to the [`Dispatcher`] in arrival order
//! - Outgoing action frames arrive through [`Outbound`] and are written one
//!   whole frame at a time
//!
//! When the loop ends the outbound slot is detached and every pending call
//! fails with [`Error::ConnectionClosed`](crate::Error::ConnectionClosed).

// ============================================================================
// Imports
// ============================================================================

use std::sync::atomic::{AtomicBool, Ordering};

use futures_util::{SinkExt, StreamExt};
use parking_lot::RwLock;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, trace, warn};

use crate::correlation::PendingCalls;
use crate::dispatch::Dispatcher;

// ============================================================================
// SessionCommand
// ============================================================================

/// Commands for the session loop.
#[derive(Debug)]
pub(crate) enum SessionCommand {
    /// Write one serialized frame.
    Send(String),
    /// Close the connection.
    Close,
}

// ============================================================================
// Outbound
// ============================================================================

/// Slot holding the active session's command sender.
#[derive(Debug, Default)]
pub(crate) struct Outbound {
    tx: RwLock<Option<mpsc::UnboundedSender<SessionCommand>>>,
}

impl Outbound {
    /// Returns the active session's sender, if any.
    pub(crate) fn sender(&self) -> Option<mpsc::UnboundedSender<SessionCommand>> {
        self.tx.read().clone()
    }

    /// Asks the active session, if any, to close.
    pub(crate) fn close(&self) {
        if let Some(tx) = self.tx.read().as_ref() {
            let _ = tx.send(SessionCommand::Close);
        }
    }

    /// Installs the sender of a newly started session.
    pub(crate) fn attach(&self, tx: mpsc::UnboundedSender<SessionCommand>) {
        *self.tx.write() = Some(tx);
    }

    /// Clears the slot; later calls fail with `NotConnected`.
    pub(crate) fn detach(&self) {
        *self.tx.write() = None;
    }
}

// ============================================================================
// Session Loop
// ============================================================================

/// Runs the session until the client disconnects or a close is requested.
///
/// A session attached after `shutdown` was raised closes immediately.
pub(crate) async fn run_session<S>(
    ws_stream: WebSocketStream<S>,
    dispatcher: Dispatcher,
    pending: &PendingCalls,
    outbound: &Outbound,
    shutdown: &AtomicBool,
) where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (mut ws_write, mut ws_read) = ws_stream.split();
    let (command_tx, mut command_rx) = mpsc::unbounded_channel();
    outbound.attach(command_tx.clone());

    // Shutdown stores the flag before closing the slot, so one of the two
    // always observes the other.
    if shutdown.load(Ordering::SeqCst) {
        let _ = command_tx.send(SessionCommand::Close);
    }
    drop(command_tx);

    loop {
        tokio::select! {
            // Incoming frames from the client
            message = ws_read.next() => {
                match message {
                    Some(Ok(Message::Text(text))) => dispatcher.dispatch_text(&text),

                    Some(Ok(Message::Binary(bytes))) => match std::str::from_utf8(&bytes) {
                        Ok(text) => dispatcher.dispatch_text(text),
                        Err(_) => warn!(len = bytes.len(), "Dropping non-UTF-8 binary frame"),
                    },

                    Some(Ok(Message::Close(frame))) => {
                        debug!(?frame, "WebSocket closed by client");
                        break;
                    }

                    Some(Err(e)) => {
                        warn!(error = %e, "WebSocket error");
                        break;
                    }

                    None => {
                        debug!("WebSocket stream ended");
                        break;
                    }

                    // Ping/Pong are answered by tungstenite
                    Some(Ok(_)) => {}
                }
            }

            // Commands from the bot API
            command = command_rx.recv() => {
                match command {
                    Some(SessionCommand::Send(text)) => {
                        if let Err(e) = ws_write.send(Message::Text(text.into())).await {
                            warn!(error = %e, "Failed to write frame");
                            break;
                        }
                        trace!("Frame written");
                    }

                    Some(SessionCommand::Close) => {
                        debug!("Close requested");
                        let _ = ws_write.close().await;
                        break;
                    }

                    None => {
                        debug!("Command channel closed");
                        break;
                    }
                }
            }
        }
    }

    // Order matters: no new frame can be queued once the receiver is gone,
    // and every call registered before this point is failed.
    outbound.detach();
    drop(command_rx);
    pending.fail_all();

    debug!("Session loop terminated");
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use tokio_tungstenite::tungstenite::protocol::Role;

    use crate::dispatch::EventRouter;

    async fn ws_pair() -> (
        WebSocketStream<tokio::io::DuplexStream>,
        WebSocketStream<tokio::io::DuplexStream>,
    ) {
        let (server_io, client_io) = tokio::io::duplex(4096);
        let server = WebSocketStream::from_raw_socket(server_io, Role::Server, None).await;
        let client = WebSocketStream::from_raw_socket(client_io, Role::Client, None).await;
        (server, client)
    }

    #[tokio::test]
    async fn test_session_started_during_shutdown_closes() {
        let (server, mut client) = ws_pair().await;
        let pending = PendingCalls::default();
        let outbound = Outbound::default();
        let shutdown = AtomicBool::new(true);
        let dispatcher = Dispatcher::new(pending.clone(), EventRouter::new());

        let session = run_session(server, dispatcher, &pending, &outbound, &shutdown);
        let client_side = async {
            loop {
                match client.next().await {
                    Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                    Some(Ok(_)) => continue,
                }
            }
        };

        tokio::time::timeout(Duration::from_secs(2), async {
            tokio::join!(session, client_side)
        })
        .await
        .expect("session closed promptly");
        assert!(outbound.sender().is_none());
    }

    #[tokio::test]
    async fn test_session_ends_fail_pending_calls() {
        let (server, client) = ws_pair().await;
        let pending = PendingCalls::default();
        let outbound = Outbound::default();
        let shutdown = AtomicBool::new(false);
        let dispatcher = Dispatcher::new(pending.clone(), EventRouter::new());
        let call = pending
            .register(crate::RequestId::new(1).expect("valid id"))
            .expect("register");

        drop(client);
        run_session(server, dispatcher, &pending, &outbound, &shutdown).await;

        let err = call
            .await_result(Duration::from_secs(1))
            .await
            .expect_err("session ended");
        assert!(matches!(err, crate::Error::ConnectionClosed));
        assert!(outbound.sender().is_none());
    }
}
