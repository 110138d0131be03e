//! OneBot v11 reverse WebSocket bridge.
//!
//! A chat-bot client (NapCat, LLOneBot, go-cqhttp, ...) dials into this
//! crate over a single long-lived WebSocket. The application calls OneBot
//! actions and awaits their results, while the client pushes events that
//! are fanned out to registered handlers.
//!
//! # Architecture
//!
//! - **Correlation**: every call gets a non-zero `echo`, is registered
//!   before its frame is written, and waits until the matching result
//!   arrives or its own timeout fires
//! - **Dispatch**: the session read loop classifies each frame as a result
//!   (usable `echo`) or an event, and never waits for handlers
//! - **Session guard**: exactly one client at a time, with the expected
//!   `X-Client-Role`
//!
//! # Quick Start
//!
//! ```no_run
//! use onebot_bridge::{Bot, Event, ParsedEvent, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let bot = Bot::builder().port(8080).endpoint("/ws/").build()?;
//!
//!     bot.on_event(|event: Event| async move {
//!         if let ParsedEvent::Heartbeat { interval, .. } = event.parse() {
//!             println!("heartbeat, next in {interval}ms");
//!         }
//!         Ok(())
//!     });
//!
//!     bot.serve().await
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`bot`] | [`Bot`] facade, builder and configuration |
//! | [`correlation`] | Request IDs and pending calls |
//! | [`dispatch`] | Frame dispatch and event handlers |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`protocol`] | OneBot v11 message types |
//! | [`transport`] | Reverse WebSocket server and session guard |

// ============================================================================
// Modules
// ============================================================================

/// Bot facade, builder and configuration.
pub mod bot;

/// Request/result correlation.
pub mod correlation;

/// Inbound frame dispatch and event routing.
pub mod dispatch;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Type-safe identifiers.
pub mod identifiers;

/// OneBot v11 message types.
pub mod protocol;

/// Reverse WebSocket transport layer.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Bot types
pub use bot::{Bot, BotBuilder, BotConfig};

// Dispatch types
pub use dispatch::{EventHandler, RouteReport};

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::RequestId;

// Protocol types
pub use protocol::{
    ActionRequest, ActionResponse, Event, MessageSegment, MessageTarget, ParsedEvent, PostType,
    ResponseStatus,
};

// Transport types
pub use transport::{BoundServer, SessionState};
