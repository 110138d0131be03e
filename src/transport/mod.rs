//! Reverse WebSocket transport layer.
//!
//! The OneBot client dials the bridge; the bridge never dials out.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐                              ┌─────────────────┐
//! │  Bot (Rust)     │                              │  OneBot client  │
//! │                 │     reverse WebSocket        │  (NapCat, LLOB, │
//! │  BoundServer    │◄─────────────────────────────│   go-cqhttp...) │
//! │  → session loop │   ws://host:port/endpoint    │                 │
//! │                 │   X-Client-Role: Universal   │                 │
//! └─────────────────┘                              └─────────────────┘
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `guard` | Single-session admission and role check |
//! | `server` | Listener, accept loop and handshake |
//! | `session` | Per-connection read/write loop |

// ============================================================================
// Submodules
// ============================================================================

/// Single-session admission control.
pub mod guard;

/// Reverse WebSocket server.
pub mod server;

/// Active session event loop.
pub(crate) mod session;

// ============================================================================
// Re-exports
// ============================================================================

pub use guard::{SessionGuard, SessionState, SessionTicket};
pub use server::{BoundServer, CLIENT_ROLE_HEADER, SELF_ID_HEADER};
