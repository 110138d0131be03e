//! OneBot v11 message types.
//!
//! This module defines the JSON frames exchanged with the client over the
//! reverse WebSocket.
//!
//! # Protocol Overview
//!
//! | Message Type | Direction | Purpose |
//! |--------------|-----------|---------|
//! | `ActionRequest` | Bridge → Client | Action call with `echo` |
//! | `ActionResponse` | Client → Bridge | Result carrying the same `echo` |
//! | `Event` | Client → Bridge | Unsolicited notification with `post_type` |
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `event` | Event payloads and typed view |
//! | `frame` | Inbound decoding and result/event classification |
//! | `message` | Message segments for `send_msg` |
//! | `request` | Action request and result types |

// ============================================================================
// Submodules
// ============================================================================

/// Event message types.
pub mod event;

/// Inbound frame classification.
pub mod frame;

/// Message segments.
pub mod message;

/// Action request and result message types.
pub mod request;

// ============================================================================
// Re-exports
// ============================================================================

pub use event::{Event, ParsedEvent, PostType};
pub use frame::Frame;
pub use message::{MessageSegment, MessageTarget};
pub use request::{ActionRequest, ActionResponse, ResponseStatus};
