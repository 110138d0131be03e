//! Inbound dispatch and event routing.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `dispatcher` | Result/event classification and routing |
//! | `router` | Handler registration and supervised fan-out |

// ============================================================================
// Submodules
// ============================================================================

/// Inbound frame dispatch.
pub mod dispatcher;

/// Event fan-out to registered handlers.
pub mod router;

// ============================================================================
// Re-exports
// ============================================================================

pub use dispatcher::Dispatcher;
pub use router::{EventHandler, EventRouter, RouteReport};
