//! Request/result correlation.
//!
//! Every action call gets a fresh [`RequestId`](crate::RequestId) from the
//! [`SequenceAllocator`], is registered in [`PendingCalls`] before the frame
//! is sent, and waits on its [`PendingCall`] until the dispatcher resolves
//! it or the timeout fires.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `registry` | Pending-call map and waitable handles |
//! | `sequence` | Lock-free request ID allocator |

// ============================================================================
// Submodules
// ============================================================================

/// Pending-call registry.
pub mod registry;

/// Request ID allocation.
pub mod sequence;

// ============================================================================
// Re-exports
// ============================================================================

pub use registry::{DEFAULT_MAX_PENDING, PendingCall, PendingCalls};
pub use sequence::SequenceAllocator;
