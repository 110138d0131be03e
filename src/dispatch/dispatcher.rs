//! Inbound frame dispatch.
//!
//! Called by the session read loop once per frame, in arrival order.
//! Results resolve pending calls; events go to the [`EventRouter`].
//! Nothing here blocks or propagates an error past a single frame.

// ============================================================================
// Imports
// ============================================================================

use tracing::{debug, trace, warn};

use crate::correlation::PendingCalls;
use crate::protocol::Frame;

use super::EventRouter;

// ============================================================================
// Constants
// ============================================================================

/// Characters of a malformed frame included in its log line.
const LOG_PREVIEW_CHARS: usize = 256;

// ============================================================================
// Dispatcher
// ============================================================================

/// Routes decoded frames to the registry or the router.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    pending: PendingCalls,
    router: EventRouter,
}

impl Dispatcher {
    /// Creates a dispatcher over shared registry and router handles.
    #[inline]
    #[must_use]
    pub fn new(pending: PendingCalls, router: EventRouter) -> Self {
        Self { pending, router }
    }

    /// Decodes and routes one text frame.
    ///
    /// Malformed frames are logged and dropped.
    pub fn dispatch_text(&self, text: &str) {
        match Frame::decode(text) {
            Ok(frame) => self.classify_and_route(frame),
            Err(e) => warn!(
                error = %e,
                len = text.len(),
                preview = preview(text),
                "Dropping malformed frame"
            ),
        }
    }

    /// Routes one decoded frame.
    pub fn classify_and_route(&self, frame: Frame) {
        match frame {
            Frame::Result(response) => {
                let Some(id) = response.request_id() else {
                    debug!(echo = %response.echo, "Result with foreign echo dropped");
                    return;
                };

                if self.pending.resolve(id, response) {
                    trace!(%id, "Result delivered");
                } else {
                    debug!(%id, "Unmatched result dropped");
                }
            }
            Frame::Event(event) => {
                trace!(post_type = %event.post_type(), "Routing event");
                // Fire and forget; the router supervises its handlers.
                drop(self.router.route(event));
            }
        }
    }
}

/// Returns at most the first [`LOG_PREVIEW_CHARS`] characters of `text`.
fn preview(text: &str) -> &str {
    text.char_indices()
        .nth(LOG_PREVIEW_CHARS)
        .map_or(text, |(end, _)| &text[..end])
}

// ============================================================================
// Tests
// ============================================================================
