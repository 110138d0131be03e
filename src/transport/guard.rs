//! Single-session admission control.
//!
//! The bridge serves exactly one client at a time. [`SessionGuard::admit`]
//! checks the client's role and moves the guard from `Idle` to `Connected`
//! with a compare-and-set, so two connections racing through the handshake
//! cannot both win. The returned [`SessionTicket`] puts the guard back to
//! `Idle` when dropped, however the session ends.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use tracing::debug;

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

const IDLE: u8 = 0;
const CONNECTED: u8 = 1;

// ============================================================================
// SessionState
// ============================================================================

/// Guard state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No client connected.
    Idle,
    /// A client session is active.
    Connected,
}

// ============================================================================
// SessionGuard
// ============================================================================

/// Enforces one active session with the expected client role.
#[derive(Debug)]
pub struct SessionGuard {
    /// Role the client must announce (compared case-insensitively).
    expected_role: String,
    state: Arc<AtomicU8>,
}

impl SessionGuard {
    /// Creates an idle guard expecting `role`, ignoring surrounding whitespace.
    #[must_use]
    pub fn new(expected_role: impl Into<String>) -> Self {
        let expected_role: String = expected_role.into();
        Self {
            expected_role: expected_role.trim().to_string(),
            state: Arc::new(AtomicU8::new(IDLE)),
        }
    }

    /// Returns the expected client role.
    #[inline]
    #[must_use]
    pub fn expected_role(&self) -> &str {
        &self.expected_role
    }

    /// Returns the current state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> SessionState {
        match self.state.load(Ordering::Acquire) {
            CONNECTED => SessionState::Connected,
            _ => SessionState::Idle,
        }
    }

    /// Returns `true` if a session is active.
    #[inline]
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state() == SessionState::Connected
    }

    /// Admits a connecting client.
    ///
    /// `role` is the announced client role, `None` if it was not sent.
    ///
    /// # Errors
    ///
    /// - [`Error::UnsupportedClientRole`] if the role does not match
    /// - [`Error::ConnectionRejected`] if a session is already active
    pub fn admit(&self, role: Option<&str>) -> Result<SessionTicket> {
        let role = role.unwrap_or_default().trim();
        if !role.eq_ignore_ascii_case(&self.expected_role) {
            return Err(Error::unsupported_client_role(role));
        }

        self.state
            .compare_exchange(IDLE, CONNECTED, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| Error::ConnectionRejected)?;

        debug!(role, "Session admitted");

        Ok(SessionTicket {
            state: Arc::clone(&self.state),
        })
    }
}

// ============================================================================
// SessionTicket
// ============================================================================

/// Proof of the active session. Dropping it returns the guard to `Idle`.
#[derive(Debug)]
pub struct SessionTicket {
    state: Arc<AtomicU8>,
}

impl Drop for SessionTicket {
    fn drop(&mut self) {
        self.state.store(IDLE, Ordering::Release);
        debug!("Session released");
    }
}

// ============================================================================
// Tests
// ============================================================================
