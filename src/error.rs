//! Error types for the OneBot bridge.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use onebot_bridge::{Bot, Result};
//!
//! async fn login_name(bot: &Bot) -> Result<String> {
//!     let data = bot.call_default("get_login_info", serde_json::json!({})).await?;
//!     Ok(data["nickname"].as_str().unwrap_or_default().to_string())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`] |
//! | Acceptance | [`Error::UnsupportedClientRole`], [`Error::ConnectionRejected`] |
//! | Connection | [`Error::Connection`], [`Error::NotConnected`], [`Error::ConnectionClosed`] |
//! | Protocol | [`Error::MalformedFrame`] |
//! | Call | [`Error::Timeout`], [`Error::RemoteFailure`], [`Error::TooManyPending`], [`Error::DuplicateRequest`] |
//! | External | [`Error::Io`], [`Error::Json`], [`Error::WebSocket`] |

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::result::Result as StdResult;

use serde_json::Value;
use thiserror::Error;
use tokio_tungstenite::tungstenite::Error as WsError;

use crate::identifiers::RequestId;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when bot configuration is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    // ========================================================================
    // Acceptance Errors
    // ========================================================================
    /// The connecting client announced a role other than the configured one.
    #[error("Unsupported client role: {role:?}")]
    UnsupportedClientRole {
        /// Role announced by the client (empty if the header was missing).
        role: String,
    },

    /// A session is already active; the new connection was refused.
    #[error("Connection rejected: a client session is already active")]
    ConnectionRejected,

    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// WebSocket handshake or transport setup failed.
    #[error("Connection failed: {message}")]
    Connection {
        /// Description of the connection error.
        message: String,
    },

    /// No client is connected, so nothing can be sent.
    #[error("No client connected")]
    NotConnected,

    /// The session ended before a result arrived.
    #[error("Connection closed")]
    ConnectionClosed,

    // ========================================================================
    // Protocol Errors
    // ========================================================================
    /// Inbound frame could not be decoded.
    #[error("Malformed frame: {message}")]
    MalformedFrame {
        /// Description of what was wrong with the frame.
        message: String,
    },

    // ========================================================================
    // Call Errors
    // ========================================================================
    /// No result arrived for the request before its deadline.
    #[error("Request {request_id} timed out after {timeout_ms}ms")]
    Timeout {
        /// The request ID that timed out.
        request_id: RequestId,
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    /// The client answered with `status: "failed"`.
    #[error("Remote failure (retcode {retcode}): {message}")]
    RemoteFailure {
        /// OneBot return code.
        retcode: i64,
        /// Message supplied by the client.
        message: String,
        /// Data payload supplied with the failure, if any.
        data: Value,
    },

    /// The pending-call registry is full.
    #[error("Too many pending requests (limit {limit})")]
    TooManyPending {
        /// Configured capacity.
        limit: usize,
    },

    /// A request ID was registered while still pending.
    #[error("Request {request_id} is already pending")]
    DuplicateRequest {
        /// The duplicated request ID.
        request_id: RequestId,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] WsError),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates an unsupported client role error.
    #[inline]
    pub fn unsupported_client_role(role: impl Into<String>) -> Self {
        Self::UnsupportedClientRole { role: role.into() }
    }

    /// Creates a connection error.
    #[inline]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates a malformed frame error.
    #[inline]
    pub fn malformed_frame(message: impl Into<String>) -> Self {
        Self::MalformedFrame {
            message: message.into(),
        }
    }

    /// Creates a timeout error.
    #[inline]
    pub fn timeout(request_id: RequestId, timeout_ms: u64) -> Self {
        Self::Timeout {
            request_id,
            timeout_ms,
        }
    }

    /// Creates a remote failure error.
    #[inline]
    pub fn remote_failure(retcode: i64, message: impl Into<String>, data: Value) -> Self {
        Self::RemoteFailure {
            retcode,
            message: message.into(),
            data,
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a timeout error.
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Returns `true` if the client reported the action as failed.
    #[inline]
    #[must_use]
    pub fn is_remote_failure(&self) -> bool {
        matches!(self, Self::RemoteFailure { .. })
    }

    /// Returns `true` if this is a connection error.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. }
                | Self::NotConnected
                | Self::ConnectionClosed
                | Self::ConnectionRejected
                | Self::WebSocket(_)
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::ErrorKind;

    #[test]
    fn test_error_display() {
        let err = Error::connection("upgrade failed");
        assert_eq!(err.to_string(), "Connection failed: upgrade failed");

        let id = RequestId::new(7).expect("valid id");
        assert_eq!(
            Error::timeout(id, 3000).to_string(),
            "Request 7 timed out after 3000ms"
        );
    }

    #[test]
    fn test_remote_failure_display() {
        let err = Error::remote_failure(100, "group not found", Value::Null);
        assert_eq!(
            err.to_string(),
            "Remote failure (retcode 100): group not found"
        );
        assert!(err.is_remote_failure());
        assert!(!err.is_timeout());
    }

    #[test]
    fn test_is_connection_error() {
        assert!(Error::NotConnected.is_connection_error());
        assert!(Error::ConnectionClosed.is_connection_error());
        assert!(Error::ConnectionRejected.is_connection_error());
        assert!(!Error::config("bad").is_connection_error());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = IoError::new(ErrorKind::AddrInUse, "address in use");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<String>("invalid").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
    }
}
