//! Action request and result message types.
//!
//! Defines the message format for OneBot v11 action calls sent to the
//! client and the results it sends back.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::identifiers::RequestId;

// ============================================================================
// ActionRequest
// ============================================================================

/// An action request from the bridge to the client.
///
/// # Format
///
/// ```json
/// {
///   "action": "send_msg",
///   "params": { ... },
///   "echo": 7
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ActionRequest {
    /// OneBot action name.
    pub action: String,

    /// Action parameters (always an object on the wire).
    pub params: Value,

    /// Correlation identifier copied back by the client.
    pub echo: RequestId,
}

impl ActionRequest {
    /// Creates a new request.
    ///
    /// `null` params are sent as an empty object.
    #[inline]
    #[must_use]
    pub fn new(action: impl Into<String>, params: Value, echo: RequestId) -> Self {
        let params = if params.is_null() {
            Value::Object(serde_json::Map::new())
        } else {
            params
        };

        Self {
            action: action.into(),
            params,
            echo,
        }
    }
}

// ============================================================================
// ActionResponse
// ============================================================================

/// A result from the client for a previously sent action.
///
/// # Format
///
/// Success:
/// ```json
/// { "status": "ok", "retcode": 0, "data": { "message_id": 42 }, "echo": 7 }
/// ```
///
/// Failure:
/// ```json
/// { "status": "failed", "retcode": 100, "data": null, "message": "...", "echo": 7 }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ActionResponse {
    /// Response status. Missing or unrecognized values count as `Ok`.
    #[serde(default)]
    pub status: ResponseStatus,

    /// OneBot return code.
    #[serde(default)]
    pub retcode: i64,

    /// Result data.
    #[serde(default)]
    pub data: Value,

    /// Failure message.
    #[serde(default)]
    pub message: Option<String>,

    /// Human-readable failure description (NapCat/go-cqhttp extension).
    #[serde(default)]
    pub wording: Option<String>,

    /// Echo copied from the request.
    #[serde(default)]
    pub echo: Value,
}

impl ActionResponse {
    /// Returns the request ID this result answers, if the echo is usable.
    #[inline]
    #[must_use]
    pub fn request_id(&self) -> Option<RequestId> {
        RequestId::from_echo(&self.echo)
    }

    /// Returns `true` if the client reported failure.
    #[inline]
    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.status == ResponseStatus::Failed
    }

    /// Extracts the data payload, returning an error if the action failed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RemoteFailure`] if `status` is `failed`.
    pub fn into_result(self) -> Result<Value> {
        match self.status {
            ResponseStatus::Ok | ResponseStatus::Async => Ok(self.data),
            ResponseStatus::Failed => {
                let message = self
                    .message
                    .filter(|m| !m.is_empty())
                    .or(self.wording)
                    .unwrap_or_else(|| "action failed".to_string());
                Err(Error::remote_failure(self.retcode, message, self.data))
            }
        }
    }
}

// ============================================================================
// ResponseStatus
// ============================================================================

/// Result status discriminator.
///
/// Only `failed` (any case) marks a failure; anything else the client
/// sends, or omits, is treated as success.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResponseStatus {
    /// Action completed.
    #[default]
    Ok,
    /// Action accepted and queued by the client.
    Async,
    /// Action failed.
    Failed,
}

impl ResponseStatus {
    /// Maps a wire status, case-insensitively.
    #[must_use]
    pub fn from_wire(status: &str) -> Self {
        if status.eq_ignore_ascii_case("failed") {
            Self::Failed
        } else if status.eq_ignore_ascii_case("async") {
            Self::Async
        } else {
            Self::Ok
        }
    }
}

impl<'de> Deserialize<'de> for ResponseStatus {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let status = Value::deserialize(deserializer)?;
        Ok(status.as_str().map_or(Self::Ok, Self::from_wire))
    }
}

// ============================================================================
// Tests
// ============================================================================
