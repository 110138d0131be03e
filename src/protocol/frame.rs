//! Inbound frame decoding and classification.
//!
//! A frame is a **result** iff it carries a usable echo: present, not
//! `null`, not `0`, not `""` and not `"0"`. Every other frame is an
//! **event**, including frames whose echo is missing or zero.

// ============================================================================
// Imports
// ============================================================================

use serde_json::Value;

use crate::error::{Error, Result};

use super::{ActionResponse, Event};

// ============================================================================
// Frame
// ============================================================================

/// A decoded inbound frame.
#[derive(Debug, Clone)]
pub enum Frame {
    /// Result of a previously sent action.
    Result(ActionResponse),
    /// Unsolicited event.
    Event(Event),
}

impl Frame {
    /// Decodes and classifies a text frame.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedFrame`] if the text is not a JSON object,
    /// or if it carries an echo but is not a valid result.
    pub fn decode(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| Error::malformed_frame(format!("invalid JSON: {e}")))?;
        Self::classify(value)
    }

    /// Classifies an already decoded payload.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedFrame`] if the payload is not an object, or
    /// if it carries an echo but is not a valid result.
    pub fn classify(value: Value) -> Result<Self> {
        if !value.is_object() {
            return Err(Error::malformed_frame("frame is not a JSON object"));
        }

        if has_usable_echo(&value) {
            let response: ActionResponse = serde_json::from_value(value)
                .map_err(|e| Error::malformed_frame(format!("invalid result: {e}")))?;
            return Ok(Self::Result(response));
        }

        Event::from_value(value).map(Self::Event)
    }

    /// Returns `true` if this frame is a result.
    #[inline]
    #[must_use]
    pub fn is_result(&self) -> bool {
        matches!(self, Self::Result(_))
    }
}

/// Returns `true` if the payload's echo is non-empty and non-zero.
fn has_usable_echo(value: &Value) -> bool {
    match value.get("echo") {
        None | Some(Value::Null) => false,
        Some(Value::Number(n)) => n.as_f64() != Some(0.0),
        Some(Value::String(s)) => !s.is_empty() && s != "0",
        Some(Value::Bool(b)) => *b,
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
    }
}

// ============================================================================
// Tests
// ============================================================================
