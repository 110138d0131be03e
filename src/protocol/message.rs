//! Message segments and targets for the `send_msg` action.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

// ============================================================================
// MessageSegment
// ============================================================================

/// One segment of an array-format OneBot message.
///
/// # Format
///
/// ```json
/// { "type": "text", "data": { "text": "hi" } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageSegment {
    /// Segment type (`text`, `at`, `face`, `image`, `reply`, ...).
    #[serde(rename = "type")]
    pub kind: String,

    /// Segment data.
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl MessageSegment {
    /// Creates a segment of arbitrary type.
    #[must_use]
    pub fn new(kind: impl Into<String>, data: Map<String, Value>) -> Self {
        Self {
            kind: kind.into(),
            data,
        }
    }

    /// Plain text.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::with("text", "text", Value::String(text.into()))
    }

    /// Mention a user (`"all"` for everyone).
    #[must_use]
    pub fn at(qq: impl ToString) -> Self {
        Self::with("at", "qq", Value::String(qq.to_string()))
    }

    /// Built-in face by ID.
    #[must_use]
    pub fn face(id: i64) -> Self {
        Self::with("face", "id", Value::String(id.to_string()))
    }

    /// Image by file name, URL or `base64://` payload.
    #[must_use]
    pub fn image(file: impl Into<String>) -> Self {
        Self::with("image", "file", Value::String(file.into()))
    }

    /// Reply to a message.
    #[must_use]
    pub fn reply(message_id: i64) -> Self {
        Self::with("reply", "id", Value::String(message_id.to_string()))
    }

    fn with(kind: &str, key: &str, value: Value) -> Self {
        let mut data = Map::new();
        data.insert(key.to_string(), value);
        Self::new(kind, data)
    }
}

// ============================================================================
// MessageTarget
// ============================================================================

/// Recipient of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageTarget {
    /// Group chat.
    Group(i64),
    /// Private chat with a user.
    Private(i64),
}

impl MessageTarget {
    /// Builds `send_msg` params for this target.
    #[must_use]
    pub fn send_msg_params(self, message: &[MessageSegment]) -> Value {
        match self {
            Self::Group(group_id) => json!({
                "message_type": "group",
                "group_id": group_id,
                "message": message,
            }),
            Self::Private(user_id) => json!({
                "message_type": "private",
                "user_id": user_id,
                "message": message,
            }),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
