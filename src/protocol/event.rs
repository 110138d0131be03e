//! Event message types.
//!
//! Events are pushed by the client without being asked for: heartbeats,
//! lifecycle notifications, chat messages, notices and friend/group
//! requests. Handlers receive the raw payload as an [`Event`] and may use
//! [`Event::parse`] for a typed view.
//!
//! # Event Categories
//!
//! | `post_type` | Examples |
//! |-------------|----------|
//! | `meta_event` | `heartbeat`, `lifecycle` |
//! | `message` | `private`, `group` |
//! | `notice` | `group_increase`, `group_recall`, `poke` |
//! | `request` | `friend`, `group` |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::{Error, Result};

// ============================================================================
// PostType
// ============================================================================

/// Top-level event discriminator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PostType {
    /// `meta_event`: heartbeats and lifecycle.
    MetaEvent,
    /// `message`: chat messages.
    Message,
    /// `notice`: group/friend notices.
    Notice,
    /// `request`: friend and group join requests.
    Request,
    /// Any other or missing value.
    Other(String),
}

impl PostType {
    /// Parses a `post_type` string.
    #[must_use]
    pub fn from_wire(value: &str) -> Self {
        match value {
            "meta_event" => Self::MetaEvent,
            "message" => Self::Message,
            "notice" => Self::Notice,
            "request" => Self::Request,
            other => Self::Other(other.to_string()),
        }
    }

    /// Returns the wire representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::MetaEvent => "meta_event",
            Self::Message => "message",
            Self::Notice => "notice",
            Self::Request => "request",
            Self::Other(other) => other,
        }
    }
}

impl fmt::Display for PostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Event
// ============================================================================

/// An event pushed by the client.
///
/// Cheap to clone: every handler sees the same underlying payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    raw: Arc<Value>,
}

impl Event {
    /// Wraps a decoded payload.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedFrame`] if the payload is not a JSON object.
    pub fn from_value(value: Value) -> Result<Self> {
        if !value.is_object() {
            return Err(Error::malformed_frame("event payload is not an object"));
        }
        Ok(Self {
            raw: Arc::new(value),
        })
    }

    /// Returns the raw payload.
    #[inline]
    #[must_use]
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// Returns the event category.
    #[must_use]
    pub fn post_type(&self) -> PostType {
        PostType::from_wire(self.get_str("post_type").unwrap_or_default())
    }

    /// Returns the bot account the event belongs to (`self_id`).
    #[inline]
    #[must_use]
    pub fn self_id(&self) -> Option<i64> {
        self.get_i64("self_id")
    }

    /// Returns the event timestamp (`time`, seconds since epoch).
    #[inline]
    #[must_use]
    pub fn time(&self) -> Option<i64> {
        self.get_i64("time")
    }

    /// Gets a top-level string field.
    #[inline]
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.raw.get(key).and_then(Value::as_str)
    }

    /// Gets a top-level integer field.
    #[inline]
    #[must_use]
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.raw.get(key).and_then(Value::as_i64)
    }

    /// Parses the event into a typed variant.
    #[must_use]
    pub fn parse(&self) -> ParsedEvent {
        match self.post_type() {
            PostType::MetaEvent => self.parse_meta(),
            PostType::Message => ParsedEvent::Message {
                message_type: self.string("message_type"),
                sub_type: self.string("sub_type"),
                message_id: self.get_i64("message_id").unwrap_or_default(),
                user_id: self.get_i64("user_id").unwrap_or_default(),
                group_id: self.get_i64("group_id"),
                message: self.raw.get("message").cloned().unwrap_or(Value::Null),
                raw_message: self.string("raw_message"),
            },
            PostType::Notice => ParsedEvent::Notice {
                notice_type: self.string("notice_type"),
                sub_type: self.get_str("sub_type").map(str::to_string),
                group_id: self.get_i64("group_id"),
                user_id: self.get_i64("user_id"),
            },
            PostType::Request => ParsedEvent::Request {
                request_type: self.string("request_type"),
                sub_type: self.get_str("sub_type").map(str::to_string),
                user_id: self.get_i64("user_id").unwrap_or_default(),
                group_id: self.get_i64("group_id"),
                comment: self.string("comment"),
                flag: self.string("flag"),
            },
            PostType::Other(post_type) => ParsedEvent::Unknown { post_type },
        }
    }

    fn parse_meta(&self) -> ParsedEvent {
        match self.get_str("meta_event_type") {
            Some("heartbeat") => ParsedEvent::Heartbeat {
                interval: self.raw.get("interval").and_then(Value::as_u64).unwrap_or_default(),
                status: self.raw.get("status").cloned().unwrap_or(Value::Null),
            },
            Some("lifecycle") => ParsedEvent::Lifecycle {
                sub_type: self.string("sub_type"),
            },
            other => ParsedEvent::Unknown {
                post_type: format!("meta_event/{}", other.unwrap_or_default()),
            },
        }
    }

    #[inline]
    fn string(&self, key: &str) -> String {
        self.get_str(key).unwrap_or_default().to_string()
    }
}

// ============================================================================
// ParsedEvent
// ============================================================================

/// Parsed event types for type-safe handling.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedEvent {
    /// Periodic heartbeat.
    Heartbeat {
        /// Milliseconds until the next heartbeat.
        interval: u64,
        /// Client status object.
        status: Value,
    },

    /// Connection lifecycle change (`connect`, `enable`, `disable`).
    Lifecycle {
        /// Lifecycle sub type.
        sub_type: String,
    },

    /// Chat message.
    Message {
        /// `private` or `group`.
        message_type: String,
        /// Message sub type (`friend`, `normal`, ...).
        sub_type: String,
        /// Message ID.
        message_id: i64,
        /// Sender.
        user_id: i64,
        /// Group, for group messages.
        group_id: Option<i64>,
        /// Message content (segment array or CQ string).
        message: Value,
        /// Plain-text rendering of the message.
        raw_message: String,
    },

    /// Notice.
    Notice {
        /// Notice type.
        notice_type: String,
        /// Notice sub type.
        sub_type: Option<String>,
        /// Group involved.
        group_id: Option<i64>,
        /// User involved.
        user_id: Option<i64>,
    },

    /// Friend or group request.
    Request {
        /// `friend` or `group`.
        request_type: String,
        /// Request sub type (`add`, `invite`).
        sub_type: Option<String>,
        /// Requesting user.
        user_id: i64,
        /// Group, for group requests.
        group_id: Option<i64>,
        /// Verification comment.
        comment: String,
        /// Flag to pass back when handling the request.
        flag: String,
    },

    /// Unrecognized event.
    Unknown {
        /// The unrecognized discriminator.
        post_type: String,
    },
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn test_heartbeat_parsing() {
        let event = Event::from_value(json!({
            "time": 1_700_000_000,
            "self_id": 10001,
            "post_type": "meta_event",
            "meta_event_type": "heartbeat",
            "status": {"online": true, "good": true},
            "interval": 5000
        }))
        .expect("event");

        assert_eq!(event.post_type(), PostType::MetaEvent);
        assert_eq!(event.self_id(), Some(10001));
        assert_eq!(event.time(), Some(1_700_000_000));

        match event.parse() {
            ParsedEvent::Heartbeat { interval, status } => {
                assert_eq!(interval, 5000);
                assert_eq!(status["online"], true);
            }
            other => panic!("unexpected parsed event: {other:?}"),
        }
    }

    #[test]
    fn test_lifecycle_parsing() {
        let event = Event::from_value(json!({
            "post_type": "meta_event",
            "meta_event_type": "lifecycle",
            "sub_type": "connect"
        }))
        .expect("event");

        assert_eq!(
            event.parse(),
            ParsedEvent::Lifecycle {
                sub_type: "connect".to_string()
            }
        );
    }

    #[test]
    fn test_group_message_parsing() {
        let event = Event::from_value(json!({
            "post_type": "message",
            "message_type": "group",
            "sub_type": "normal",
            "message_id": 99,
            "group_id": 10,
            "user_id": 2000,
            "message": [{"type": "text", "data": {"text": "hi"}}],
            "raw_message": "hi"
        }))
        .expect("event");

        match event.parse() {
            ParsedEvent::Message {
                message_type,
                group_id,
                user_id,
                message,
                raw_message,
                ..
            } => {
                assert_eq!(message_type, "group");
                assert_eq!(group_id, Some(10));
                assert_eq!(user_id, 2000);
                assert_eq!(message[0]["data"]["text"], "hi");
                assert_eq!(raw_message, "hi");
            }
            other => panic!("unexpected parsed event: {other:?}"),
        }
    }

    #[test]
    fn test_request_parsing() {
        let event = Event::from_value(json!({
            "post_type": "request",
            "request_type": "friend",
            "user_id": 3,
            "comment": "hello",
            "flag": "f-1"
        }))
        .expect("event");

        match event.parse() {
            ParsedEvent::Request {
                request_type, flag, group_id, ..
            } => {
                assert_eq!(request_type, "friend");
                assert_eq!(flag, "f-1");
                assert!(group_id.is_none());
            }
            other => panic!("unexpected parsed event: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_post_type() {
        let event = Event::from_value(json!({"post_type": "message_sent"})).expect("event");
        assert_eq!(event.post_type(), PostType::Other("message_sent".to_string()));
        assert_eq!(
            event.parse(),
            ParsedEvent::Unknown {
                post_type: "message_sent".to_string()
            }
        );
    }

    #[test]
    fn test_non_object_rejected() {
        assert!(Event::from_value(json!([1, 2, 3])).is_err());
    }
}
