//! Type-safe identifiers.
//!
//! [`RequestId`] is the value carried in the OneBot `echo` field. It is
//! always non-zero: zero is reserved so that a result without an echo, or
//! with `echo: 0`, can never be mistaken for a correlation echo.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// RequestId
// ============================================================================

/// Identifier correlating an action request with its result.
///
/// Valid values are `1..=RequestId::MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(NonZeroU32);

impl RequestId {
    /// Largest identifier ever issued (`2^31 - 1`).
    pub const MAX: u32 = i32::MAX as u32;

    /// Creates a request ID from a raw value.
    ///
    /// Returns `None` for zero or values above [`RequestId::MAX`].
    #[inline]
    #[must_use]
    pub fn new(value: u32) -> Option<Self> {
        if value > Self::MAX {
            return None;
        }
        NonZeroU32::new(value).map(Self)
    }

    /// Creates a request ID from a non-zero value already known to be in range.
    #[inline]
    #[must_use]
    pub(crate) const fn from_non_zero(value: NonZeroU32) -> Self {
        Self(value)
    }

    /// Returns the raw value.
    #[inline]
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// Interprets an `echo` value as a request ID.
    ///
    /// Accepts integers and decimal strings (some clients stringify the
    /// echo). Anything else, zero, or out-of-range values yield `None`.
    #[must_use]
    pub fn from_echo(echo: &Value) -> Option<Self> {
        let raw = match echo {
            Value::Number(n) => n.as_u64()?,
            Value::String(s) => s.trim().parse::<u64>().ok()?,
            _ => return None,
        };
        u32::try_from(raw).ok().and_then(Self::new)
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn test_zero_is_rejected() {
        assert!(RequestId::new(0).is_none());
        assert!(RequestId::new(RequestId::MAX + 1).is_none());
        assert_eq!(RequestId::new(RequestId::MAX).map(RequestId::get), Some(RequestId::MAX));
    }

    #[test]
    fn test_from_echo() {
        assert_eq!(RequestId::from_echo(&json!(7)).map(RequestId::get), Some(7));
        assert_eq!(RequestId::from_echo(&json!("12")).map(RequestId::get), Some(12));
        assert!(RequestId::from_echo(&json!(0)).is_none());
        assert!(RequestId::from_echo(&json!(-3)).is_none());
        assert!(RequestId::from_echo(&json!("abc")).is_none());
        assert!(RequestId::from_echo(&json!(null)).is_none());
        assert!(RequestId::from_echo(&json!(u64::MAX)).is_none());
    }

    #[test]
    fn test_serializes_as_integer() {
        let id = RequestId::new(42).expect("valid id");
        assert_eq!(serde_json::to_string(&id).expect("serialize"), "42");
        assert_eq!(id.to_string(), "42");
    }
}
