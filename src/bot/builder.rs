//! Builder pattern for bot configuration.
//!
//! # Example
//!
//! ```no_run
//! use onebot_bridge::Bot;
//!
//! # fn example() -> onebot_bridge::Result<()> {
//! let bot = Bot::builder()
//!     .port(8080)
//!     .endpoint("/ws/")
//!     .build()?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::net::IpAddr;
use std::time::Duration;

use crate::error::Result;

use super::config::BotConfig;
use super::core::Bot;

// ============================================================================
// BotBuilder
// ============================================================================

/// Builder for configuring a [`Bot`] instance.
///
/// Use [`Bot::builder()`] to create a new builder.
#[derive(Debug, Default, Clone)]
pub struct BotBuilder {
    config: BotConfig,
}

impl BotBuilder {
    /// Creates a builder with default settings.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing configuration.
    #[inline]
    #[must_use]
    pub fn from_config(config: BotConfig) -> Self {
        Self { config }
    }

    /// Sets the bind address.
    #[inline]
    #[must_use]
    pub fn host(mut self, host: IpAddr) -> Self {
        self.config.host = host;
        self
    }

    /// Sets the bind port (0 for random).
    #[inline]
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Sets the endpoint path the client dials, e.g. `/ws/`.
    #[inline]
    #[must_use]
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.endpoint = endpoint.into();
        self
    }

    /// Sets the required client role.
    #[inline]
    #[must_use]
    pub fn client_role(mut self, role: impl Into<String>) -> Self {
        self.config.client_role = role.into();
        self
    }

    /// Sets the timeout used by [`Bot::call_default`].
    #[inline]
    #[must_use]
    pub fn default_timeout(mut self, timeout: Duration) -> Self {
        self.config.default_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Sets the maximum number of concurrently pending calls.
    #[inline]
    #[must_use]
    pub fn max_pending(mut self, max_pending: usize) -> Self {
        self.config.max_pending = max_pending;
        self
    }

    /// Builds the bot with validation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`](crate::Error::Config) if a setting is invalid.
    pub fn build(self) -> Result<Bot> {
        self.config.validate()?;
        Ok(Bot::new(self.config))
    }
}

// ============================================================================
// Tests
// ============================================================================
