//! Bot configuration.
//!
//! [`BotConfig`] can be built with [`BotBuilder`](super::BotBuilder) or
//! loaded from JSON; missing fields take their defaults.
//!
//! ```json
//! {
//!   "host": "127.0.0.1",
//!   "port": 8080,
//!   "endpoint": "/ws/",
//!   "client_role": "universal",
//!   "default_timeout_ms": 30000,
//!   "max_pending": 1024
//! }
//! ```
//!
//! The endpoint must match what the client dials exactly, including any
//! trailing slash.

// ============================================================================
// Imports
// ============================================================================

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::correlation::DEFAULT_MAX_PENDING;
use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Default bind address.
pub const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

/// Default port.
pub const DEFAULT_PORT: u16 = 8080;

/// Default endpoint path.
pub const DEFAULT_ENDPOINT: &str = "/ws";

/// Default client role.
pub const DEFAULT_CLIENT_ROLE: &str = "universal";

/// Default action timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// BotConfig
// ============================================================================

/// Validated bot settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Address to bind.
    pub host: IpAddr,
    /// Port to bind (0 for random).
    pub port: u16,
    /// WebSocket endpoint path.
    pub endpoint: String,
    /// Client role required in `X-Client-Role`.
    pub client_role: String,
    /// Timeout used by `Bot::call_default`, in milliseconds.
    pub default_timeout_ms: u64,
    /// Maximum concurrently pending calls.
    pub max_pending: usize,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST,
            port: DEFAULT_PORT,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            client_role: DEFAULT_CLIENT_ROLE.to_string(),
            default_timeout_ms: DEFAULT_TIMEOUT.as_millis() as u64,
            max_pending: DEFAULT_MAX_PENDING,
        }
    }
}

impl BotConfig {
    /// Parses and validates a JSON configuration.
    ///
    /// # Errors
    ///
    /// - [`Error::Json`] if the text is not valid JSON for this shape
    /// - [`Error::Config`] if a value is invalid
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    ///
    /// # Errors
    ///
    /// - [`Error::Io`] if the file cannot be read
    /// - otherwise as [`BotConfig::from_json`]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Returns the socket address to bind.
    #[inline]
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Returns the default action timeout.
    #[inline]
    #[must_use]
    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }

    /// Checks every field.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] describing the first invalid field.
    pub fn validate(&self) -> Result<()> {
        if !self.endpoint.starts_with('/') {
            return Err(Error::config(format!(
                "Endpoint must start with '/': {:?}",
                self.endpoint
            )));
        }
        if self.client_role.trim().is_empty() {
            return Err(Error::config("Client role must not be empty"));
        }
        if self.default_timeout_ms == 0 {
            return Err(Error::config("Default timeout must be greater than zero"));
        }
        if self.max_pending == 0 {
            return Err(Error::config("max_pending must be greater than zero"));
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
