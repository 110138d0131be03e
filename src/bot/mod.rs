//! Bot facade and configuration.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Bot`] | Action calls, handler registration, serving |
//! | [`BotBuilder`] | Fluent configuration builder |
//! | [`BotConfig`] | Serializable settings |
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use onebot_bridge::{Bot, Result};
//! use serde_json::json;
//!
//! # async fn example() -> Result<()> {
//! let bot = Bot::builder().port(8080).endpoint("/ws/").build()?;
//! let server = bot.bind().await?;
//! tokio::spawn(server.run());
//!
//! // Once the client is connected:
//! let info = bot.call("get_login_info", json!({}), Duration::from_secs(3)).await?;
//! println!("logged in as {}", info["nickname"]);
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Fluent builder pattern for bot configuration.
pub mod builder;

/// Bot settings.
pub mod config;

/// Core bot implementation.
pub mod core;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::BotBuilder;
pub use config::BotConfig;
pub use core::Bot;
