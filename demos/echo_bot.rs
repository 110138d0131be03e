//! Echo bot.
//!
//! Demonstrates:
//! - Loading settings from a JSON file or the builder defaults
//! - Logging heartbeat and lifecycle events
//! - Repeating group messages back with `send_message`
//! - Calling an arbitrary action once the client has connected
//!
//! Usage:
//!   cargo run --example echo_bot
//!   cargo run --example echo_bot -- --debug
//!   cargo run --example echo_bot -- --config bot.json

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use anyhow::Context;
use onebot_bridge::{
    Bot, BotBuilder, BotConfig, Event, MessageSegment, MessageTarget, ParsedEvent, Result,
};
use serde_json::json;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

// ============================================================================
// Constants
// ============================================================================

const SEND_TIMEOUT: Duration = Duration::from_secs(3);

// ============================================================================
// Args
// ============================================================================

/// Command-line arguments.
#[derive(Debug, Clone)]
struct Args {
    debug: bool,
    config: Option<String>,
}

impl Args {
    fn parse() -> Self {
        let args: Vec<String> = std::env::args().collect();
        let config = args
            .iter()
            .position(|a| a == "--config")
            .and_then(|i| args.get(i + 1))
            .cloned();

        Self {
            debug: args.iter().any(|a| a == "--debug"),
            config,
        }
    }
}

fn init_logging(debug: bool) {
    let filter = if debug {
        "onebot_bridge=debug,echo_bot=debug"
    } else {
        "onebot_bridge=info,echo_bot=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logging(args.debug);

    if let Err(e) = run(args).await {
        eprintln!("\n[ERROR] {e:#}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let bot = match &args.config {
        Some(path) => {
            let config = BotConfig::from_file(path)
                .with_context(|| format!("loading config from {path}"))?;
            BotBuilder::from_config(config).build()?
        }
        None => Bot::builder().endpoint("/ws/").build()?,
    };

    // ========================================================================
    // Handlers
    // ========================================================================

    bot.on_event(|event: Event| async move {
        match event.parse() {
            ParsedEvent::Heartbeat { interval, .. } => {
                info!(interval, self_id = ?event.self_id(), "Heartbeat");
            }
            ParsedEvent::Lifecycle { sub_type } => {
                info!(%sub_type, self_id = ?event.self_id(), "Lifecycle");
            }
            _ => {}
        }
        Ok(())
    });

    let echo = bot.clone();
    bot.on_event(move |event: Event| {
        let bot = echo.clone();
        async move { repeat_group_message(&bot, &event).await }
    });

    let greeter = bot.clone();
    bot.on_event(move |event: Event| {
        let bot = greeter.clone();
        async move {
            if let ParsedEvent::Lifecycle { sub_type } = event.parse()
                && sub_type == "connect"
            {
                let info = bot.call("get_login_info", json!({}), SEND_TIMEOUT).await?;
                info!(nickname = %info["nickname"], user_id = %info["user_id"], "Logged in");
            }
            Ok(())
        }
    });

    // ========================================================================
    // Serve
    // ========================================================================

    let server = bot.bind().await?;
    info!(url = %server.ws_url(), "Waiting for client");

    let shutdown = bot.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl+C received, shutting down");
            shutdown.shutdown();
        }
    });

    server.run().await?;
    Ok(())
}

// ============================================================================
// Echo
// ============================================================================

async fn repeat_group_message(bot: &Bot, event: &Event) -> Result<()> {
    let ParsedEvent::Message {
        group_id: Some(group_id),
        user_id,
        message,
        raw_message,
        ..
    } = event.parse()
    else {
        return Ok(());
    };

    if Some(user_id) == event.self_id() {
        return Ok(());
    }

    let segments: Vec<MessageSegment> = serde_json::from_value(message)
        .unwrap_or_else(|_| vec![MessageSegment::text(raw_message)]);

    match bot
        .send_message(MessageTarget::Group(group_id), &segments)
        .await
    {
        Ok(message_id) => info!(group_id, message_id, "Echoed"),
        Err(e) if e.is_timeout() => warn!(group_id, "Echo timed out"),
        Err(e) => return Err(e),
    }

    Ok(())
}
