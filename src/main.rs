//! Mate bot entry point.
//!
//! The chat transport is intentionally external: this binary reads one
//! JSON-encoded inbound event per stdin line and writes one JSON-encoded
//! render instruction per stdout line. Whatever speaks to the chat
//! platform (long polling daemon, webhook receiver, test harness) pipes
//! through it.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use matebot::config::loader::load_config;
use matebot::config::BotConfig;
use matebot::gateway::types::AccountId;
use matebot::gateway::MeteClient;
use matebot::router::events::InboundEvent;
use matebot::store::{LinkStore, PlatformId};
use matebot::Bot;

#[derive(Parser)]
#[command(name = "matebot", about = "mete ledger chat bot core")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "matebot.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "matebot=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = if args.config.exists() {
        load_config(&args.config)?
    } else {
        tracing::warn!(path = %args.config.display(), "Config file not found, using defaults");
        BotConfig::default()
    };

    tracing::info!(
        gateway = %config.gateway.base_url,
        store = %config.store.path,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => matebot::observability::metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let store = Arc::new(LinkStore::open(&config.store.path)?);
    if let (Some(platform), Some(account)) = (
        config.bootstrap.admin_platform_id,
        config.bootstrap.admin_account_id,
    ) {
        store.seed_admin(PlatformId(platform), AccountId(account))?;
    }

    let ledger = MeteClient::new(&config.gateway)?;
    let bot = Bot::new(store, ledger);

    tracing::info!("Event loop ready on stdin");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let event: InboundEvent = match serde_json::from_str(line) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!(error = %e, "Discarded undecodable event line");
                continue;
            }
        };
        for render in bot.handle(event).await {
            println!("{}", serde_json::to_string(&render)?);
        }
    }

    tracing::info!("Event stream closed, shutting down");
    Ok(())
}
