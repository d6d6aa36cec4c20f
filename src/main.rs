use std::sync::{Arc, OnceLock};

use serenity::all::{GatewayIntents, Http, OnlineStatus};
use serenity::Client;
use tracing::{error, info};
use tracing_subscriber::prelude::*;

use artemis_relay::config::Config;
use artemis_relay::discord::Handler;
use artemis_relay::discord_log::DiscordLogLayer;

#[tokio::main]
async fn main() {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "artemis.json".to_string());
    let config = match Config::load(&config_path) {
        Ok(config) => Arc::new(config),
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    // Setup logging
    let log_dir = config.data_dir.join("logs");
    std::fs::create_dir_all(&log_dir).ok();
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("artemis-relay.log"))
        .expect("Failed to open log file");
    let (non_blocking, _guard) = tracing_appender::non_blocking(log_file);

    let registry = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stdout)
                .with_filter(
                    tracing_subscriber::EnvFilter::from_default_env()
                        .add_directive(tracing::Level::INFO.into()),
                ),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_filter(
                    tracing_subscriber::EnvFilter::from_default_env()
                        .add_directive(tracing::Level::INFO.into()),
                ),
        );

    if let Some(log_channel_id) = config.log_channel_id {
        let http = Arc::new(Http::new(&config.bot_token));
        registry.with(DiscordLogLayer::new(http, log_channel_id)).init();
    } else {
        registry.init();
    }

    info!("Starting artemis-relay...");
    info!("Loaded config from {config_path}");
    info!(
        "Guild {}, channel {}, announcer {}, command /{}",
        config.guild_id, config.channel_id, config.announcer_id, config.command_name
    );

    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let shard_manager = Arc::new(OnceLock::new());
    let handler = Handler::new(config.clone(), shard_manager.clone());

    let mut builder = Client::builder(&config.bot_token, intents).event_handler(handler);
    if config.invisible {
        builder = builder.status(OnlineStatus::Invisible);
    }
    let mut client = match builder.await {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to create client: {e}");
            return;
        }
    };
    let _ = shard_manager.set(client.shard_manager.clone());

    let manager = client.shard_manager.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C received, shutting down");
            manager.shutdown_all().await;
        }
    });

    if let Err(e) = client.start().await {
        error!("Client error: {e}");
    }
}
