//! Gateway event handler.

use std::sync::{Arc, OnceLock};

use serenity::all::{Context, EventHandler, Message, Ready, ShardManager};
use serenity::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::discord::client::DiscordPlatform;
use crate::relay::{IncomingMessage, Relay, RelayConfig};

/// Routes gateway events into the relay.
///
/// The relay sits behind one mutex held for the whole handling of a message,
/// so messages are processed one at a time in the order they take the lock.
pub struct Handler {
    config: Arc<Config>,
    relay: Mutex<Option<Relay<DiscordPlatform>>>,
    shard_manager: Arc<OnceLock<Arc<ShardManager>>>,
}

impl Handler {
    pub fn new(config: Arc<Config>, shard_manager: Arc<OnceLock<Arc<ShardManager>>>) -> Self {
        Self {
            config,
            relay: Mutex::new(None),
            shard_manager,
        }
    }

    fn shutdown(&self) {
        match self.shard_manager.get() {
            Some(manager) => {
                let manager = manager.clone();
                tokio::spawn(async move { manager.shutdown_all().await });
            }
            None => warn!("No shard manager registered, cannot shut down"),
        }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("Authenticated as {} (ID: {})", ready.user.name, ready.user.id);

        let mut relay = self.relay.lock().await;
        if relay.is_some() {
            info!("Session re-established, keeping pending requests");
            return;
        }

        match DiscordPlatform::connect(ctx.http.clone(), &self.config, &ready.session_id).await {
            Ok(platform) => {
                let relay_config = RelayConfig::from_config(&self.config, ready.user.id.get());
                *relay = Some(Relay::new(relay_config, platform));
                info!("Bot is ready!");
            }
            Err(e) => {
                error!("{e}, please check your configuration.");
                self.shutdown();
            }
        }
    }

    async fn message(&self, _ctx: Context, msg: Message) {
        let incoming = to_incoming(&msg);

        let mut relay = self.relay.lock().await;
        let Some(relay) = relay.as_mut() else {
            debug!("Message {} received before ready, skipping", incoming.message_id);
            return;
        };

        match relay.handle_message(&incoming).await {
            Ok(disposition) => debug!("Message {} → {:?}", incoming.message_id, disposition),
            Err(e) => warn!("Failed to handle message {}: {e}", incoming.message_id),
        }
    }
}

fn to_incoming(msg: &Message) -> IncomingMessage {
    IncomingMessage {
        message_id: msg.id.get(),
        channel_id: msg.channel_id.get(),
        guild_id: msg.guild_id.map(|id| id.get()),
        author_id: msg.author.id.get(),
        author_name: msg.author.name.clone(),
        author_is_bot: msg.author.bot,
        content: msg.content.clone(),
        mentions: msg.mentions.iter().map(|user| user.id.get()).collect(),
    }
}
