//! Discord client using serenity.

use std::sync::Arc;

use async_trait::async_trait;
use serenity::all::{ChannelId, CreateMessage, Http, MessageId};
use tracing::{info, warn};

use crate::config::Config;
use crate::discord::interactions::CommandInvoker;
use crate::relay::{Platform, PlatformError};

/// Relay platform backed by the Discord REST API.
pub struct DiscordPlatform {
    http: Arc<Http>,
    invoker: CommandInvoker,
}

impl DiscordPlatform {
    /// Resolve the designated channel and the announcer command.
    ///
    /// Either lookup failing is fatal for the session.
    pub async fn connect(http: Arc<Http>, config: &Config, session_id: &str) -> Result<Self, PlatformError> {
        let channel = http
            .get_channel(ChannelId::new(config.channel_id))
            .await
            .map_err(|e| PlatformError::ChannelUnavailable {
                channel_id: config.channel_id,
                reason: e.to_string(),
            })?;
        info!("Found channel {}", channel.id());

        let invoker = CommandInvoker::resolve(
            &config.user_token,
            config.guild_id,
            config.channel_id,
            &config.command_name,
            &config.command_format,
            session_id,
        )
        .await?;

        Ok(Self { http, invoker })
    }
}

#[async_trait]
impl Platform for DiscordPlatform {
    async fn reply(&self, channel_id: u64, message_id: u64, text: &str) -> Result<(), PlatformError> {
        let channel = ChannelId::new(channel_id);
        let builder = CreateMessage::new()
            .content(text)
            .reference_message((channel, MessageId::new(message_id)));

        channel
            .send_message(&self.http, builder)
            .await
            .map(|_| ())
            .map_err(|e| {
                let msg = format!("Failed to send: {e}");
                warn!("{}", msg);
                PlatformError::Delivery(msg)
            })
    }

    async fn invoke_announcer(&self) -> Result<(), PlatformError> {
        self.invoker.invoke().await
    }
}
