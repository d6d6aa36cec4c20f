//! Relay engine - pairs time requests with the announcer's answers.

use std::collections::VecDeque;
use std::time::Duration;

use chrono::{Local, TimeDelta};
use tokio::time::Instant;
use tracing::{debug, info};

use crate::config::{Config, PAUSE_DURATION};
use crate::nlp::{self, Analyzer, RuleAnalyzer, TimeRequestMatcher};
use crate::relay::message::{IncomingMessage, PendingRequest};
use crate::relay::platform::{Platform, PlatformError};
use crate::relay::throttle::Throttle;

/// Relay configuration.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub guild_id: u64,
    pub announcer_id: u64,
    /// Our own user ID, used to detect mentions.
    pub bot_user_id: u64,
    pub pause_duration: Duration,
    pub min_send_interval: Duration,
}

impl RelayConfig {
    pub fn from_config(config: &Config, bot_user_id: u64) -> Self {
        Self {
            guild_id: config.guild_id,
            announcer_id: config.announcer_id,
            bot_user_id,
            pause_duration: PAUSE_DURATION,
            min_send_interval: config.min_send_interval,
        }
    }
}

/// What the relay did with a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Filtered out: other guild, or another bot.
    Ignored,
    /// Dropped because the relay is paused.
    Paused,
    /// The message asked the relay to shut up; it is now paused.
    Silenced,
    /// Human message that is not a time request.
    NotARequest,
    /// Time request queued and announcer invoked.
    Enqueued,
    /// Announcer spoke but nobody was waiting.
    NoPendingRequest,
    /// Announcement forwarded to the oldest requester.
    Relayed,
}

/// The relay state machine.
///
/// Messages must be handled one at a time, in arrival order.
pub struct Relay<P, A = RuleAnalyzer> {
    config: RelayConfig,
    platform: P,
    matcher: TimeRequestMatcher<A>,
    /// Requesters waiting for an announcement, oldest first.
    queue: VecDeque<PendingRequest>,
    disabled_until: Option<Instant>,
    throttle: Throttle,
}

impl<P: Platform> Relay<P> {
    pub fn new(config: RelayConfig, platform: P) -> Self {
        Self::with_matcher(config, platform, TimeRequestMatcher::new())
    }
}

impl<P: Platform, A: Analyzer> Relay<P, A> {
    pub fn with_matcher(config: RelayConfig, platform: P, matcher: TimeRequestMatcher<A>) -> Self {
        let throttle = Throttle::new(config.min_send_interval);
        Self {
            config,
            platform,
            matcher,
            queue: VecDeque::new(),
            disabled_until: None,
            throttle,
        }
    }

    /// Entry point for every inbound message.
    pub async fn handle_message(&mut self, msg: &IncomingMessage) -> Result<Disposition, PlatformError> {
        if self.is_paused() {
            return Ok(Disposition::Paused);
        }

        if msg.guild_id != Some(self.config.guild_id) {
            return Ok(Disposition::Ignored);
        }

        if msg.author_id == self.config.announcer_id {
            return self.handle_announcer_message(msg).await;
        }

        if msg.author_is_bot {
            return Ok(Disposition::Ignored);
        }

        self.handle_human_message(msg).await
    }

    pub async fn handle_human_message(&mut self, msg: &IncomingMessage) -> Result<Disposition, PlatformError> {
        if self.is_paused() {
            return Ok(Disposition::Paused);
        }

        if self.is_shutdown_request(msg) {
            info!("Shut up request detected from {}: {}", msg.author_name, msg.preview());
            self.disabled_until = Some(Instant::now() + self.config.pause_duration);
            let resume_at = Local::now() + TimeDelta::seconds(self.config.pause_duration.as_secs() as i64);
            info!("Relay disabled until {}", resume_at.format("%H:%M:%S"));

            let minutes = self.config.pause_duration.as_secs() / 60;
            let text = format!("Padooon 🥺\nJe me tais {minutes} minutes.");
            self.throttle
                .send(|| self.platform.reply(msg.channel_id, msg.message_id, &text))
                .await?;
            return Ok(Disposition::Silenced);
        }

        let Some(pattern) = self.matcher.matching_pattern(&msg.content) else {
            return Ok(Disposition::NotARequest);
        };

        info!("Time request detected from {} ({pattern}): {}", msg.author_name, msg.preview());
        self.queue.push_back(PendingRequest::new(msg));
        debug!("{} pending request(s)", self.queue.len());
        self.platform.invoke_announcer().await?;
        Ok(Disposition::Enqueued)
    }

    pub async fn handle_announcer_message(&mut self, msg: &IncomingMessage) -> Result<Disposition, PlatformError> {
        if self.is_paused() {
            return Ok(Disposition::Paused);
        }

        let Some(request) = self.queue.pop_front() else {
            return Ok(Disposition::NoPendingRequest);
        };

        let waited = request.enqueued_at.elapsed();
        info!(
            "Relaying announcement to {} after {}ms: {}",
            request.requester_name,
            waited.as_millis(),
            msg.preview()
        );

        let thanks = format!(
            "Merci pour tes loyaux services Artémis ! Je transmets l'information à {}",
            self.platform.mention(request.requester_id)
        );
        self.throttle
            .send(|| self.platform.reply(msg.channel_id, msg.message_id, &thanks))
            .await?;

        let forward = format!(
            "D'après {}, {}",
            self.platform.mention(msg.author_id),
            msg.content.to_lowercase()
        );
        self.throttle
            .send(|| self.platform.reply(request.channel_id, request.message_id, &forward))
            .await?;

        Ok(Disposition::Relayed)
    }

    /// True if the message mentions us and tells us to shut up.
    pub fn is_shutdown_request(&self, msg: &IncomingMessage) -> bool {
        msg.mentions_user(self.config.bot_user_id) && nlp::contains_shutdown_phrase(&msg.content)
    }

    pub fn is_paused(&self) -> bool {
        self.disabled_until.is_some_and(|until| Instant::now() < until)
    }

    pub fn disabled_until(&self) -> Option<Instant> {
        self.disabled_until
    }

    /// Requests waiting for an announcement, oldest first.
    pub fn pending(&self) -> impl Iterator<Item = &PendingRequest> {
        self.queue.iter()
    }
}
