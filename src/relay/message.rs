//! Inbound message snapshot and queued requests.

use tokio::time::Instant;

/// Max chars of message text shown in log lines.
const PREVIEW_LENGTH: usize = 100;

/// A message as delivered by the event source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    pub message_id: u64,
    pub channel_id: u64,
    /// `None` for direct messages.
    pub guild_id: Option<u64>,
    pub author_id: u64,
    pub author_name: String,
    pub author_is_bot: bool,
    pub content: String,
    /// User IDs mentioned in the message.
    pub mentions: Vec<u64>,
}

impl IncomingMessage {
    pub fn mentions_user(&self, user_id: u64) -> bool {
        self.mentions.contains(&user_id)
    }

    /// Message text cut for logging.
    pub fn preview(&self) -> String {
        self.content.chars().take(PREVIEW_LENGTH).collect()
    }
}

/// A human message waiting for the next announcement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
    pub requester_id: u64,
    pub requester_name: String,
    pub channel_id: u64,
    pub message_id: u64,
    pub enqueued_at: Instant,
}

impl PendingRequest {
    pub fn new(message: &IncomingMessage) -> Self {
        Self {
            requester_id: message.author_id,
            requester_name: message.author_name.clone(),
            channel_id: message.channel_id,
            message_id: message.message_id,
            enqueued_at: Instant::now(),
        }
    }
}
