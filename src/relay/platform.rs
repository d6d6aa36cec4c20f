//! Chat-platform operations the relay depends on.

use async_trait::async_trait;

/// Errors raised by the chat platform.
#[derive(Debug)]
pub enum PlatformError {
    /// The designated channel can't be fetched (missing, forbidden or invalid).
    ChannelUnavailable { channel_id: u64, reason: String },
    /// The announcer command is not registered in the guild.
    CommandNotFound { name: String },
    /// Transport failure talking to the platform.
    Http(String),
    /// The platform answered with an error status.
    Api(String),
    /// Unexpected response body.
    Parse(String),
    /// A message could not be delivered.
    Delivery(String),
}

impl std::fmt::Display for PlatformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlatformError::ChannelUnavailable { channel_id, reason } => {
                write!(f, "channel {channel_id} can't be accessed: {reason}")
            }
            PlatformError::CommandNotFound { name } => write!(f, "command /{name} not found"),
            PlatformError::Http(e) => write!(f, "HTTP error: {e}"),
            PlatformError::Api(e) => write!(f, "API error: {e}"),
            PlatformError::Parse(e) => write!(f, "Parse error: {e}"),
            PlatformError::Delivery(e) => write!(f, "Delivery error: {e}"),
        }
    }
}

impl std::error::Error for PlatformError {}

/// Outbound side of the chat platform.
#[async_trait]
pub trait Platform: Send + Sync {
    /// Reply to a message in its channel.
    async fn reply(&self, channel_id: u64, message_id: u64, text: &str) -> Result<(), PlatformError>;

    /// Ask the announcer to post the time in the designated channel.
    async fn invoke_announcer(&self) -> Result<(), PlatformError>;

    /// Inline mention of a user.
    fn mention(&self, user_id: u64) -> String {
        format!("<@{user_id}>")
    }
}
