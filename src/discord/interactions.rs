//! Invokes the announcer's application command through the interactions API.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::relay::PlatformError;

const API_BASE: &str = "https://discord.com/api/v10";

/// Discord epoch (2015-01-01T00:00:00Z) in milliseconds.
const DISCORD_EPOCH_MS: i64 = 1_420_070_400_000;

/// Interaction type for an application command.
const APPLICATION_COMMAND: u8 = 2;
/// Command type for a chat-input (slash) command.
const CHAT_INPUT: u8 = 1;
/// Option type for a string argument.
const STRING_OPTION: u8 = 3;

/// Name of the command option carrying the announcement format.
const FORMAT_OPTION: &str = "format";

/// An application command registered in the guild.
#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationCommand {
    pub id: String,
    pub application_id: String,
    pub version: String,
    pub name: String,
}

#[derive(Deserialize)]
struct CommandIndex {
    application_commands: Vec<ApplicationCommand>,
}

#[derive(Serialize)]
struct InteractionRequest<'a> {
    #[serde(rename = "type")]
    kind: u8,
    application_id: &'a str,
    guild_id: String,
    channel_id: String,
    session_id: &'a str,
    nonce: String,
    data: InteractionData<'a>,
}

#[derive(Serialize)]
struct InteractionData<'a> {
    version: &'a str,
    id: &'a str,
    name: &'a str,
    #[serde(rename = "type")]
    kind: u8,
    options: Vec<CommandOption<'a>>,
}

#[derive(Serialize)]
struct CommandOption<'a> {
    #[serde(rename = "type")]
    kind: u8,
    name: &'a str,
    value: &'a str,
}

/// Calls one resolved command, always in the same channel with the same format.
pub struct CommandInvoker {
    token: String,
    http: reqwest::Client,
    guild_id: u64,
    channel_id: u64,
    session_id: String,
    format: String,
    command: ApplicationCommand,
}

impl CommandInvoker {
    /// Look up `name` in the guild's command index.
    pub async fn resolve(
        token: &str,
        guild_id: u64,
        channel_id: u64,
        name: &str,
        format: &str,
        session_id: &str,
    ) -> Result<Self, PlatformError> {
        let http = reqwest::Client::new();
        let response = http
            .get(format!("{API_BASE}/guilds/{guild_id}/application-command-index"))
            .header("authorization", token)
            .send()
            .await
            .map_err(|e| PlatformError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PlatformError::Api(format!("{status}: {body}")));
        }

        let index: CommandIndex = response
            .json()
            .await
            .map_err(|e| PlatformError::Parse(e.to_string()))?;

        let command = find_command(index.application_commands, name)
            .ok_or_else(|| PlatformError::CommandNotFound { name: name.to_string() })?;
        info!("Found command {} (id: {})", command.name, command.id);

        Ok(Self {
            token: token.to_string(),
            http,
            guild_id,
            channel_id,
            session_id: session_id.to_string(),
            format: format.to_string(),
            command,
        })
    }

    /// Fire the command. The announcement arrives later as a normal message.
    pub async fn invoke(&self) -> Result<(), PlatformError> {
        let request = self.interaction(nonce(chrono::Utc::now().timestamp_millis()));

        let response = self
            .http
            .post(format!("{API_BASE}/interactions"))
            .header("authorization", &self.token)
            .json(&request)
            .send()
            .await
            .map_err(|e| PlatformError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PlatformError::Api(format!("{status}: {body}")));
        }

        info!("Invoked /{} in channel {}", self.command.name, self.channel_id);
        Ok(())
    }

    fn interaction(&self, nonce: String) -> InteractionRequest<'_> {
        InteractionRequest {
            kind: APPLICATION_COMMAND,
            application_id: &self.command.application_id,
            guild_id: self.guild_id.to_string(),
            channel_id: self.channel_id.to_string(),
            session_id: &self.session_id,
            nonce,
            data: InteractionData {
                version: &self.command.version,
                id: &self.command.id,
                name: &self.command.name,
                kind: CHAT_INPUT,
                options: vec![CommandOption {
                    kind: STRING_OPTION,
                    name: FORMAT_OPTION,
                    value: &self.format,
                }],
            },
        }
    }
}

fn find_command(commands: Vec<ApplicationCommand>, name: &str) -> Option<ApplicationCommand> {
    commands.into_iter().find(|c| c.name == name)
}

/// Snowflake-shaped nonce for a unix timestamp in milliseconds.
fn nonce(unix_ms: i64) -> String {
    (((unix_ms - DISCORD_EPOCH_MS).max(0) as u64) << 22).to_string()
}
