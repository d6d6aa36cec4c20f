use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read the config file.
    ReadFile { path: PathBuf, source: std::io::Error },
    /// Failed to parse JSON.
    ParseJson { path: PathBuf, source: serde_json::Error },
    /// Validation error.
    Validation(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadFile { path, source } => {
                write!(f, "failed to read config file '{}': {}", path.display(), source)
            }
            Self::ParseJson { path, source } => {
                write!(f, "failed to parse config file '{}': {}", path.display(), source)
            }
            Self::Validation(msg) => write!(f, "config validation error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ReadFile { source, .. } => Some(source),
            Self::ParseJson { source, .. } => Some(source),
            Self::Validation(_) => None,
        }
    }
}

/// How long the relay stays quiet after being told to shut up.
pub const PAUSE_DURATION: Duration = Duration::from_secs(900);

#[derive(Deserialize)]
struct ConfigFile {
    /// Token of the bot account that listens to the guild and sends replies.
    bot_token: String,
    /// Token used to invoke the announcer's application command.
    user_token: String,
    guild_id: u64,
    /// Channel where the announcer command is invoked.
    channel_id: u64,
    /// User ID of the announcer bot (Artemis).
    announcer_id: u64,
    #[serde(default = "default_command_name")]
    command_name: String,
    #[serde(default = "default_command_format")]
    command_format: String,
    #[serde(default = "default_min_send_interval_ms")]
    min_send_interval_ms: u64,
    log_channel_id: Option<u64>,
    /// Directory for log files. Defaults to current directory.
    data_dir: Option<String>,
    #[serde(default = "default_invisible")]
    invisible: bool,
}

fn default_command_name() -> String {
    "heure".to_string()
}

fn default_command_format() -> String {
    "Lettres".to_string()
}

fn default_min_send_interval_ms() -> u64 {
    1000
}

fn default_invisible() -> bool {
    true
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bot_token: String,
    pub user_token: String,
    pub guild_id: u64,
    pub channel_id: u64,
    pub announcer_id: u64,
    /// Name of the announcer's slash command (without the slash).
    pub command_name: String,
    /// Value passed to the command's `format` option.
    pub command_format: String,
    /// Minimum gap between two outbound messages.
    pub min_send_interval: Duration,
    /// Channel receiving a copy of the logs, if any.
    pub log_channel_id: Option<u64>,
    pub data_dir: PathBuf,
    /// Connect with an invisible presence.
    pub invisible: bool,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config_path = path.as_ref().to_path_buf();
        let content = std::fs::read_to_string(&config_path)
            .map_err(|e| ConfigError::ReadFile { path: config_path.clone(), source: e })?;
        let file: ConfigFile = serde_json::from_str(&content)
            .map_err(|e| ConfigError::ParseJson { path: config_path.clone(), source: e })?;

        if file.bot_token.trim().is_empty() {
            return Err(ConfigError::Validation("bot_token is required".into()));
        }
        if file.user_token.trim().is_empty() {
            return Err(ConfigError::Validation("user_token is required".into()));
        }
        for (name, value) in [
            ("guild_id", file.guild_id),
            ("channel_id", file.channel_id),
            ("announcer_id", file.announcer_id),
        ] {
            if value == 0 {
                return Err(ConfigError::Validation(format!("{name} must be a non-zero snowflake")));
            }
        }
        let command_name = file.command_name.trim().trim_start_matches('/').to_string();
        if command_name.is_empty() {
            return Err(ConfigError::Validation("command_name must not be empty".into()));
        }

        let data_dir = file
            .data_dir
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(Self {
            bot_token: file.bot_token,
            user_token: file.user_token,
            guild_id: file.guild_id,
            channel_id: file.channel_id,
            announcer_id: file.announcer_id,
            command_name,
            command_format: file.command_format,
            min_send_interval: Duration::from_millis(file.min_send_interval_ms),
            log_channel_id: file.log_channel_id.filter(|id| *id != 0),
            data_dir,
            invisible: file.invisible,
        })
    }
}
