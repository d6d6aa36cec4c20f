pub mod config;
pub mod discord;
pub mod discord_log;
pub mod nlp;
pub mod relay;
