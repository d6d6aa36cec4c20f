//! Discord adapter - gateway events in, replies and command invocations out.

pub mod client;
pub mod handler;
pub mod interactions;

pub use client::DiscordPlatform;
pub use handler::Handler;
pub use interactions::CommandInvoker;
