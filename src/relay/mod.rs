//! Relay module - forwards the announcer's time to whoever asked for it.

pub mod engine;
pub mod message;
pub mod platform;
pub mod throttle;

#[cfg(test)]
mod tests;

pub use engine::{Disposition, Relay, RelayConfig};
pub use message::{IncomingMessage, PendingRequest};
pub use platform::{Platform, PlatformError};
pub use throttle::Throttle;
