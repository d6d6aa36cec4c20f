//! Minimum spacing between outbound messages.

use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::debug;

/// Serializes sends so that consecutive messages are at least `interval` apart.
///
/// The gap is measured from the completion of the previous successful send to
/// the start of the next one. A failed send does not reset the clock.
pub struct Throttle {
    interval: Duration,
    last_send: Option<Instant>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self { interval, last_send: None }
    }

    /// Wait out the remaining interval, then run `action`.
    ///
    /// Errors from `action` are returned unchanged and never retried.
    pub async fn send<F, Fut, T, E>(&mut self, action: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(last) = self.last_send {
            let elapsed = last.elapsed();
            if elapsed < self.interval {
                let wait = self.interval - elapsed;
                debug!("Throttling send for {}ms", wait.as_millis());
                sleep(wait).await;
            }
        }

        let result = action().await?;
        self.last_send = Some(Instant::now());
        Ok(result)
    }

    pub fn last_send(&self) -> Option<Instant> {
        self.last_send
    }
}
