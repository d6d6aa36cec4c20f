use std::sync::Arc;
use std::time::Duration;

use serenity::all::{ChannelId, Http};
use tokio::sync::mpsc;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

/// Discord rejects messages above 2000 chars.
const MAX_MESSAGE_LENGTH: usize = 1900;

/// Only our own events are mirrored; serenity logs about sending would loop.
const LOG_TARGET_PREFIX: &str = "artemis_relay";

/// Log message with priority.
#[derive(Debug, PartialEq, Eq)]
enum LogMessage {
    /// High priority (WARN/ERROR) - send immediately
    Urgent(String),
    /// Low priority (INFO) - batch and send periodically
    Info(String),
}

pub struct DiscordLogLayer {
    tx: mpsc::UnboundedSender<LogMessage>,
}

impl DiscordLogLayer {
    pub fn new(http: Arc<Http>, channel_id: u64) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<LogMessage>();
        let channel = ChannelId::new(channel_id);

        tokio::spawn(async move {
            let mut info_buffer: Vec<String> = Vec::new();
            let mut interval = tokio::time::interval(Duration::from_secs(5));

            loop {
                tokio::select! {
                    msg = rx.recv() => {
                        match msg {
                            Some(LogMessage::Urgent(text)) => {
                                send_log(&http, channel, &text).await;
                            }
                            Some(LogMessage::Info(text)) => {
                                info_buffer.push(text);
                                if info_buffer.len() >= 50 {
                                    flush_buffer(&http, channel, &mut info_buffer).await;
                                }
                            }
                            None => break,
                        }
                    }
                    _ = interval.tick() => {
                        if !info_buffer.is_empty() {
                            flush_buffer(&http, channel, &mut info_buffer).await;
                        }
                    }
                }
            }
        });

        Self { tx }
    }
}

fn truncate(text: &str) -> String {
    if text.chars().count() > MAX_MESSAGE_LENGTH {
        let truncated: String = text.chars().take(MAX_MESSAGE_LENGTH).collect();
        format!("{}...", truncated)
    } else {
        text.to_string()
    }
}

async fn send_log(http: &Arc<Http>, channel: ChannelId, text: &str) {
    if let Err(e) = channel.say(http, truncate(text)).await {
        eprintln!("Failed to send log to Discord: {e}");
    }
}

async fn flush_buffer(http: &Arc<Http>, channel: ChannelId, buffer: &mut Vec<String>) {
    if buffer.is_empty() {
        return;
    }
    let combined = buffer.join("\n");
    buffer.clear();
    send_log(http, channel, &combined).await;
}

/// Map an event to the message mirrored to Discord, if any.
fn classify(level: Level, message: String) -> Option<LogMessage> {
    match level {
        Level::ERROR => Some(LogMessage::Urgent(format!("❌ {}", message))),
        Level::WARN => Some(LogMessage::Urgent(format!("⚠️ {}", message))),
        Level::INFO => Some(LogMessage::Info(message)),
        _ => None,
    }
}

struct MessageVisitor {
    message: String,
}

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else if self.message.is_empty() {
            self.message = format!("{} = {:?}", field.name(), value);
        } else {
            self.message
                .push_str(&format!(", {} = {:?}", field.name(), value));
        }
    }
}

impl<S: Subscriber> Layer<S> for DiscordLogLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if !event.metadata().target().starts_with(LOG_TARGET_PREFIX) {
            return;
        }

        let mut visitor = MessageVisitor {
            message: String::new(),
        };
        event.record(&mut visitor);

        let Some(msg) = classify(*event.metadata().level(), visitor.message) else {
            return;
        };

        if self.tx.send(msg).is_err() {
            eprintln!("Log channel closed, message dropped");
        }
    }
}
