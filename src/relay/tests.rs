//! Tests for the relay state machine, driven through a recording platform.

use super::*;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{sleep, Instant};

const GUILD: u64 = 10;
const ANNOUNCER: u64 = 20;
const BOT: u64 = 30;
const CHANNEL: u64 = 40;
const ANNOUNCER_CHANNEL: u64 = 41;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    Reply { channel_id: u64, message_id: u64, text: String },
    Invoke,
}

/// Platform that records every call with the instant it was dispatched.
#[derive(Clone, Default)]
struct RecordingPlatform {
    calls: Arc<Mutex<Vec<(Instant, Call)>>>,
    fail_replies: Arc<AtomicBool>,
}

impl RecordingPlatform {
    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().iter().map(|(_, c)| c.clone()).collect()
    }

    fn reply_instants(&self) -> Vec<Instant> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, c)| matches!(c, Call::Reply { .. }))
            .map(|(at, _)| *at)
            .collect()
    }

    fn invocations(&self) -> usize {
        self.calls().iter().filter(|c| **c == Call::Invoke).count()
    }
}

#[async_trait]
impl Platform for RecordingPlatform {
    async fn reply(&self, channel_id: u64, message_id: u64, text: &str) -> Result<(), PlatformError> {
        if self.fail_replies.load(Ordering::SeqCst) {
            return Err(PlatformError::Delivery("missing permissions".to_string()));
        }
        self.calls.lock().unwrap().push((
            Instant::now(),
            Call::Reply { channel_id, message_id, text: text.to_string() },
        ));
        Ok(())
    }

    async fn invoke_announcer(&self) -> Result<(), PlatformError> {
        self.calls.lock().unwrap().push((Instant::now(), Call::Invoke));
        Ok(())
    }
}

fn config() -> RelayConfig {
    RelayConfig {
        guild_id: GUILD,
        announcer_id: ANNOUNCER,
        bot_user_id: BOT,
        pause_duration: Duration::from_secs(900),
        min_send_interval: Duration::from_millis(10),
    }
}

fn relay_with(config: RelayConfig) -> (Relay<RecordingPlatform>, RecordingPlatform) {
    let platform = RecordingPlatform::default();
    (Relay::new(config, platform.clone()), platform)
}

fn human(message_id: u64, author_id: u64, content: &str) -> IncomingMessage {
    IncomingMessage {
        message_id,
        channel_id: CHANNEL,
        guild_id: Some(GUILD),
        author_id,
        author_name: format!("user{author_id}"),
        author_is_bot: false,
        content: content.to_string(),
        mentions: Vec::new(),
    }
}

fn announcer(message_id: u64, content: &str) -> IncomingMessage {
    IncomingMessage {
        message_id,
        channel_id: ANNOUNCER_CHANNEL,
        guild_id: Some(GUILD),
        author_id: ANNOUNCER,
        author_name: "Artemis".to_string(),
        author_is_bot: true,
        content: content.to_string(),
        mentions: Vec::new(),
    }
}

fn shut_up(message_id: u64, author_id: u64, content: &str) -> IncomingMessage {
    let mut msg = human(message_id, author_id, content);
    msg.mentions = vec![BOT];
    msg
}

// =============================================================================
// GUARDS
// =============================================================================

mod guards {
    use super::*;

    #[tokio::test]
    async fn test_other_guild_is_ignored() {
        let (mut relay, platform) = relay_with(config());
        let mut msg = human(1, 100, "what time is it?");
        msg.guild_id = Some(GUILD + 1);

        assert_eq!(relay.handle_message(&msg).await.unwrap(), Disposition::Ignored);
        assert!(platform.calls().is_empty());
    }

    #[tokio::test]
    async fn test_direct_message_is_ignored() {
        let (mut relay, platform) = relay_with(config());
        let mut msg = human(1, 100, "what time is it?");
        msg.guild_id = None;

        assert_eq!(relay.handle_message(&msg).await.unwrap(), Disposition::Ignored);
        assert!(platform.calls().is_empty());
    }

    #[tokio::test]
    async fn test_other_bots_are_ignored() {
        let (mut relay, platform) = relay_with(config());
        let mut msg = human(1, 555, "what time is it?");
        msg.author_is_bot = true;

        assert_eq!(relay.handle_message(&msg).await.unwrap(), Disposition::Ignored);
        assert!(platform.calls().is_empty());
        assert_eq!(relay.pending().count(), 0);
    }

    #[tokio::test]
    async fn test_announcer_is_never_checked_as_requester() {
        let (mut relay, platform) = relay_with(config());
        let mut msg = announcer(1, "What time is it? Ta gueule");
        msg.mentions = vec![BOT];

        assert_eq!(relay.handle_message(&msg).await.unwrap(), Disposition::NoPendingRequest);
        assert!(platform.calls().is_empty());
        assert!(!relay.is_paused());
    }
}

// =============================================================================
// DETECTION
// =============================================================================

mod detection {
    use super::*;

    #[tokio::test]
    async fn test_time_request_is_queued_and_invokes_announcer_once() {
        let (mut relay, platform) = relay_with(config());

        let disposition = relay.handle_message(&human(1, 100, "What's the time?")).await.unwrap();

        assert_eq!(disposition, Disposition::Enqueued);
        assert_eq!(platform.calls(), vec![Call::Invoke]);
        let pending: Vec<u64> = relay.pending().map(|r| r.requester_id).collect();
        assert_eq!(pending, vec![100]);
    }

    #[tokio::test]
    async fn test_french_request_is_queued() {
        let (mut relay, platform) = relay_with(config());

        let disposition = relay.handle_message(&human(1, 100, "Quelle heure est-il ?")).await.unwrap();

        assert_eq!(disposition, Disposition::Enqueued);
        assert_eq!(platform.invocations(), 1);
    }

    #[tokio::test]
    async fn test_chatter_is_not_a_request() {
        let (mut relay, platform) = relay_with(config());

        let disposition = relay.handle_message(&human(1, 100, "I like turtles")).await.unwrap();

        assert_eq!(disposition, Disposition::NotARequest);
        assert!(platform.calls().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_requests_are_all_queued() {
        let (mut relay, platform) = relay_with(config());

        for id in 1..=3 {
            relay.handle_message(&human(id, 100, "what time is it")).await.unwrap();
        }

        assert_eq!(relay.pending().count(), 3);
        assert_eq!(platform.invocations(), 3);
    }
}

// =============================================================================
// PAUSE
// =============================================================================

mod pause {
    use super::*;

    #[tokio::test]
    async fn test_shut_up_pauses_and_acknowledges() {
        let (mut relay, platform) = relay_with(config());
        let before = Instant::now();

        let disposition = relay.handle_message(&shut_up(7, 100, "Oh  TA GUEULE")).await.unwrap();

        assert_eq!(disposition, Disposition::Silenced);
        assert!(relay.is_paused());
        let until = relay.disabled_until().unwrap();
        assert!(until >= before + Duration::from_secs(900));
        assert!(until <= Instant::now() + Duration::from_secs(900));

        let calls = platform.calls();
        assert_eq!(calls.len(), 1);
        match &calls[0] {
            Call::Reply { channel_id, message_id, text } => {
                assert_eq!(*channel_id, CHANNEL);
                assert_eq!(*message_id, 7);
                assert!(text.contains("15 minutes"));
            }
            other => panic!("expected reply, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_paused_relay_ignores_everything() {
        let (mut relay, platform) = relay_with(config());
        relay.handle_message(&human(1, 100, "what time is it")).await.unwrap();
        relay.handle_message(&shut_up(2, 101, "ta gueule")).await.unwrap();

        let request = relay.handle_message(&human(3, 102, "what time is it")).await.unwrap();
        let announcement = relay.handle_message(&announcer(4, "Il est 5 heures")).await.unwrap();

        assert_eq!(request, Disposition::Paused);
        assert_eq!(announcement, Disposition::Paused);
        assert_eq!(platform.invocations(), 1);
        // The request queued before the pause is kept.
        assert_eq!(relay.pending().count(), 1);
    }

    #[tokio::test]
    async fn test_shut_up_without_mention_is_plain_chatter() {
        let (mut relay, platform) = relay_with(config());

        let disposition = relay.handle_message(&human(1, 100, "ta gueule")).await.unwrap();

        assert_eq!(disposition, Disposition::NotARequest);
        assert!(!relay.is_paused());
        assert!(platform.calls().is_empty());
    }

    #[tokio::test]
    async fn test_mention_without_phrase_does_not_pause() {
        let (mut relay, _platform) = relay_with(config());

        let disposition = relay.handle_message(&shut_up(1, 100, "what time is it")).await.unwrap();

        assert_eq!(disposition, Disposition::Enqueued);
        assert!(!relay.is_paused());
    }

    #[tokio::test]
    async fn test_pause_expires_lazily() {
        let mut config = config();
        config.pause_duration = Duration::from_millis(50);
        let (mut relay, platform) = relay_with(config);

        relay.handle_message(&shut_up(1, 100, "ta gueule")).await.unwrap();
        assert_eq!(
            relay.handle_message(&human(2, 100, "what time is it")).await.unwrap(),
            Disposition::Paused
        );

        sleep(Duration::from_millis(80)).await;

        assert_eq!(
            relay.handle_message(&human(3, 100, "what time is it")).await.unwrap(),
            Disposition::Enqueued
        );
        assert_eq!(platform.invocations(), 1);
    }
}

// =============================================================================
// QUEUE AND RELAY
// =============================================================================

mod relaying {
    use super::*;

    fn reply_targets(platform: &RecordingPlatform) -> Vec<(u64, u64)> {
        platform
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Reply { channel_id, message_id, .. } => Some((channel_id, message_id)),
                Call::Invoke => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_announcement_without_requests_is_dropped() {
        let (mut relay, platform) = relay_with(config());

        let disposition = relay.handle_message(&announcer(1, "Il est midi")).await.unwrap();

        assert_eq!(disposition, Disposition::NoPendingRequest);
        assert!(platform.calls().is_empty());
    }

    #[tokio::test]
    async fn test_end_to_end_relay() {
        let (mut relay, platform) = relay_with(config());

        relay.handle_message(&human(1, 100, "What's the time?")).await.unwrap();
        let disposition = relay.handle_message(&announcer(2, "It is 5 O'Clock")).await.unwrap();

        assert_eq!(disposition, Disposition::Relayed);
        assert_eq!(
            platform.calls(),
            vec![
                Call::Invoke,
                Call::Reply {
                    channel_id: ANNOUNCER_CHANNEL,
                    message_id: 2,
                    text: "Merci pour tes loyaux services Artémis ! Je transmets l'information à <@100>".to_string(),
                },
                Call::Reply {
                    channel_id: CHANNEL,
                    message_id: 1,
                    text: format!("D'après <@{ANNOUNCER}>, it is 5 o'clock"),
                },
            ]
        );
        assert_eq!(relay.pending().count(), 0);
    }

    #[tokio::test]
    async fn test_requests_are_served_fifo() {
        let (mut relay, platform) = relay_with(config());

        relay.handle_message(&human(1, 100, "what time is it")).await.unwrap();
        relay.handle_message(&human(2, 200, "quelle heure est-il")).await.unwrap();

        relay.handle_message(&announcer(3, "Il est 10 heures")).await.unwrap();
        relay.handle_message(&announcer(4, "Il est 10 heures et 1 minute")).await.unwrap();
        let third = relay.handle_message(&announcer(5, "Il est 10 heures et 2 minutes")).await.unwrap();

        assert_eq!(third, Disposition::NoPendingRequest);
        assert_eq!(
            reply_targets(&platform),
            vec![
                (ANNOUNCER_CHANNEL, 3),
                (CHANNEL, 1),
                (ANNOUNCER_CHANNEL, 4),
                (CHANNEL, 2),
            ]
        );
        let texts: Vec<String> = platform
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Reply { text, .. } => Some(text),
                Call::Invoke => None,
            })
            .collect();
        assert!(texts[0].ends_with("<@100>"));
        assert!(texts[2].ends_with("<@200>"));
    }

    #[tokio::test]
    async fn test_relayed_replies_respect_send_interval() {
        let mut config = config();
        config.min_send_interval = Duration::from_millis(100);
        let (mut relay, platform) = relay_with(config);

        relay.handle_message(&human(1, 100, "what time is it")).await.unwrap();
        relay.handle_message(&announcer(2, "Il est midi")).await.unwrap();

        let instants = platform.reply_instants();
        assert_eq!(instants.len(), 2);
        assert!(instants[1] - instants[0] >= Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_delivery_failure_propagates() {
        let (mut relay, platform) = relay_with(config());
        relay.handle_message(&human(1, 100, "what time is it")).await.unwrap();
        platform.fail_replies.store(true, Ordering::SeqCst);

        let result = relay.handle_message(&announcer(2, "Il est midi")).await;

        assert!(matches!(result, Err(PlatformError::Delivery(_))));
        // The request was taken off the queue before sending and is not retried.
        assert_eq!(relay.pending().count(), 0);
    }
}
