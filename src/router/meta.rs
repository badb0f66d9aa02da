use std::{
    sync::Arc,
    time::Instant,
};

use anyhow::Result;

use crate::{
    core::{
        id::{
            Id,
            IdAllocator,
        },
        types::{
            Dictionary,
            List,
            Value,
        },
        uri::Uri,
    },
    message::message::{
        Message,
        PublishMessage,
    },
    router::{
        config::StatsConfig,
        router_capability::Router,
    },
};

/// `wamp.session.on_join`.
pub const TOPIC_ON_JOIN: &str = "wamp.session.on_join";
/// `wamp.session.on_leave`.
pub const TOPIC_ON_LEAVE: &str = "wamp.session.on_leave";
/// `wamp.session.on_stats`.
pub const TOPIC_ON_STATS: &str = "wamp.session.on_stats";

/// A single stats emission for a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsRecord {
    pub id: Id,
    pub rated_messages: u64,
    pub duration: u64,
    pub first: bool,
    pub last: bool,
}

impl From<&StatsRecord> for Dictionary {
    fn from(record: &StatsRecord) -> Self {
        Dictionary::from_iter([
            (
                "id".to_owned(),
                Value::Integer(record.id.to_string().parse().unwrap_or(0)),
            ),
            (
                "rated_messages".to_owned(),
                Value::Integer(record.rated_messages),
            ),
            ("duration".to_owned(), Value::Integer(record.duration)),
            ("first".to_owned(), Value::Bool(record.first)),
            ("last".to_owned(), Value::Bool(record.last)),
        ])
    }
}

/// Tracks per-session message-rating stats and decides when to emit a [`StatsRecord`].
///
/// The byte counter resets after every emission; `rated_messages` and elapsed duration persist
/// for the life of the session, since they are what gate `first`/`last`, not the byte counter.
pub struct StatsTracker {
    config: StatsConfig,
    id: Id,
    rated_messages: u64,
    bytes_since_emission: u64,
    joined_at: Instant,
    last_emission_at: Instant,
    emitted_any: bool,
}

impl StatsTracker {
    pub fn new(id: Id, config: StatsConfig) -> Self {
        let now = Instant::now();
        Self {
            config,
            id,
            rated_messages: 0,
            bytes_since_emission: 0,
            joined_at: now,
            last_emission_at: now,
            emitted_any: false,
        }
    }

    /// Rates an outgoing/incoming message by its serialized byte size and accumulates it.
    pub fn record_message(&mut self, byte_size: usize) {
        let rating = (byte_size.max(1) as u64).div_ceil(self.config.rated_message_size as u64).max(1);
        self.rated_messages += rating;
        self.bytes_since_emission += byte_size as u64;
    }

    fn elapsed_since_last_emission(&self) -> u64 {
        self.last_emission_at.elapsed().as_secs()
    }

    /// Whether accumulated message ratings or elapsed time warrant an emission.
    pub fn should_trigger(&self) -> bool {
        (self.config.trigger_after_rated_messages > 0
            && self.rated_messages >= self.config.trigger_after_rated_messages)
            || (self.config.trigger_after_duration > 0
                && self.elapsed_since_last_emission() >= self.config.trigger_after_duration)
    }

    /// Produces a [`StatsRecord`] and resets the byte counter (not the persistent counters).
    pub fn emit(&mut self, last: bool) -> StatsRecord {
        let duration = if self.emitted_any {
            self.elapsed_since_last_emission()
        } else {
            self.joined_at.elapsed().as_secs()
        };
        let record = StatsRecord {
            id: self.id,
            rated_messages: self.rated_messages,
            duration,
            first: !self.emitted_any,
            last,
        };
        self.bytes_since_emission = 0;
        self.last_emission_at = Instant::now();
        self.emitted_any = true;
        record
    }
}

/// Publishes the three session meta-events through the realm's routing engine on behalf of its
/// service session.
pub struct MetaPublisher {
    router: Arc<dyn Router>,
    service_session_id: Id,
    id_allocator: Arc<dyn IdAllocator>,
}

impl MetaPublisher {
    pub fn new(
        router: Arc<dyn Router>,
        service_session_id: Id,
        id_allocator: Arc<dyn IdAllocator>,
    ) -> Self {
        Self {
            router,
            service_session_id,
            id_allocator,
        }
    }

    async fn publish(&self, topic: &str, arguments_keyword: Dictionary) -> Result<()> {
        let request = self.id_allocator.generate_id().await;
        let message = Message::Publish(PublishMessage {
            request,
            options: Dictionary::default(),
            topic: Uri::from_known(topic.to_owned()),
            arguments: List::default(),
            arguments_keyword,
        });
        self.router.process(self.service_session_id, message).await
    }

    pub async fn publish_on_join(&self, session_id: Id, authid: &str, authrole: &str) -> Result<()> {
        self.publish(
            TOPIC_ON_JOIN,
            Dictionary::from_iter([
                ("session".to_owned(), Value::Integer(session_id.to_string().parse().unwrap_or(0))),
                ("authid".to_owned(), Value::String(authid.to_owned())),
                ("authrole".to_owned(), Value::String(authrole.to_owned())),
            ]),
        )
        .await
    }

    pub async fn publish_on_leave(&self, previous_session_id: Id) -> Result<()> {
        self.publish(
            TOPIC_ON_LEAVE,
            Dictionary::from_iter([(
                "session".to_owned(),
                Value::Integer(previous_session_id.to_string().parse().unwrap_or(0)),
            )]),
        )
        .await
    }

    pub async fn publish_on_stats(&self, record: StatsRecord) -> Result<()> {
        self.publish(TOPIC_ON_STATS, Dictionary::from(&record)).await
    }
}

#[cfg(test)]
mod stats_test {
    use super::*;

    #[test]
    fn rates_small_messages_as_one_unit() {
        let mut tracker = StatsTracker::new(Id::MIN, StatsConfig {
            rated_message_size: 512,
            trigger_after_rated_messages: 2,
            ..Default::default()
        });
        tracker.record_message(10);
        assert_eq!(tracker.rated_messages, 1);
        assert!(!tracker.should_trigger());
        tracker.record_message(600);
        assert_eq!(tracker.rated_messages, 3);
        assert!(tracker.should_trigger());
    }

    #[test]
    fn first_and_last_flags_reflect_emission_history() {
        let mut tracker = StatsTracker::new(Id::MIN, StatsConfig {
            trigger_after_rated_messages: 1,
            ..Default::default()
        });
        tracker.record_message(1);
        let first = tracker.emit(false);
        assert!(first.first);
        assert!(!first.last);

        tracker.record_message(1);
        let last = tracker.emit(true);
        assert!(!last.first);
        assert!(last.last);
    }
}
