//! In-memory implementation of the EventBus trait for testing and development

use crate::{BusMessage, BusResult, EventBus};
use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

/// EventBus implementation using in-memory channels
///
/// Messages are broadcast to all live subscribers via a Tokio broadcast
/// channel. A bus built with [`InMemoryBus::recording`] also appends every
/// published message to a history log so tests can assert on what was sent
/// without racing a subscriber; [`InMemoryBus::new`] keeps no history.
///
/// # Example
/// ```rust
/// use event_bus::{EventBus, InMemoryBus};
/// use futures::StreamExt;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let bus = InMemoryBus::recording();
///
/// let mut stream = bus.subscribe("templates.>").await?;
/// bus.publish("templates.events", b"hello".to_vec()).await?;
///
/// let msg = stream.next().await.unwrap();
/// assert_eq!(msg.subject, "templates.events");
/// assert_eq!(bus.published().len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct InMemoryBus {
    sender: Arc<broadcast::Sender<BusMessage>>,
    history: Option<Arc<Mutex<Vec<BusMessage>>>>,
}

impl InMemoryBus {
    /// Create a new in-memory event bus with a buffer of 1000 messages.
    pub fn new() -> Self {
        Self::with_capacity(1000)
    }

    /// Create a new in-memory event bus with a custom buffer size
    ///
    /// Lagging subscribers lose the oldest messages once the buffer is
    /// exceeded.
    pub fn with_capacity(buffer_size: usize) -> Self {
        let (sender, _) = broadcast::channel(buffer_size);
        Self {
            sender: Arc::new(sender),
            history: None,
        }
    }

    /// Create a bus that keeps every published message for inspection.
    ///
    /// The history is never trimmed, so use this in tests only.
    pub fn recording() -> Self {
        Self {
            history: Some(Arc::new(Mutex::new(Vec::new()))),
            ..Self::new()
        }
    }

    /// Every message published so far, in publish order. Always empty unless
    /// the bus was built with [`InMemoryBus::recording`].
    pub fn published(&self) -> Vec<BusMessage> {
        match &self.history {
            Some(history) => match history.lock() {
                Ok(history) => history.clone(),
                Err(poisoned) => poisoned.into_inner().clone(),
            },
            None => Vec::new(),
        }
    }

    /// Messages published to exactly `subject`, in publish order
    pub fn published_to(&self, subject: &str) -> Vec<BusMessage> {
        self.published()
            .into_iter()
            .filter(|msg| msg.subject == subject)
            .collect()
    }

    /// Publish a message carrying a reply subject, the way a request-style
    /// upstream hands over a batch and waits for the failure report.
    pub fn publish_with_reply(&self, subject: &str, payload: Vec<u8>, reply_to: &str) {
        let msg = BusMessage::new(subject.to_string(), payload).with_reply_to(reply_to.to_string());
        self.record(msg);
    }

    fn record(&self, msg: BusMessage) {
        if let Some(history) = &self.history {
            match history.lock() {
                Ok(mut history) => history.push(msg.clone()),
                Err(poisoned) => poisoned.into_inner().push(msg.clone()),
            }
        }
        // No receivers is fine
        let _ = self.sender.send(msg);
    }

    /// Check if a subject matches a subscription pattern
    ///
    /// - `templates.>` matches `templates.changes.batch`
    /// - `templates.*.batch` matches `templates.changes.batch`
    /// - `templates.*` does NOT match `templates.changes.batch`
    fn matches_pattern(subject: &str, pattern: &str) -> bool {
        let subject_tokens: Vec<&str> = subject.split('.').collect();
        let pattern_tokens: Vec<&str> = pattern.split('.').collect();

        let mut s_idx = 0;
        let mut p_idx = 0;

        while s_idx < subject_tokens.len() && p_idx < pattern_tokens.len() {
            let pattern_token = pattern_tokens[p_idx];

            if pattern_token == ">" {
                return true;
            } else if pattern_token == "*" || subject_tokens[s_idx] == pattern_token {
                s_idx += 1;
                p_idx += 1;
            } else {
                return false;
            }
        }

        s_idx == subject_tokens.len() && p_idx == pattern_tokens.len()
    }
}

impl Default for InMemoryBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventBus for InMemoryBus {
    async fn publish(&self, subject: &str, payload: Vec<u8>) -> BusResult<()> {
        self.record(BusMessage::new(subject.to_string(), payload));
        Ok(())
    }

    async fn subscribe(&self, pattern: &str) -> BusResult<BoxStream<'static, BusMessage>> {
        let mut receiver = self.sender.subscribe();
        let pattern = pattern.to_string();

        let stream = async_stream::stream! {
            loop {
                match receiver.recv().await {
                    Ok(msg) => {
                        if Self::matches_pattern(&msg.subject, &pattern) {
                            yield msg;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, pattern = %pattern, "InMemoryBus subscriber lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        };

        Ok(stream.boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use std::time::Duration;

    #[test]
    fn test_pattern_matching() {
        assert!(InMemoryBus::matches_pattern("templates.events", "templates.events"));
        assert!(InMemoryBus::matches_pattern("templates.changes.batch", "templates.*.batch"));
        assert!(!InMemoryBus::matches_pattern("templates.changes.batch", "templates.*"));
        assert!(InMemoryBus::matches_pattern("templates.changes.batch", "templates.>"));
        assert!(!InMemoryBus::matches_pattern("templates.changes", "routing.>"));
        assert!(InMemoryBus::matches_pattern("single", "*"));
        assert!(!InMemoryBus::matches_pattern("one.two", "one"));
    }

    #[tokio::test]
    async fn test_publish_is_recorded_without_subscribers() {
        let bus = InMemoryBus::recording();

        bus.publish("templates.events", b"first".to_vec()).await.unwrap();
        bus.publish("other.events", b"second".to_vec()).await.unwrap();

        assert_eq!(bus.published().len(), 2);
        let to_templates = bus.published_to("templates.events");
        assert_eq!(to_templates.len(), 1);
        assert_eq!(to_templates[0].payload, b"first".to_vec());
    }

    #[tokio::test]
    async fn test_plain_bus_keeps_no_history() {
        let bus = InMemoryBus::new();
        let mut stream = bus.subscribe("templates.>").await.unwrap();

        for _ in 0..10_000 {
            bus.publish("templates.events", vec![0u8; 100]).await.unwrap();
        }

        assert!(bus.published().is_empty());
        assert!(bus.published_to("templates.events").is_empty());

        // Delivery to subscribers is unaffected
        let msg = tokio::time::timeout(Duration::from_secs(1), stream.next())
            .await
            .expect("timeout")
            .expect("stream ended");
        assert_eq!(msg.subject, "templates.events");
    }

    #[tokio::test]
    async fn test_recording_clones_share_history() {
        let bus = InMemoryBus::recording();
        let shared = bus.clone();

        shared.publish("templates.events", b"x".to_vec()).await.unwrap();

        assert_eq!(bus.published().len(), 1);
    }

    #[tokio::test]
    async fn test_publish_and_subscribe_in_order() {
        let bus = InMemoryBus::new();
        let mut stream = bus.subscribe("templates.>").await.unwrap();

        for i in 0..3 {
            bus.publish(&format!("templates.msg.{}", i), format!("m{}", i).into_bytes())
                .await
                .unwrap();
        }

        for i in 0..3 {
            let msg = tokio::time::timeout(Duration::from_secs(1), stream.next())
                .await
                .expect("timeout")
                .expect("stream ended");
            assert_eq!(msg.subject, format!("templates.msg.{}", i));
        }
    }

    #[tokio::test]
    async fn test_reply_subject_is_delivered() {
        let bus = InMemoryBus::new();
        let mut stream = bus.subscribe("templates.changes").await.unwrap();

        bus.publish_with_reply("templates.changes", b"[]".to_vec(), "_INBOX.1");

        let msg = tokio::time::timeout(Duration::from_secs(1), stream.next())
            .await
            .expect("timeout")
            .expect("stream ended");
        assert_eq!(msg.reply_to.as_deref(), Some("_INBOX.1"));
    }
}
