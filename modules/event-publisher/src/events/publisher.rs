use crate::error::PublishError;
use crate::events::envelope::TemplateEventEnvelope;
use event_bus::EventBus;
use std::sync::Arc;
use tracing::info;

/// Sends validated envelopes to the destination topic.
///
/// One `publish` call is one transport send. Failures are returned as-is;
/// redelivery belongs to whoever handed us the record.
#[derive(Clone)]
pub struct EventPublisher {
    bus: Arc<dyn EventBus>,
    topic: String,
}

impl EventPublisher {
    pub fn new(bus: Arc<dyn EventBus>, topic: impl Into<String>) -> Self {
        Self {
            bus,
            topic: topic.into(),
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub async fn publish(&self, envelope: &TemplateEventEnvelope) -> Result<(), PublishError> {
        let bytes = serde_json::to_vec(envelope)?;
        self.bus.publish(&self.topic, bytes).await?;

        info!(
            event_id = %envelope.id,
            event_type = %envelope.event_type,
            subject = %envelope.subject,
            topic = %self.topic,
            "Published template event"
        );
        Ok(())
    }
}
