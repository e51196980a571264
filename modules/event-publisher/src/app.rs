use crate::domain::event_builder::EventBuilder;
use crate::error::HandlerError;
use crate::events::publisher::EventPublisher;
use crate::models::ChangeRecord;
use tracing::debug;

/// Per-record orchestration: build, then publish if there is anything to
/// publish. Holds no state between records.
pub struct App {
    builder: EventBuilder,
    publisher: EventPublisher,
}

impl App {
    pub fn new(builder: EventBuilder, publisher: EventPublisher) -> Self {
        Self { builder, publisher }
    }

    /// Handle one change record. Errors are returned to the caller, which owns
    /// redelivery of the record.
    pub async fn handle(&self, record: &ChangeRecord) -> Result<(), HandlerError> {
        let Some(envelope) = self.builder.build_event(record)? else {
            debug!(
                record_id = %record.record_id,
                sequence_number = record.sequence_number.as_deref().unwrap_or("-"),
                "No event to publish for change record"
            );
            return Ok(());
        };

        self.publisher.publish(&envelope).await?;
        Ok(())
    }
}
