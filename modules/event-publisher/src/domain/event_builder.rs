use crate::domain::attribute::decode;
use crate::domain::should_publish::should_publish;
use crate::domain::snapshot::TemplateSnapshot;
use crate::error::BuildError;
use crate::events::envelope::{EventKind, TemplateEventEnvelope};
use crate::events::validate::ContractRegistry;
use crate::models::{AttributeMap, ChangeRecord};
use chrono::{DateTime, Utc};
use tracing::debug;

/// Turns change records into validated template event envelopes.
///
/// Returns `Ok(None)` for every deliberate skip (ignored table, hard delete,
/// not publish-worthy) and an error for everything unexpected.
pub struct EventBuilder {
    templates_table: String,
    routing_config_table: String,
    event_source: String,
    contracts: ContractRegistry,
}

impl EventBuilder {
    pub fn new(
        templates_table: impl Into<String>,
        routing_config_table: impl Into<String>,
        event_source: impl Into<String>,
    ) -> Result<Self, BuildError> {
        Ok(Self {
            templates_table: templates_table.into(),
            routing_config_table: routing_config_table.into(),
            event_source: event_source.into(),
            contracts: ContractRegistry::load()?,
        })
    }

    pub fn build_event(&self, record: &ChangeRecord) -> Result<Option<TemplateEventEnvelope>, BuildError> {
        self.build_event_at(record, Utc::now())
    }

    /// Build with an explicit construction time, which becomes the envelope's
    /// `time`.
    pub fn build_event_at(
        &self,
        record: &ChangeRecord,
        now: DateTime<Utc>,
    ) -> Result<Option<TemplateEventEnvelope>, BuildError> {
        if record.source_table == self.routing_config_table {
            debug!(
                record_id = %record.record_id,
                table = %record.source_table,
                "Routing config changes are not published, skipping"
            );
            return Ok(None);
        }

        if record.source_table != self.templates_table {
            return Err(BuildError::UnrecognisedSource {
                record_id: record.record_id.clone(),
                table: record.source_table.clone(),
            });
        }

        self.build_template_event(record, now)
    }

    fn build_template_event(
        &self,
        record: &ChangeRecord,
        now: DateTime<Utc>,
    ) -> Result<Option<TemplateEventEnvelope>, BuildError> {
        let Some(new_state) = &record.new_state else {
            debug!(record_id = %record.record_id, "No new image (hard delete), skipping");
            return Ok(None);
        };

        let current = snapshot("newState", new_state)?;
        let previous = record
            .old_state
            .as_ref()
            .map(|old_state| snapshot("oldState", old_state))
            .transpose()?;

        if !should_publish(previous.as_ref(), &current) {
            debug!(
                record_id = %record.record_id,
                template_id = %current.id,
                template_type = ?current.template_type,
                template_status = current.template_status.as_str(),
                has_previous = previous.is_some(),
                "Change is not publishable, skipping"
            );
            return Ok(None);
        }

        let kind = EventKind::classify(current.template_status);
        let subject = current.id.clone();
        let envelope = TemplateEventEnvelope::new(
            kind,
            record.record_id.clone(),
            self.event_source.clone(),
            subject,
            current.into_document(),
            now,
        );

        let wire = serde_json::to_value(&envelope).map_err(|e| BuildError::Contract(e.to_string()))?;
        self.contracts.validate(&wire)?;

        Ok(Some(envelope))
    }
}

fn snapshot(image: &'static str, raw: &AttributeMap) -> Result<TemplateSnapshot, BuildError> {
    let document = decode(raw)?;
    Ok(TemplateSnapshot::from_document(image, document)?)
}
