use crate::error::{BuildError, ValidationIssue};
use crate::events::envelope::EventKind;
use jsonschema::JSONSchema;
use serde_json::Value;
use std::collections::HashMap;

const TEMPLATE_COMPLETED_V1: &str =
    include_str!("../../../../contracts/events/template-completed.v1.json");
const TEMPLATE_DRAFTED_V1: &str = include_str!("../../../../contracts/events/template-drafted.v1.json");
const TEMPLATE_DELETED_V1: &str = include_str!("../../../../contracts/events/template-deleted.v1.json");

fn schema_source(kind: EventKind) -> &'static str {
    match kind {
        EventKind::Completed => TEMPLATE_COMPLETED_V1,
        EventKind::Drafted => TEMPLATE_DRAFTED_V1,
        EventKind::Deleted => TEMPLATE_DELETED_V1,
    }
}

/// Compiled output schemas, one per event kind, selected by the envelope's
/// `type` field.
pub struct ContractRegistry {
    schemas: HashMap<EventKind, JSONSchema>,
}

impl ContractRegistry {
    /// Compile the schemas embedded at build time
    pub fn load() -> Result<Self, BuildError> {
        let mut schemas = HashMap::new();
        for kind in EventKind::ALL {
            let json: Value = serde_json::from_str(schema_source(kind))
                .map_err(|e| BuildError::Contract(format!("{}: {e}", kind.event_type())))?;
            let compiled = JSONSchema::compile(&json)
                .map_err(|e| BuildError::Contract(format!("{}: {e}", kind.event_type())))?;
            schemas.insert(kind, compiled);
        }
        Ok(Self { schemas })
    }

    /// Validate a serialised envelope against the schema its `type` names.
    ///
    /// An envelope whose `type` is missing or unknown fails here too, since no
    /// schema can vouch for it.
    pub fn validate(&self, envelope: &Value) -> Result<(), BuildError> {
        let event_type = envelope
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let schema = EventKind::from_event_type(&event_type)
            .and_then(|kind| self.schemas.get(&kind))
            .ok_or_else(|| BuildError::EnvelopeValidation {
                event_type: event_type.clone(),
                issues: vec![ValidationIssue {
                    path: "/type".to_string(),
                    message: format!("no output schema for event type '{event_type}'"),
                }],
            })?;

        if let Err(errors) = schema.validate(envelope) {
            let issues = errors
                .map(|e| ValidationIssue {
                    path: e.instance_path.to_string(),
                    message: e.to_string(),
                })
                .collect();
            return Err(BuildError::EnvelopeValidation { event_type, issues });
        }

        Ok(())
    }
}
