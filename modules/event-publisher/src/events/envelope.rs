//! # Template Event Envelope
//!
//! The published contract for template lifecycle events.
//!
//! ## Envelope Fields
//!
//! - `id`: the originating change record id (stable across redelivery)
//! - `source`: configured event source identifier
//! - `time`: RFC 3339 timestamp of envelope construction (not of the change)
//! - `specversion`, `datacontenttype`, `plane`: fixed
//! - `subject`: template id
//! - `type`, `dataschema`, `dataschemaversion`: fixed per [`EventKind`]
//! - `data`: the full decoded template image

use crate::domain::snapshot::TemplateStatus;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const SPEC_VERSION: &str = "1.0";
pub const DATA_CONTENT_TYPE: &str = "application/json";
pub const PLANE: &str = "control";

const TYPE_NAMESPACE: &str = "uk.nhs.notify.template-management";
const SCHEMA_BASE_URL: &str = "https://notify.nhs.uk/events/schemas";

/// The three mutually exclusive template events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Completed,
    Drafted,
    Deleted,
}

impl EventKind {
    pub const ALL: [EventKind; 3] = [EventKind::Completed, EventKind::Drafted, EventKind::Deleted];

    /// SUBMITTED completes a template, DELETED deletes it, and every other
    /// status is a draft.
    pub fn classify(status: TemplateStatus) -> Self {
        match status {
            TemplateStatus::Submitted => EventKind::Completed,
            TemplateStatus::Deleted => EventKind::Deleted,
            _ => EventKind::Drafted,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            EventKind::Completed => "TemplateCompleted",
            EventKind::Drafted => "TemplateDrafted",
            EventKind::Deleted => "TemplateDeleted",
        }
    }

    /// Major version of the event type; bumped only on breaking changes
    pub fn major_version(&self) -> u32 {
        1
    }

    pub fn event_type(&self) -> String {
        format!("{TYPE_NAMESPACE}.{}.v{}", self.name(), self.major_version())
    }

    pub fn dataschema(&self) -> String {
        format!("{SCHEMA_BASE_URL}/{}/v{}.json", self.name(), self.major_version())
    }

    /// Payload shape version, moves independently of the `type` suffix
    pub fn dataschemaversion(&self) -> &'static str {
        match self {
            EventKind::Completed => "1.0.0",
            EventKind::Drafted => "1.0.1",
            EventKind::Deleted => "1.1.0",
        }
    }

    /// Resolve a fully-qualified `type` string back to its kind
    pub fn from_event_type(event_type: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.event_type() == event_type)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateEventEnvelope {
    pub id: String,
    pub source: String,
    pub time: String,
    pub specversion: String,
    pub datacontenttype: String,
    pub plane: String,
    pub subject: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub dataschema: String,
    pub dataschemaversion: String,
    pub data: Map<String, Value>,
}

impl TemplateEventEnvelope {
    pub fn new(
        kind: EventKind,
        record_id: String,
        source: String,
        subject: String,
        data: Map<String, Value>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: record_id,
            source,
            time: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            specversion: SPEC_VERSION.to_string(),
            datacontenttype: DATA_CONTENT_TYPE.to_string(),
            plane: PLANE.to_string(),
            subject,
            event_type: kind.event_type(),
            dataschema: kind.dataschema(),
            dataschemaversion: kind.dataschemaversion().to_string(),
            data,
        }
    }

    pub fn kind(&self) -> Option<EventKind> {
        EventKind::from_event_type(&self.event_type)
    }
}
