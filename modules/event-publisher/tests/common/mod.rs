#![allow(dead_code)]

use async_trait::async_trait;
use event_bus::{BusError, BusMessage, BusResult, EventBus, InMemoryBus};
use event_publisher::{App, ChangeRecord, EventBuilder, EventPublisher};
use futures::stream::BoxStream;
use serde_json::{json, Map, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub const TEMPLATES_TABLE: &str = "templates";
pub const ROUTING_CONFIG_TABLE: &str = "routing-configs";
pub const EVENT_SOURCE: &str = "//notify.nhs.uk/app/nhs-notify-template-management/test";
pub const EVENT_TOPIC: &str = "templates.events";

pub fn builder() -> EventBuilder {
    EventBuilder::new(TEMPLATES_TABLE, ROUTING_CONFIG_TABLE, EVENT_SOURCE).expect("contracts compile")
}

pub fn app_with_bus(bus: Arc<dyn EventBus>) -> App {
    App::new(builder(), EventPublisher::new(bus, EVENT_TOPIC))
}

pub fn attributes(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("fixture must be an object, got {other}"),
    }
}

fn base_image(id: &str, template_type: &str, status: &str) -> Map<String, Value> {
    attributes(json!({
        "id": { "S": id },
        "owner": { "S": "owner" },
        "clientId": { "S": "client-id" },
        "name": { "S": "name" },
        "templateType": { "S": template_type },
        "templateStatus": { "S": status },
        "createdAt": { "S": "2022-01-01T08:00:00.000Z" },
        "createdBy": { "S": "created-by" },
        "updatedAt": { "S": "2022-01-01T08:30:00.000Z" },
        "updatedBy": { "S": "updated-by" },
        "lockNumber": { "N": "2" }
    }))
}

pub fn email_image(id: &str, status: &str) -> Map<String, Value> {
    let mut image = base_image(id, "EMAIL", status);
    image.insert("subject".to_string(), json!({ "S": "Appointment" }));
    image.insert("message".to_string(), json!({ "S": "See you at ((time))" }));
    image
}

pub fn sms_image(id: &str, status: &str) -> Map<String, Value> {
    let mut image = base_image(id, "SMS", status);
    image.insert("message".to_string(), json!({ "S": "Reply STOP" }));
    image
}

pub fn nhs_app_image(id: &str, status: &str) -> Map<String, Value> {
    let mut image = base_image(id, "NHS_APP", status);
    image.insert("message".to_string(), json!({ "S": "Open the app" }));
    image
}

pub fn letter_image(id: &str, status: &str, proofing_enabled: bool) -> Map<String, Value> {
    let mut image = base_image(id, "LETTER", status);
    image.insert("language".to_string(), json!({ "S": "en" }));
    image.insert("letterType".to_string(), json!({ "S": "x0" }));
    image.insert("proofingEnabled".to_string(), json!({ "BOOL": proofing_enabled }));
    image.insert(
        "personalisationParameters".to_string(),
        json!({ "L": [ { "S": "nhsNumber" } ] }),
    );
    image.insert(
        "files".to_string(),
        json!({ "M": {
            "proofs": { "M": {
                "proof1": { "M": {
                    "supplier": { "S": "WTMMOCK" },
                    "fileName": { "S": "proof-1.pdf" },
                    "virusScanStatus": { "S": "PASSED" }
                }}
            }}
        }}),
    );
    image
}

pub fn record(
    record_id: &str,
    table: &str,
    new_state: Option<Map<String, Value>>,
    old_state: Option<Map<String, Value>>,
) -> ChangeRecord {
    ChangeRecord {
        record_id: record_id.to_string(),
        source_table: table.to_string(),
        sequence_number: Some("100".to_string()),
        new_state,
        old_state,
    }
}

/// Bus that rejects every publish and counts attempts
#[derive(Default)]
pub struct FailingBus {
    pub attempts: AtomicUsize,
}

impl FailingBus {
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EventBus for FailingBus {
    async fn publish(&self, subject: &str, _payload: Vec<u8>) -> BusResult<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(BusError::PublishError(format!("no route to {subject}")))
    }

    async fn subscribe(&self, subject: &str) -> BusResult<BoxStream<'static, BusMessage>> {
        Err(BusError::SubscribeError(subject.to_string()))
    }
}

pub fn in_memory() -> (InMemoryBus, Arc<dyn EventBus>) {
    let bus = InMemoryBus::recording();
    let shared: Arc<dyn EventBus> = Arc::new(bus.clone());
    (bus, shared)
}

pub fn published_envelopes(bus: &InMemoryBus) -> Vec<Value> {
    bus.published_to(EVENT_TOPIC)
        .iter()
        .map(|msg| serde_json::from_slice(&msg.payload).expect("published payload is JSON"))
        .collect()
}
