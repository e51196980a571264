//! Inbound side: receives batches of change records from the bus and feeds
//! them to [`App`] one at a time.
//!
//! Each record is its own unit of work. A failed record is reported back by
//! id so the upstream can redeliver just that record; it never stops the rest
//! of the batch.

use crate::app::App;
use crate::models::{BatchItemFailures, ChangeRecord};
use event_bus::{BusMessage, BusResult, EventBus};
use futures::StreamExt;
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info, warn};

/// One element of an inbound batch
#[derive(Debug, Clone, PartialEq)]
pub enum BatchEntry {
    Record(Box<ChangeRecord>),
    /// Not a valid change record. `record_id` is kept when the element still
    /// named one, so the failure can be reported against it.
    Malformed {
        record_id: Option<String>,
        reason: String,
    },
}

/// Parse a message payload: a JSON array of change records, or a single
/// record treated as a batch of one.
///
/// Only a payload that is not JSON at all is an error. Each element is read
/// on its own, so one bad element never hides the others.
pub fn parse_batch(payload: &[u8]) -> Result<Vec<BatchEntry>, serde_json::Error> {
    let items = match serde_json::from_slice::<Value>(payload)? {
        Value::Array(items) => items,
        single => vec![single],
    };

    Ok(items.into_iter().map(parse_entry).collect())
}

fn parse_entry(item: Value) -> BatchEntry {
    let record_id = item
        .get("recordId")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .map(str::to_string);

    match serde_json::from_value::<ChangeRecord>(item) {
        Ok(record) => BatchEntry::Record(Box::new(record)),
        Err(e) => BatchEntry::Malformed {
            record_id,
            reason: e.to_string(),
        },
    }
}

async fn handle_record(app: &App, record: &ChangeRecord) -> bool {
    match app.handle(record).await {
        Ok(()) => true,
        Err(e) => {
            error!(
                record_id = %record.record_id,
                source_table = %record.source_table,
                error = %e,
                "Failed to process change record"
            );
            false
        }
    }
}

/// Handle every record in batch order and collect the ids of those that failed.
pub async fn process_batch(app: &App, records: &[ChangeRecord]) -> BatchItemFailures {
    let mut failures = BatchItemFailures::default();

    for record in records {
        if !handle_record(app, record).await {
            failures.push(&record.record_id);
        }
    }

    failures
}

/// Process parsed entries in batch order. Malformed entries are reported
/// alongside records that failed processing.
pub async fn process_entries(app: &App, entries: &[BatchEntry]) -> BatchItemFailures {
    let mut failures = BatchItemFailures::default();
    let mut unidentified = 0usize;

    for (index, entry) in entries.iter().enumerate() {
        match entry {
            BatchEntry::Record(record) => {
                if !handle_record(app, record).await {
                    failures.push(&record.record_id);
                }
            }
            BatchEntry::Malformed { record_id, reason } => {
                error!(
                    index,
                    record_id = record_id.as_deref().unwrap_or(""),
                    reason = %reason,
                    "Malformed change record in batch"
                );
                match record_id {
                    Some(id) => failures.push(id),
                    None => unidentified += 1,
                }
            }
        }
    }

    if unidentified > 0 {
        failures.error = Some(format!("{unidentified} batch element(s) without a recordId could not be read"));
    }

    failures
}

async fn send_report(bus: &dyn EventBus, reply_to: &str, report: &BatchItemFailures) {
    match serde_json::to_vec(report) {
        Ok(payload) => {
            if let Err(e) = bus.publish(reply_to, payload).await {
                warn!(reply_to = %reply_to, error = %e, "Failed to send batch failure report");
            }
        }
        Err(e) => warn!(error = %e, "Failed to serialize batch failure report"),
    }
}

/// Process one inbound message. When it carries a reply subject the failure
/// report is sent there.
///
/// Returns `None` when the payload could not be parsed at all; a report with
/// only an `error` is still sent to the reply subject in that case.
pub async fn handle_message(app: &App, bus: &dyn EventBus, msg: &BusMessage) -> Option<BatchItemFailures> {
    let entries = match parse_batch(&msg.payload) {
        Ok(entries) => entries,
        Err(e) => {
            error!(subject = %msg.subject, error = %e, "Dropping unparseable change batch");
            if let Some(reply_to) = &msg.reply_to {
                send_report(bus, reply_to, &BatchItemFailures::rejected(e.to_string())).await;
            }
            return None;
        }
    };

    let failures = process_entries(app, &entries).await;

    if !failures.is_empty() {
        warn!(
            subject = %msg.subject,
            batch_size = entries.len(),
            failed = failures.batch_item_failures.len(),
            "Change batch completed with failures"
        );
    }

    if let Some(reply_to) = &msg.reply_to {
        send_report(bus, reply_to, &failures).await;
    }

    Some(failures)
}

/// Consume change batches from `subject` until the subscription ends.
pub async fn run_consumer(app: Arc<App>, bus: Arc<dyn EventBus>, subject: &str) -> BusResult<()> {
    let mut stream = bus.subscribe(subject).await?;
    info!(subject = %subject, "Consuming template change batches");

    while let Some(msg) = stream.next().await {
        handle_message(&app, bus.as_ref(), &msg).await;
    }

    warn!(subject = %subject, "Change batch subscription ended");
    Ok(())
}
