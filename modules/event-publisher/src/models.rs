use serde::{Deserialize, Serialize};

/// A change image in its wire encoding: attribute name to tagged value.
///
/// Kept as raw JSON so that nothing is decoded until the record has been
/// routed to a table we actually publish from.
pub type AttributeMap = serde_json::Map<String, serde_json::Value>;

/// One change-data-capture notification from the templates change stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRecord {
    pub record_id: String,
    pub source_table: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence_number: Option<String>,
    /// Absent on hard delete
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_state: Option<AttributeMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_state: Option<AttributeMap>,
}

/// Identifies a record the consumer could not process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchItemFailure {
    pub item_identifier: String,
}

/// Per-batch report handed back to the upstream queue so it redelivers only
/// the failed records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchItemFailures {
    pub batch_item_failures: Vec<BatchItemFailure>,
    /// Set when part of the batch could not be attributed to a record id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchItemFailures {
    /// Report for a payload that could not be read at all
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            batch_item_failures: Vec::new(),
            error: Some(reason.into()),
        }
    }

    pub fn push(&mut self, record_id: &str) {
        self.batch_item_failures.push(BatchItemFailure {
            item_identifier: record_id.to_string(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.batch_item_failures.is_empty() && self.error.is_none()
    }

    pub fn record_ids(&self) -> Vec<&str> {
        self.batch_item_failures
            .iter()
            .map(|f| f.item_identifier.as_str())
            .collect()
    }
}
