use crate::error::SchemaError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TemplateType {
    Email,
    Sms,
    NhsApp,
    Letter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TemplateStatus {
    NotYetSubmitted,
    Submitted,
    Deleted,
    PendingUpload,
    PendingValidation,
    ValidationFailed,
    VirusScanFailed,
    PendingProofRequest,
    WaitingForProof,
    ProofAvailable,
    Locked,
}

impl TemplateStatus {
    pub const ALL: [TemplateStatus; 11] = [
        TemplateStatus::NotYetSubmitted,
        TemplateStatus::Submitted,
        TemplateStatus::Deleted,
        TemplateStatus::PendingUpload,
        TemplateStatus::PendingValidation,
        TemplateStatus::ValidationFailed,
        TemplateStatus::VirusScanFailed,
        TemplateStatus::PendingProofRequest,
        TemplateStatus::WaitingForProof,
        TemplateStatus::ProofAvailable,
        TemplateStatus::Locked,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateStatus::NotYetSubmitted => "NOT_YET_SUBMITTED",
            TemplateStatus::Submitted => "SUBMITTED",
            TemplateStatus::Deleted => "DELETED",
            TemplateStatus::PendingUpload => "PENDING_UPLOAD",
            TemplateStatus::PendingValidation => "PENDING_VALIDATION",
            TemplateStatus::ValidationFailed => "VALIDATION_FAILED",
            TemplateStatus::VirusScanFailed => "VIRUS_SCAN_FAILED",
            TemplateStatus::PendingProofRequest => "PENDING_PROOF_REQUEST",
            TemplateStatus::WaitingForProof => "WAITING_FOR_PROOF",
            TemplateStatus::ProofAvailable => "PROOF_AVAILABLE",
            TemplateStatus::Locked => "LOCKED",
        }
    }
}

/// The fields the pipeline reads. Everything else rides along untouched in
/// the snapshot document.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RequiredFields {
    id: String,
    template_type: TemplateType,
    template_status: TemplateStatus,
    #[serde(default)]
    proofing_enabled: Option<bool>,
}

/// A template's state at one point in time, as captured in a change image.
///
/// Built once from a decoded image and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateSnapshot {
    pub id: String,
    pub template_type: TemplateType,
    pub template_status: TemplateStatus,
    pub proofing_enabled: Option<bool>,
    document: Map<String, Value>,
}

impl TemplateSnapshot {
    /// Validate a decoded image. `image` names it in the error
    /// (`"newState"` / `"oldState"`).
    ///
    /// Only `id`, `templateType` and `templateStatus` are required. Older
    /// images may predate most other fields, so unknown and missing optional
    /// fields are accepted as-is.
    pub fn from_document(image: &'static str, document: Map<String, Value>) -> Result<Self, SchemaError> {
        let fields: RequiredFields =
            serde_json::from_value(Value::Object(document.clone())).map_err(|e| SchemaError {
                image,
                reason: e.to_string(),
            })?;

        Ok(Self {
            id: fields.id,
            template_type: fields.template_type,
            template_status: fields.template_status,
            proofing_enabled: fields.proofing_enabled,
            document,
        })
    }

    /// The full decoded image, including fields the pipeline does not read
    pub fn document(&self) -> &Map<String, Value> {
        &self.document
    }

    pub fn into_document(self) -> Map<String, Value> {
        self.document
    }
}
