use crate::domain::snapshot::{TemplateSnapshot, TemplateStatus, TemplateType};

/// Letter statuses that are meaningful to downstream consumers. Upload,
/// validation and scanning states are internal to the proofing workflow.
const PUBLISHABLE_LETTER_STATUSES: [TemplateStatus; 5] = [
    TemplateStatus::Deleted,
    TemplateStatus::PendingProofRequest,
    TemplateStatus::ProofAvailable,
    TemplateStatus::Submitted,
    TemplateStatus::WaitingForProof,
];

/// Decide whether a template change warrants a domain event.
///
/// Digital templates always publish. A letter publishes only when there is a
/// previous image to compare against, proofing is enabled on the current
/// image, and the current status is one consumers care about. The previous
/// image's own fields are not inspected.
pub fn should_publish(previous: Option<&TemplateSnapshot>, current: &TemplateSnapshot) -> bool {
    match current.template_type {
        TemplateType::Email | TemplateType::Sms | TemplateType::NhsApp => true,
        TemplateType::Letter => {
            previous.is_some()
                && current.proofing_enabled == Some(true)
                && PUBLISHABLE_LETTER_STATUSES.contains(&current.template_status)
        }
    }
}
