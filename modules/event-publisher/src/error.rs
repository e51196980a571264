use event_bus::BusError;
use thiserror::Error;

/// A change image could not be unwrapped from its tagged attribute encoding.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed attribute '{name}': {source}")]
    MalformedAttribute {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("attribute '{name}' holds non-numeric value '{value}'")]
    InvalidNumber { name: String, value: String },

    #[error("attribute '{name}' holds invalid base64 binary: {source}")]
    InvalidBinary {
        name: String,
        #[source]
        source: base64::DecodeError,
    },
}

/// A decoded image does not have the minimal template shape.
#[derive(Debug, Error)]
#[error("{image} failed template schema validation: {reason}")]
pub struct SchemaError {
    pub image: &'static str,
    pub reason: String,
}

/// One failed constraint in an assembled envelope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// JSON pointer into the envelope, e.g. `/data/language`
    pub path: String,
    pub message: String,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("Unrecognised event type: change record {record_id} came from unknown table '{table}'")]
    UnrecognisedSource { record_id: String, table: String },

    #[error("{event_type} envelope failed output schema validation: {}", format_issues(.issues))]
    EnvelopeValidation {
        event_type: String,
        issues: Vec<ValidationIssue>,
    },

    #[error("event contract error: {0}")]
    Contract(String),
}

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("failed to serialize envelope: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Transport(#[from] BusError),
}

/// Failure of a single change record; the caller owns redelivery.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Publish(#[from] PublishError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

fn format_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
