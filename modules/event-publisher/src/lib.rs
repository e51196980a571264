//! # Template Event Publisher
//!
//! Turns change-data-capture records from the templates table into versioned
//! template lifecycle events and publishes them to the event topic.
//!
//! Per record: decode the tagged images, validate them as template
//! snapshots, decide whether the change is publish-worthy, classify it as
//! `TemplateCompleted`, `TemplateDrafted` or `TemplateDeleted`, validate the
//! envelope against that event's schema, and publish it.

pub mod app;
pub mod config;
pub mod consumer;
pub mod domain;
pub mod error;
pub mod events;
pub mod models;

pub use app::App;
pub use config::{BusType, Config};
pub use domain::event_builder::EventBuilder;
pub use domain::should_publish::should_publish;
pub use domain::snapshot::{TemplateSnapshot, TemplateStatus, TemplateType};
pub use error::{BuildError, ConfigError, DecodeError, HandlerError, PublishError, SchemaError};
pub use events::envelope::{EventKind, TemplateEventEnvelope};
pub use events::publisher::EventPublisher;
pub use models::{BatchItemFailures, ChangeRecord};
