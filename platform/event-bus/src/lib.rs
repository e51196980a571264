//! # EventBus Abstraction
//!
//! Transport seam between the template event publisher and the pub/sub system
//! it delivers to.
//!
//! The publisher only ever needs two things from a transport: send one message
//! to a topic, and receive a stream of inbound change batches. Both live behind
//! [`EventBus`] so the pipeline can be exercised without a broker.
//!
//! ## Implementations
//!
//! - **NatsBus**: Production implementation using NATS
//! - **InMemoryBus**: Test/dev implementation using in-memory channels
//!
//! ## Usage
//!
//! ```rust,no_run
//! use event_bus::{EventBus, NatsBus, InMemoryBus};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Production: NATS
//! let nats_client = async_nats::connect("nats://localhost:4222").await?;
//! let bus: Arc<dyn EventBus> = Arc::new(NatsBus::new(nats_client));
//!
//! // Dev/Test: In-Memory
//! let bus: Arc<dyn EventBus> = Arc::new(InMemoryBus::new());
//!
//! let payload = serde_json::to_vec(&serde_json::json!({
//!     "type": "uk.nhs.notify.template-management.TemplateCompleted.v1",
//!     "subject": "92b676e9-470f-4d04-ab14-965ef145e15d"
//! }))?;
//! bus.publish("templates.events", payload).await?;
//! # Ok(())
//! # }
//! ```

mod inmemory_bus;
mod nats_bus;

pub use inmemory_bus::InMemoryBus;
pub use nats_bus::NatsBus;

use async_trait::async_trait;
use futures::stream::BoxStream;
use std::collections::HashMap;
use std::fmt;

/// A message received from (or recorded by) the event bus
#[derive(Debug, Clone, PartialEq)]
pub struct BusMessage {
    /// The subject/topic this message was published to
    pub subject: String,
    /// The message payload (raw bytes)
    pub payload: Vec<u8>,
    pub headers: Option<HashMap<String, String>>,
    /// Reply subject set by request-style publishers; batch reports go here
    pub reply_to: Option<String>,
}

impl BusMessage {
    pub fn new(subject: String, payload: Vec<u8>) -> Self {
        Self {
            subject,
            payload,
            headers: None,
            reply_to: None,
        }
    }

    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = Some(headers);
        self
    }

    pub fn with_reply_to(mut self, reply_to: String) -> Self {
        self.reply_to = Some(reply_to);
        self
    }
}

/// Errors that can occur when using the event bus
#[derive(Debug, thiserror::Error)]
pub enum BusError {
    #[error("failed to publish message: {0}")]
    PublishError(String),

    #[error("failed to subscribe to subject: {0}")]
    SubscribeError(String),

    #[error("connection error: {0}")]
    ConnectionError(String),
}

/// Result type for event bus operations
pub type BusResult<T> = Result<T, BusError>;

/// Core event bus abstraction for publish-subscribe messaging
///
/// Implementations must be safe to share across tasks; the publisher holds a
/// single `Arc<dyn EventBus>` for the lifetime of the process and reuses it
/// for every record.
#[async_trait]
pub trait EventBus: Send + Sync {
    /// Publish a message to a subject
    ///
    /// # Returns
    /// * `Ok(())` once the transport has accepted the message
    /// * `Err(BusError)` if publishing failed; callers must not assume anything
    ///   was delivered
    async fn publish(&self, subject: &str, payload: Vec<u8>) -> BusResult<()>;

    /// Subscribe to messages matching a subject pattern
    ///
    /// Supports NATS wildcards: `*` matches a single token, `>` matches one or
    /// more trailing tokens.
    async fn subscribe(&self, subject: &str) -> BusResult<BoxStream<'static, BusMessage>>;
}

impl fmt::Debug for dyn EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventBus")
    }
}
