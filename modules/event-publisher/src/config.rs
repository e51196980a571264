use crate::error::ConfigError;
use std::env;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusType {
    Nats,
    InMemory,
}

impl BusType {
    pub fn from_str(s: &str) -> Result<Self, ConfigError> {
        match s.trim().to_lowercase().as_str() {
            "nats" => Ok(BusType::Nats),
            "inmemory" => Ok(BusType::InMemory),
            other => Err(ConfigError::Invalid {
                var: "EVENT_BUS_TYPE",
                reason: format!("expected 'nats' or 'inmemory', got '{other}'"),
            }),
        }
    }
}

/// Process configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Table whose changes are published
    pub templates_table_name: String,
    /// Table whose changes are recognised but not published
    pub routing_config_table_name: String,
    pub event_source: String,
    /// Destination subject for template events
    pub event_topic: String,
    /// Subject the change batches arrive on
    pub inbound_subject: String,
    pub nats_url: String,
    pub bus_type: BusType,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        let templates_table_name = required("TEMPLATES_TABLE_NAME")?;
        let routing_config_table_name = required("ROUTING_CONFIG_TABLE_NAME")?;

        // Routing-config records are skipped before the templates check, so a
        // shared name would silently drop every template change.
        if templates_table_name == routing_config_table_name {
            return Err(ConfigError::Invalid {
                var: "ROUTING_CONFIG_TABLE_NAME",
                reason: format!("must differ from TEMPLATES_TABLE_NAME ('{templates_table_name}')"),
            });
        }

        Ok(Self {
            templates_table_name,
            routing_config_table_name,
            event_source: required("EVENT_SOURCE")?,
            event_topic: required("EVENT_TOPIC")?,
            inbound_subject: lookup("INBOUND_SUBJECT").unwrap_or_else(|| "templates.changes".to_string()),
            nats_url: lookup("NATS_URL").unwrap_or_else(|| "nats://localhost:4222".to_string()),
            bus_type: BusType::from_str(&lookup("EVENT_BUS_TYPE").unwrap_or_else(|| "nats".to_string()))?,
        })
    }
}
