use event_bus::{EventBus, InMemoryBus, NatsBus};
use event_publisher::consumer::run_consumer;
use event_publisher::{App, BusType, Config, EventBuilder, EventPublisher};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;
    init_tracing();

    let bus: Arc<dyn EventBus> = match config.bus_type {
        BusType::Nats => {
            tracing::info!(url = %config.nats_url, "Connecting to NATS");
            Arc::new(NatsBus::connect(&config.nats_url).await?)
        }
        BusType::InMemory => {
            tracing::warn!("Using in-memory event bus; events will not leave this process");
            Arc::new(InMemoryBus::new())
        }
    };

    let builder = EventBuilder::new(
        config.templates_table_name.clone(),
        config.routing_config_table_name.clone(),
        config.event_source.clone(),
    )?;
    let publisher = EventPublisher::new(bus.clone(), config.event_topic.clone());
    let app = Arc::new(App::new(builder, publisher));

    tracing::info!(
        templates_table = %config.templates_table_name,
        inbound_subject = %config.inbound_subject,
        event_topic = %config.event_topic,
        "Template event publisher starting"
    );

    tokio::select! {
        result = run_consumer(app, bus, &config.inbound_subject) => result?,
        _ = tokio::signal::ctrl_c() => tracing::info!("Shutdown signal received"),
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());

    if std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json")) {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
