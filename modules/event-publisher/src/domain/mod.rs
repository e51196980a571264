pub mod attribute;
pub mod event_builder;
pub mod should_publish;
pub mod snapshot;
