pub mod envelope;
pub mod publisher;
pub mod validate;
