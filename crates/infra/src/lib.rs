//! Infrastructure layer: configuration and broker-backed messaging clients.

pub mod config;
pub mod messaging;

pub use config::{ConfigError, PublisherConfig};
