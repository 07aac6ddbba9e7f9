//! Messaging mechanics: the client contract the publisher depends on, plus an
//! in-memory implementation for tests and local runs.

pub mod bus;
pub mod in_memory_bus;

pub use bus::{MessagingClient, Subscription};
pub use in_memory_bus::{DeliveredMessage, InMemoryClientError, InMemoryMessagingClient};
