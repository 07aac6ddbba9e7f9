//! Messaging client abstraction (mechanics only).
//!
//! The publisher needs exactly one thing from the message bus: a synchronous
//! `publish(topic, payload)` that can fail. Connection handling, reconnection
//! and subscriber-side semantics belong to the concrete client.
//!
//! ## Delivery
//!
//! Nothing here promises more than the underlying transport does. Redis
//! pub/sub, for instance, drops messages when no subscriber is listening.
//! Retrying a failed publish is the caller's responsibility.

use std::sync::Arc;
use std::sync::mpsc::Receiver;
use std::time::Duration;

/// A subscription to a topic.
///
/// Each subscription gets a copy of every message published to its topic
/// after it was created (broadcast semantics). Intended for single-threaded
/// consumption.
///
/// ```ignore
/// let client = InMemoryMessagingClient::new();
/// let subscription = client.subscribe("transactions");
///
/// loop {
///     match subscription.recv_timeout(Duration::from_secs(1)) {
///         Ok(payload) => handle(payload)?,
///         Err(std::sync::mpsc::RecvTimeoutError::Timeout) => continue,
///         Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
///     }
/// }
/// ```
#[derive(Debug)]
pub struct Subscription<M> {
    receiver: Receiver<M>,
}

impl<M> Subscription<M> {
    pub fn new(receiver: Receiver<M>) -> Self {
        Self { receiver }
    }

    /// Block for up to `timeout` waiting for a message.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<M, std::sync::mpsc::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }

    /// Drain everything currently buffered.
    pub fn drain(&self) -> Vec<M> {
        self.receiver.try_iter().collect()
    }
}

/// Transport-agnostic messaging client.
///
/// `publish` returns the outcome as a value. Implementations must not panic on
/// transport failure; the error is handed back so the caller can decide
/// whether to retry.
///
/// ## Thread Safety
///
/// The trait requires `Send + Sync`; a single client may be shared by several
/// publishers.
pub trait MessagingClient: Send + Sync {
    type Error: core::fmt::Debug + core::fmt::Display + Send + Sync + 'static;

    fn publish(&self, topic: &str, payload: &str) -> Result<(), Self::Error>;
}

impl<C> MessagingClient for Arc<C>
where
    C: MessagingClient + ?Sized,
{
    type Error = C::Error;

    fn publish(&self, topic: &str, payload: &str) -> Result<(), Self::Error> {
        (**self).publish(topic, payload)
    }
}

impl<C> MessagingClient for &C
where
    C: MessagingClient + ?Sized,
{
    type Error = C::Error;

    fn publish(&self, topic: &str, payload: &str) -> Result<(), Self::Error> {
        (**self).publish(topic, payload)
    }
}
