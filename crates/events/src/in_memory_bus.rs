//! In-memory messaging client for tests/dev.

use std::collections::HashMap;
use std::sync::{Mutex, mpsc};

use thiserror::Error;

use crate::bus::{MessagingClient, Subscription};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InMemoryClientError {
    /// Publish failed due to internal lock poisoning.
    #[error("in-memory client lock poisoned")]
    Poisoned,

    /// A failure scheduled through [`InMemoryMessagingClient::fail_next`].
    #[error("injected publish failure ({remaining} more scheduled)")]
    Injected { remaining: usize },
}

/// A message that was accepted by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveredMessage {
    pub topic: String,
    pub payload: String,
}

#[derive(Debug, Default)]
struct State {
    subscribers: HashMap<String, Vec<mpsc::Sender<String>>>,
    delivered: Vec<DeliveredMessage>,
    attempts: usize,
    failures_remaining: usize,
}

/// In-memory topic fan-out.
///
/// - No IO / no async
/// - Keeps a log of every accepted message
/// - Failures can be scheduled up front to exercise retry paths
#[derive(Debug, Default)]
pub struct InMemoryMessagingClient {
    state: Mutex<State>,
}

impl InMemoryMessagingClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `count` publish calls fail. Adds to any failures
    /// already scheduled.
    pub fn fail_next(&self, count: usize) {
        if let Ok(mut state) = self.state.lock() {
            state.failures_remaining = state.failures_remaining.saturating_add(count);
        }
    }

    /// Subscribe to a single topic.
    pub fn subscribe(&self, topic: impl Into<String>) -> Subscription<String> {
        let (tx, rx) = mpsc::channel();

        // If the lock is poisoned we still hand out a subscription;
        // it just never receives anything.
        if let Ok(mut state) = self.state.lock() {
            state.subscribers.entry(topic.into()).or_default().push(tx);
        }

        Subscription::new(rx)
    }

    /// Number of publish calls made so far, failed ones included.
    pub fn attempts(&self) -> usize {
        self.state.lock().map(|s| s.attempts).unwrap_or(0)
    }

    /// Every message accepted so far, in publish order.
    pub fn delivered(&self) -> Vec<DeliveredMessage> {
        self.state
            .lock()
            .map(|s| s.delivered.clone())
            .unwrap_or_default()
    }
}

impl MessagingClient for InMemoryMessagingClient {
    type Error = InMemoryClientError;

    fn publish(&self, topic: &str, payload: &str) -> Result<(), Self::Error> {
        let mut state = self.state.lock().map_err(|_| InMemoryClientError::Poisoned)?;
        state.attempts += 1;

        if state.failures_remaining > 0 {
            state.failures_remaining -= 1;
            return Err(InMemoryClientError::Injected {
                remaining: state.failures_remaining,
            });
        }

        state.delivered.push(DeliveredMessage {
            topic: topic.to_string(),
            payload: payload.to_string(),
        });

        // Drop any dead subscribers while publishing.
        if let Some(subs) = state.subscribers.get_mut(topic) {
            subs.retain(|tx| tx.send(payload.to_string()).is_ok());
        }

        Ok(())
    }
}
