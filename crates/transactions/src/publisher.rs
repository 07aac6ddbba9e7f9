//! Reliable transaction publisher.
//!
//! Records are processed strictly in order. Each record gets its own
//! [`RetryState`]; a record that exhausts its budget is reported and dropped,
//! and the batch moves on. Nothing is ever returned to the caller as an error.

use std::sync::Arc;

use chrono::FixedOffset;
use tracing::{debug, info, warn};

use tradefeed_core::Clock;
use tradefeed_events::MessagingClient;

use crate::calendar::BusinessCalendar;
use crate::outcome::{PublishListener, RecordOutcome};
use crate::retry::{RetryState, Sleeper, ThreadSleeper};
use crate::serializer::{JsonRecordSerializer, RecordSerializer};
use crate::transaction::{PublishedTransaction, Transaction};

/// Publishes transactions to one topic through a [`MessagingClient`].
///
/// Client, topic and clock are fixed at construction.
pub struct TransactionPublisher<C> {
    client: C,
    topic: String,
    calendar: BusinessCalendar,
    default_retry: RetryState,
    serializer: Box<dyn RecordSerializer>,
    sleeper: Arc<dyn Sleeper>,
    listener: Option<Arc<dyn PublishListener>>,
}

impl<C: MessagingClient> TransactionPublisher<C> {
    pub fn new(client: C, topic: impl Into<String>, clock: impl Clock + 'static) -> Self {
        Self {
            client,
            topic: topic.into(),
            calendar: BusinessCalendar::utc(Arc::new(clock)),
            default_retry: RetryState::default(),
            serializer: Box::new(JsonRecordSerializer),
            sleeper: Arc::new(ThreadSleeper),
            listener: None,
        }
    }

    /// Zone in which the close of business date is evaluated (default UTC).
    pub fn with_zone(mut self, zone: FixedOffset) -> Self {
        self.calendar = self.calendar.with_zone(zone);
        self
    }

    /// Retry state each record starts from.
    pub fn with_default_retry(mut self, retry: RetryState) -> Self {
        self.default_retry = retry;
        self
    }

    pub fn with_serializer(mut self, serializer: impl RecordSerializer + 'static) -> Self {
        self.serializer = Box::new(serializer);
        self
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn with_listener(mut self, listener: Arc<dyn PublishListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    pub fn default_retry(&self) -> RetryState {
        self.default_retry
    }

    /// Stamp and publish a batch of raw transactions.
    ///
    /// The clock is read once, so every record in the batch carries the same
    /// close of business date.
    pub fn publish(&self, records: &[Transaction]) {
        let close_of_business = self.calendar.close_of_business_date();
        let stamped: Vec<PublishedTransaction> = records
            .iter()
            .cloned()
            .map(|tx| PublishedTransaction::stamp(tx, close_of_business))
            .collect();

        info!(
            topic = %self.topic,
            records = stamped.len(),
            close_of_business = %close_of_business,
            "publishing transaction batch"
        );

        self.publish_from(&stamped, 0, self.default_retry);
    }

    /// Publish a single already-stamped record.
    pub fn publish_one(&self, record: PublishedTransaction) {
        self.publish_from(std::slice::from_ref(&record), 0, self.default_retry);
    }

    /// Publish `records[index..]`.
    ///
    /// `records[index]` runs under `retry`; every later record starts from the
    /// publisher's default retry state. Returns immediately when `index` is
    /// past the end.
    pub fn publish_from(&self, records: &[PublishedTransaction], index: usize, retry: RetryState) {
        let mut retry = retry;
        for record in records.iter().skip(index) {
            let outcome = self.settle(record, retry);
            self.report(record, &outcome);
            retry = self.default_retry;
        }
    }

    /// Drive one record to a final outcome.
    fn settle(&self, record: &PublishedTransaction, retry: RetryState) -> RecordOutcome {
        if retry.is_exhausted() {
            return RecordOutcome::Skipped;
        }

        let payload = match self.serializer.serialize(record) {
            Ok(payload) => payload,
            Err(e) => {
                return RecordOutcome::Unserializable {
                    error: e.to_string(),
                };
            }
        };

        let mut retry = retry;
        loop {
            match self.client.publish(&self.topic, &payload) {
                Ok(()) => {
                    return RecordOutcome::Published {
                        attempt: retry.attempt(),
                    };
                }
                Err(e) if retry.is_last_try() => {
                    return RecordOutcome::Abandoned {
                        attempt: retry.attempt(),
                        last_error: e.to_string(),
                    };
                }
                Err(e) => {
                    debug!(
                        topic = %self.topic,
                        ref_no = %record.ref_no(),
                        attempt = retry.attempt(),
                        max_attempts = retry.max_attempts(),
                        delay = ?retry.delay(),
                        error = %e,
                        "publish failed; backing off"
                    );
                    self.sleeper.sleep(retry.delay());
                    retry = retry.next();
                }
            }
        }
    }

    fn report(&self, record: &PublishedTransaction, outcome: &RecordOutcome) {
        let ref_no = record.ref_no();
        match outcome {
            RecordOutcome::Published { attempt } => {
                debug!(topic = %self.topic, %ref_no, attempt, "transaction published");
            }
            RecordOutcome::Abandoned {
                attempt,
                last_error,
            } => {
                warn!(
                    topic = %self.topic,
                    %ref_no,
                    attempt,
                    error = %last_error,
                    "giving up on transaction after final attempt"
                );
            }
            RecordOutcome::Skipped => {
                debug!(topic = %self.topic, %ref_no, "retry budget already exhausted; skipping");
            }
            RecordOutcome::Unserializable { error } => {
                warn!(topic = %self.topic, %ref_no, %error, "transaction could not be serialized");
            }
        }

        if let Some(listener) = &self.listener {
            listener.on_outcome(&self.topic, ref_no, outcome);
        }
    }
}

impl<C> core::fmt::Debug for TransactionPublisher<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TransactionPublisher")
            .field("topic", &self.topic)
            .field("calendar", &self.calendar)
            .field("default_retry", &self.default_retry)
            .finish_non_exhaustive()
    }
}
