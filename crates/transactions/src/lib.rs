//! `tradefeed-transactions` — stamping and publishing transaction records.
//!
//! ```text
//! Transaction ──stamp(close of business date)──▶ PublishedTransaction
//!     ──serialize──▶ payload ──MessagingClient::publish (retry/backoff)──▶ topic
//! ```

pub mod calendar;
pub mod outcome;
pub mod publisher;
pub mod retry;
pub mod serializer;
pub mod transaction;

pub use calendar::{BusinessCalendar, format_business_date, previous_business_day};
pub use outcome::{PublishListener, PublisherStats, RecordOutcome, StatsSnapshot};
pub use publisher::TransactionPublisher;
pub use retry::{RetryPhase, RetryState, Sleeper, ThreadSleeper};
pub use serializer::{JsonRecordSerializer, RecordSerializer, SerializeError};
pub use transaction::{PublishedTransaction, Transaction};
