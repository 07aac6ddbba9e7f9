//! Per-record outcomes and the listener hook that observes them.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// How a single record's publication settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Accepted by the messaging client on the given attempt.
    Published { attempt: u32 },
    /// Every permitted attempt failed; `attempt` is the last one made.
    Abandoned { attempt: u32, last_error: String },
    /// The retry state was already exhausted, so nothing was sent.
    Skipped,
    /// The payload could not be produced, so nothing was sent.
    Unserializable { error: String },
}

/// Side channel for outcomes (metrics, dead-letter capture, test assertions).
///
/// Called synchronously on the publishing thread once per settled record.
pub trait PublishListener: Send + Sync {
    fn on_outcome(&self, topic: &str, ref_no: &str, outcome: &RecordOutcome);
}

/// Outcome counters.
#[derive(Debug, Default)]
pub struct PublisherStats {
    published: AtomicU64,
    abandoned: AtomicU64,
    skipped: AtomicU64,
    unserializable: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub published: u64,
    pub abandoned: u64,
    pub skipped: u64,
    pub unserializable: u64,
}

impl StatsSnapshot {
    pub fn total(&self) -> u64 {
        self.published + self.abandoned + self.skipped + self.unserializable
    }
}

impl PublisherStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            published: self.published.load(Ordering::Relaxed),
            abandoned: self.abandoned.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            unserializable: self.unserializable.load(Ordering::Relaxed),
        }
    }
}

impl PublishListener for PublisherStats {
    fn on_outcome(&self, _topic: &str, _ref_no: &str, outcome: &RecordOutcome) {
        let counter = match outcome {
            RecordOutcome::Published { .. } => &self.published,
            RecordOutcome::Abandoned { .. } => &self.abandoned,
            RecordOutcome::Skipped => &self.skipped,
            RecordOutcome::Unserializable { .. } => &self.unserializable,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_count_each_outcome_kind() {
        let stats = PublisherStats::new();
        stats.on_outcome("t", "A", &RecordOutcome::Published { attempt: 1 });
        stats.on_outcome("t", "B", &RecordOutcome::Published { attempt: 2 });
        stats.on_outcome(
            "t",
            "C",
            &RecordOutcome::Abandoned {
                attempt: 3,
                last_error: "broker down".into(),
            },
        );
        stats.on_outcome("t", "D", &RecordOutcome::Skipped);

        let snapshot = stats.snapshot();
        assert_eq!(
            snapshot,
            StatsSnapshot {
                published: 2,
                abandoned: 1,
                skipped: 1,
                unserializable: 0,
            }
        );
        assert_eq!(snapshot.total(), 4);
    }
}
