//! Notification Store
//!
//! Arrival-ordered list of recent notifications with age-based eviction.
//! Owned by the UI loop; all mutation happens there, so there is no locking.
//!
//! # Eviction
//!
//! Eviction drops a *prefix*: everything up to and including the newest
//! record (by position) that is older than `max_age`. A fresh record sitting
//! before that stale one goes with it, and a stale record sitting after the
//! last stale position survives until a later pass. Records are appended with
//! a monotonic clock, so in practice positions and ages agree.

use std::time::{Duration, Instant};

/// Default age after which a record is eligible for eviction
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(10);

/// One visible notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRecord {
    observed_at: Instant,
    label: Option<String>,
}

impl NotificationRecord {
    pub fn new(observed_at: Instant, label: Option<String>) -> Self {
        Self { observed_at, label }
    }

    /// When the record was created
    pub fn observed_at(&self) -> Instant {
        self.observed_at
    }

    /// Source label (collection name), if the event carried one
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Time since the record was created, saturating at zero
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.observed_at)
    }
}

/// In-memory notification history for the current session
#[derive(Debug, Clone)]
pub struct NotificationStore {
    records: Vec<NotificationRecord>,
    max_age: Duration,
}

impl Default for NotificationStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_AGE)
    }
}

impl NotificationStore {
    pub fn new(max_age: Duration) -> Self {
        Self {
            records: Vec::new(),
            max_age,
        }
    }

    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    /// Append a record observed at `now`
    pub fn push(&mut self, label: Option<String>, now: Instant) {
        self.records.push(NotificationRecord::new(now, label));
    }

    /// Drop the prefix ending at the last record older than `max_age`.
    ///
    /// Returns how many records were removed.
    pub fn evict_stale(&mut self, now: Instant) -> usize {
        let last_stale = self
            .records
            .iter()
            .rposition(|record| record.age(now) > self.max_age);

        match last_stale {
            Some(idx) => {
                self.records.drain(..=idx);
                idx + 1
            }
            None => 0,
        }
    }

    /// Records, oldest first
    pub fn records(&self) -> &[NotificationRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &NotificationRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
