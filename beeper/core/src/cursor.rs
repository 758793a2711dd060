//! Stream Cursor
//!
//! Where the next subscription attempt resumes reading. The cursor is a
//! microsecond Unix timestamp, the event source's native position unit.
//!
//! With [`CursorPolicy::Fixed`] every reconnect replays from the startup
//! position (now minus the backfill window), so already-seen events within
//! that window are delivered again. [`CursorPolicy::Advance`] resumes from
//! the last event that was handed to the handler instead.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default backfill window for the startup cursor
pub const DEFAULT_BACKFILL: Duration = Duration::from_secs(60);

/// How the cursor moves between reconnects
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CursorPolicy {
    /// Always resume from the startup position
    #[default]
    Fixed,
    /// Resume from the last processed event
    Advance,
}

impl FromStr for CursorPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fixed" => Ok(CursorPolicy::Fixed),
            "advance" | "advancing" => Ok(CursorPolicy::Advance),
            other => Err(format!(
                "invalid cursor policy '{other}': expected 'fixed' or 'advance'"
            )),
        }
    }
}

impl fmt::Display for CursorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CursorPolicy::Fixed => f.write_str("fixed"),
            CursorPolicy::Advance => f.write_str("advance"),
        }
    }
}

/// Resume position for the event stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamCursor {
    start_us: i64,
    last_seen_us: Option<i64>,
    processed: u64,
    policy: CursorPolicy,
}

impl StreamCursor {
    pub fn new(start_us: i64, policy: CursorPolicy) -> Self {
        Self {
            start_us,
            last_seen_us: None,
            processed: 0,
            policy,
        }
    }

    /// Cursor positioned `backfill` before the current wall-clock time
    pub fn backfill_from_now(backfill: Duration, policy: CursorPolicy) -> Self {
        let backfill_us = i64::try_from(backfill.as_micros()).unwrap_or(i64::MAX);
        let now_us = chrono::Utc::now().timestamp_micros();
        Self::new(now_us.saturating_sub(backfill_us), policy)
    }

    /// Startup position
    pub fn start(&self) -> i64 {
        self.start_us
    }

    pub fn policy(&self) -> CursorPolicy {
        self.policy
    }

    /// Timestamp of the newest event handed to the handler so far
    pub fn last_seen(&self) -> Option<i64> {
        self.last_seen_us
    }

    /// Number of events observed over the cursor's lifetime
    pub fn processed(&self) -> u64 {
        self.processed
    }

    /// Record that an event stamped `time_us` was processed
    pub fn observe(&mut self, time_us: i64) {
        self.processed += 1;
        self.last_seen_us = Some(match self.last_seen_us {
            Some(prev) => prev.max(time_us),
            None => time_us,
        });
    }

    /// Position the next subscription should start from
    pub fn resume_point(&self) -> i64 {
        match (self.policy, self.last_seen_us) {
            (CursorPolicy::Advance, Some(seen)) => seen.max(self.start_us),
            _ => self.start_us,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_cursor_never_moves() {
        let mut cursor = StreamCursor::new(1_000, CursorPolicy::Fixed);
        cursor.observe(5_000);
        cursor.observe(9_000);

        assert_eq!(cursor.resume_point(), 1_000);
        assert_eq!(cursor.last_seen(), Some(9_000));
        assert_eq!(cursor.processed(), 2);
    }

    #[test]
    fn test_advancing_cursor_follows_newest_event() {
        let mut cursor = StreamCursor::new(1_000, CursorPolicy::Advance);
        assert_eq!(cursor.resume_point(), 1_000);

        cursor.observe(5_000);
        cursor.observe(3_000);
        assert_eq!(cursor.resume_point(), 5_000);
    }

    #[test]
    fn test_advancing_cursor_never_goes_before_start() {
        let mut cursor = StreamCursor::new(1_000, CursorPolicy::Advance);
        cursor.observe(10);
        assert_eq!(cursor.resume_point(), 1_000);
    }

    #[test]
    fn test_backfill_from_now() {
        let before = chrono::Utc::now().timestamp_micros();
        let cursor = StreamCursor::backfill_from_now(DEFAULT_BACKFILL, CursorPolicy::Fixed);
        let after = chrono::Utc::now().timestamp_micros();

        assert!(cursor.start() >= before - 60_000_000);
        assert!(cursor.start() <= after - 60_000_000);
    }

    #[test]
    fn test_policy_parse() {
        assert_eq!("fixed".parse::<CursorPolicy>(), Ok(CursorPolicy::Fixed));
        assert_eq!(" Advance ".parse::<CursorPolicy>(), Ok(CursorPolicy::Advance));
        assert!("sideways".parse::<CursorPolicy>().is_err());
        assert_eq!(CursorPolicy::Advance.to_string(), "advance");
    }
}
