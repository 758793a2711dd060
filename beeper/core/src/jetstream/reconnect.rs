//! Reconnection Loop
//!
//! Keeps a subscription alive for the life of the process:
//!
//! ```text
//!            session error / close
//!   CONNECTED ─────────────────────▶ RECONNECTING
//!       ▲                                 │
//!       └──────── session starts ─────────┘
//!
//!   shutdown signal (either state) ──▶ exit
//! ```
//!
//! There is no attempt limit. With the default [`ReconnectPolicy`] the delay
//! between attempts is zero, so a failed session is followed immediately by
//! exactly one new connection attempt.

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::source::{cancelled, is_cancelled, EventHandler, EventSource, SessionEnd};
use crate::cursor::StreamCursor;

/// Delay schedule between reconnect attempts
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReconnectPolicy {
    /// Delay after the first failure (0 = retry immediately)
    pub initial_delay_ms: u64,
    /// Upper bound for the growing delay
    pub max_delay_ms: u64,
    /// Growth factor applied after each consecutive failure
    pub multiplier: f64,
    /// Spread delays by up to ±25%
    pub jitter: bool,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            initial_delay_ms: 0,
            max_delay_ms: 30_000,
            multiplier: 2.0,
            jitter: false,
        }
    }
}

impl ReconnectPolicy {
    /// Immediate retries, forever
    pub fn immediate() -> Self {
        Self::default()
    }

    /// Exponential backoff starting at `initial`
    pub fn exponential(initial: Duration, max: Duration) -> Self {
        Self {
            initial_delay_ms: initial.as_millis() as u64,
            max_delay_ms: max.as_millis() as u64,
            ..Self::default()
        }
    }

    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }

    /// First delay, never above the ceiling
    fn first_delay(&self) -> Duration {
        self.initial_delay().min(self.max_delay())
    }
}

/// Consecutive-failure backoff state
#[derive(Debug)]
pub struct Backoff {
    policy: ReconnectPolicy,
    current: Duration,
    attempt: u32,
}

impl Backoff {
    pub fn new(policy: ReconnectPolicy) -> Self {
        let current = policy.first_delay();
        Self {
            policy,
            current,
            attempt: 0,
        }
    }

    /// Consecutive failures since the last reset
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Forget failures after a session made progress
    pub fn reset(&mut self) {
        self.attempt = 0;
        self.current = self.policy.first_delay();
    }

    /// Delay before the next attempt; grows the delay for the one after
    pub fn next_delay(&mut self) -> Duration {
        self.attempt = self.attempt.saturating_add(1);
        let delay = self.current;

        let max = self.policy.max_delay();
        let grown = delay.as_secs_f64() * self.policy.multiplier.max(1.0);
        self.current = Duration::try_from_secs_f64(grown).unwrap_or(max).min(max);

        if self.policy.jitter && !delay.is_zero() {
            let factor = rand::thread_rng().gen_range(0.75..=1.25);
            return delay.mul_f64(factor);
        }
        delay
    }
}

/// Counters describing what the loop did
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoopStats {
    /// Sessions started
    pub sessions: u64,
    /// Sessions that ended in an error
    pub failures: u64,
    /// Sessions the remote end closed cleanly
    pub closes: u64,
}

/// Drives an [`EventSource`] until shutdown
pub struct ReconnectLoop<S> {
    source: S,
    backoff: Backoff,
}

impl<S: EventSource> ReconnectLoop<S> {
    pub fn new(source: S, policy: ReconnectPolicy) -> Self {
        Self {
            source,
            backoff: Backoff::new(policy),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn into_source(self) -> S {
        self.source
    }

    /// Run sessions back to back until `shutdown` fires.
    ///
    /// Never returns early on a stream error.
    pub async fn run(
        &mut self,
        cursor: &mut StreamCursor,
        handler: &dyn EventHandler,
        mut shutdown: watch::Receiver<bool>,
    ) -> LoopStats {
        let mut stats = LoopStats::default();

        loop {
            if is_cancelled(&shutdown) {
                info!("Shutdown requested, exiting consume loop");
                break;
            }

            stats.sessions += 1;
            let processed_before = cursor.processed();
            let result = self
                .source
                .run_session(cursor, handler, &mut shutdown)
                .await;

            if cursor.processed() > processed_before {
                self.backoff.reset();
            }

            match result {
                Ok(SessionEnd::Cancelled) => {
                    info!("Event stream cancelled, exiting consume loop");
                    break;
                }
                Ok(SessionEnd::Closed) => {
                    stats.closes += 1;
                    info!(resume_at = cursor.resume_point(), "Event stream closed, reconnecting");
                }
                Err(e) => {
                    stats.failures += 1;
                    warn!(
                        error = %e,
                        resume_at = cursor.resume_point(),
                        "Error in consume loop, reconnecting"
                    );
                }
            }

            let delay = self.backoff.next_delay();
            if delay.is_zero() {
                // Give the rest of the runtime a turn between immediate retries
                tokio::task::yield_now().await;
                continue;
            }

            debug!(
                attempt = self.backoff.attempt(),
                delay_ms = delay.as_millis() as u64,
                "Waiting before reconnect"
            );
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = cancelled(&mut shutdown) => {
                    info!("Shutdown requested during backoff, exiting consume loop");
                    break;
                }
            }
        }

        stats
    }
}
