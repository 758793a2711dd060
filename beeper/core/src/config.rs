//! Configuration
//!
//! Every knob has a default that reproduces the stock behaviour: the public
//! Jetstream endpoint, the four watched collections, a one-minute backfill
//! that stays fixed across reconnects, and immediate retries.
//!
//! Environment variables:
//! - `JS_SERVER_ADDR`: websocket endpoint
//! - `BEEPER_SOUND`: path to the alert WAV
//! - `BEEPER_BACKFILL_SECS`: how far back the startup cursor reaches
//! - `BEEPER_CURSOR`: "fixed" or "advance"
//! - `BEEPER_RECONNECT_DELAY_MS`: first reconnect delay (0 = immediate)
//! - `BEEPER_RECONNECT_MAX_DELAY_MS`: reconnect delay ceiling
//! - `BEEPER_RECONNECT_MULTIPLIER`: reconnect delay growth factor, 1 to 16
//! - `BEEPER_LOG`: log file path

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::audio::DEFAULT_SOUND_PATH;
use crate::cursor::{CursorPolicy, DEFAULT_BACKFILL};
use crate::jetstream::{ReconnectPolicy, WantedCollections, DEFAULT_ENDPOINT};
use crate::store::DEFAULT_MAX_AGE;

/// Largest accepted reconnect delay growth factor
pub const MAX_RECONNECT_MULTIPLIER: f64 = 16.0;

/// Full runtime configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BeeperConfig {
    /// Jetstream websocket endpoint
    pub endpoint: String,

    /// Collections that trigger a notification
    pub collections: WantedCollections,

    /// Alert sound asset
    pub sound_path: PathBuf,

    /// Startup cursor offset into the past, in seconds
    pub backfill_secs: u64,

    /// Whether reconnects resume from the startup cursor or the last event
    pub cursor_policy: CursorPolicy,

    /// Delay schedule between reconnect attempts
    pub reconnect: ReconnectPolicy,

    /// UI tick period in milliseconds
    pub tick_interval_ms: u64,

    /// Age after which notifications are evicted, in milliseconds
    pub max_age_ms: u64,

    /// Time for a notification to fade to its settled color, in milliseconds
    pub fade_window_ms: u64,

    /// Log file (None = default location under the state directory)
    pub log_path: Option<PathBuf>,
}

impl Default for BeeperConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            collections: WantedCollections::default(),
            sound_path: PathBuf::from(DEFAULT_SOUND_PATH),
            backfill_secs: DEFAULT_BACKFILL.as_secs(),
            cursor_policy: CursorPolicy::default(),
            reconnect: ReconnectPolicy::default(),
            tick_interval_ms: 50,
            max_age_ms: DEFAULT_MAX_AGE.as_millis() as u64,
            fade_window_ms: 1_000,
            log_path: None,
        }
    }
}

impl BeeperConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// Empty and unparsable values fall back to the default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            endpoint: get("JS_SERVER_ADDR").unwrap_or(defaults.endpoint),
            collections: defaults.collections,
            sound_path: get("BEEPER_SOUND")
                .map(PathBuf::from)
                .unwrap_or(defaults.sound_path),
            backfill_secs: parse_value(get("BEEPER_BACKFILL_SECS"))
                .unwrap_or(defaults.backfill_secs),
            cursor_policy: parse_value(get("BEEPER_CURSOR")).unwrap_or(defaults.cursor_policy),
            reconnect: ReconnectPolicy {
                initial_delay_ms: parse_value(get("BEEPER_RECONNECT_DELAY_MS"))
                    .unwrap_or(defaults.reconnect.initial_delay_ms),
                max_delay_ms: parse_value(get("BEEPER_RECONNECT_MAX_DELAY_MS"))
                    .unwrap_or(defaults.reconnect.max_delay_ms),
                multiplier: parse_value(get("BEEPER_RECONNECT_MULTIPLIER"))
                    .filter(|m: &f64| (1.0..=MAX_RECONNECT_MULTIPLIER).contains(m))
                    .unwrap_or(defaults.reconnect.multiplier),
                jitter: defaults.reconnect.jitter,
            },
            tick_interval_ms: defaults.tick_interval_ms,
            max_age_ms: defaults.max_age_ms,
            fade_window_ms: defaults.fade_window_ms,
            log_path: get("BEEPER_LOG").map(PathBuf::from),
        }
    }

    pub fn backfill(&self) -> Duration {
        Duration::from_secs(self.backfill_secs)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    pub fn max_age(&self) -> Duration {
        Duration::from_millis(self.max_age_ms)
    }

    pub fn fade_window(&self) -> Duration {
        Duration::from_millis(self.fade_window_ms)
    }

    /// Where logs go: `log_path`, else `<state dir>/beeper/beeper.log`
    pub fn log_file(&self) -> PathBuf {
        if let Some(path) = &self.log_path {
            return path.clone();
        }
        dirs::state_dir()
            .or_else(dirs::cache_dir)
            .unwrap_or_else(std::env::temp_dir)
            .join("beeper")
            .join("beeper.log")
    }
}

fn parse_value<T: FromStr>(value: Option<String>) -> Option<T> {
    value.and_then(|v| v.trim().parse().ok())
}
