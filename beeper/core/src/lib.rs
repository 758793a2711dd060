//! Beeper Core - Headless Notification Engine
//!
//! Everything the notification dashboard does that isn't drawing:
//! following a Jetstream event feed, deciding which events are worth a
//! beep, holding the short-lived notification history, and computing the
//! fade color for each entry.
//!
//! # Architecture
//!
//! ```text
//!  Jetstream ──▶ ReconnectLoop ──▶ WebSocketSource ──▶ NotificationSystem
//!                                                         │        │
//!                                                   AlertPlayer  UiSender
//!                                                                  │
//!  ticker ──────────── UiMessage::Tick ───────────────────────────▶│
//!                                                                  ▼
//!                                                   UI loop ─▶ NotificationStore
//! ```
//!
//! The UI loop is the only owner of the [`NotificationStore`]; the ticker
//! and the notification trigger only send [`UiMessage`]s.
//!
//! # Key Types
//!
//! - [`ReconnectLoop`]: keeps a stream session alive until shutdown
//! - [`NotificationSystem`]: beep + enqueue for each matched event
//! - [`NotificationStore`]: arrival-ordered records with prefix eviction
//! - [`color::interpolate`]: hex color blend used for the fade

pub mod audio;
pub mod color;
pub mod config;
pub mod cursor;
pub mod jetstream;
pub mod messages;
pub mod notify;
pub mod store;

pub use audio::{AlertPlayer, AlertSound, AudioError};
pub use color::{interpolate, ColorError, Rgb};
pub use config::BeeperConfig;
pub use cursor::{CursorPolicy, StreamCursor};
pub use jetstream::{
    EventHandler, EventSource, ReconnectLoop, ReconnectPolicy, SessionEnd, StreamError,
    WantedCollections, WebSocketSource,
};
pub use messages::{ui_channel, UiMessage, UiReceiver, UiSender};
pub use notify::NotificationSystem;
pub use store::{NotificationRecord, NotificationStore};
