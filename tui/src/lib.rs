//! Beeper TUI - Terminal dashboard for beeper
//!
//! A full-screen list of recent notifications. Each new entry beeps, shows
//! up in the accent color, fades to gray over a second, and disappears after
//! ten seconds.
//!
//! # Architecture
//!
//! - **App**: the UI update loop, sole owner of the notification store
//! - **View**: pure render of the store into a ratatui frame
//! - **Ticker**: periodic `Tick` producer
//! - **Speaker**: alert playback (audio device or terminal bell)

pub mod app;
pub mod speaker;
pub mod theme;
pub mod ticker;
pub mod view;

pub use app::App;
