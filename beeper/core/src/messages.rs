//! UI Messages
//!
//! Everything that changes what the dashboard shows arrives as a
//! [`UiMessage`] on one ordered channel. The UI loop is the only consumer;
//! the ticker and the notification trigger hold cloned senders.

use tokio::sync::mpsc;

/// Default inbox capacity
pub const UI_INBOX_CAPACITY: usize = 256;

/// Messages processed by the UI update loop, one at a time
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiMessage {
    /// A watched event arrived
    Notification {
        /// Collection name of the commit, if any
        label: Option<String>,
    },

    /// Periodic timer: evict stale records and redraw
    Tick,

    /// Stop the UI loop
    Quit,
}

/// Producer half of the UI inbox
pub type UiSender = mpsc::Sender<UiMessage>;

/// Consumer half of the UI inbox
pub type UiReceiver = mpsc::Receiver<UiMessage>;

/// Create the UI inbox
pub fn ui_channel() -> (UiSender, UiReceiver) {
    mpsc::channel(UI_INBOX_CAPACITY)
}
