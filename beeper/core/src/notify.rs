//! Notification System
//!
//! The single entry point for "a watched event happened": ring the alert and
//! post a notification into the UI inbox. Neither step reports failure to
//! the caller.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::audio::AlertPlayer;
use crate::jetstream::EventHandler;
use crate::messages::{UiMessage, UiSender};

/// Fans one matched event out to the speaker and the UI
#[derive(Clone)]
pub struct NotificationSystem {
    player: Arc<dyn AlertPlayer>,
    ui: UiSender,
}

impl NotificationSystem {
    pub fn new(player: Arc<dyn AlertPlayer>, ui: UiSender) -> Self {
        Self { player, ui }
    }

    /// Play the alert and enqueue a notification carrying `label`
    pub async fn notify(&self, label: Option<String>) {
        self.player.play();

        if self.ui.send(UiMessage::Notification { label }).await.is_err() {
            debug!("UI inbox closed, dropping notification");
        }
    }
}

#[async_trait]
impl EventHandler for NotificationSystem {
    async fn handle_commit(&self, collection: &str) {
        self.notify(Some(collection.to_string())).await;
    }
}
