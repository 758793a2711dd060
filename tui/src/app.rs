//! Main Application
//!
//! The App is the UI update loop. It owns the notification store and the
//! consumer half of the UI inbox, and it is the only place the store is ever
//! mutated:
//!
//! 1. Wait for the next terminal event or inbox message
//! 2. Apply it with [`App::update`]
//! 3. Render
//!
//! The ticker and the notification trigger only ever send [`UiMessage`]s.

use std::io;
use std::time::{Duration, Instant};

use anyhow::Context;
use beeper_core::{BeeperConfig, NotificationStore, UiMessage, UiReceiver};
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::{Stream, StreamExt};
use ratatui::backend::Backend;
use ratatui::Terminal;
use tracing::{debug, info};

use crate::view::{self, ViewSettings};

/// Main application state
pub struct App {
    /// Is the loop still running?
    running: bool,
    /// Recent notifications, oldest first
    store: NotificationStore,
    /// Messages from the ticker and the notification trigger
    inbox: UiReceiver,
    /// Static render inputs
    settings: ViewSettings,
}

impl App {
    pub fn new(inbox: UiReceiver, config: &BeeperConfig) -> Self {
        Self::with_settings(
            inbox,
            config.max_age(),
            ViewSettings {
                endpoint: config.endpoint.clone(),
                fade_window: config.fade_window(),
            },
        )
    }

    pub fn with_settings(inbox: UiReceiver, max_age: Duration, settings: ViewSettings) -> Self {
        Self {
            running: true,
            store: NotificationStore::new(max_age),
            inbox,
            settings,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn store(&self) -> &NotificationStore {
        &self.store
    }

    /// Apply one message
    pub fn update(&mut self, msg: UiMessage, now: Instant) {
        match msg {
            UiMessage::Quit => {
                info!("Quit requested");
                self.running = false;
            }
            UiMessage::Notification { label } => {
                self.store.push(label, now);
            }
            UiMessage::Tick => {
                let evicted = self.store.evict_stale(now);
                if evicted > 0 {
                    debug!(evicted, remaining = self.store.len(), "Evicted stale notifications");
                }
            }
        }
    }

    /// Main event loop; returns once a quit message has been handled
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> anyhow::Result<()> {
        self.run_with_events(terminal, EventStream::new()).await
    }

    /// Event loop over an arbitrary terminal event source
    pub async fn run_with_events<B, S>(
        &mut self,
        terminal: &mut Terminal<B>,
        mut event_stream: S,
    ) -> anyhow::Result<()>
    where
        B: Backend,
        S: Stream<Item = io::Result<Event>> + Unpin,
    {
        self.render(terminal, Instant::now())?;

        while self.running {
            let msg = tokio::select! {
                biased;

                // Terminal events first so 'q' is never stuck behind ticks
                maybe_event = event_stream.next() => match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        match quit_key(key) {
                            Some(msg) => msg,
                            None => continue,
                        }
                    }
                    Some(Ok(Event::Resize(..))) => {
                        self.render(terminal, Instant::now())?;
                        continue;
                    }
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => return Err(e).context("terminal event stream failed"),
                    None => UiMessage::Quit,
                },

                msg = self.inbox.recv() => match msg {
                    Some(msg) => msg,
                    None => {
                        info!("UI inbox closed");
                        UiMessage::Quit
                    }
                },
            };

            let now = Instant::now();
            self.update(msg, now);
            self.render(terminal, now)?;
        }

        Ok(())
    }

    /// Render the dashboard as of `now`
    pub fn render<B: Backend>(&self, terminal: &mut Terminal<B>, now: Instant) -> anyhow::Result<()> {
        terminal.draw(|frame| view::draw(frame, &self.store, now, &self.settings))?;
        Ok(())
    }
}

/// `q` quits. Raw mode swallows SIGINT, so Ctrl-C does too.
pub fn quit_key(key: KeyEvent) -> Option<UiMessage> {
    match key.code {
        KeyCode::Char('q') => Some(UiMessage::Quit),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(UiMessage::Quit)
        }
        _ => None,
    }
}
