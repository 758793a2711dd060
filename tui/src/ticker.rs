//! Periodic Ticker
//!
//! Sends [`UiMessage::Tick`] into the UI inbox on a fixed period. The ticker
//! never touches the notification store; it only asks the UI loop to evict
//! and redraw.

use std::time::Duration;

use beeper_core::{UiMessage, UiSender};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

/// Spawn the ticker; it stops on its own once the UI inbox is closed
pub fn spawn_ticker(ui: UiSender, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        // A slow frame shouldn't cause a burst of catch-up ticks
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            if ui.send(UiMessage::Tick).await.is_err() {
                debug!("UI inbox closed, stopping ticker");
                break;
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use beeper_core::ui_channel;

    #[tokio::test(start_paused = true)]
    async fn test_ticks_on_period() {
        let (tx, mut rx) = ui_channel();
        let _ticker = spawn_ticker(tx, Duration::from_millis(50));

        let began = tokio::time::Instant::now();
        for _ in 0..4 {
            assert_eq!(rx.recv().await, Some(UiMessage::Tick));
        }
        // First tick is immediate, then one every 50ms
        assert_eq!(began.elapsed(), Duration::from_millis(150));
    }

    #[tokio::test]
    async fn test_stops_when_inbox_closes() {
        let (tx, rx) = ui_channel();
        let ticker = spawn_ticker(tx, Duration::from_millis(1));
        drop(rx);

        tokio_test::assert_ok!(ticker.await);
    }
}
