//! Dashboard View
//!
//! Pure rendering of the notification store: a dim header, then one line
//! per notification, oldest first, colored by how far into its fade it is.
//! Nothing here mutates state and nothing here can fail; a color that won't
//! decode falls back to [`FADE_FALLBACK`].

use std::borrow::Cow;
use std::time::{Duration, Instant};

use beeper_core::color::{fade_progress, interpolate};
use beeper_core::{NotificationRecord, NotificationStore};
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use tracing::debug;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::theme::{hex_color, FADE_FALLBACK, FADE_FAR_HEX, FADE_NEAR_HEX, HEADER_DIM, HEADER_KEY};

/// Shown for a notification that carries no label
pub const LABEL_PLACEHOLDER: &str = "unknown collection";

/// Static inputs to the view
#[derive(Debug, Clone)]
pub struct ViewSettings {
    /// Endpoint shown in the header
    pub endpoint: String,
    /// Time for a new notification to settle to its final color
    pub fade_window: Duration,
}

/// Draw the whole dashboard
pub fn draw(frame: &mut Frame, store: &NotificationStore, now: Instant, settings: &ViewSettings) {
    let [header_area, list_area] =
        Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).areas(frame.area());

    frame.render_widget(
        Paragraph::new(header_line(&settings.endpoint, store.len())),
        header_area,
    );
    frame.render_widget(
        Paragraph::new(notification_lines(store, now, settings.fade_window, list_area)),
        list_area,
    );
}

/// `beeper · <endpoint> · N recent · q quit`
pub fn header_line(endpoint: &str, count: usize) -> Line<'static> {
    let dim = Style::default().fg(HEADER_DIM);
    Line::from(vec![
        Span::styled(format!("beeper · {endpoint} · {count} recent · "), dim),
        Span::styled("q", Style::default().fg(HEADER_KEY)),
        Span::styled(" quit", dim),
    ])
}

/// One line per record in arrival order.
///
/// When there are more records than rows, the oldest overflow is skipped so
/// the newest notification is always on screen.
pub fn notification_lines(
    store: &NotificationStore,
    now: Instant,
    fade_window: Duration,
    area: Rect,
) -> Vec<Line<'static>> {
    let skip = store.len().saturating_sub(area.height as usize);
    store
        .iter()
        .skip(skip)
        .map(|record| notification_line(record, now, fade_window, area.width as usize))
        .collect()
}

pub fn notification_line(
    record: &NotificationRecord,
    now: Instant,
    fade_window: Duration,
    width: usize,
) -> Line<'static> {
    let label = record.label().unwrap_or(LABEL_PLACEHOLDER);
    let color = fade_color(record.age(now), fade_window);
    Line::from(Span::styled(
        truncate_to_width(label, width).into_owned(),
        Style::default().fg(color),
    ))
}

/// Color for a notification of the given age
pub fn fade_color(age: Duration, fade_window: Duration) -> Color {
    blend_or_fallback(FADE_NEAR_HEX, FADE_FAR_HEX, fade_progress(age, fade_window))
}

fn blend_or_fallback(near: &str, far: &str, t: f64) -> Color {
    match interpolate(near, far, t).and_then(|hex| hex_color(&hex)) {
        Ok(color) => color,
        Err(e) => {
            debug!(error = %e, "Fade color failed, using fallback");
            FADE_FALLBACK
        }
    }
}

/// Cut `text` to at most `max_width` columns, marking the cut with `…`
pub fn truncate_to_width(text: &str, max_width: usize) -> Cow<'_, str> {
    if text.width() <= max_width {
        return Cow::Borrowed(text);
    }
    if max_width == 0 {
        return Cow::Borrowed("");
    }

    let budget = max_width - 1;
    let mut used = 0;
    let mut out = String::new();
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    Cow::Owned(out)
}
