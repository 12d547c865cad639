//! Timed full-screen notification.

use heapless::{String, Vec};

use crate::config::{MESSAGE_TEXT_CHARS, NOTIFICATION_MILLIS};
use crate::mesh::Name;
use crate::text::{sanitize_for_display, truncated};

/// Characters per wrapped notification line.
pub const LINE_CHARS: usize = 19;
/// Wrapped lines shown at most.
pub const MAX_LINES: usize = 4;

pub type Line = String<LINE_CHARS>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub from: Name,
    pub text: String<MESSAGE_TEXT_CHARS>,
    pub expiry_ms: u64,
}

impl Notification {
    /// Message text wrapped to 19-character lines, at most four.
    pub fn lines(&self) -> Vec<Line, MAX_LINES> {
        wrap(self.text.as_str())
    }
}

/// Sanitise `text` and cut it into fixed-width lines.
pub fn wrap(text: &str) -> Vec<Line, MAX_LINES> {
    let clean: String<MESSAGE_TEXT_CHARS> = sanitize_for_display(text);
    let mut lines = Vec::new();
    // Sanitised text is ASCII, so byte chunks are char chunks.
    for chunk in clean.as_bytes().chunks(LINE_CHARS) {
        let Ok(part) = core::str::from_utf8(chunk) else {
            break;
        };
        if lines.push(truncated(part)).is_err() {
            break;
        }
    }
    lines
}

/// At most one live notification; a new one replaces the old.
#[derive(Clone, Debug, Default)]
pub struct NotificationOverlay {
    current: Option<Notification>,
}

impl NotificationOverlay {
    pub const fn new() -> Self {
        Self { current: None }
    }

    /// Show for the default two seconds.
    pub fn show(&mut self, from: &str, text: &str, now_ms: u64) {
        self.show_for(from, text, now_ms, NOTIFICATION_MILLIS);
    }

    pub fn show_for(&mut self, from: &str, text: &str, now_ms: u64, duration_ms: u64) {
        debug!("Notification: {} ({} ms)", from, duration_ms);
        self.current = Some(Notification {
            from: truncated(from),
            text: truncated(text),
            expiry_ms: now_ms.saturating_add(duration_ms),
        });
    }

    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    pub fn current(&self) -> Option<&Notification> {
        self.current.as_ref()
    }

    /// Dismiss by key. Returns `true` if something was dismissed.
    pub fn dismiss(&mut self) -> bool {
        self.current.take().is_some()
    }

    /// Clear once `now >= expiry`. Returns `true` if it just expired.
    pub fn expire(&mut self, now_ms: u64) -> bool {
        match &self.current {
            Some(n) if now_ms >= n.expiry_ms => {
                self.current = None;
                true
            }
            _ => false,
        }
    }
}
