//! User-facing notifications.
//!
//! Services report outcomes through a [`Notifier`] and never wait on it. The
//! TUI shows them with a [`ToastBoard`].

use std::cell::RefCell;
use std::time::{Duration, Instant};

/// How long a toast stays on screen.
pub const TOAST_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Info,
    Warning,
    Error,
}

/// Where user-facing messages go.
pub trait Notifier {
    fn notify(&self, level: Level, message: &str);

    fn success(&self, message: &str) {
        self.notify(Level::Success, message);
    }

    fn error(&self, message: &str) {
        self.notify(Level::Error, message);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub level: Level,
    pub message: String,
}

/// Holds the most recent notification until it expires.
#[derive(Debug, Default)]
pub struct ToastBoard {
    latest: RefCell<Option<(Toast, Instant)>>,
}

impl ToastBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// The toast to display at `now`, if one is still live.
    pub fn current_at(&self, now: Instant) -> Option<Toast> {
        let mut latest = self.latest.borrow_mut();
        match latest.as_ref() {
            Some((_, shown)) if now.duration_since(*shown) >= TOAST_TTL => {
                *latest = None;
                None
            }
            Some((toast, _)) => Some(toast.clone()),
            None => None,
        }
    }

    /// The toast to draw right now, if any.
    pub fn current(&self) -> Option<Toast> {
        self.current_at(Instant::now())
    }

    pub fn dismiss(&self) {
        self.latest.borrow_mut().take();
    }

    fn show(&self, toast: Toast, at: Instant) {
        *self.latest.borrow_mut() = Some((toast, at));
    }
}

impl Notifier for ToastBoard {
    fn notify(&self, level: Level, message: &str) {
        self.show(
            Toast {
                level,
                message: message.to_string(),
            },
            Instant::now(),
        );
    }
}

#[cfg(test)]
pub(crate) use recording::RecordingNotifier;

#[cfg(test)]
mod recording {
    use super::{Level, Notifier};
    use std::cell::RefCell;

    /// Keeps every notification for later assertions.
    #[derive(Default)]
    pub struct RecordingNotifier {
        pub messages: RefCell<Vec<(Level, String)>>,
    }

    impl RecordingNotifier {
        pub fn count(&self, level: Level) -> usize {
            self.messages
                .borrow()
                .iter()
                .filter(|(l, _)| *l == level)
                .count()
        }
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, level: Level, message: &str) {
            self.messages.borrow_mut().push((level, message.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toast_expires_after_its_ttl() {
        let board = ToastBoard::new();
        let start = Instant::now();
        board.show(
            Toast {
                level: Level::Success,
                message: "Patient added".into(),
            },
            start,
        );

        assert!(board.current_at(start + Duration::from_secs(4)).is_some());
        assert!(board.current_at(start + TOAST_TTL).is_none());
        assert!(board.current_at(start).is_none());
    }

    #[test]
    fn newer_notifications_replace_older_ones() {
        let board = ToastBoard::new();
        board.notify(Level::Info, "first");
        board.error("second");
        let toast = board.current().unwrap();
        assert_eq!(toast.level, Level::Error);
        assert_eq!(toast.message, "second");
    }
}
