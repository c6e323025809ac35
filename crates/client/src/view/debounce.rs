//! Search Debouncer

use std::time::{Duration, Instant};

/// Delay between the last keystroke and the search being committed
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);

/// Holds the latest search text until input pauses for `delay`
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    text: String,
    deadline: Option<Instant>,
}

impl Debouncer {
    /// Create a debouncer with the given quiet period
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            text: String::new(),
            deadline: None,
        }
    }

    /// Record new input; restarts the quiet period
    pub fn input(&mut self, text: impl Into<String>, now: Instant) {
        self.text = text.into();
        self.deadline = Some(now + self.delay);
    }

    /// Current input text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether input is waiting to be committed
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Return the text once the quiet period has elapsed
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                Some(self.text.clone())
            }
            _ => None,
        }
    }

    /// Commit immediately (Enter key), cancelling any pending timer
    pub fn flush(&mut self) -> String {
        self.deadline = None;
        self.text.clone()
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(SEARCH_DEBOUNCE)
    }
}
