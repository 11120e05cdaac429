//! Seek debounce window

use std::time::Duration;
use tokio::time::Instant;

/// Suppresses progress publishing for a fixed window after a manual seek
#[derive(Debug, Clone)]
pub struct SeekDebounce {
    window: Duration,
    last_seek: Option<Instant>,
}

impl SeekDebounce {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_seek: None,
        }
    }

    /// Remember that a seek was issued at `now`
    pub fn record(&mut self, now: Instant) {
        self.last_seek = Some(now);
    }

    /// Whether progress updates are still held back at `now`.
    ///
    /// The window is inclusive: updates resume once strictly more than
    /// `window` has elapsed since the last seek.
    pub fn is_suppressed(&self, now: Instant) -> bool {
        match self.last_seek {
            Some(at) => now.saturating_duration_since(at) <= self.window,
            None => false,
        }
    }

    pub fn last_seek(&self) -> Option<Instant> {
        self.last_seek
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_seek_never_suppresses() {
        let debounce = SeekDebounce::new(Duration::from_millis(200));
        assert!(!debounce.is_suppressed(Instant::now()));
        assert!(debounce.last_seek().is_none());
    }

    #[test]
    fn test_window_boundaries() {
        let mut debounce = SeekDebounce::new(Duration::from_millis(200));
        let at = Instant::now();
        debounce.record(at);

        assert!(debounce.is_suppressed(at));
        assert!(debounce.is_suppressed(at + Duration::from_millis(150)));
        assert!(debounce.is_suppressed(at + Duration::from_millis(200)));
        assert!(!debounce.is_suppressed(at + Duration::from_millis(201)));
    }

    #[test]
    fn test_new_seek_restarts_window() {
        let mut debounce = SeekDebounce::new(Duration::from_millis(200));
        let at = Instant::now();
        debounce.record(at);
        debounce.record(at + Duration::from_millis(180));

        assert!(debounce.is_suppressed(at + Duration::from_millis(300)));
        assert!(!debounce.is_suppressed(at + Duration::from_millis(381)));
    }
}
