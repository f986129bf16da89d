//! Debounced label persistence.
//!
//! Label edits update the live graph immediately but only reach storage
//! after a quiet period without further keystrokes, so a typing burst
//! produces a single write.

use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct LabelDebouncer {
    quiet_period: Duration,
    last_edit: Option<Instant>,
}

impl LabelDebouncer {
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            quiet_period,
            last_edit: None,
        }
    }

    /// Marks an edit at `now`, restarting the quiet period.
    pub fn touch(&mut self, now: Instant) {
        self.last_edit = Some(now);
    }

    pub fn has_pending(&self) -> bool {
        self.last_edit.is_some()
    }

    /// True once a pending edit has been quiet long enough to flush.
    pub fn is_due(&self, now: Instant) -> bool {
        self.last_edit
            .is_some_and(|at| now.duration_since(at) >= self.quiet_period)
    }

    /// Consumes the pending edit if it is due. Returns whether the caller
    /// should persist now.
    pub fn take_due(&mut self, now: Instant) -> bool {
        if self.is_due(now) {
            self.last_edit = None;
            true
        } else {
            false
        }
    }

    /// Drops the pending edit without flushing, for paths that persist for
    /// another reason anyway.
    pub fn reset(&mut self) {
        self.last_edit = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edit_is_due_only_after_the_quiet_period() {
        let mut debouncer = LabelDebouncer::new(Duration::from_millis(500));
        let start = Instant::now();
        debouncer.touch(start);

        assert!(!debouncer.is_due(start + Duration::from_millis(200)));
        assert!(debouncer.is_due(start + Duration::from_millis(500)));
    }

    #[test]
    fn retouch_restarts_the_quiet_period() {
        let mut debouncer = LabelDebouncer::new(Duration::from_millis(500));
        let start = Instant::now();
        debouncer.touch(start);
        debouncer.touch(start + Duration::from_millis(400));

        assert!(!debouncer.is_due(start + Duration::from_millis(700)));
        assert!(debouncer.is_due(start + Duration::from_millis(900)));
    }

    #[test]
    fn take_due_consumes_the_pending_edit() {
        let mut debouncer = LabelDebouncer::new(Duration::from_millis(500));
        let start = Instant::now();
        debouncer.touch(start);

        let later = start + Duration::from_secs(1);
        assert!(debouncer.take_due(later));
        assert!(!debouncer.has_pending());
        assert!(!debouncer.take_due(later));
    }
}
