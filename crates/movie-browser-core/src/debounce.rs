//! Input debouncing
//!
//! A [`Debouncer`] coalesces bursts of values on one input channel: only the
//! latest value is kept, and it becomes ready once no new value has arrived
//! for the quiescence window.

use std::time::Duration;

use tokio::time::Instant;

/// Quiescence window for text entry and the rating slider
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Latest-value debouncer for a single input channel
#[derive(Debug)]
pub struct Debouncer<T> {
    window: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    /// Create a debouncer with the given quiescence window
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    /// Record a new value at `now`, replacing any pending one.
    ///
    /// Returns the instant at which the value becomes ready.
    pub fn push_at(&mut self, value: T, now: Instant) -> Instant {
        let deadline = now + self.window;
        self.pending = Some((value, deadline));
        deadline
    }

    /// Record a new value now
    pub fn push(&mut self, value: T) -> Instant {
        self.push_at(value, Instant::now())
    }

    /// Take the pending value if its window has elapsed at `now`
    pub fn poll_ready(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((_, deadline)) if *deadline <= now => self.pending.take().map(|(value, _)| value),
            _ => None,
        }
    }

    /// Take the pending value regardless of its deadline
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }

    /// Deadline of the pending value, if any
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_not_ready_inside_window() {
        let start = Instant::now();
        let mut debouncer = Debouncer::default();

        let deadline = debouncer.push_at("d", start);
        assert_eq!(deadline, start + Duration::from_millis(300));
        assert_eq!(debouncer.poll_ready(start + Duration::from_millis(299)), None);
        assert_eq!(debouncer.deadline(), Some(deadline));
        assert_eq!(debouncer.poll_ready(deadline), Some("d"));
        assert_eq!(debouncer.deadline(), None);
    }

    #[test]
    fn test_burst_coalesces_to_latest() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(300));

        debouncer.push_at("d", start);
        debouncer.push_at("du", start + Duration::from_millis(100));
        let deadline = debouncer.push_at("dun", start + Duration::from_millis(200));

        // The first deadline has passed but was superseded
        assert_eq!(debouncer.poll_ready(start + Duration::from_millis(350)), None);
        assert_eq!(debouncer.poll_ready(deadline), Some("dun"));
        assert_eq!(debouncer.poll_ready(deadline), None);
    }

    #[test]
    fn test_flush_ignores_deadline() {
        let mut debouncer = Debouncer::default();
        debouncer.push(7.5_f32);
        assert_eq!(debouncer.flush(), Some(7.5));
        assert_eq!(debouncer.deadline(), None);
    }
}
