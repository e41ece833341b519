//! Shared notion of "now".
//!
//! A [`SharedClock`] lives inside the session state and is only advanced by
//! the clock source task. Readings come from a [`TimeSource`] so tests can
//! drive time by hand.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Produces the current monotonic time.
pub trait TimeSource: Send + Sync + 'static {
    fn now(&self) -> Instant;
}

/// Reads `Instant::now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A time source that only moves when told to.
#[derive(Debug, Clone)]
pub struct ManualTimeSource {
    now: Arc<Mutex<Instant>>,
}

impl ManualTimeSource {
    pub fn new(start: Instant) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// The single time value every renderer reads.
///
/// Never moves backwards: a reading earlier than the current value is
/// ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SharedClock {
    now: Instant,
}

impl SharedClock {
    pub fn new(now: Instant) -> Self {
        Self { now }
    }

    pub fn now(&self) -> Instant {
        self.now
    }

    /// Returns `true` if the clock moved.
    pub fn advance_to(&mut self, reading: Instant) -> bool {
        if reading > self.now {
            self.now = reading;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_clock_is_non_decreasing() {
        let t0 = Instant::now();
        let mut clock = SharedClock::new(t0 + Duration::from_secs(5));

        assert!(!clock.advance_to(t0));
        assert_eq!(clock.now(), t0 + Duration::from_secs(5));

        assert!(clock.advance_to(t0 + Duration::from_secs(6)));
        assert_eq!(clock.now(), t0 + Duration::from_secs(6));
    }

    #[test]
    fn manual_source_moves_only_on_advance() {
        let t0 = Instant::now();
        let source = ManualTimeSource::new(t0);
        assert_eq!(source.now(), t0);

        source.advance(Duration::from_millis(250));
        assert_eq!(source.now(), t0 + Duration::from_millis(250));

        let clone = source.clone();
        clone.advance(Duration::from_millis(250));
        assert_eq!(source.now(), t0 + Duration::from_millis(500));
    }
}
