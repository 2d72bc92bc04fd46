//! Clock and timing utilities for gaze sampling.
//!
//! Every gazetrack session is anchored to a monotonic epoch recorded when
//! tracking or recording starts. Time itself comes from a [`Clock`] so the
//! sampling loop can run against real time in production and against a
//! manually advanced clock in tests.

use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Source of monotonic time.
pub trait Clock: Send + Sync {
    /// Current monotonic instant.
    fn now(&self) -> Instant;
}

/// Production clock backed by [`Instant::now`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Test clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    instant: Mutex<Instant>,
}

impl ManualClock {
    /// Create a manual clock starting at the current real instant.
    pub fn new() -> Self {
        Self {
            instant: Mutex::new(Instant::now()),
        }
    }

    /// Advance time by the given duration.
    pub fn advance(&self, duration: Duration) {
        let mut inst = self
            .instant
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *inst += duration;
    }

    /// Move time forward to `target`. Never moves backwards.
    pub fn advance_to(&self, target: Instant) {
        let mut inst = self
            .instant
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if target > *inst {
            *inst = target;
        }
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self
            .instant
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// The epoch of one tracking session.
///
/// Sample timestamps are whole milliseconds since [`SessionClock::epoch`].
#[derive(Debug, Clone)]
pub struct SessionClock {
    /// The instant the session started.
    epoch: Instant,

    /// Wall-clock time at epoch (ISO 8601 string).
    epoch_wall: String,
}

impl SessionClock {
    /// Start a session at the clock's current instant.
    pub fn start(clock: &dyn Clock) -> Self {
        Self {
            epoch: clock.now(),
            epoch_wall: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Whole milliseconds between the epoch and `now`, saturating at
    /// `u32::MAX` (about 49 days).
    pub fn elapsed_ms_at(&self, now: Instant) -> u32 {
        let ms = now.saturating_duration_since(self.epoch).as_millis();
        u32::try_from(ms).unwrap_or(u32::MAX)
    }

    /// Instant at which the tick after one stamped `elapsed_ms` is due.
    pub fn deadline(&self, elapsed_ms: u32, period_ms: u32) -> Instant {
        self.epoch + ms_to_duration(elapsed_ms) + ms_to_duration(period_ms)
    }

    /// The instant the session started.
    pub fn epoch(&self) -> Instant {
        self.epoch
    }

    /// Wall-clock time at session start.
    pub fn epoch_wall(&self) -> &str {
        &self.epoch_wall
    }
}

/// Convert whole milliseconds to a [`Duration`].
pub fn ms_to_duration(ms: u32) -> Duration {
    Duration::from_millis(u64::from(ms))
}

/// Convert a millisecond timestamp to seconds.
pub fn ms_to_secs(ms: u32) -> f64 {
    f64::from(ms) / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_only_moves_forward() {
        let clock = ManualClock::new();
        let start = clock.now();

        clock.advance(Duration::from_millis(5));
        assert_eq!(clock.now() - start, Duration::from_millis(5));

        clock.advance_to(start);
        assert_eq!(clock.now() - start, Duration::from_millis(5));

        clock.advance_to(start + Duration::from_millis(9));
        assert_eq!(clock.now() - start, Duration::from_millis(9));
    }

    #[test]
    fn test_session_elapsed_truncates_to_ms() {
        let clock = ManualClock::new();
        let session = SessionClock::start(&clock);

        clock.advance(Duration::from_micros(2_900));
        assert_eq!(session.elapsed_ms_at(clock.now()), 2);
    }

    #[test]
    fn test_session_elapsed_before_epoch_is_zero() {
        let clock = ManualClock::new();
        let earlier = clock.now();
        clock.advance(Duration::from_millis(3));
        let session = SessionClock::start(&clock);
        assert_eq!(session.elapsed_ms_at(earlier), 0);
    }

    #[test]
    fn test_deadline() {
        let clock = ManualClock::new();
        let session = SessionClock::start(&clock);
        let deadline = session.deadline(10, 1);
        assert_eq!(deadline - session.epoch(), Duration::from_millis(11));
    }

    #[test]
    fn test_system_clock_is_monotonic() {
        let clock = SystemClock;
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }

    #[test]
    fn test_ms_to_secs() {
        assert!((ms_to_secs(1_500) - 1.5).abs() < 1e-12);
    }
}
