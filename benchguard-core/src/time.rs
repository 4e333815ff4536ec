//! Clocks for sample timestamps
//!
//! Timestamps are for display and logging only; classification never looks at
//! them. The runner reads its [`TimeSource`] once per cycle:
//! - [`SystemTime`]: wall clock, the default, so event-log times are real
//! - [`SteppedTime`]: advances a fixed step per read, for tests and replays

use core::cell::Cell;

/// Milliseconds since the Unix epoch (or since an arbitrary origin for
/// non-wall clocks)
pub type Timestamp = u64;

/// Source of cycle timestamps
pub trait TimeSource {
    /// Current time in milliseconds
    fn now(&self) -> Timestamp;

    /// Whether `now()` is calendar time that can be formatted as a date
    fn is_wall_clock(&self) -> bool;
}

/// Wall clock (requires std)
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTime;

#[cfg(feature = "std")]
impl TimeSource for SystemTime {
    fn now(&self) -> Timestamp {
        use std::time::{SystemTime as StdSystemTime, UNIX_EPOCH};

        // A clock set before 1970 reads as the epoch
        StdSystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as Timestamp
    }

    fn is_wall_clock(&self) -> bool {
        true
    }
}

/// Clock that advances by a fixed step every time it is read
///
/// A runner owning this clock stamps its cycles `start`, `start + step`,
/// `start + 2·step`, ... without the caller touching the clock in between.
#[derive(Debug, Clone)]
pub struct SteppedTime {
    next: Cell<Timestamp>,
    step_ms: u64,
}

impl SteppedTime {
    /// Clock reading `start` first, then `step_ms` more on every read
    pub fn new(start: Timestamp, step_ms: u64) -> Self {
        Self { next: Cell::new(start), step_ms }
    }

    /// Timestamp the next `now()` returns, without advancing
    pub fn peek(&self) -> Timestamp {
        self.next.get()
    }
}

impl TimeSource for SteppedTime {
    fn now(&self) -> Timestamp {
        let current = self.next.get();
        self.next.set(current.saturating_add(self.step_ms));
        current
    }

    fn is_wall_clock(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stepped_time_ticks_per_read() {
        let time = SteppedTime::new(1000, 200);
        assert_eq!(time.peek(), 1000);
        assert_eq!(time.now(), 1000);
        assert_eq!(time.now(), 1200);
        assert_eq!(time.peek(), 1400);
        assert!(!time.is_wall_clock());
    }

    #[test]
    fn stepped_time_saturates() {
        let time = SteppedTime::new(u64::MAX - 1, 200);
        assert_eq!(time.now(), u64::MAX - 1);
        assert_eq!(time.now(), u64::MAX);
    }

    #[cfg(feature = "std")]
    #[test]
    fn system_time_is_wall_clock() {
        let clock = SystemTime;
        assert!(clock.is_wall_clock());
        // Any date after 2020-01-01
        assert!(clock.now() > 1_577_836_800_000);
    }
}
