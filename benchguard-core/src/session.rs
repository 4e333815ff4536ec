//! Timing of one test run
//!
//! [`SessionTimer`] is the pure clock logic behind a test run: it decides when
//! the relays are due for their periodic toggle and when the run is over. The
//! caller polls it from the same periodic callback that drives
//! [`Runner::step`](crate::runner::Runner), so no timer thread is involved.
//!
//! ```rust
//! use benchguard_core::session::{SessionEvent, SessionTimer};
//!
//! // 30 s run, toggle every 10 s, started at t = 0
//! let mut timer = SessionTimer::new(30, 10, 0);
//! assert_eq!(timer.poll(5_000), SessionEvent::Continue);
//! assert_eq!(timer.poll(10_000), SessionEvent::ToggleDue);
//! assert_eq!(timer.remaining_hms(12_000).to_string(), "00:00:18");
//! assert_eq!(timer.poll(30_000), SessionEvent::Expired);
//! ```

use core::fmt;

use crate::config::ThresholdConfig;
use crate::constants::{MS_PER_SECOND, SECONDS_PER_HOUR, SECONDS_PER_MINUTE};
use crate::time::Timestamp;

/// What the caller should do after a poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Keep sampling
    Continue,
    /// Toggle the relays now
    ToggleDue,
    /// Run is over, stop the runner
    Expired,
}

/// Countdown split into hours, minutes and seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hms {
    /// Whole hours, unbounded
    pub hours: u64,
    /// 0..60
    pub minutes: u32,
    /// 0..60
    pub seconds: u32,
}

impl Hms {
    /// Split a number of seconds
    pub fn from_secs(total: u64) -> Self {
        let hour = u64::from(SECONDS_PER_HOUR);
        let minute = u64::from(SECONDS_PER_MINUTE);
        Self {
            hours: total / hour,
            minutes: ((total % hour) / minute) as u32,
            seconds: (total % minute) as u32,
        }
    }
}

impl fmt::Display for Hms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hours, self.minutes, self.seconds)
    }
}

/// Duration and relay-toggle schedule of a running test
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTimer {
    started_at: Timestamp,
    duration_ms: u64,
    toggle_interval_ms: u64,
    next_toggle: Option<Timestamp>,
    expired: bool,
}

impl SessionTimer {
    /// Start a run at `now`; a zero toggle interval disables toggling
    pub fn new(test_duration_s: u32, relay_toggle_interval_s: u32, now: Timestamp) -> Self {
        let duration_ms = u64::from(test_duration_s) * MS_PER_SECOND;
        let toggle_interval_ms = u64::from(relay_toggle_interval_s) * MS_PER_SECOND;
        let next_toggle = (toggle_interval_ms > 0).then(|| now.saturating_add(toggle_interval_ms));
        Self {
            started_at: now,
            duration_ms,
            toggle_interval_ms,
            next_toggle,
            expired: false,
        }
    }

    /// Start a run with the cadence of `config`
    pub fn from_config(config: &ThresholdConfig, now: Timestamp) -> Self {
        Self::new(config.test_duration_s, config.relay_toggle_interval_s, now)
    }

    /// Advance the schedule to `now`
    ///
    /// Expiry wins over a toggle falling due at the same instant. Missed
    /// toggles (a stalled caller) collapse into one `ToggleDue`.
    pub fn poll(&mut self, now: Timestamp) -> SessionEvent {
        if self.expired || now >= self.deadline() {
            self.expired = true;
            return SessionEvent::Expired;
        }

        match self.next_toggle {
            Some(due) if now >= due => {
                let missed = (now - due) / self.toggle_interval_ms;
                let next = due.saturating_add((missed + 1) * self.toggle_interval_ms);
                self.next_toggle = Some(next);
                SessionEvent::ToggleDue
            }
            _ => SessionEvent::Continue,
        }
    }

    /// Whether the run reached its deadline
    pub fn is_expired(&self) -> bool {
        self.expired
    }

    /// Time the run started (ms)
    pub fn started_at(&self) -> Timestamp {
        self.started_at
    }

    /// Time the run ends (ms)
    pub fn deadline(&self) -> Timestamp {
        self.started_at.saturating_add(self.duration_ms)
    }

    /// Time since the start, zero before it
    pub fn elapsed_ms(&self, now: Timestamp) -> u64 {
        now.saturating_sub(self.started_at)
    }

    /// Time left until the deadline, zero once expired
    pub fn remaining_ms(&self, now: Timestamp) -> u64 {
        if self.expired {
            return 0;
        }
        self.deadline().saturating_sub(now)
    }

    /// Countdown for display, whole seconds rounded down
    pub fn remaining_hms(&self, now: Timestamp) -> Hms {
        Hms::from_secs(self.remaining_ms(now) / MS_PER_SECOND)
    }
}
