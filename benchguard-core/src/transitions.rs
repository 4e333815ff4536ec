//! Per-channel status transitions
//!
//! [`TransitionTracker`] remembers the flags each channel had after the last
//! observed cycle and turns changes into [`TransitionEvent`]s for the operator
//! log. Steady states are silent: a channel that stays out of its window
//! produces one `Error` when it leaves and one `Ok` when it comes back.
//!
//! The first observation of a channel only primes the tracker.

use std::fmt;

use crate::config::ThresholdConfig;
use crate::constants::NUM_CHANNELS;
use crate::sample::{ChannelSample, Snapshot};
use crate::time::Timestamp;

/// What a transition is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Supply voltage window
    Supply,
    /// Signal voltage window
    Signal,
    /// Current draw window
    Current,
    /// Module inserted or removed
    Presence,
    /// Channel could not be read
    Read,
}

impl Category {
    /// CSV and display name
    pub const fn name(&self) -> &'static str {
        match self {
            Category::Supply => "supply",
            Category::Signal => "signal",
            Category::Current => "current",
            Category::Presence => "presence",
            Category::Read => "read",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Log level of a transition, ordered from benign to serious
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Back inside the window
    Ok,
    /// Informational, e.g. a module was inserted
    Info,
    /// Needs attention, values may be stale
    Warn,
    /// Out of window
    Error,
}

impl Severity {
    /// CSV and display name
    pub const fn name(&self) -> &'static str {
        match self {
            Severity::Ok => "OK",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One change of a channel's status
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionEvent {
    /// Timestamp of the sample that showed the change (ms)
    pub timestamp: Timestamp,
    /// Channel, 0-based
    pub channel: u8,
    /// Operator-entered serial number of the module in the slot
    pub serial: Option<String>,
    /// What changed
    pub category: Category,
    /// How serious the change is
    pub severity: Severity,
    /// Human-readable detail, values and window for failures
    pub detail: String,
    /// Relay pair of the channel was energized
    pub relay_on: bool,
}

impl TransitionEvent {
    /// Relay column text
    pub fn relay_label(&self) -> &'static str {
        if self.relay_on {
            "ON"
        } else {
            "OFF"
        }
    }

    /// Serial column text, `-` when none was entered
    pub fn serial_label(&self) -> &str {
        self.serial.as_deref().unwrap_or("-")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Flags {
    present: bool,
    supply_ok: bool,
    signal_ok: bool,
    current_ok: bool,
    stale: bool,
}

impl From<&ChannelSample> for Flags {
    fn from(sample: &ChannelSample) -> Self {
        Self {
            present: sample.present,
            supply_ok: sample.supply_ok,
            signal_ok: sample.signal_ok,
            current_ok: sample.current_ok,
            stale: sample.stale,
        }
    }
}

/// Edge detector over successive snapshots
#[derive(Debug, Clone, Default)]
pub struct TransitionTracker {
    previous: [Option<Flags>; NUM_CHANNELS],
    serials: [Option<String>; NUM_CHANNELS],
}

impl TransitionTracker {
    /// Unprimed tracker without serial numbers
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or clear the serial number shown for a channel
    ///
    /// Empty strings clear it. Out-of-range channels are ignored.
    pub fn set_serial(&mut self, channel: usize, serial: Option<&str>) {
        if let Some(slot) = self.serials.get_mut(channel) {
            *slot = serial
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned);
        }
    }

    /// Serial number shown for a channel
    pub fn serial(&self, channel: usize) -> Option<&str> {
        self.serials.get(channel)?.as_deref()
    }

    /// Forget previous flags, the next observation primes again
    ///
    /// Serial numbers are kept.
    pub fn reset(&mut self) {
        self.previous = [None; NUM_CHANNELS];
    }

    /// Compare `sensors` with the previous observation
    ///
    /// `relay_on(channel)` reports whether the channel's relay pair is
    /// energized. Channels never classified (fresh snapshot, or stale before
    /// their first read) are skipped and unprimed, so a runner reset does not
    /// produce a burst of errors.
    pub fn observe<F>(
        &mut self,
        sensors: &Snapshot,
        relay_on: F,
        config: &ThresholdConfig,
    ) -> Vec<TransitionEvent>
    where
        F: Fn(usize) -> bool,
    {
        let mut events = Vec::new();

        for (channel, sample) in sensors.iter().enumerate() {
            let current = Flags::from(sample);
            if sample.cycles() == 0 {
                self.previous[channel] = None;
                continue;
            }
            let Some(before) = self.previous[channel] else {
                self.previous[channel] = Some(current);
                continue;
            };

            let mut emit = |category: Category, severity: Severity, detail: String| {
                events.push(TransitionEvent {
                    timestamp: sample.timestamp,
                    channel: channel as u8,
                    serial: self.serials[channel].clone(),
                    category,
                    severity,
                    detail,
                    relay_on: relay_on(channel),
                });
            };

            if current.stale {
                if !before.stale {
                    emit(Category::Read, Severity::Warn, "read failed, values stale".to_owned());
                }
                // Flags of a stale sample are carried over, compare after recovery
                let mut kept = before;
                kept.stale = true;
                self.previous[channel] = Some(kept);
                continue;
            }

            if current.supply_ok != before.supply_ok {
                if current.supply_ok {
                    emit(Category::Supply, Severity::Ok, "recovered".to_owned());
                } else {
                    let window = config.supply_voltage_range;
                    emit(
                        Category::Supply,
                        Severity::Error,
                        format!(
                            "V={:.2} outside [{:.2}, {:.2}]",
                            sample.bus_voltage_v, window.lo, window.hi
                        ),
                    );
                }
            }

            if current.signal_ok != before.signal_ok {
                if current.signal_ok {
                    emit(Category::Signal, Severity::Ok, "recovered".to_owned());
                } else {
                    let neg = config.signal_negative_range;
                    let pos = config.signal_positive_range;
                    emit(
                        Category::Signal,
                        Severity::Error,
                        format!(
                            "S={:.2} outside [{}, {}] / [{}, {}]",
                            sample.signal_v, neg.lo, neg.hi, pos.lo, pos.hi
                        ),
                    );
                }
            }

            if current.current_ok != before.current_ok {
                if current.current_ok {
                    emit(Category::Current, Severity::Ok, "recovered".to_owned());
                } else {
                    let window = config.presence_current_range;
                    emit(
                        Category::Current,
                        Severity::Error,
                        format!(
                            "I={:.2} mA outside [{:.2}, {:.2}] mA",
                            sample.current_ma, window.lo, window.hi
                        ),
                    );
                }
            }

            if current.present != before.present {
                if current.present {
                    emit(Category::Presence, Severity::Info, "module detected".to_owned());
                } else {
                    emit(Category::Presence, Severity::Warn, "module not detected".to_owned());
                }
            }

            self.previous[channel] = Some(current);
        }

        events
    }
}
