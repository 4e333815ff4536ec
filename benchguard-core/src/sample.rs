//! Per-channel sample model
//!
//! One [`ChannelSample`] exists per physical channel for the lifetime of a
//! runner. Each cycle overwrites its measurements and flags in place; the three
//! error counters are the only state carried from one cycle to the next, and
//! only the classifier can advance them.
//!
//! ```text
//! Snapshot = [ChannelSample; 8]
//! ┌────┬────┬────┬────┬────┬────┬────┬────┐
//! │ 0  │ 1  │ 2  │ 3  │ 4  │ 5  │ 6  │ 7  │  ← channel
//! └────┴────┴────┴────┴────┴────┴────┴────┘
//!   pair 0    pair 1    pair 2    pair 3     ← relay pair = channel / 2
//! ```

use crate::constants::{CHANNELS_PER_PAIR, NUM_CHANNELS};
use crate::time::Timestamp;

/// Latest sample of every channel, indexed by channel number
pub type Snapshot = [ChannelSample; NUM_CHANNELS];

/// Build a snapshot of default samples, channel numbers 0..NUM_CHANNELS
pub fn fresh_snapshot() -> Snapshot {
    core::array::from_fn(|channel| ChannelSample::new(channel as u8))
}

/// Relay pair driving a channel
pub const fn relay_pair_of(channel: usize) -> usize {
    channel / CHANNELS_PER_PAIR
}

/// Cumulative failure counts of one channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ErrorCounters {
    /// Cycles with the supply out of its window
    pub supply: u32,
    /// Cycles with the signal out of its window
    pub signal: u32,
    /// Cycles with the current out of its window
    pub current: u32,
}

impl ErrorCounters {
    /// Sum of all three counters
    pub fn total(&self) -> u32 {
        self.supply
            .saturating_add(self.signal)
            .saturating_add(self.current)
    }
}

/// One channel's reading and derived status
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelSample {
    channel: u8,

    /// Supply rail voltage (V)
    pub bus_voltage_v: f32,
    /// Current draw (mA)
    pub current_ma: f32,
    /// Power draw (mW)
    pub power_mw: f32,
    /// Auxiliary signal voltage (V)
    pub signal_v: f32,

    /// Device under test deemed connected
    pub present: bool,
    /// Supply inside its window
    pub supply_ok: bool,
    /// Signal inside either polarity window
    pub signal_ok: bool,
    /// Current inside its window
    pub current_ok: bool,

    /// Last read failed; measurements are from an earlier cycle
    pub stale: bool,

    /// Capture time (ms)
    pub timestamp: Timestamp,

    counters: ErrorCounters,
    cycles: u32,
}

impl ChannelSample {
    /// Zeroed, not-present sample for `channel`
    pub const fn new(channel: u8) -> Self {
        Self {
            channel,
            bus_voltage_v: 0.0,
            current_ma: 0.0,
            power_mw: 0.0,
            signal_v: 0.0,
            present: false,
            supply_ok: false,
            signal_ok: false,
            current_ok: false,
            stale: false,
            timestamp: 0,
            counters: ErrorCounters { supply: 0, signal: 0, current: 0 },
            cycles: 0,
        }
    }

    /// Channel number, fixed at creation
    pub fn channel(&self) -> u8 {
        self.channel
    }

    /// Relay pair energizing this channel
    pub fn relay_pair(&self) -> usize {
        relay_pair_of(self.channel as usize)
    }

    /// Cumulative error counters
    pub fn counters(&self) -> ErrorCounters {
        self.counters
    }

    /// Supply failures since the run started
    pub fn supply_error_count(&self) -> u32 {
        self.counters.supply
    }

    /// Signal failures since the run started
    pub fn signal_error_count(&self) -> u32 {
        self.counters.signal
    }

    /// Current failures since the run started
    pub fn current_error_count(&self) -> u32 {
        self.counters.current
    }

    /// Number of cycles in which this channel was classified
    pub fn cycles(&self) -> u32 {
        self.cycles
    }

    /// All three checks passed on fresh data
    pub fn is_healthy(&self) -> bool {
        !self.stale && self.supply_ok && self.signal_ok && self.current_ok
    }

    pub(crate) fn counters_mut(&mut self) -> &mut ErrorCounters {
        &mut self.counters
    }

    pub(crate) fn record_cycle(&mut self) {
        self.cycles = self.cycles.saturating_add(1);
    }
}
