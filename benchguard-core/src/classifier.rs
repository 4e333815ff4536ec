//! Health classification of raw channel readings
//!
//! ## Checks
//!
//! Every check is a plain inclusive window test, no hysteresis:
//!
//! | flag         | passes when                                               |
//! |--------------|-----------------------------------------------------------|
//! | `supply_ok`  | bus voltage ∈ supply window                               |
//! | `signal_ok`  | signal ∈ positive window **or** signal ∈ negative window  |
//! | `current_ok` | current ∈ presence current window                         |
//! | `present`    | signal ∉ idle window **or** current > presence floor      |
//!
//! Presence ORs two independent hints, so a module drawing current while its
//! status output momentarily floats in the idle band still counts as plugged
//! in, and the other way round.
//!
//! ## Counters
//!
//! [`apply`] writes the outcome into a [`ChannelSample`] and advances its
//! error counters according to [`CounterPolicy`]. Counters never go down;
//! only a fresh snapshot (test restart) zeroes them.
//!
//! ## Invalid readings
//!
//! A NaN or infinite measurement is a read failure, not an out-of-range value:
//! [`apply`] marks the sample stale and leaves counters and flags alone.
//!
//! ```rust
//! use benchguard_core::classifier::{classify, Reading};
//! use benchguard_core::ThresholdConfig;
//!
//! let config = ThresholdConfig::default();
//! let health = classify(&Reading::new(5.0, 15.0, 3.5), &config);
//! assert!(health.all_ok());
//! assert!(health.present);
//! ```

use crate::config::{CounterPolicy, ThresholdConfig};
use crate::constants::{SEVERITY_CURRENT_WEIGHT, SEVERITY_SIGNAL_WEIGHT, SEVERITY_SUPPLY_WEIGHT};
use crate::errors::{Quantity, ReadError};
use crate::sample::ChannelSample;
use crate::time::Timestamp;

/// Raw measurements of one channel in engineering units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    /// Supply rail voltage (V)
    pub bus_voltage_v: f32,
    /// Current draw (mA)
    pub current_ma: f32,
    /// Measured power (mW), if the sensor reports it
    pub power_mw: Option<f32>,
    /// Auxiliary signal voltage (V)
    pub signal_v: f32,
}

impl Reading {
    /// Reading without a power measurement
    pub fn new(bus_voltage_v: f32, current_ma: f32, signal_v: f32) -> Self {
        Self { bus_voltage_v, current_ma, power_mw: None, signal_v }
    }

    /// Attach a measured power value instead of deriving it
    pub fn with_power(mut self, power_mw: f32) -> Self {
        self.power_mw = Some(power_mw);
        self
    }

    /// Measured power, or V × mA when the sensor gave none
    pub fn power_mw(&self) -> f32 {
        self.power_mw.unwrap_or(self.bus_voltage_v * self.current_ma)
    }

    /// Reject NaN/infinite measurements
    pub fn check_finite(&self) -> Result<(), ReadError> {
        let checks = [
            (self.bus_voltage_v, Quantity::BusVoltage),
            (self.current_ma, Quantity::Current),
            (self.power_mw(), Quantity::Power),
            (self.signal_v, Quantity::Signal),
        ];
        for (value, quantity) in checks {
            if !value.is_finite() {
                return Err(ReadError::NonFinite { quantity });
            }
        }
        Ok(())
    }
}

/// Classification outcome of one reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Health {
    /// A module sits in the slot
    pub present: bool,
    /// Supply voltage inside its window
    pub supply_ok: bool,
    /// Signal voltage inside the window for the relay state
    pub signal_ok: bool,
    /// Current draw inside its window
    pub current_ok: bool,
}

impl Health {
    /// All three window checks passed
    pub fn all_ok(&self) -> bool {
        self.supply_ok && self.signal_ok && self.current_ok
    }

    /// Weighted failure score in [0, 1] for status LEDs
    pub fn severity(&self) -> f32 {
        severity(self)
    }
}

/// Presence heuristic: signal away from the idle band, or current above the floor
pub fn is_present(reading: &Reading, config: &ThresholdConfig) -> bool {
    let signal_not_idle = !config.signal_idle_range.contains(reading.signal_v);
    let drawing_current = reading.current_ma > config.presence_floor_ma();
    signal_not_idle || drawing_current
}

/// Evaluate all windows for one reading
pub fn classify(reading: &Reading, config: &ThresholdConfig) -> Health {
    Health {
        present: is_present(reading, config),
        supply_ok: config.supply_voltage_range.contains(reading.bus_voltage_v),
        signal_ok: config.signal_positive_range.contains(reading.signal_v)
            || config.signal_negative_range.contains(reading.signal_v),
        current_ok: config.presence_current_range.contains(reading.current_ma),
    }
}

/// 0.5 × supply fail + 0.3 × signal fail + 0.2 × current fail, clamped to [0, 1]
pub fn severity(health: &Health) -> f32 {
    let mut score = 0.0;
    if !health.supply_ok {
        score += SEVERITY_SUPPLY_WEIGHT;
    }
    if !health.signal_ok {
        score += SEVERITY_SIGNAL_WEIGHT;
    }
    if !health.current_ok {
        score += SEVERITY_CURRENT_WEIGHT;
    }
    score.clamp(0.0, 1.0)
}

/// Classify `reading` and write the result into `sample`
///
/// Overwrites measurements, flags and timestamp; advances the error counters
/// per `config.counter_policy`. A non-finite reading marks the sample stale
/// and is returned as an error without touching flags or counters.
pub fn apply(
    sample: &mut ChannelSample,
    reading: Reading,
    config: &ThresholdConfig,
    now: Timestamp,
) -> Result<Health, ReadError> {
    if let Err(err) = reading.check_finite() {
        mark_stale(sample);
        return Err(err);
    }

    let health = classify(&reading, config);
    let first = sample.cycles() == 0;
    let previous = Health {
        present: sample.present,
        supply_ok: sample.supply_ok,
        signal_ok: sample.signal_ok,
        current_ok: sample.current_ok,
    };

    let counts = |ok: bool, was_ok: bool| match config.counter_policy {
        CounterPolicy::PerFailingCycle => !ok,
        CounterPolicy::OnFailureTransition => !ok && (first || was_ok),
    };
    let supply_fail = counts(health.supply_ok, previous.supply_ok);
    let signal_fail = counts(health.signal_ok, previous.signal_ok);
    let current_fail = counts(health.current_ok, previous.current_ok);

    let counters = sample.counters_mut();
    if supply_fail {
        counters.supply = counters.supply.saturating_add(1);
    }
    if signal_fail {
        counters.signal = counters.signal.saturating_add(1);
    }
    if current_fail {
        counters.current = counters.current.saturating_add(1);
    }

    sample.bus_voltage_v = reading.bus_voltage_v;
    sample.current_ma = reading.current_ma;
    sample.power_mw = reading.power_mw();
    sample.signal_v = reading.signal_v;
    sample.present = health.present;
    sample.supply_ok = health.supply_ok;
    sample.signal_ok = health.signal_ok;
    sample.current_ok = health.current_ok;
    sample.stale = false;
    sample.timestamp = now;
    sample.record_cycle();

    Ok(health)
}

/// Flag a sample whose read failed this cycle
///
/// Measurements, ok flags and timestamp stay as last read; the channel is
/// reported not present until a read succeeds again.
pub fn mark_stale(sample: &mut ChannelSample) {
    sample.stale = true;
    sample.present = false;
}
