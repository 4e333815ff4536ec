//! Hardware-backed acquisition for the BenchGuard bench
//!
//! ## Overview
//!
//! [`HardwareSource`] implements the core's `AcquisitionSource` on the real
//! bench: one current sensor shared by all eight channels behind an I2C
//! multiplexer, a DAQ for the signal voltages, GPIO relay pairs, and an
//! optional status LED strip.
//!
//! ```text
//!              ┌──────────┐  ch0..7  ┌────────┐
//!   I2C bus ──▶│ TCA9548A │─────────▶│ INA219 │  bus V, current, power
//!              └──────────┘          └────────┘
//!   USB DAQ ─────────────────────────────────────  signal V, input per channel
//!   GPIO ─────── 4 relay pairs × 2 lines ────────  energize channels 2i, 2i+1
//!   LED strip ── one pixel per channel ──────────  severity green → red
//! ```
//!
//! ## Drivers
//!
//! | part      | module          | bus                            |
//! |-----------|-----------------|--------------------------------|
//! | TCA9548A  | [`mux`]         | `embedded_hal::i2c::I2c`       |
//! | INA219    | [`power`]       | `embedded_hal::i2c::I2c`       |
//! | relays    | [`relays`]      | `embedded_hal::digital::OutputPin` |
//! | DAQ       | [`daq`]         | vendor wrapper, `nb` polling   |
//! | LED strip | [`indicator`]   | vendor wrapper                 |
//!
//! Each part sits behind a trait ([`ChannelMux`], [`PowerMonitor`],
//! [`AnalogInput`], [`IndicatorStrip`]) so benches with other parts, and the
//! tests, plug in their own.
//!
//! ## Lifecycle
//!
//! ```text
//! Uninitialized ── initialize() ──▶ Ready ── update / relay calls ──▶ Ready
//!       ▲                             │
//!       └──────── shutdown() ─────────┘
//! ```
//!
//! `initialize()` opens relays (switched off first), multiplexer, current
//! sensor, DAQ and LED strip, in that order. A part that fails to open is
//! reported and skipped afterwards; its channels read as
//! `SubsystemUnavailable`. `shutdown()` walks the same list backwards and
//! releases the relay lines last.

#![deny(unsafe_code)]

pub mod daq;
pub mod error;
pub mod indicator;
pub mod mux;
pub mod power;
pub mod relays;

#[cfg(test)]
pub(crate) mod mock;

pub use daq::{AnalogInput, InputMap, IDENTITY_INPUTS};
pub use error::DriverError;
pub use indicator::{severity_to_rgb, IndicatorStrip, NoIndicator, Rgb};
pub use mux::{ChannelMux, Tca9548a};
pub use power::{Ina219, Ina219Config, PowerMonitor, PowerReading};
pub use relays::RelayBank;

use benchguard_core::{
    classifier::{self, Reading},
    constants::NUM_CHANNELS,
    AcquisitionSource, CycleReport, InitReport, ReadError, Snapshot, SourceError, Subsystem,
    ThresholdConfig, Timestamp,
};
use embedded_hal::digital::OutputPin;

/// Hardware tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HardwareOptions {
    /// Attempts per channel read before the channel is reported faulty
    pub read_retries: u8,
    /// DAQ input of each bench channel
    pub signal_inputs: InputMap,
}

impl Default for HardwareOptions {
    fn default() -> Self {
        Self { read_retries: 3, signal_inputs: IDENTITY_INPUTS }
    }
}

/// Lifecycle state of a [`HardwareSource`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HardwareState {
    #[default]
    Uninitialized,
    Ready,
}

/// Acquisition source backed by the bench hardware
pub struct HardwareSource<M, P, D, O, L = NoIndicator> {
    mux: M,
    power: P,
    daq: D,
    relays: RelayBank<O>,
    indicator: L,
    options: HardwareOptions,
    state: HardwareState,
    init: InitReport,
}

impl<M, P, D, O, L> HardwareSource<M, P, D, O, L>
where
    M: ChannelMux,
    P: PowerMonitor,
    D: AnalogInput,
    O: OutputPin,
    L: IndicatorStrip,
{
    pub fn new(mux: M, power: P, daq: D, relays: RelayBank<O>, indicator: L) -> Self {
        Self {
            mux,
            power,
            daq,
            relays,
            indicator,
            options: HardwareOptions::default(),
            state: HardwareState::Uninitialized,
            init: InitReport::ok(),
        }
    }

    pub fn with_options(mut self, options: HardwareOptions) -> Self {
        self.options = options;
        self
    }

    pub fn state(&self) -> HardwareState {
        self.state
    }

    /// Outcome of the last `initialize()`
    pub fn init_report(&self) -> &InitReport {
        &self.init
    }

    pub fn options(&self) -> &HardwareOptions {
        &self.options
    }

    fn available(&self, subsystem: Subsystem) -> bool {
        self.state == HardwareState::Ready && self.init.is_available(subsystem)
    }

    /// First missing subsystem a channel read depends on
    fn missing_for_read(&self) -> Option<Subsystem> {
        [Subsystem::Multiplexer, Subsystem::PowerMonitor, Subsystem::AnalogInput]
            .into_iter()
            .find(|s| !self.init.is_available(*s))
    }

    fn read_channel(&mut self, channel: u8) -> Result<Reading, ReadError> {
        let attempts = self.options.read_retries.max(1);
        let mut last_error = ReadError::MuxSelect;
        for attempt in 1..=attempts {
            match self.try_read(channel) {
                Ok(reading) => return Ok(reading),
                Err(err) => {
                    log::debug!("channel {} attempt {}/{}: {}", channel + 1, attempt, attempts, err);
                    last_error = err;
                }
            }
        }
        Err(last_error)
    }

    fn try_read(&mut self, channel: u8) -> Result<Reading, ReadError> {
        self.mux.select(channel).map_err(|e| {
            log::trace!("mux select {}: {:?}", channel, e);
            ReadError::MuxSelect
        })?;

        let power = self.power.read().map_err(|e| {
            log::trace!("power monitor: {:?}", e);
            ReadError::PowerMonitor
        })?;

        let input = self.options.signal_inputs[channel as usize];
        let signal = nb::block!(self.daq.read_voltage(input)).map_err(|e| {
            log::trace!("analog input {}: {:?}", input, e);
            ReadError::AnalogInput
        })?;

        Ok(Reading::new(power.bus_voltage_v, power.current_ma, signal).with_power(power.power_mw))
    }

    fn show_severities(&mut self, severities: &[f32; NUM_CHANNELS]) {
        if !self.available(Subsystem::Indicator) {
            return;
        }
        let count = self.indicator.len().min(NUM_CHANNELS);
        for (index, severity) in severities.iter().take(count).enumerate() {
            if let Err(e) = self.indicator.set_pixel(index, severity_to_rgb(*severity)) {
                log::warn!("indicator pixel {}: {:?}", index, e);
                return;
            }
        }
        if let Err(e) = self.indicator.show() {
            log::warn!("indicator update failed: {:?}", e);
        }
    }
}

impl<M, P, D, O, L> AcquisitionSource for HardwareSource<M, P, D, O, L>
where
    M: ChannelMux,
    P: PowerMonitor,
    D: AnalogInput,
    O: OutputPin,
    L: IndicatorStrip,
{
    fn initialize(&mut self) -> InitReport {
        if self.state == HardwareState::Ready {
            self.shutdown();
        }
        let mut report = InitReport::ok();

        if let Err(e) = self.relays.init() {
            log::error!("relays: {}", e);
            report.fail(Subsystem::Relays);
        }
        if let Err(e) = self.mux.init() {
            log::error!("multiplexer: {:?}", e);
            report.fail(Subsystem::Multiplexer);
        }
        if let Err(e) = self.power.init() {
            log::error!("power monitor: {:?}", e);
            report.fail(Subsystem::PowerMonitor);
        }
        if let Err(e) = self.daq.connect() {
            log::error!("analog input: {:?}", e);
            report.fail(Subsystem::AnalogInput);
        }
        let indicator = self
            .indicator
            .init()
            .and_then(|()| self.indicator.clear())
            .and_then(|()| self.indicator.show());
        if let Err(e) = indicator {
            log::warn!("indicator: {:?}", e);
            report.fail(Subsystem::Indicator);
        }

        self.init = report.clone();
        self.state = HardwareState::Ready;
        if report.is_ok() {
            log::info!("hardware ready");
        }
        report
    }

    fn shutdown(&mut self) {
        if self.state == HardwareState::Uninitialized {
            return;
        }

        if self.init.is_available(Subsystem::Indicator) {
            let cleared = self.indicator.clear().and_then(|()| self.indicator.show());
            if let Err(e) = cleared {
                log::warn!("indicator not cleared: {:?}", e);
            }
            self.indicator.shutdown();
        }
        if self.init.is_available(Subsystem::AnalogInput) {
            self.daq.disconnect();
        }
        if self.init.is_available(Subsystem::Multiplexer) {
            if let Err(e) = self.mux.disable() {
                log::warn!("multiplexer not disabled: {:?}", e);
            }
        }
        // Relay lines go last so modules lose power after everything else is quiet
        if let Err(e) = self.relays.set_all(false) {
            log::error!("relays not released: {}", e);
        }

        self.state = HardwareState::Uninitialized;
        log::info!("hardware shut down");
    }

    fn update_sensors(
        &mut self,
        config: &ThresholdConfig,
        sensors: &mut Snapshot,
        now: Timestamp,
    ) -> CycleReport {
        if self.state != HardwareState::Ready {
            for sample in sensors.iter_mut() {
                classifier::mark_stale(sample);
            }
            return CycleReport::all_failed(ReadError::NotReady);
        }

        let missing = self.missing_for_read();
        let mut report = CycleReport::new();
        let mut severities = [1.0f32; NUM_CHANNELS];

        for (index, sample) in sensors.iter_mut().enumerate() {
            let channel = index as u8;
            let outcome = match missing {
                Some(subsystem) => Err(ReadError::SubsystemUnavailable { subsystem }),
                None => self.read_channel(channel),
            }
            .and_then(|reading| classifier::apply(sample, reading, config, now));

            match outcome {
                Ok(health) => {
                    severities[index] = health.severity();
                    report.record_sampled();
                }
                Err(err) => {
                    classifier::mark_stale(sample);
                    log::warn!("channel {}: {}", channel + 1, err);
                    report.record_fault(channel, err);
                }
            }
        }

        self.show_severities(&severities);
        report
    }

    fn set_relay_pair(&mut self, pair: usize, on: bool) -> Result<(), SourceError> {
        if self.state != HardwareState::Ready {
            return Err(SourceError::NotReady);
        }
        self.relays.set_pair(pair, on)
    }

    fn set_all_relays(&mut self, on: bool) -> Result<(), SourceError> {
        if self.state != HardwareState::Ready {
            return Err(SourceError::NotReady);
        }
        self.relays.set_all(on)
    }

    fn relay_pair(&self, pair: usize) -> bool {
        self.relays.state(pair)
    }

    fn name(&self) -> &'static str {
        "hardware"
    }
}
