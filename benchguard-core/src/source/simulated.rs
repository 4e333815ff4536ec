//! Seeded synthetic source
//!
//! Produces plausible readings without any hardware attached. Energized
//! channels draw about 60% of the expected current and sit in the positive
//! signal window; de-energized channels idle near 5% and the negative window.
//! With `inject_faults` set, roughly one sample in [`FAULT_ODDS`] is corrupted
//! on purpose so the logger and the counters have something to show.

use super::{AcquisitionSource, CycleReport, InitReport};
use crate::classifier::{self, Reading};
use crate::config::ThresholdConfig;
use crate::constants::simulation::*;
use crate::constants::NUM_RELAY_PAIRS;
use crate::errors::{ReadError, SourceError};
use crate::sample::{relay_pair_of, Snapshot};
use crate::time::Timestamp;

/// Noise and fault settings of a [`SimulatedSource`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationOptions {
    /// Corrupt roughly one sample in [`FAULT_ODDS`]
    pub inject_faults: bool,
    /// Generator seed, 0 selects [`DEFAULT_SEED`]
    pub seed: u64,
    /// Supply noise standard deviation (V)
    pub bus_sigma_v: f32,
    /// Current noise standard deviation (mA)
    pub current_sigma_ma: f32,
    /// Signal noise standard deviation (V)
    pub signal_sigma_v: f32,
}

impl Default for SimulationOptions {
    fn default() -> Self {
        Self {
            inject_faults: false,
            seed: DEFAULT_SEED,
            bus_sigma_v: BUS_SIGMA_V,
            current_sigma_ma: CURRENT_SIGMA_MA,
            signal_sigma_v: SIGNAL_SIGMA_V,
        }
    }
}

impl SimulationOptions {
    /// Same options with a different seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Same options with fault injection switched on or off
    pub fn with_faults(mut self, inject_faults: bool) -> Self {
        self.inject_faults = inject_faults;
        self
    }
}

/// 64-bit LCG with a Box-Muller transform on top
#[derive(Debug, Clone)]
struct NoiseGenerator {
    state: u64,
}

impl NoiseGenerator {
    fn new(seed: u64) -> Self {
        let state = if seed == 0 { DEFAULT_SEED } else { seed };
        Self { state }
    }

    fn next_u32(&mut self) -> u32 {
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.state >> 32) as u32
    }

    /// Uniform in (0, 1]
    fn uniform(&mut self) -> f32 {
        ((self.next_u32() >> 8) as f32 + 1.0) / 16777216.0
    }

    fn gaussian(&mut self, std_dev: f32) -> f32 {
        if std_dev <= 0.0 {
            return 0.0;
        }
        let u1 = self.uniform();
        let u2 = self.uniform();
        let radius = libm::sqrtf(-2.0 * libm::logf(u1));
        radius * libm::cosf(2.0 * core::f32::consts::PI * u2) * std_dev
    }

    /// True with probability 1/odds
    fn one_in(&mut self, odds: u32) -> bool {
        odds > 0 && self.next_u32() % odds == 0
    }

    fn below(&mut self, bound: u32) -> u32 {
        self.next_u32() % bound
    }
}

/// Kinds of injected fault
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fault {
    Absent,
    SignalOutOfBand,
    SupplySag,
}

/// Acquisition source producing synthetic data
#[derive(Debug, Clone)]
pub struct SimulatedSource {
    options: SimulationOptions,
    noise: NoiseGenerator,
    relays: [bool; NUM_RELAY_PAIRS],
    initialized: bool,
}

impl SimulatedSource {
    /// Uninitialized source with all relays off
    pub fn new(options: SimulationOptions) -> Self {
        Self {
            options,
            noise: NoiseGenerator::new(options.seed),
            relays: [false; NUM_RELAY_PAIRS],
            initialized: false,
        }
    }

    /// Default noise, faults off, default seed
    pub fn with_seed(seed: u64) -> Self {
        Self::new(SimulationOptions::default().with_seed(seed))
    }

    /// Noise and fault settings
    pub fn options(&self) -> &SimulationOptions {
        &self.options
    }

    /// Whether `initialize()` ran since the last shutdown
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn synthesize(&mut self, config: &ThresholdConfig, energized: bool) -> Reading {
        let max_current = config.max_expected_current_ma;

        let supply = config.supply_voltage_range.midpoint()
            + self.noise.gaussian(self.options.bus_sigma_v);
        let supply = supply.max(0.0);

        let fraction = if energized { ENERGIZED_CURRENT_FRACTION } else { IDLE_CURRENT_FRACTION };
        let current = fraction * max_current + self.noise.gaussian(self.options.current_sigma_ma);
        let current = current.max(0.0).min(max_current);

        let window = if energized {
            config.signal_positive_range
        } else {
            config.signal_negative_range
        };
        let signal = window.midpoint() + self.noise.gaussian(self.options.signal_sigma_v);

        let mut reading = Reading::new(supply, current, signal);

        if self.options.inject_faults && self.noise.one_in(FAULT_ODDS) {
            let fault = match self.noise.below(3) {
                0 => Fault::Absent,
                1 => Fault::SignalOutOfBand,
                _ => Fault::SupplySag,
            };
            log_debug!("simulated fault {:?}", fault);
            reading = inject(reading, fault, config);
        }

        reading.with_power(reading.bus_voltage_v * reading.current_ma)
    }
}

impl Default for SimulatedSource {
    fn default() -> Self {
        Self::new(SimulationOptions::default())
    }
}

fn inject(mut reading: Reading, fault: Fault, config: &ThresholdConfig) -> Reading {
    match fault {
        Fault::Absent => {
            reading.signal_v = config.signal_idle_range.midpoint();
            reading.current_ma = 0.0;
        }
        Fault::SignalOutOfBand => {
            let push = if reading.signal_v >= 0.0 {
                FAULT_SIGNAL_OFFSET_V
            } else {
                -FAULT_SIGNAL_OFFSET_V
            };
            reading.signal_v += push;
        }
        Fault::SupplySag => {
            reading.bus_voltage_v = (config.supply_voltage_range.lo - FAULT_SUPPLY_DROP_V).max(0.0);
        }
    }
    reading
}

impl AcquisitionSource for SimulatedSource {
    fn initialize(&mut self) -> InitReport {
        self.relays = [false; NUM_RELAY_PAIRS];
        self.initialized = true;
        log_info!("simulated source ready (seed {:#x})", self.noise.state);
        InitReport::ok()
    }

    fn shutdown(&mut self) {
        self.relays = [false; NUM_RELAY_PAIRS];
        self.initialized = false;
    }

    fn update_sensors(
        &mut self,
        config: &ThresholdConfig,
        sensors: &mut Snapshot,
        now: Timestamp,
    ) -> CycleReport {
        if !self.initialized {
            for sample in sensors.iter_mut() {
                classifier::mark_stale(sample);
            }
            return CycleReport::all_failed(ReadError::NotReady);
        }

        let scale = config.max_expected_current_ma;
        if !(scale.is_finite() && scale > 0.0) {
            for sample in sensors.iter_mut() {
                classifier::mark_stale(sample);
            }
            return CycleReport::all_failed(ReadError::CurrentScale);
        }

        let mut report = CycleReport::new();
        for (channel, sample) in sensors.iter_mut().enumerate() {
            let energized = self.relays[relay_pair_of(channel)];
            let reading = self.synthesize(config, energized);
            match classifier::apply(sample, reading, config, now) {
                Ok(_) => report.record_sampled(),
                Err(err) => report.record_fault(channel as u8, err),
            }
        }
        report
    }

    fn set_relay_pair(&mut self, pair: usize, on: bool) -> Result<(), SourceError> {
        let slot = self
            .relays
            .get_mut(pair)
            .ok_or(SourceError::InvalidRelayPair { pair })?;
        *slot = on;
        Ok(())
    }

    fn set_all_relays(&mut self, on: bool) -> Result<(), SourceError> {
        self.relays = [on; NUM_RELAY_PAIRS];
        Ok(())
    }

    fn relay_pair(&self, pair: usize) -> bool {
        self.relays.get(pair).copied().unwrap_or(false)
    }

    fn name(&self) -> &'static str {
        "simulated"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::fresh_snapshot;

    fn ready(options: SimulationOptions) -> SimulatedSource {
        let mut source = SimulatedSource::new(options);
        assert!(source.initialize().is_ok());
        source
    }

    #[test]
    fn same_seed_same_data() {
        let config = ThresholdConfig::default();
        let mut a = ready(SimulationOptions::default().with_seed(42));
        let mut b = ready(SimulationOptions::default().with_seed(42));
        let mut snap_a = fresh_snapshot();
        let mut snap_b = fresh_snapshot();

        for t in 0..20 {
            a.update_sensors(&config, &mut snap_a, t);
            b.update_sensors(&config, &mut snap_b, t);
        }
        assert_eq!(snap_a, snap_b);
    }

    #[test]
    fn zero_seed_uses_default() {
        assert_eq!(NoiseGenerator::new(0).state, NoiseGenerator::new(DEFAULT_SEED).state);
    }

    #[test]
    fn gaussian_is_centered() {
        let mut noise = NoiseGenerator::new(7);
        let n = 4000;
        let mean: f32 = (0..n).map(|_| noise.gaussian(1.0)).sum::<f32>() / n as f32;
        assert!(mean.abs() < 0.1, "mean {mean}");
    }

    #[test]
    fn relays_select_signal_polarity_and_current() {
        let config = ThresholdConfig::default();
        let mut source = ready(SimulationOptions::default());
        source.set_relay_pair(1, true).unwrap();

        let mut snapshot = fresh_snapshot();
        let report = source.update_sensors(&config, &mut snapshot, 100);
        assert!(report.is_clean());
        assert_eq!(report.sampled(), 8);

        // Pair 1 drives channels 2 and 3
        for sample in &snapshot[2..4] {
            assert!(sample.signal_v > 0.0);
            assert!(sample.current_ma > 10.0);
            assert!(sample.present);
        }
        for sample in &snapshot[4..] {
            assert!(sample.signal_v < 0.0);
            assert!(sample.current_ma < 5.0);
        }
        assert!(snapshot.iter().all(|s| s.timestamp == 100));
    }

    #[test]
    fn power_is_supply_times_current() {
        let config = ThresholdConfig::default();
        let mut source = ready(SimulationOptions::default());
        let mut snapshot = fresh_snapshot();
        source.update_sensors(&config, &mut snapshot, 0);
        for sample in &snapshot {
            let expected = sample.bus_voltage_v * sample.current_ma;
            assert!((sample.power_mw - expected).abs() < 1e-3);
        }
    }

    #[test]
    fn uninitialized_marks_everything_stale() {
        let config = ThresholdConfig::default();
        let mut source = SimulatedSource::default();
        let mut snapshot = fresh_snapshot();

        let report = source.update_sensors(&config, &mut snapshot, 0);
        assert_eq!(report.faults().len(), 8);
        assert!(report.faults().iter().all(|f| f.error == ReadError::NotReady));
        assert!(snapshot.iter().all(|s| s.stale && s.counters().total() == 0));
    }

    #[test]
    fn unusable_current_scale_faults_instead_of_panicking() {
        let mut source = ready(SimulationOptions::default());
        source.set_all_relays(true).unwrap();

        for scale in [-1.0, 0.0, f32::NAN, f32::INFINITY] {
            let mut config = ThresholdConfig::default();
            config.max_expected_current_ma = scale;
            let mut snapshot = fresh_snapshot();

            let report = source.update_sensors(&config, &mut snapshot, 0);
            assert_eq!(report.sampled(), 0, "scale {scale}");
            assert!(report.faults().iter().all(|f| f.error == ReadError::CurrentScale));
            assert!(snapshot.iter().all(|s| s.stale && s.counters().total() == 0));
        }
    }

    #[test]
    fn current_never_exceeds_scale() {
        let mut config = ThresholdConfig::default();
        config.max_expected_current_ma = 0.5;
        let options = SimulationOptions { current_sigma_ma: 5.0, ..SimulationOptions::default() };
        let mut source = ready(options);
        source.set_all_relays(true).unwrap();

        for _ in 0..50 {
            let reading = source.synthesize(&config, true);
            assert!((0.0..=0.5).contains(&reading.current_ma), "{}", reading.current_ma);
        }
    }

    #[test]
    fn invalid_pair_rejected() {
        let mut source = ready(SimulationOptions::default());
        assert_eq!(
            source.set_relay_pair(4, true),
            Err(SourceError::InvalidRelayPair { pair: 4 })
        );
        assert!(!source.relay_pair(4));
    }

    #[test]
    fn initialize_switches_relays_off() {
        let mut source = ready(SimulationOptions::default());
        source.set_all_relays(true).unwrap();
        assert!(source.relay_pair(3));
        source.initialize();
        assert!((0..NUM_RELAY_PAIRS).all(|p| !source.relay_pair(p)));
    }

    #[test]
    fn injected_faults_show_up_in_counters() {
        let config = ThresholdConfig::default();
        let mut source = ready(SimulationOptions::default().with_faults(true).with_seed(3));
        source.set_all_relays(true).unwrap();
        let mut snapshot = fresh_snapshot();

        for t in 0..600 {
            source.update_sensors(&config, &mut snapshot, t);
        }
        // 4800 samples at 1/120 odds, expect around 40 faults
        let total: u32 = snapshot.iter().map(|s| s.counters().total()).sum();
        assert!(total > 5, "only {total} failures recorded");
    }

    #[test]
    fn fault_shapes() {
        let config = ThresholdConfig::default();
        let base = Reading::new(5.1, 15.0, 3.5);

        let absent = inject(base, Fault::Absent, &config);
        assert!(!classifier::is_present(&absent, &config));

        let out = inject(base, Fault::SignalOutOfBand, &config);
        assert!(!classifier::classify(&out, &config).signal_ok);

        let sag = inject(base, Fault::SupplySag, &config);
        assert!(!classifier::classify(&sag, &config).supply_ok);
    }
}
