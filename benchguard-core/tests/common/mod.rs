//! Shared fixtures for the core integration tests
//!
//! - A scripted source that replays fixed readings per channel
//! - Runner construction with a stepped clock
//! - Canned readings for "all ok" and "all failing" cycles

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use benchguard_core::{
    classifier::{self, Reading},
    constants::{NUM_CHANNELS, NUM_RELAY_PAIRS},
    time::SteppedTime,
    AcquisitionSource, CycleReport, InitReport, ReadError, Runner, SharedSource, Snapshot,
    SourceError, Subsystem, ThresholdConfig, Timestamp,
};

/// Reading that passes every default window
pub const HEALTHY: Reading = Reading { bus_voltage_v: 5.0, current_ma: 15.0, power_mw: None, signal_v: 3.5 };

/// Reading that fails every default window but still counts as present
pub const FAILING: Reading = Reading { bus_voltage_v: 4.0, current_ma: 150.0, power_mw: None, signal_v: 0.5 };

/// One scripted cycle: a reading or a read error per channel
pub type ScriptedCycle = [Result<Reading, ReadError>; NUM_CHANNELS];

/// Same reading on every channel
pub fn uniform(reading: Reading) -> ScriptedCycle {
    [Ok(reading); NUM_CHANNELS]
}

/// Source that replays queued cycles and repeats the last one when empty
pub struct ScriptedSource {
    queue: VecDeque<ScriptedCycle>,
    last: ScriptedCycle,
    relays: [bool; NUM_RELAY_PAIRS],
    failed_init: Vec<Subsystem>,
    pub initialized: u32,
    pub shutdowns: u32,
}

impl ScriptedSource {
    pub fn new(default_cycle: ScriptedCycle) -> Self {
        Self {
            queue: VecDeque::new(),
            last: default_cycle,
            relays: [false; NUM_RELAY_PAIRS],
            failed_init: Vec::new(),
            initialized: 0,
            shutdowns: 0,
        }
    }

    pub fn push(&mut self, cycle: ScriptedCycle) {
        self.queue.push_back(cycle);
    }

    pub fn fail_on_init(&mut self, subsystem: Subsystem) {
        self.failed_init.push(subsystem);
    }
}

impl AcquisitionSource for ScriptedSource {
    fn initialize(&mut self) -> InitReport {
        self.initialized += 1;
        self.relays = [false; NUM_RELAY_PAIRS];
        let mut report = InitReport::ok();
        for subsystem in &self.failed_init {
            report.fail(*subsystem);
        }
        report
    }

    fn shutdown(&mut self) {
        self.shutdowns += 1;
    }

    fn update_sensors(
        &mut self,
        config: &ThresholdConfig,
        sensors: &mut Snapshot,
        now: Timestamp,
    ) -> CycleReport {
        if let Some(next) = self.queue.pop_front() {
            self.last = next;
        }
        let mut report = CycleReport::new();
        for (channel, sample) in sensors.iter_mut().enumerate() {
            let outcome = self.last[channel]
                .and_then(|reading| classifier::apply(sample, reading, config, now).map(|_| ()));
            match outcome {
                Ok(()) => report.record_sampled(),
                Err(err) => {
                    classifier::mark_stale(sample);
                    report.record_fault(channel as u8, err);
                }
            }
        }
        report
    }

    fn set_relay_pair(&mut self, pair: usize, on: bool) -> Result<(), SourceError> {
        let slot = self.relays.get_mut(pair).ok_or(SourceError::InvalidRelayPair { pair })?;
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
        "scripted"
    }
}

/// Scripted source shared the way an application would hold it
pub fn shared(source: ScriptedSource) -> (Arc<Mutex<ScriptedSource>>, SharedSource) {
    let concrete = Arc::new(Mutex::new(source));
    let erased: SharedSource = concrete.clone();
    (concrete, erased)
}

/// Stopped runner with default thresholds and a 200 ms stepped clock
pub fn runner() -> Runner {
    runner_with(ThresholdConfig::default())
}

pub fn runner_with(config: ThresholdConfig) -> Runner {
    Runner::new(Arc::new(config)).with_time_source(Box::new(SteppedTime::new(0, 200)))
}
