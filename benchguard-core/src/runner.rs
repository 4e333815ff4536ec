//! Sampling-cycle orchestrator
//!
//! The [`Runner`] owns the latest snapshot and the run/stop state. It does not
//! own the acquisition source: the application keeps the [`SharedSource`] and
//! the runner holds a `Weak` to it, so dropping the source on the application
//! side simply turns the runner into a "no source" runner.
//!
//! ```text
//!            start()                     step()
//! Stopped ───────────▶ Running ─────────────────▶ Running
//!    ▲                    │       (source → classify → snapshot)
//!    └──────── stop() ────┘
//! ```
//!
//! Scheduling is external: a UI timer calls [`Runner::step`] every
//! `sample_interval_ms`. Calls must be serialized, which `&mut self` enforces.

use std::sync::{Arc, Mutex, MutexGuard, Weak};

use crate::config::ThresholdConfig;
use crate::errors::ConfigError;
use crate::sample::{fresh_snapshot, relay_pair_of, ChannelSample, Snapshot};
use crate::source::{AcquisitionSource, CycleReport, InitReport};
use crate::time::{SystemTime, TimeSource};

/// Acquisition source shared between the application and the runner
pub type SharedSource = Arc<Mutex<dyn AcquisitionSource + Send>>;

type WeakSource = Weak<Mutex<dyn AcquisitionSource + Send>>;

/// Run state of a [`Runner`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    /// Not sampling; `step()` is a no-op
    #[default]
    Stopped,
    /// Sampling on every `step()`
    Running,
}

/// Result of one [`Runner::step`] call
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// Runner is stopped, nothing changed
    Idle,
    /// No live source attached, snapshot reset to defaults
    NoSource,
    /// Source sampled every channel
    Sampled(CycleReport),
}

/// Drives sampling cycles against an attached source
pub struct Runner {
    config: Arc<ThresholdConfig>,
    source: Option<WeakSource>,
    state: RunState,
    relays_on: bool,
    sensors: Snapshot,
    clock: Box<dyn TimeSource + Send>,
    last_cycle: Option<CycleReport>,
}

impl Runner {
    /// Stopped runner with no source, stamped by the system clock
    pub fn new(config: Arc<ThresholdConfig>) -> Self {
        Self {
            config,
            source: None,
            state: RunState::Stopped,
            relays_on: false,
            sensors: fresh_snapshot(),
            clock: Box::new(SystemTime),
            last_cycle: None,
        }
    }

    /// Replace the clock used to stamp samples
    pub fn with_time_source(mut self, clock: Box<dyn TimeSource + Send>) -> Self {
        self.clock = clock;
        self
    }

    /// Attach a source without taking ownership or starting it
    pub fn set_source(&mut self, source: &SharedSource) {
        self.source = Some(Arc::downgrade(source));
    }

    /// Detach the current source, if any
    pub fn clear_source(&mut self) {
        self.source = None;
    }

    /// Start (or restart) a test run
    ///
    /// Initializes the source, switches relays off and zeroes the snapshot,
    /// counters included. Partial initialization failures are logged and the
    /// runner runs degraded.
    pub fn start(&mut self) -> InitReport {
        self.state = RunState::Running;
        self.relays_on = false;
        self.sensors = fresh_snapshot();
        self.last_cycle = None;

        let report = self.initialize_source();

        for subsystem in report.failed() {
            log_warn!("{} failed to initialize, running degraded", subsystem);
        }
        report
    }

    /// Stop the run and shut the source down; no-op when already stopped
    pub fn stop(&mut self) {
        if self.state == RunState::Stopped {
            return;
        }
        self.state = RunState::Stopped;

        let Some(shared) = self.attached() else {
            return;
        };
        let Some(mut source) = lock(&shared) else {
            return;
        };
        source.shutdown();
        log_info!("{} source shut down", source.name());
    }

    /// Run one sampling cycle
    pub fn step(&mut self) -> StepOutcome {
        if self.state == RunState::Stopped {
            return StepOutcome::Idle;
        }

        let now = self.clock.now();
        let Some(shared) = self.attached() else {
            return self.reset_without_source();
        };
        let Some(mut source) = lock(&shared) else {
            return self.reset_without_source();
        };

        let report = source.update_sensors(&self.config, &mut self.sensors, now);
        drop(source);

        for fault in report.faults() {
            log_warn!("channel {}: {}", fault.channel + 1, fault.error);
        }
        self.last_cycle = Some(report.clone());
        StepOutcome::Sampled(report)
    }

    /// Flip every relay pair together and return the new state
    ///
    /// Without a source nothing changes. If the source rejects the command
    /// the previous state is kept.
    pub fn toggle_relays(&mut self) -> bool {
        let Some(shared) = self.attached() else {
            return self.relays_on;
        };
        let Some(mut source) = lock(&shared) else {
            return self.relays_on;
        };

        let target = !self.relays_on;
        match source.set_all_relays(target) {
            Ok(()) => {
                self.relays_on = target;
                log_debug!("relays {}", if target { "on" } else { "off" });
            }
            Err(err) => log_warn!("relay toggle failed: {}", err),
        }
        self.relays_on
    }

    /// Latest snapshot of every channel
    pub fn sensors(&self) -> &Snapshot {
        &self.sensors
    }

    /// Latest sample of one channel
    pub fn channel(&self, channel: usize) -> Option<&ChannelSample> {
        self.sensors.get(channel)
    }

    /// State of a relay pair as the source reports it
    pub fn relay_pair(&self, pair: usize) -> bool {
        let Some(shared) = self.attached() else {
            return false;
        };
        // Polled by the UI every frame, a poisoned lock is already reported by step()
        let Ok(source) = shared.lock() else {
            log_debug!("relay pair {} unknown, source lock poisoned", pair);
            return false;
        };
        source.relay_pair(pair)
    }

    /// Whether the relay pair energizing `channel` is on
    pub fn channel_relay_on(&self, channel: usize) -> bool {
        self.relay_pair(relay_pair_of(channel))
    }

    /// Global relay flag last commanded by [`toggle_relays`](Self::toggle_relays)
    pub fn relays_on(&self) -> bool {
        self.relays_on
    }

    /// Current run state
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Whether a run is in progress
    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    /// Clock stamping the samples
    pub fn clock(&self) -> &dyn TimeSource {
        self.clock.as_ref()
    }

    /// Configuration used by the next cycle
    pub fn config(&self) -> &Arc<ThresholdConfig> {
        &self.config
    }

    /// Validate and swap in a new configuration for the next cycle
    pub fn publish_config(&mut self, config: ThresholdConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.config = Arc::new(config);
        log_info!("threshold configuration updated");
        Ok(())
    }

    /// Diagnostics of the most recent sampled cycle
    pub fn last_cycle(&self) -> Option<&CycleReport> {
        self.last_cycle.as_ref()
    }

    /// Whether a live source is attached
    pub fn has_source(&self) -> bool {
        self.attached().is_some()
    }

    fn attached(&self) -> Option<SharedSource> {
        self.source.as_ref()?.upgrade()
    }

    fn initialize_source(&self) -> InitReport {
        let Some(shared) = self.attached() else {
            log_info!("run started without an acquisition source");
            return InitReport::ok();
        };
        let Some(mut source) = lock(&shared) else {
            return InitReport::ok();
        };
        let report = source.initialize();
        if report.is_ok() {
            log_info!("{} source initialized", source.name());
        }
        report
    }

    fn reset_without_source(&mut self) -> StepOutcome {
        self.sensors = fresh_snapshot();
        self.last_cycle = None;
        StepOutcome::NoSource
    }
}

impl core::fmt::Debug for Runner {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Runner")
            .field("state", &self.state)
            .field("relays_on", &self.relays_on)
            .field("has_source", &self.has_source())
            .finish_non_exhaustive()
    }
}

fn lock(shared: &SharedSource) -> Option<MutexGuard<'_, dyn AcquisitionSource + Send + 'static>> {
    match shared.lock() {
        Ok(guard) => Some(guard),
        Err(_) => {
            log_error!("acquisition source lock poisoned, treating source as detached");
            None
        }
    }
}
