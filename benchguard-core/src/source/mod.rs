//! Acquisition sources
//!
//! An [`AcquisitionSource`] fills the runner's snapshot once per cycle and
//! drives the relay pairs. The bench has two:
//!
//! - [`SimulatedSource`]: seeded synthetic data for development and tests
//! - `HardwareSource` (in `benchguard-hw`): multiplexer, current sensor, DAQ, GPIO
//!
//! Both run every reading through [`classifier::apply`](crate::classifier::apply),
//! so flags and counters mean the same thing whichever source is attached.
//!
//! ## Contract
//!
//! ```text
//! initialize() ──▶ update_sensors() / set_*relay*() ... ──▶ shutdown()
//! ```
//!
//! - `update_sensors` never fails as a whole. A channel that cannot be read is
//!   marked stale and reported in the returned [`CycleReport`]; the remaining
//!   channels are still sampled.
//! - `initialize` reports which subsystems failed to open; the source keeps
//!   working with the rest.

mod simulated;

pub use simulated::{SimulatedSource, SimulationOptions};

use crate::config::ThresholdConfig;
use crate::constants::NUM_CHANNELS;
use crate::errors::{ReadError, SourceError, Subsystem};
use crate::sample::Snapshot;
use crate::time::Timestamp;
use heapless::Vec;

/// Capability interface shared by the simulated and hardware sources
pub trait AcquisitionSource {
    /// Open devices and put relays in a safe state
    fn initialize(&mut self) -> InitReport;

    /// Release devices in reverse order
    fn shutdown(&mut self);

    /// Sample every channel into `sensors`, classifying against `config`
    fn update_sensors(
        &mut self,
        config: &ThresholdConfig,
        sensors: &mut Snapshot,
        now: Timestamp,
    ) -> CycleReport;

    /// Energize or de-energize one relay pair
    fn set_relay_pair(&mut self, pair: usize, on: bool) -> Result<(), SourceError>;

    /// Drive every relay pair to the same state
    fn set_all_relays(&mut self, on: bool) -> Result<(), SourceError>;

    /// Last commanded state of a relay pair (false for unknown pairs)
    fn relay_pair(&self, pair: usize) -> bool;

    /// Short name for logs
    fn name(&self) -> &'static str;
}

/// Outcome of `initialize()`
///
/// A non-empty failure list does not stop the source; it runs degraded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitReport {
    failed: Vec<Subsystem, { Subsystem::COUNT }>,
}

impl InitReport {
    /// Every subsystem came up
    pub fn ok() -> Self {
        Self::default()
    }

    /// Record a subsystem that failed to open
    pub fn fail(&mut self, subsystem: Subsystem) {
        if !self.failed.contains(&subsystem) {
            // Capacity equals the number of subsystems, duplicates are filtered
            let _ = self.failed.push(subsystem);
        }
    }

    /// No subsystem failed
    pub fn is_ok(&self) -> bool {
        self.failed.is_empty()
    }

    /// Subsystems that failed, in initialization order
    pub fn failed(&self) -> &[Subsystem] {
        &self.failed
    }

    /// Whether `subsystem` came up
    pub fn is_available(&self, subsystem: Subsystem) -> bool {
        !self.failed.contains(&subsystem)
    }
}

/// A channel that could not be read this cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelFault {
    /// Channel, 0-based
    pub channel: u8,
    /// Why the read failed
    pub error: ReadError,
}

/// Per-cycle diagnostics returned by `update_sensors()`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CycleReport {
    sampled: u8,
    faults: Vec<ChannelFault, NUM_CHANNELS>,
}

impl CycleReport {
    /// Empty report, nothing sampled yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Report where every channel failed with the same error
    pub fn all_failed(error: ReadError) -> Self {
        let mut report = Self::new();
        for channel in 0..NUM_CHANNELS {
            report.record_fault(channel as u8, error);
        }
        report
    }

    /// Count a successfully classified channel
    pub fn record_sampled(&mut self) {
        self.sampled = self.sampled.saturating_add(1);
    }

    /// Record a channel read failure
    pub fn record_fault(&mut self, channel: u8, error: ReadError) {
        // At most one fault per channel per cycle
        let _ = self.faults.push(ChannelFault { channel, error });
    }

    /// Channels classified this cycle
    pub fn sampled(&self) -> usize {
        self.sampled as usize
    }

    /// Channels that failed this cycle
    pub fn faults(&self) -> &[ChannelFault] {
        &self.faults
    }

    /// Every channel was read
    pub fn is_clean(&self) -> bool {
        self.faults.is_empty()
    }
}
