//! Acquisition and health-classification core for BenchGuard
//!
//! Samples an 8-channel bench of modules under test, energized in pairs by
//! four relay pairs, and classifies every channel against configurable
//! acceptance windows. The same core runs on a simulated source or on real
//! hardware (see the `benchguard-hw` crate).
//!
//! Key constraints:
//! - No heap allocation in the sampling cycle
//! - One fixed snapshot per runner, counters carried across cycles
//! - A failing channel never aborts the cycle
//!
//! ```no_run
//! use std::sync::{Arc, Mutex};
//! use benchguard_core::{Runner, SharedSource, SimulatedSource, ThresholdConfig};
//!
//! let source: SharedSource = Arc::new(Mutex::new(SimulatedSource::default()));
//! let mut runner = Runner::new(Arc::new(ThresholdConfig::default()));
//! runner.set_source(&source);
//! runner.start();
//!
//! // Called every `sample_interval_ms` by the application's timer
//! runner.step();
//! for sample in runner.sensors() {
//!     println!("ch{} ok={}", sample.channel() + 1, sample.is_healthy());
//! }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

#[macro_use]
mod macros;

pub mod classifier;
pub mod config;
pub mod constants;
pub mod errors;
pub mod sample;
pub mod session;
pub mod source;
pub mod time;

#[cfg(feature = "std")]
pub mod event_log;
#[cfg(feature = "std")]
pub mod runner;
#[cfg(feature = "std")]
pub mod transitions;

// Public API
pub use classifier::{Health, Reading};
pub use config::{CounterPolicy, Range, ThresholdConfig};
pub use errors::{ConfigError, Quantity, ReadError, SourceError, Subsystem};
pub use sample::{ChannelSample, ErrorCounters, Snapshot};
pub use source::{
    AcquisitionSource, ChannelFault, CycleReport, InitReport, SimulatedSource, SimulationOptions,
};
pub use time::{TimeSource, Timestamp};

#[cfg(feature = "std")]
pub use config::ConfigLoadError;
#[cfg(feature = "std")]
pub use event_log::EventLog;
#[cfg(feature = "std")]
pub use runner::{RunState, Runner, SharedSource, StepOutcome};
#[cfg(feature = "std")]
pub use transitions::{TransitionEvent, TransitionTracker};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
