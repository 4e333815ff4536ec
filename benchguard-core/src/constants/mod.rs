//! Constants for BenchGuard Core
//!
//! Every fixed number the bench relies on lives here, grouped by domain:
//! - **Bench**: channel/relay topology and classifier weights
//! - **Thresholds**: factory-default acceptance windows and cadence
//! - **Simulation**: noise and fault parameters of the simulated source
//! - **Time**: unit conversions
//!
//! Names carry their unit (`_V`, `_MA`, `_MS`, `_S`) so call sites read unambiguously.

/// Channel/relay topology and classification weights.
pub mod bench;

/// Default acceptance windows and cadence of a fresh configuration.
pub mod thresholds;

/// Parameters of the synthetic acquisition source.
pub mod simulation;

/// Time unit conversions.
pub mod time;

pub use bench::{
    NUM_CHANNELS, NUM_RELAY_PAIRS, CHANNELS_PER_PAIR, PRESENCE_FLOOR_FRACTION,
    SEVERITY_SUPPLY_WEIGHT, SEVERITY_SIGNAL_WEIGHT, SEVERITY_CURRENT_WEIGHT,
};

pub use time::{MS_PER_SECOND, SECONDS_PER_MINUTE, SECONDS_PER_HOUR};
