//! Error Types for Configuration, Acquisition and Relay Control
//!
//! ## Design Philosophy
//!
//! Errors are returned from inside the sampling cycle, so they follow the same
//! rules as the rest of the hot path:
//!
//! 1. **No Heap Allocation**: payloads are scalars or `&'static str`.
//! 2. **Copy Semantics**: errors are cheap to store in a per-cycle report.
//! 3. **Actionable**: each variant names the channel, subsystem or field involved.
//!
//! ## Error Categories
//!
//! ### Configuration
//! - [`ConfigError`]: a threshold window is non-finite or inverted, or a cadence
//!   value is unusable. Raised when a configuration is committed, never mid-cycle.
//!
//! ### Acquisition
//! - [`ReadError`]: one channel could not be read this cycle. Recoverable: the
//!   channel is marked stale and the cycle continues with the next channel.
//!
//! ### Relay control
//! - [`SourceError`]: a relay command could not be carried out.
//!
//! ## Handling Strategy
//!
//! ```rust
//! use benchguard_core::{ReadError, Subsystem};
//!
//! fn describe(err: ReadError) -> &'static str {
//!     match err {
//!         ReadError::NonFinite { .. } => "sensor returned garbage, treat as a read failure",
//!         ReadError::SubsystemUnavailable { subsystem: Subsystem::AnalogInput } => "DAQ offline",
//!         _ => "bus transaction failed, retry next cycle",
//!     }
//! }
//! # let _ = describe(ReadError::NotReady);
//! ```

use thiserror_no_std::Error;

/// Result type for configuration checks
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Hardware subsystems opened by a source during initialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Subsystem {
    /// GPIO relay outputs
    Relays = 0,
    /// I2C channel multiplexer
    Multiplexer = 1,
    /// Current/voltage sensor behind the multiplexer
    PowerMonitor = 2,
    /// DAQ reading the auxiliary signal voltage
    AnalogInput = 3,
    /// Optional status LED strip
    Indicator = 4,
}

impl Subsystem {
    /// Number of subsystems
    pub const COUNT: usize = 5;

    /// All subsystems in initialization order
    pub const ALL: [Subsystem; Self::COUNT] = [
        Subsystem::Relays,
        Subsystem::Multiplexer,
        Subsystem::PowerMonitor,
        Subsystem::AnalogInput,
        Subsystem::Indicator,
    ];

    /// Human-readable name
    pub const fn name(&self) -> &'static str {
        match self {
            Subsystem::Relays => "relays",
            Subsystem::Multiplexer => "multiplexer",
            Subsystem::PowerMonitor => "power monitor",
            Subsystem::AnalogInput => "analog input",
            Subsystem::Indicator => "indicator",
        }
    }
}

impl core::fmt::Display for Subsystem {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// Measured quantity, used to say which value was not finite
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Quantity {
    /// Supply rail voltage
    BusVoltage = 0,
    /// Current draw
    Current = 1,
    /// Power
    Power = 2,
    /// Auxiliary signal voltage
    Signal = 3,
}

impl Quantity {
    /// Human-readable name
    pub const fn name(&self) -> &'static str {
        match self {
            Quantity::BusVoltage => "bus voltage",
            Quantity::Current => "current",
            Quantity::Power => "power",
            Quantity::Signal => "signal voltage",
        }
    }
}

impl core::fmt::Display for Quantity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// Rejected threshold configuration
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// A bound is NaN or infinite
    #[error("{field}: bound is not a finite number")]
    NonFinite {
        /// Configuration field holding the bad bound
        field: &'static str,
    },

    /// Lower bound above upper bound
    #[error("{field}: inverted range [{lo}, {hi}]")]
    InvertedRange {
        /// Configuration field holding the range
        field: &'static str,
        /// Lower bound as given
        lo: f32,
        /// Upper bound as given
        hi: f32,
    },

    /// Current scale must be a positive, finite number of mA
    #[error("max expected current {value} mA must be positive")]
    InvalidCurrentScale {
        /// Value as given
        value: f32,
    },

    /// Cadence value that would stall the scheduler
    #[error("{field}: must be greater than zero")]
    ZeroInterval {
        /// Configuration field holding the interval
        field: &'static str,
    },
}

/// Failure to read one channel during a cycle
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ReadError {
    /// Multiplexer refused the channel selection
    #[error("multiplexer select failed")]
    MuxSelect,

    /// Current sensor transaction failed
    #[error("power monitor read failed")]
    PowerMonitor,

    /// DAQ conversion failed
    #[error("analog input read failed")]
    AnalogInput,

    /// Device returned NaN or infinity
    #[error("{quantity} is not a finite number")]
    NonFinite {
        /// Offending measurement
        quantity: Quantity,
    },

    /// The subsystem needed for this read failed to initialize
    #[error("{subsystem} unavailable")]
    SubsystemUnavailable {
        /// Missing subsystem
        subsystem: Subsystem,
    },

    /// Current scale is not a positive number, readings cannot be sized
    #[error("max expected current is unusable")]
    CurrentScale,

    /// Source was asked for data before `initialize()`
    #[error("source not initialized")]
    NotReady,
}

/// Relay command failure
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceError {
    /// Pair index outside 0..NUM_RELAY_PAIRS
    #[error("relay pair {pair} does not exist")]
    InvalidRelayPair {
        /// Requested pair
        pair: usize,
    },

    /// Output line could not be driven
    #[error("relay pair {pair}: output line failed")]
    RelayLine {
        /// Pair being driven
        pair: usize,
    },

    /// Source was commanded before `initialize()`
    #[error("source not initialized")]
    NotReady,
}

#[cfg(feature = "defmt")]
impl defmt::Format for ConfigError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::NonFinite { field } =>
                defmt::write!(fmt, "{}: not finite", field),
            Self::InvertedRange { field, lo, hi } =>
                defmt::write!(fmt, "{}: inverted [{}, {}]", field, lo, hi),
            Self::InvalidCurrentScale { value } =>
                defmt::write!(fmt, "max current {} mA invalid", value),
            Self::ZeroInterval { field } =>
                defmt::write!(fmt, "{}: zero interval", field),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ReadError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::MuxSelect => defmt::write!(fmt, "mux select failed"),
            Self::PowerMonitor => defmt::write!(fmt, "power monitor failed"),
            Self::AnalogInput => defmt::write!(fmt, "analog input failed"),
            Self::NonFinite { quantity } =>
                defmt::write!(fmt, "{} not finite", quantity.name()),
            Self::SubsystemUnavailable { subsystem } =>
                defmt::write!(fmt, "{} unavailable", subsystem.name()),
            Self::CurrentScale => defmt::write!(fmt, "current scale unusable"),
            Self::NotReady => defmt::write!(fmt, "not ready"),
        }
    }
}
