//! Threshold configuration
//!
//! A [`ThresholdConfig`] is a read-only snapshot of every acceptance window the
//! classifier checks, plus the cadence values the external scheduler uses.
//! Sources and the classifier receive it as `&ThresholdConfig` on every call;
//! the runner keeps it behind an `Arc` and swaps in a new, validated snapshot
//! when the operator edits thresholds, so a cycle in flight never sees a
//! half-edited configuration.
//!
//! ```rust
//! use benchguard_core::config::{Range, ThresholdConfig};
//!
//! let mut config = ThresholdConfig::default();
//! config.supply_voltage_range = Range::new(4.75, 5.25);
//! assert!(config.validate().is_ok());
//!
//! config.presence_current_range = Range::new(10.0, 1.0);
//! assert!(config.validate().is_err());
//! ```

use crate::constants::{thresholds::*, PRESENCE_FLOOR_FRACTION};
use crate::errors::{ConfigError, ConfigResult};

/// Inclusive acceptance window `[lo, hi]`
///
/// Serialized as a two-element array, `[lo, hi]`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "[f32; 2]", into = "[f32; 2]"))]
pub struct Range {
    /// Lower bound, inclusive
    pub lo: f32,
    /// Upper bound, inclusive
    pub hi: f32,
}

impl Range {
    /// Window `[lo, hi]`, unchecked until [`validate`](Self::validate)
    pub const fn new(lo: f32, hi: f32) -> Self {
        Self { lo, hi }
    }

    /// Inclusive membership test
    ///
    /// An inverted range contains nothing, and NaN is never contained.
    pub fn contains(&self, value: f32) -> bool {
        value >= self.lo && value <= self.hi
    }

    /// Center of the window
    pub fn midpoint(&self) -> f32 {
        0.5 * (self.lo + self.hi)
    }

    /// Check that both bounds are finite and ordered
    pub fn validate(&self, field: &'static str) -> ConfigResult<()> {
        if !self.lo.is_finite() || !self.hi.is_finite() {
            return Err(ConfigError::NonFinite { field });
        }
        if self.lo > self.hi {
            return Err(ConfigError::InvertedRange { field, lo: self.lo, hi: self.hi });
        }
        Ok(())
    }
}

impl From<[f32; 2]> for Range {
    fn from([lo, hi]: [f32; 2]) -> Self {
        Self { lo, hi }
    }
}

impl From<Range> for [f32; 2] {
    fn from(range: Range) -> Self {
        [range.lo, range.hi]
    }
}

/// When the per-channel error counters advance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CounterPolicy {
    /// +1 for every cycle the check fails
    #[default]
    PerFailingCycle,
    /// +1 only when the check goes from ok to failed
    ///
    /// The first classified cycle of a channel counts as a transition.
    OnFailureTransition,
}

/// Acceptance windows and cadence for one test session
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ThresholdConfig {
    /// Window for the supply rail voltage (V)
    pub supply_voltage_range: Range,

    /// Positive-polarity signal window (V)
    pub signal_positive_range: Range,

    /// Negative-polarity signal window (V)
    pub signal_negative_range: Range,

    /// Signal band of an empty slot (V), drives the presence heuristic
    pub signal_idle_range: Range,

    /// Window for the current draw (mA)
    pub presence_current_range: Range,

    /// Current scale for the simulator and the presence floor (mA)
    pub max_expected_current_ma: f32,

    /// How error counters advance
    pub counter_policy: CounterPolicy,

    /// Sampling cadence for the external scheduler (ms)
    pub sample_interval_ms: u32,

    /// Automatic relay toggle cadence during a run (s)
    pub relay_toggle_interval_s: u32,

    /// Length of a test run (s)
    pub test_duration_s: u32,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            supply_voltage_range: Range::new(SUPPLY_MIN_V, SUPPLY_MAX_V),
            signal_positive_range: Range::new(SIGNAL_POSITIVE_MIN_V, SIGNAL_POSITIVE_MAX_V),
            signal_negative_range: Range::new(SIGNAL_NEGATIVE_MIN_V, SIGNAL_NEGATIVE_MAX_V),
            signal_idle_range: Range::new(SIGNAL_IDLE_MIN_V, SIGNAL_IDLE_MAX_V),
            presence_current_range: Range::new(PRESENCE_CURRENT_MIN_MA, PRESENCE_CURRENT_MAX_MA),
            max_expected_current_ma: MAX_EXPECTED_CURRENT_MA,
            counter_policy: CounterPolicy::PerFailingCycle,
            sample_interval_ms: DEFAULT_SAMPLE_INTERVAL_MS,
            relay_toggle_interval_s: DEFAULT_RELAY_TOGGLE_INTERVAL_S,
            test_duration_s: DEFAULT_TEST_DURATION_S,
        }
    }
}

impl ThresholdConfig {
    /// Reject configurations the classifier cannot use
    pub fn validate(&self) -> ConfigResult<()> {
        self.supply_voltage_range.validate("supply_voltage_range")?;
        self.signal_positive_range.validate("signal_positive_range")?;
        self.signal_negative_range.validate("signal_negative_range")?;
        self.signal_idle_range.validate("signal_idle_range")?;
        self.presence_current_range.validate("presence_current_range")?;

        let scale = self.max_expected_current_ma;
        if !scale.is_finite() || scale <= 0.0 {
            return Err(ConfigError::InvalidCurrentScale { value: scale });
        }

        if self.sample_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval { field: "sample_interval_ms" });
        }

        Ok(())
    }

    /// Current above which a channel counts as drawing power (mA)
    pub fn presence_floor_ma(&self) -> f32 {
        PRESENCE_FLOOR_FRACTION * self.max_expected_current_ma
    }
}

#[cfg(feature = "std")]
pub use loading::ConfigLoadError;

#[cfg(feature = "std")]
mod loading {
    use super::ThresholdConfig;
    use crate::errors::ConfigError;
    use std::path::Path;
    use thiserror_no_std::Error;

    /// Failure to load a configuration file
    #[derive(Error, Debug, Clone, Copy, PartialEq)]
    pub enum ConfigLoadError {
        /// File could not be read
        #[error("cannot read config file: {0:?}")]
        Io(std::io::ErrorKind),

        /// File is not valid JSON for a configuration
        #[error("malformed config at line {line}, column {column}")]
        Parse {
            /// 1-based line of the syntax error
            line: usize,
            /// 1-based column of the syntax error
            column: usize,
        },

        /// File parsed but the values are unusable
        #[error("invalid config: {0}")]
        Invalid(ConfigError),
    }

    impl From<ConfigError> for ConfigLoadError {
        fn from(err: ConfigError) -> Self {
            ConfigLoadError::Invalid(err)
        }
    }

    impl ThresholdConfig {
        /// Parse and validate a JSON configuration
        ///
        /// Fields missing from the document keep their default value.
        pub fn from_json_str(json: &str) -> Result<Self, ConfigLoadError> {
            let config: ThresholdConfig = serde_json::from_str(json).map_err(|e| {
                ConfigLoadError::Parse { line: e.line(), column: e.column() }
            })?;
            config.validate()?;
            Ok(config)
        }

        /// Read, parse and validate a JSON configuration file
        pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigLoadError> {
            let text = std::fs::read_to_string(path.as_ref())
                .map_err(|e| ConfigLoadError::Io(e.kind()))?;
            Self::from_json_str(&text)
        }

        /// Serialize for saving next to the test results
        pub fn to_json_pretty(&self) -> String {
            // A struct of plain numbers and unit enums always serializes
            serde_json::to_string_pretty(self).unwrap_or_default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(ThresholdConfig::default().validate().is_ok());
    }

    #[test]
    fn range_bounds_are_inclusive() {
        let range = Range::new(4.7, 5.5);
        assert!(range.contains(4.7));
        assert!(range.contains(5.5));
        assert!(range.contains(5.0));
        assert!(!range.contains(4.69));
        assert!(!range.contains(f32::NAN));
    }

    #[test]
    fn inverted_range_contains_nothing() {
        let range = Range::new(5.0, 1.0);
        assert!(!range.contains(3.0));
        assert!(matches!(
            range.validate("test"),
            Err(ConfigError::InvertedRange { field: "test", .. })
        ));
    }

    #[test]
    fn non_finite_bounds_rejected() {
        let mut config = ThresholdConfig::default();
        config.signal_idle_range = Range::new(f32::NAN, 1.6);
        assert_eq!(
            config.validate(),
            Err(ConfigError::NonFinite { field: "signal_idle_range" })
        );
    }

    #[test]
    fn bad_scale_and_interval_rejected() {
        let mut config = ThresholdConfig::default();
        config.max_expected_current_ma = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidCurrentScale { .. })));

        let mut config = ThresholdConfig::default();
        config.sample_interval_ms = 0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroInterval { field: "sample_interval_ms" })
        );
    }

    #[test]
    fn presence_floor_scales_with_current() {
        let config = ThresholdConfig::default();
        assert!((config.presence_floor_ma() - 5.0).abs() < 1e-6);
    }

    #[cfg(feature = "std")]
    #[test]
    fn json_fills_missing_fields_with_defaults() {
        let config = ThresholdConfig::from_json_str(
            r#"{ "supply_voltage_range": [4.8, 5.2], "counter_policy": "on_failure_transition" }"#,
        )
        .unwrap();

        assert_eq!(config.supply_voltage_range, Range::new(4.8, 5.2));
        assert_eq!(config.counter_policy, CounterPolicy::OnFailureTransition);
        assert_eq!(config.signal_idle_range, ThresholdConfig::default().signal_idle_range);
    }

    #[cfg(feature = "std")]
    #[test]
    fn json_rejects_inverted_window() {
        let err = ThresholdConfig::from_json_str(r#"{ "signal_positive_range": [5.0, 2.0] }"#)
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigLoadError::Invalid(ConfigError::InvertedRange { field: "signal_positive_range", .. })
        ));
    }

    #[cfg(feature = "std")]
    #[test]
    fn json_syntax_error_reports_position() {
        let err = ThresholdConfig::from_json_str("{\n  \"test_duration_s\": ,\n}").unwrap_err();
        assert!(matches!(err, ConfigLoadError::Parse { line: 2, .. }));
    }

    #[cfg(feature = "std")]
    #[test]
    fn json_round_trip_keeps_windows() {
        let config = ThresholdConfig::default();
        let parsed = ThresholdConfig::from_json_str(&config.to_json_pretty()).unwrap();
        assert_eq!(parsed, config);
    }
}
