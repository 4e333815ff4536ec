//! Factory-Default Thresholds
//!
//! Values a fresh [`ThresholdConfig`](crate::config::ThresholdConfig) starts with.
//! They describe a 5 V module with a bipolar ±2..5 V status output.

// ===== SUPPLY =====

/// Lowest acceptable supply rail voltage (V).
pub const SUPPLY_MIN_V: f32 = 4.7;

/// Highest acceptable supply rail voltage (V).
pub const SUPPLY_MAX_V: f32 = 5.5;

// ===== SIGNAL WINDOWS =====

/// Positive-polarity signal window (V).
pub const SIGNAL_POSITIVE_MIN_V: f32 = 2.0;
/// Upper bound of the positive-polarity window (V).
pub const SIGNAL_POSITIVE_MAX_V: f32 = 5.0;

/// Negative-polarity signal window (V).
pub const SIGNAL_NEGATIVE_MIN_V: f32 = -5.0;
/// Upper bound of the negative-polarity window (V).
pub const SIGNAL_NEGATIVE_MAX_V: f32 = -2.0;

/// Signal voltage seen on an empty slot (V).
///
/// The DAQ input floats into this band when nothing is plugged in.
pub const SIGNAL_IDLE_MIN_V: f32 = 1.3;
/// Upper bound of the empty-slot band (V).
pub const SIGNAL_IDLE_MAX_V: f32 = 1.6;

// ===== CURRENT =====

/// Acceptable current draw window (mA).
pub const PRESENCE_CURRENT_MIN_MA: f32 = 5.0;
/// Upper bound of the current window (mA).
pub const PRESENCE_CURRENT_MAX_MA: f32 = 100.0;

/// Largest current a healthy module is expected to draw (mA).
pub const MAX_EXPECTED_CURRENT_MA: f32 = 25.0;

// ===== CADENCE =====

/// Interval between sampling cycles (ms).
pub const DEFAULT_SAMPLE_INTERVAL_MS: u32 = 200;

/// Interval between automatic relay toggles during a test run (s).
pub const DEFAULT_RELAY_TOGGLE_INTERVAL_S: u32 = 10;

/// Length of a test run (s).
pub const DEFAULT_TEST_DURATION_S: u32 = 3600;
