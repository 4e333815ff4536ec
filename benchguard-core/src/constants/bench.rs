//! Bench Topology and Classification Weights
//!
//! The bench is built around a fixed acquisition topology: eight DUT slots
//! behind one I2C multiplexer, energized two at a time by four relay pairs.

// ===== TOPOLOGY =====

/// Number of device-under-test channels on the bench.
///
/// Matches the eight downstream ports of a TCA9548A multiplexer.
pub const NUM_CHANNELS: usize = 8;

/// Channels energized together by one relay pair.
pub const CHANNELS_PER_PAIR: usize = 2;

/// Number of logical relay pairs. Pair `i` drives channels `2i` and `2i + 1`.
pub const NUM_RELAY_PAIRS: usize = NUM_CHANNELS / CHANNELS_PER_PAIR;

// ===== PRESENCE HEURISTIC =====

/// Fraction of the maximum expected current above which a channel counts as
/// "drawing current", independent of what the signal sensor says.
///
/// 0.2 × 25 mA = 5 mA with the factory configuration.
pub const PRESENCE_FLOOR_FRACTION: f32 = 0.2;

// ===== SEVERITY SCORE =====

/// Weight of a supply failure in the [0, 1] severity score.
pub const SEVERITY_SUPPLY_WEIGHT: f32 = 0.5;

/// Weight of a signal failure in the [0, 1] severity score.
pub const SEVERITY_SIGNAL_WEIGHT: f32 = 0.3;

/// Weight of a current failure in the [0, 1] severity score.
pub const SEVERITY_CURRENT_WEIGHT: f32 = 0.2;
