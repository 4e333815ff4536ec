//! Simulated Source Parameters

/// Supply noise standard deviation (V).
pub const BUS_SIGMA_V: f32 = 0.05;

/// Current noise standard deviation (mA).
pub const CURRENT_SIGMA_MA: f32 = 0.5;

/// Signal noise standard deviation (V).
pub const SIGNAL_SIGMA_V: f32 = 0.3;

/// Share of the maximum expected current drawn by an energized module.
pub const ENERGIZED_CURRENT_FRACTION: f32 = 0.6;

/// Share of the maximum expected current drawn by a de-energized module (leakage).
pub const IDLE_CURRENT_FRACTION: f32 = 0.05;

/// One in this many samples gets a synthetic fault when injection is enabled.
pub const FAULT_ODDS: u32 = 120;

/// Offset pushing the signal out of band in a "signal" fault (V).
pub const FAULT_SIGNAL_OFFSET_V: f32 = 5.0;

/// Drop below the supply window in a "supply" fault (V).
pub const FAULT_SUPPLY_DROP_V: f32 = 0.3;

/// Seed used when the caller passes 0.
pub const DEFAULT_SEED: u64 = 0x5EED_BE9C_4D1E_2024;
