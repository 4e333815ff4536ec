//! Analog input boundary for the signal voltage
//!
//! The bench reads each module's status output with a USB DAQ in
//! single-ended ±5 V mode. The vendor library lives outside this crate; a
//! wrapper implements [`AnalogInput`] and the source drives it with
//! `nb::block!`, so both blocking and polled conversions fit.

/// Single-ended voltage input, one input per channel
pub trait AnalogInput {
    type Error: core::fmt::Debug;

    /// Open the device
    fn connect(&mut self) -> Result<(), Self::Error>;

    /// Close the device; calling it twice is harmless
    fn disconnect(&mut self);

    /// Convert one input (V)
    ///
    /// Returns `WouldBlock` while a conversion is still running.
    fn read_voltage(&mut self, input: u8) -> nb::Result<f32, Self::Error>;
}

/// Which DAQ input carries the signal of each bench channel
pub type InputMap = [u8; benchguard_core::constants::NUM_CHANNELS];

/// Bench channel `n` wired to DAQ input `n`
pub const IDENTITY_INPUTS: InputMap = [0, 1, 2, 3, 4, 5, 6, 7];
