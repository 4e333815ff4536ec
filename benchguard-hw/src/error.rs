//! Driver error type shared by the register drivers

use thiserror::Error;

/// Failure of a register driver over a bus with error type `E`
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DriverError<E> {
    /// Bus transaction failed
    #[error("bus error: {0:?}")]
    Bus(E),

    /// Channel outside the device's range
    #[error("channel {0} out of range")]
    InvalidChannel(u8),

    /// Calibration parameters give no usable register value
    #[error("invalid calibration: {0}")]
    Calibration(&'static str),

    /// Measurement overflowed the ADC range
    #[error("measurement overflow")]
    Overflow,
}
