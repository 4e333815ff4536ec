//! TCA9548A 8-channel I2C multiplexer
//!
//! The device has a single control register: writing a byte enables the
//! downstream buses whose bits are set. One channel is enabled at a time here,
//! `1 << channel`; `0x00` disconnects everything.

use embedded_hal::i2c::I2c;

use crate::error::DriverError;

/// Default 7-bit address (A0..A2 low)
pub const TCA9548A_DEFAULT_ADDRESS: u8 = 0x70;

/// Number of downstream buses
pub const TCA9548A_CHANNELS: u8 = 8;

/// Routes the shared bus to one channel at a time
pub trait ChannelMux {
    type Error: core::fmt::Debug;

    /// Bring the device up with every channel disconnected
    fn init(&mut self) -> Result<(), Self::Error>;

    /// Connect `channel` and disconnect the others
    fn select(&mut self, channel: u8) -> Result<(), Self::Error>;

    /// Disconnect every channel
    fn disable(&mut self) -> Result<(), Self::Error>;
}

/// TCA9548A driver over an `embedded-hal` bus
#[derive(Debug)]
pub struct Tca9548a<I> {
    i2c: I,
    address: u8,
    mask: u8,
}

impl<I: I2c> Tca9548a<I> {
    pub fn new(i2c: I) -> Self {
        Self::with_address(i2c, TCA9548A_DEFAULT_ADDRESS)
    }

    pub fn with_address(i2c: I, address: u8) -> Self {
        Self { i2c, address, mask: 0 }
    }

    /// Channel mask last written to the device
    pub fn mask(&self) -> u8 {
        self.mask
    }

    /// Hand the bus back
    pub fn release(self) -> I {
        self.i2c
    }

    fn write_mask(&mut self, mask: u8) -> Result<(), DriverError<I::Error>> {
        self.i2c.write(self.address, &[mask]).map_err(DriverError::Bus)?;
        self.mask = mask;
        Ok(())
    }
}

impl<I: I2c> ChannelMux for Tca9548a<I> {
    type Error = DriverError<I::Error>;

    fn init(&mut self) -> Result<(), Self::Error> {
        self.write_mask(0x00)
    }

    fn select(&mut self, channel: u8) -> Result<(), Self::Error> {
        if channel >= TCA9548A_CHANNELS {
            return Err(DriverError::InvalidChannel(channel));
        }
        self.write_mask(1 << channel)
    }

    fn disable(&mut self) -> Result<(), Self::Error> {
        self.write_mask(0x00)
    }
}
