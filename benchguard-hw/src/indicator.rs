//! Status LED strip boundary
//!
//! One LED per channel shows the channel's severity score as a gradient from
//! green (healthy) to red (every check failing). The strip driver itself is a
//! vendor wrapper implementing [`IndicatorStrip`]; [`NoIndicator`] stands in
//! on benches without a strip.

use core::convert::Infallible;

/// 8-bit color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const OFF: Rgb = Rgb { r: 0, g: 0, b: 0 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Severity in [0, 1] to a green → red gradient; out-of-range values clamp
pub fn severity_to_rgb(severity: f32) -> Rgb {
    let s = if severity.is_nan() { 1.0 } else { severity.clamp(0.0, 1.0) };
    Rgb {
        r: (255.0 * s) as u8,
        g: (255.0 * (1.0 - s)) as u8,
        b: 0,
    }
}

/// Addressable LED strip
pub trait IndicatorStrip {
    type Error: core::fmt::Debug;

    fn init(&mut self) -> Result<(), Self::Error>;

    /// Number of LEDs
    fn len(&self) -> usize;

    fn set_pixel(&mut self, index: usize, color: Rgb) -> Result<(), Self::Error>;

    /// Latch the pixel buffer onto the strip
    fn show(&mut self) -> Result<(), Self::Error>;

    /// Set every pixel to off (not latched until `show`)
    fn clear(&mut self) -> Result<(), Self::Error> {
        for index in 0..self.len() {
            self.set_pixel(index, Rgb::OFF)?;
        }
        Ok(())
    }

    fn shutdown(&mut self);
}

/// Bench without a status strip
#[derive(Debug, Clone, Copy, Default)]
pub struct NoIndicator;

impl IndicatorStrip for NoIndicator {
    type Error = Infallible;

    fn init(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn len(&self) -> usize {
        0
    }

    fn set_pixel(&mut self, _index: usize, _color: Rgb) -> Result<(), Self::Error> {
        Ok(())
    }

    fn show(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn shutdown(&mut self) {}
}
