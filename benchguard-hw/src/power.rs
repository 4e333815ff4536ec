//! INA219 current/voltage/power monitor
//!
//! ## Register map
//!
//! | reg  | name        | content                                      |
//! |------|-------------|----------------------------------------------|
//! | 0x00 | config      | range, gain, ADC modes, operating mode       |
//! | 0x01 | shunt       | shunt voltage, 10 µV/bit, signed             |
//! | 0x02 | bus         | bus voltage in bits 15..3, 4 mV/bit          |
//! | 0x03 | power       | `20 × current_lsb` W/bit                     |
//! | 0x04 | current     | `current_lsb` A/bit, signed                  |
//! | 0x05 | calibration | `trunc(0.04096 / (current_lsb × R_shunt))`   |
//!
//! `current_lsb = max_expected_amps / 32768`. Current and power only read
//! correctly once the calibration register is written, so [`Ina219::init`]
//! writes calibration before configuration.

use embedded_hal::i2c::I2c;

use crate::error::DriverError;

/// Default 7-bit address (A0, A1 low)
pub const INA219_DEFAULT_ADDRESS: u8 = 0x40;

const REG_CONFIG: u8 = 0x00;
const REG_SHUNT: u8 = 0x01;
const REG_BUS: u8 = 0x02;
const REG_POWER: u8 = 0x03;
const REG_CURRENT: u8 = 0x04;
const REG_CALIBRATION: u8 = 0x05;

const BUS_LSB_V: f32 = 0.004;
const SHUNT_LSB_V: f32 = 0.000_01;
const CALIBRATION_SCALE: f32 = 0.04096;
const POWER_LSB_FACTOR: f32 = 20.0;

const BUS_OVERFLOW: u16 = 0x0001;
/// Shunt and bus, continuous
const MODE_CONTINUOUS: u16 = 0b111;

/// One measurement in engineering units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerReading {
    /// Bus voltage (V)
    pub bus_voltage_v: f32,
    /// Current (mA)
    pub current_ma: f32,
    /// Power (mW)
    pub power_mw: f32,
}

/// Current/voltage sensor behind the multiplexer
pub trait PowerMonitor {
    type Error: core::fmt::Debug;

    /// Calibrate and configure the device
    fn init(&mut self) -> Result<(), Self::Error>;

    /// Read bus voltage, current and power of the selected channel
    fn read(&mut self) -> Result<PowerReading, Self::Error>;
}

/// Full-scale bus voltage (BRNG)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BusRange {
    #[default]
    V16 = 0,
    V32 = 1,
}

/// Shunt PGA gain and full-scale shunt voltage (PG)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Gain {
    Mv40 = 0,
    Mv80 = 1,
    Mv160 = 2,
    #[default]
    Mv320 = 3,
}

/// ADC resolution or averaging (BADC / SADC)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdcMode {
    Bits9 = 0x0,
    Bits10 = 0x1,
    Bits11 = 0x2,
    #[default]
    Bits12 = 0x3,
    Samples2 = 0x9,
    Samples4 = 0xA,
    Samples8 = 0xB,
    Samples16 = 0xC,
    Samples32 = 0xD,
    Samples64 = 0xE,
    Samples128 = 0xF,
}

/// Electrical and ADC settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ina219Config {
    pub address: u8,
    /// Shunt resistor (Ω)
    pub shunt_ohms: f32,
    /// Largest current to resolve (A), sets the current LSB
    pub max_expected_amps: f32,
    pub bus_range: BusRange,
    pub gain: Gain,
    pub bus_adc: AdcMode,
    pub shunt_adc: AdcMode,
}

impl Default for Ina219Config {
    fn default() -> Self {
        Self {
            address: INA219_DEFAULT_ADDRESS,
            shunt_ohms: 0.1,
            max_expected_amps: 3.2,
            bus_range: BusRange::V16,
            gain: Gain::Mv320,
            bus_adc: AdcMode::Bits12,
            shunt_adc: AdcMode::Bits12,
        }
    }
}

impl Ina219Config {
    /// Configuration register value
    pub fn config_word(&self) -> u16 {
        (self.bus_range as u16) << 13
            | (self.gain as u16) << 11
            | (self.bus_adc as u16) << 7
            | (self.shunt_adc as u16) << 3
            | MODE_CONTINUOUS
    }

    /// Current per bit of the current register (A)
    pub fn current_lsb(&self) -> f32 {
        self.max_expected_amps / 32768.0
    }

    /// Calibration register value; bit 0 is reserved and always cleared
    pub fn calibration_word(&self) -> Result<u16, &'static str> {
        if !(self.shunt_ohms.is_finite() && self.shunt_ohms > 0.0) {
            return Err("shunt resistance must be positive");
        }
        if !(self.max_expected_amps.is_finite() && self.max_expected_amps > 0.0) {
            return Err("max expected current must be positive");
        }
        let cal = libm::truncf(CALIBRATION_SCALE / (self.current_lsb() * self.shunt_ohms));
        if !(1.0..=65534.0).contains(&cal) {
            return Err("calibration out of register range");
        }
        Ok((cal as u16) & !1)
    }
}

/// INA219 driver over an `embedded-hal` bus
#[derive(Debug)]
pub struct Ina219<I> {
    i2c: I,
    config: Ina219Config,
}

impl<I: I2c> Ina219<I> {
    pub fn new(i2c: I, config: Ina219Config) -> Self {
        Self { i2c, config }
    }

    pub fn config(&self) -> &Ina219Config {
        &self.config
    }

    pub fn release(self) -> I {
        self.i2c
    }

    /// Shunt voltage (mV)
    pub fn shunt_voltage_mv(&mut self) -> Result<f32, DriverError<I::Error>> {
        let raw = self.read_register(REG_SHUNT)? as i16;
        Ok(f32::from(raw) * SHUNT_LSB_V * 1000.0)
    }

    fn read_register(&mut self, register: u8) -> Result<u16, DriverError<I::Error>> {
        let mut buffer = [0u8; 2];
        self.i2c
            .write_read(self.config.address, &[register], &mut buffer)
            .map_err(DriverError::Bus)?;
        Ok(u16::from_be_bytes(buffer))
    }

    fn write_register(&mut self, register: u8, value: u16) -> Result<(), DriverError<I::Error>> {
        let [hi, lo] = value.to_be_bytes();
        self.i2c
            .write(self.config.address, &[register, hi, lo])
            .map_err(DriverError::Bus)
    }
}

impl<I: I2c> PowerMonitor for Ina219<I> {
    type Error = DriverError<I::Error>;

    fn init(&mut self) -> Result<(), Self::Error> {
        let calibration = self.config.calibration_word().map_err(DriverError::Calibration)?;
        self.write_register(REG_CALIBRATION, calibration)?;
        self.write_register(REG_CONFIG, self.config.config_word())
    }

    fn read(&mut self) -> Result<PowerReading, Self::Error> {
        let bus = self.read_register(REG_BUS)?;
        if bus & BUS_OVERFLOW != 0 {
            return Err(DriverError::Overflow);
        }
        let current = self.read_register(REG_CURRENT)? as i16;
        let power = self.read_register(REG_POWER)?;

        let current_lsb = self.config.current_lsb();
        Ok(PowerReading {
            bus_voltage_v: f32::from(bus >> 3) * BUS_LSB_V,
            current_ma: f32::from(current) * current_lsb * 1000.0,
            power_mw: f32::from(power) * POWER_LSB_FACTOR * current_lsb * 1000.0,
        })
    }
}
