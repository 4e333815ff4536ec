//! Fake bench for the hardware source tests
//!
//! Every fake part shares one [`BenchState`], so the power monitor and DAQ
//! answer for whichever channel the multiplexer last selected, and the
//! journal records the order parts were opened and closed in.

#![allow(dead_code)]

use std::sync::{Arc, Mutex, MutexGuard};

use benchguard_core::constants::NUM_CHANNELS;
use benchguard_hw::{
    AnalogInput, ChannelMux, HardwareSource, IndicatorStrip, PowerMonitor, PowerReading,
    RelayBank, Rgb,
};
use embedded_hal::digital::{self, OutputPin};

pub const HEALTHY_POWER: PowerReading =
    PowerReading { bus_voltage_v: 5.0, current_ma: 15.0, power_mw: 75.0 };

pub const HEALTHY_SIGNAL_V: f32 = 3.5;

pub const STRIP_LEN: usize = NUM_CHANNELS;

#[derive(Debug)]
pub struct BenchState {
    pub journal: Vec<&'static str>,
    pub selected: Option<u8>,
    pub power: [PowerReading; NUM_CHANNELS],
    pub signal: [f32; NUM_CHANNELS],
    /// Parts whose open call fails: "mux", "power", "daq", "leds"
    pub fail_init: Vec<&'static str>,
    /// Transient power read failures left per channel
    pub power_failures: [u8; NUM_CHANNELS],
    /// `WouldBlock` answers before each conversion completes
    pub conversion_polls: u8,
    pub lines: [bool; 2 * 4],
    pub broken_line: Option<usize>,
    pub pixels: [Rgb; STRIP_LEN],
    pub shows: u32,
}

impl Default for BenchState {
    fn default() -> Self {
        Self {
            journal: Vec::new(),
            selected: None,
            power: [HEALTHY_POWER; NUM_CHANNELS],
            signal: [HEALTHY_SIGNAL_V; NUM_CHANNELS],
            fail_init: Vec::new(),
            power_failures: [0; NUM_CHANNELS],
            conversion_polls: 0,
            lines: [false; 8],
            broken_line: None,
            pixels: [Rgb::OFF; STRIP_LEN],
            shows: 0,
        }
    }
}

impl BenchState {
    fn note(&mut self, entry: &'static str) {
        // Line writes come in runs; one entry per run keeps the journal readable
        if self.journal.last() != Some(&entry) {
            self.journal.push(entry);
        }
    }

    fn fails(&self, part: &str) -> bool {
        self.fail_init.contains(&part)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Bench(Arc<Mutex<BenchState>>);

impl Bench {
    pub fn state(&self) -> MutexGuard<'_, BenchState> {
        self.0.lock().unwrap()
    }

    pub fn take_journal(&self) -> Vec<&'static str> {
        std::mem::take(&mut self.state().journal)
    }
}

pub struct FakeMux(Bench);

impl ChannelMux for FakeMux {
    type Error = &'static str;

    fn init(&mut self) -> Result<(), Self::Error> {
        let mut state = self.0.state();
        state.note("mux.init");
        if state.fails("mux") {
            return Err("no ack");
        }
        state.selected = None;
        Ok(())
    }

    fn select(&mut self, channel: u8) -> Result<(), Self::Error> {
        self.0.state().selected = Some(channel);
        Ok(())
    }

    fn disable(&mut self) -> Result<(), Self::Error> {
        let mut state = self.0.state();
        state.note("mux.disable");
        state.selected = None;
        Ok(())
    }
}

pub struct FakePower(Bench);

impl PowerMonitor for FakePower {
    type Error = &'static str;

    fn init(&mut self) -> Result<(), Self::Error> {
        let mut state = self.0.state();
        state.note("power.init");
        if state.fails("power") {
            return Err("calibration rejected");
        }
        Ok(())
    }

    fn read(&mut self) -> Result<PowerReading, Self::Error> {
        let mut state = self.0.state();
        let channel = state.selected.ok_or("no channel selected")? as usize;
        if state.power_failures[channel] > 0 {
            state.power_failures[channel] -= 1;
            return Err("nack");
        }
        Ok(state.power[channel])
    }
}

pub struct FakeDaq {
    bench: Bench,
    pending: Option<u8>,
}

impl AnalogInput for FakeDaq {
    type Error = &'static str;

    fn connect(&mut self) -> Result<(), Self::Error> {
        let mut state = self.bench.state();
        state.note("daq.connect");
        if state.fails("daq") {
            return Err("device not found");
        }
        Ok(())
    }

    fn disconnect(&mut self) {
        self.bench.state().note("daq.disconnect");
    }

    fn read_voltage(&mut self, input: u8) -> nb::Result<f32, Self::Error> {
        let state = self.bench.state();
        let polls = *self.pending.get_or_insert(state.conversion_polls);
        if polls > 0 {
            self.pending = Some(polls - 1);
            return Err(nb::Error::WouldBlock);
        }
        self.pending = None;
        state
            .signal
            .get(input as usize)
            .copied()
            .ok_or(nb::Error::Other("no such input"))
    }
}

pub struct FakeLeds(Bench);

impl IndicatorStrip for FakeLeds {
    type Error = &'static str;

    fn init(&mut self) -> Result<(), Self::Error> {
        let mut state = self.0.state();
        state.note("leds.init");
        if state.fails("leds") {
            return Err("strip not responding");
        }
        Ok(())
    }

    fn len(&self) -> usize {
        STRIP_LEN
    }

    fn set_pixel(&mut self, index: usize, color: Rgb) -> Result<(), Self::Error> {
        let mut state = self.0.state();
        let pixel = state.pixels.get_mut(index).ok_or("pixel out of range")?;
        *pixel = color;
        Ok(())
    }

    fn show(&mut self) -> Result<(), Self::Error> {
        let mut state = self.0.state();
        state.note("leds.show");
        state.shows += 1;
        Ok(())
    }

    fn shutdown(&mut self) {
        self.0.state().note("leds.shutdown");
    }
}

pub struct FakeLine {
    bench: Bench,
    index: usize,
}

impl digital::ErrorType for FakeLine {
    type Error = digital::ErrorKind;
}

impl FakeLine {
    fn drive(&mut self, level: bool) -> Result<(), digital::ErrorKind> {
        let mut state = self.bench.state();
        state.note("relays");
        if state.broken_line == Some(self.index) {
            return Err(digital::ErrorKind::Other);
        }
        state.lines[self.index] = level;
        Ok(())
    }
}

impl OutputPin for FakeLine {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.drive(false)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.drive(true)
    }
}

pub type BenchSource = HardwareSource<FakeMux, FakePower, FakeDaq, FakeLine, FakeLeds>;

/// Uninitialized hardware source wired to a fresh fake bench
pub fn bench() -> (Bench, BenchSource) {
    let bench = Bench::default();
    let line = |index: usize| FakeLine { bench: bench.clone(), index };
    let relays = RelayBank::new(
        [
            [line(0), line(1)],
            [line(2), line(3)],
            [line(4), line(5)],
            [line(6), line(7)],
        ],
        true,
    );
    let source = HardwareSource::new(
        FakeMux(bench.clone()),
        FakePower(bench.clone()),
        FakeDaq { bench: bench.clone(), pending: None },
        relays,
        FakeLeds(bench.clone()),
    );
    (bench, source)
}
