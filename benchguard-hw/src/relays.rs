//! GPIO relay bank
//!
//! Four relay pairs, each switched by two output lines driven identically.
//! Lines are released in the de-energized state.

use benchguard_core::constants::NUM_RELAY_PAIRS;
use benchguard_core::SourceError;
use embedded_hal::digital::OutputPin;

/// Output lines of one relay pair
pub type PairLines<O> = [O; 2];

/// Relay outputs of the bench
#[derive(Debug)]
pub struct RelayBank<O> {
    lines: [PairLines<O>; NUM_RELAY_PAIRS],
    active_high: bool,
    states: [bool; NUM_RELAY_PAIRS],
}

impl<O: OutputPin> RelayBank<O> {
    /// `active_high`: a high level energizes the relay
    pub fn new(lines: [PairLines<O>; NUM_RELAY_PAIRS], active_high: bool) -> Self {
        Self { lines, active_high, states: [false; NUM_RELAY_PAIRS] }
    }

    /// Drive every relay off
    pub fn init(&mut self) -> Result<(), SourceError> {
        self.set_all(false)
    }

    /// Energize or release one pair
    ///
    /// The recorded state only changes when both lines were driven.
    pub fn set_pair(&mut self, pair: usize, on: bool) -> Result<(), SourceError> {
        let active_high = self.active_high;
        let lines = self
            .lines
            .get_mut(pair)
            .ok_or(SourceError::InvalidRelayPair { pair })?;

        for line in lines.iter_mut() {
            let result = if on == active_high { line.set_high() } else { line.set_low() };
            result.map_err(|_| SourceError::RelayLine { pair })?;
        }
        self.states[pair] = on;
        Ok(())
    }

    /// Drive every pair, attempting all of them even after a failure
    pub fn set_all(&mut self, on: bool) -> Result<(), SourceError> {
        let mut first_error = None;
        for pair in 0..NUM_RELAY_PAIRS {
            if let Err(err) = self.set_pair(pair, on) {
                log::warn!("relay pair {}: {}", pair, err);
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Last successfully commanded state (false for unknown pairs)
    pub fn state(&self, pair: usize) -> bool {
        self.states.get(pair).copied().unwrap_or(false)
    }

    pub fn active_high(&self) -> bool {
        self.active_high
    }

    /// Switch everything off and hand the lines back
    pub fn release(mut self) -> [PairLines<O>; NUM_RELAY_PAIRS] {
        if let Err(err) = self.set_all(false) {
            log::warn!("relays not fully released: {}", err);
        }
        self.lines
    }
}
