//! In-memory bus fakes for driver unit tests

use std::collections::VecDeque;

use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, Operation};

/// Register-file I2C device at one address
///
/// A one-byte write sets the register pointer (or, for devices without
/// registers, is recorded as a control byte); a three-byte write stores a
/// big-endian word; reads return the word at the pointer.
#[derive(Debug, Default)]
pub struct FakeI2c {
    pub address: u8,
    pub registers: [u16; 8],
    pub pointer: u8,
    pub control_writes: Vec<u8>,
    pub fail_next: VecDeque<bool>,
    pub fail_always: bool,
}

impl FakeI2c {
    pub fn new(address: u8) -> Self {
        Self { address, ..Self::default() }
    }

    fn should_fail(&mut self) -> bool {
        self.fail_always || self.fail_next.pop_front().unwrap_or(false)
    }
}

impl ErrorType for FakeI2c {
    type Error = ErrorKind;
}

impl I2c for FakeI2c {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if address != self.address {
            return Err(ErrorKind::NoAcknowledge(embedded_hal::i2c::NoAcknowledgeSource::Address));
        }
        if self.should_fail() {
            return Err(ErrorKind::Bus);
        }
        for operation in operations {
            match operation {
                Operation::Write(bytes) => match bytes.len() {
                    1 => {
                        self.pointer = bytes[0];
                        self.control_writes.push(bytes[0]);
                    }
                    3 => {
                        let word = u16::from_be_bytes([bytes[1], bytes[2]]);
                        self.registers[bytes[0] as usize] = word;
                    }
                    _ => return Err(ErrorKind::Other),
                },
                Operation::Read(buffer) => {
                    let word = self.registers[self.pointer as usize].to_be_bytes();
                    for (dst, src) in buffer.iter_mut().zip(word) {
                        *dst = src;
                    }
                }
            }
        }
        Ok(())
    }
}
