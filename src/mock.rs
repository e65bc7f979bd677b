//! Simulated AXP192 register file for tests

use std::cell::RefCell;
use std::rc::Rc;
use std::vec::Vec;

use embedded_hal::i2c::{self, ErrorKind, NoAcknowledgeSource, Operation};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockError(pub ErrorKind);

impl i2c::Error for MockError {
    fn kind(&self) -> ErrorKind {
        self.0
    }
}

struct State {
    address: u8,
    registers: [u8; 256],
    failing: Vec<u8>,
    fail_everything: bool,
    writes: Vec<(u8, u8)>,
    transactions: usize,
}

/// Cloning hands out another handle onto the same chip, so a test can keep one while the driver
/// owns the other
#[derive(Clone)]
pub struct MockBus {
    state: Rc<RefCell<State>>,
}

impl MockBus {
    pub fn new(address: u8) -> Self {
        Self {
            state: Rc::new(RefCell::new(State {
                address,
                registers: [0; 256],
                failing: Vec::new(),
                fail_everything: false,
                writes: Vec::new(),
                transactions: 0,
            })),
        }
    }

    pub fn register(&self, register: u8) -> u8 {
        self.state.borrow().registers[register as usize]
    }

    pub fn set_registers(&self, first: u8, values: &[u8]) {
        let mut state = self.state.borrow_mut();
        for (i, v) in values.iter().enumerate() {
            state.registers[first.wrapping_add(i as u8) as usize] = *v;
        }
    }

    /// Store a 12 bit ADC code the way the chip lays it out
    pub fn set_adc_12(&self, register: u8, code: u16) {
        self.set_registers(register, &[(code >> 4) as u8, (code & 0x0f) as u8]);
    }

    /// Store a 13 bit ADC code the way the chip lays it out
    pub fn set_adc_13(&self, register: u8, code: u16) {
        self.set_registers(register, &[(code >> 5) as u8, (code & 0x1f) as u8]);
    }

    /// Transactions addressing `register` are not acknowledged from now on
    pub fn fail_register(&self, register: u8) {
        self.state.borrow_mut().failing.push(register);
    }

    pub fn fail_everything(&self, fail: bool) {
        self.state.borrow_mut().fail_everything = fail;
    }

    pub fn clear_failures(&self) {
        let mut state = self.state.borrow_mut();
        state.failing.clear();
        state.fail_everything = false;
    }

    /// Every (register, value) written so far, in order
    pub fn writes(&self) -> Vec<(u8, u8)> {
        self.state.borrow().writes.clone()
    }

    pub fn clear_writes(&self) {
        self.state.borrow_mut().writes.clear();
    }

    pub fn transactions(&self) -> usize {
        self.state.borrow().transactions
    }
}

impl i2c::ErrorType for MockBus {
    type Error = MockError;
}

impl i2c::I2c for MockBus {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        let mut state = self.state.borrow_mut();
        state.transactions += 1;

        if address != state.address {
            return Err(MockError(ErrorKind::NoAcknowledge(
                NoAcknowledgeSource::Address,
            )));
        }

        let target = operations.iter().find_map(|op| match op {
            Operation::Write(data) => data.first().copied(),
            Operation::Read(_) => None,
        });
        if state.fail_everything || target.is_some_and(|r| state.failing.contains(&r)) {
            return Err(MockError(ErrorKind::NoAcknowledge(
                NoAcknowledgeSource::Data,
            )));
        }

        let mut pointer = 0u8;
        for op in operations.iter_mut() {
            match op {
                Operation::Write(data) => {
                    if let Some((&first, rest)) = data.split_first() {
                        pointer = first;
                        for v in rest {
                            state.registers[pointer as usize] = *v;
                            state.writes.push((pointer, *v));
                            pointer = pointer.wrapping_add(1);
                        }
                    }
                }
                Operation::Read(buff) => {
                    for b in buff.iter_mut() {
                        *b = state.registers[pointer as usize];
                        pointer = pointer.wrapping_add(1);
                    }
                }
            }
        }
        Ok(())
    }
}
