//! Register access over the two-wire bus
//!
//! Every method here is exactly one bus transaction, so handing [`RegisterIo`] a shared-bus
//! device from `embedded-hal-bus` (`RefCellDevice`, `CriticalSectionDevice`, `MutexDevice`) is
//! enough to keep register operations from interleaving with other users of the bus.
//! Read-modify-write helpers are two transactions and are only atomic with respect to this
//! driver.
//!
//! Nothing is retried at this level.

use embedded_hal::i2c;

use crate::error::BusError;

/// Byte-wide register access to one device on the bus
pub struct RegisterIo<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C, E> RegisterIo<I2C>
where
    I2C: i2c::I2c<Error = E>,
{
    /// Wrap `i2c`, talking to the device at 7-bit `address`
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    /// Bus address in use
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Give the bus back
    pub fn release(self) -> I2C {
        self.i2c
    }

    fn get(&mut self, register: u8, buff: &mut [u8]) -> Result<(), BusError<E>> {
        self.i2c
            .write_read(self.address, &[register], buff)
            .map_err(|source| BusError { register, source })
    }

    /// Read one register
    pub fn read(&mut self, register: u8) -> Result<u8, BusError<E>> {
        let mut buff = [0u8];
        self.get(register, &mut buff)?;
        Ok(buff[0])
    }

    /// Write one register
    pub fn write(&mut self, register: u8, value: u8) -> Result<(), BusError<E>> {
        self.i2c
            .write(self.address, &[register, value])
            .map_err(|source| BusError { register, source })
    }

    /// 12 bit ADC value: 8 high bits in `register`, 4 low bits in the next one
    pub fn read_12(&mut self, register: u8) -> Result<u16, BusError<E>> {
        let mut buff = [0; 2];
        self.get(register, &mut buff)?;
        Ok(((buff[0] as u16) << 4) + (buff[1] & 0x0f) as u16)
    }

    /// 13 bit ADC value: 8 high bits in `register`, 5 low bits in the next one
    pub fn read_13(&mut self, register: u8) -> Result<u16, BusError<E>> {
        let mut buff = [0; 2];
        self.get(register, &mut buff)?;
        Ok(((buff[0] as u16) << 5) + (buff[1] & 0x1f) as u16)
    }

    /// Big-endian 24 bit value
    pub fn read_24(&mut self, register: u8) -> Result<u32, BusError<E>> {
        let mut buff = [0; 3];
        self.get(register, &mut buff)?;
        Ok(u32::from_be_bytes([0, buff[0], buff[1], buff[2]]))
    }

    /// Big-endian 32 bit value
    pub fn read_32(&mut self, register: u8) -> Result<u32, BusError<E>> {
        let mut buff = [0; 4];
        self.get(register, &mut buff)?;
        Ok(u32::from_be_bytes(buff))
    }

    /// Replace the bits selected by `mask` with those of `value`
    pub fn update_bits(&mut self, register: u8, mask: u8, value: u8) -> Result<(), BusError<E>> {
        let existing = self.read(register)?;
        self.write(register, (existing & !mask) | (value & mask))
    }

    /// Set or clear `bit`
    pub fn set_flag(&mut self, register: u8, bit: u8, state: bool) -> Result<(), BusError<E>> {
        self.update_bits(register, bit, if state { bit } else { 0 })
    }

    /// Test `flag`
    pub fn get_flag(&mut self, register: u8, flag: u8) -> Result<bool, BusError<E>> {
        Ok(self.read(register)? & flag != 0)
    }
}
