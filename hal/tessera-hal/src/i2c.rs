//! I2C master trait
//!
//! Sensors on the board are register-mapped: a write sets a register
//! pointer (and optionally a value), a repeated-start read returns the
//! register contents.

/// I2C bus master
///
/// Addresses are 7-bit. Every method reports a missing acknowledge or bus
/// fault as `Self::Error`; none of them retry.
pub trait I2cBus {
    type Error;

    /// Write `data` to the device at `address`
    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error>;

    /// Fill `buf` from the device at `address`
    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Write `write_data`, then read into `read_buf` after a repeated start
    fn write_read(
        &mut self,
        address: u8,
        write_data: &[u8],
        read_buf: &mut [u8],
    ) -> Result<(), Self::Error>;

    /// Set one 8-bit register
    fn write_register(&mut self, address: u8, register: u8, value: u8) -> Result<(), Self::Error> {
        self.write(address, &[register, value])
    }

    /// Fetch one 8-bit register
    fn read_register(&mut self, address: u8, register: u8) -> Result<u8, Self::Error> {
        let mut value = [0u8];
        self.write_read(address, &[register], &mut value)?;
        Ok(value[0])
    }
}

/// Bus clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct I2cConfig {
    pub frequency: u32,
}

impl I2cConfig {
    /// 100 kHz
    pub const STANDARD: Self = Self { frequency: 100_000 };

    /// 400 kHz, the accelerometer's maximum
    pub const FAST: Self = Self { frequency: 400_000 };
}

impl Default for I2cConfig {
    fn default() -> Self {
        Self::STANDARD
    }
}
