//! Blocking I2C master

use embassy_rp::i2c::{self, Blocking, Error, I2c, Instance};
use tessera_hal::i2c::I2cConfig;
use tessera_hal::I2cBus;

/// Translate a HAL I2C configuration to embassy-rp's
pub fn rp_config(config: &I2cConfig) -> i2c::Config {
    let mut rp = i2c::Config::default();
    rp.frequency = config.frequency;
    rp
}

/// I2C master in blocking mode
pub struct RpI2c<T: Instance + 'static> {
    bus: I2c<'static, T, Blocking>,
}

impl<T: Instance + 'static> RpI2c<T> {
    pub fn new(bus: I2c<'static, T, Blocking>) -> Self {
        Self { bus }
    }
}

impl<T: Instance + 'static> I2cBus for RpI2c<T> {
    type Error = Error;

    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Error> {
        self.bus.blocking_write(address, data)
    }

    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), Error> {
        self.bus.blocking_read(address, buf)
    }

    fn write_read(&mut self, address: u8, write_data: &[u8], read_buf: &mut [u8]) -> Result<(), Error> {
        self.bus.blocking_write_read(address, write_data, read_buf)
    }
}
