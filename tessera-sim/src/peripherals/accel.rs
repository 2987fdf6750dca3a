//! Accelerometer register file on a simulated I2C bus
//!
//! Answers at the accelerometer's address only. Until `CTRL_REG1` enables
//! the axes every output register reads zero; afterwards x and y wobble
//! and z sits near 1 g.

use tessera_applets::accel::{reg, ADDRESS};
use tessera_hal::I2cBus;

/// Axis-enable bits of `CTRL_REG1`
const AXES_ENABLED: u8 = 0x07;

/// 1 g in 8-bit low-power counts at +/-2 g full scale
const ONE_G: i8 = 64;

/// I2C errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimBusError {
    /// No device acknowledged the address
    Nack,
}

/// Simulated I2C bus with one accelerometer on it
#[derive(Debug)]
pub struct SimAccelBus {
    present: bool,
    ctrl_reg1: u8,
    tick: u32,
}

impl SimAccelBus {
    /// Create a bus; `present = false` models a missing or dead sensor
    pub fn new(present: bool) -> Self {
        Self {
            present,
            ctrl_reg1: 0,
            tick: 0,
        }
    }

    /// Current `CTRL_REG1` value
    pub fn ctrl_reg1(&self) -> u8 {
        self.ctrl_reg1
    }

    fn check(&self, address: u8) -> Result<(), SimBusError> {
        if self.present && address == ADDRESS {
            Ok(())
        } else {
            Err(SimBusError::Nack)
        }
    }

    fn register(&mut self, register: u8) -> u8 {
        if register == reg::CTRL_REG1 {
            return self.ctrl_reg1;
        }
        if self.ctrl_reg1 & AXES_ENABLED == 0 {
            return 0;
        }

        let value = match register {
            reg::OUT_X_H => {
                // One new sample per x read; y and z follow
                self.tick = self.tick.wrapping_add(1);
                wobble(self.tick)
            }
            reg::OUT_Y_H => wobble(self.tick.wrapping_add(32)),
            reg::OUT_Z_H => ONE_G + wobble(self.tick) / 8,
            _ => 0,
        };
        value as u8
    }
}

/// Triangle wave in -32..=32 with a 128-sample period
fn wobble(tick: u32) -> i8 {
    let phase = (tick % 128) as i32;
    let level = if phase < 64 { phase } else { 128 - phase };
    (level - 32) as i8
}

impl I2cBus for SimAccelBus {
    type Error = SimBusError;

    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), SimBusError> {
        self.check(address)?;
        if let [reg::CTRL_REG1, value] = data {
            self.ctrl_reg1 = *value;
        }
        Ok(())
    }

    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), SimBusError> {
        self.check(address)?;
        buf.fill(0);
        Ok(())
    }

    fn write_read(
        &mut self,
        address: u8,
        write_data: &[u8],
        read_buf: &mut [u8],
    ) -> Result<(), SimBusError> {
        self.check(address)?;
        let register = write_data.first().copied().unwrap_or(0);
        for byte in read_buf.iter_mut() {
            *byte = self.register(register);
        }
        Ok(())
    }
}
