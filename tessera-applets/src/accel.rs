//! Three-axis accelerometer applet
//!
//! Drives a LIS3DH-class part over I2C in low-power 8-bit mode. Only the
//! high byte of each axis is read; in 8-bit mode that byte is the whole
//! two's-complement sample.

use core::fmt::Write;

use tessera_core::{Field, Producer, ProducerTask, ReadPolicy};
use tessera_display::{Element, Window};
use tessera_hal::I2cBus;

/// 7-bit bus address (SA0 high)
pub const ADDRESS: u8 = 0x19;

/// Register addresses
pub mod reg {
    pub const CTRL_REG1: u8 = 0x20;
    pub const OUT_X_H: u8 = 0x29;
    pub const OUT_Y_H: u8 = 0x2B;
    pub const OUT_Z_H: u8 = 0x2D;
}

/// CTRL_REG1: 10 Hz output data rate, low-power mode, x/y/z enabled
pub const CTRL_REG1_10HZ_LP_XYZ: u8 = 0x2F;

/// Accelerometer errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AccelError {
    /// Writing the control register failed
    Configure,
    /// Reading an axis register failed
    Read,
}

/// Latest acceleration sample, raw 8-bit counts per axis
#[derive(Debug, Default)]
pub struct AccelTelemetry {
    pub x: Field<i8>,
    pub y: Field<i8>,
    pub z: Field<i8>,
}

impl AccelTelemetry {
    /// Create a cell with every axis at zero
    pub const fn new() -> Self {
        Self {
            x: Field::unknown(),
            y: Field::unknown(),
            z: Field::unknown(),
        }
    }
}

impl Element for AccelTelemetry {
    fn display(&self, window: &mut Window<'_>) {
        let _ = write!(
            window,
            "+---------------+\n\
             | Accelerometer |\n\
             |    x:{:4}     |\n\
             |    y:{:4}     |\n\
             |    z:{:4}     |\n\
             +---------------+\n",
            self.x.get(),
            self.y.get(),
            self.z.get(),
        );
    }
}

/// One sample of all three axes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AccelReading {
    pub x: i8,
    pub y: i8,
    pub z: i8,
}

/// Accelerometer producer
pub struct Accelerometer<'a, B: I2cBus> {
    bus: B,
    telemetry: &'a AccelTelemetry,
}

impl<'a, B: I2cBus> Accelerometer<'a, B> {
    /// A failed read stops the applet; the cell keeps its last sample
    pub const READ_POLICY: ReadPolicy = ReadPolicy::Abandon;

    pub fn new(bus: B, telemetry: &'a AccelTelemetry) -> Self {
        Self { bus, telemetry }
    }

    /// Wrap in a task with this applet's read policy
    pub fn into_task(self) -> ProducerTask<Self> {
        ProducerTask::new(self, Self::READ_POLICY)
    }

    fn read_axis(&mut self, register: u8) -> Result<i8, AccelError> {
        self.bus
            .read_register(ADDRESS, register)
            .map(|raw| raw as i8)
            .map_err(|_| AccelError::Read)
    }
}

impl<B: I2cBus> Producer for Accelerometer<'_, B> {
    type Reading = AccelReading;
    type Error = AccelError;

    const NAME: &'static str = "accel";

    fn configure(&mut self) -> Result<(), AccelError> {
        self.bus
            .write_register(ADDRESS, reg::CTRL_REG1, CTRL_REG1_10HZ_LP_XYZ)
            .map_err(|_| AccelError::Configure)
    }

    fn sample(&mut self) -> Result<AccelReading, AccelError> {
        Ok(AccelReading {
            x: self.read_axis(reg::OUT_X_H)?,
            y: self.read_axis(reg::OUT_Y_H)?,
            z: self.read_axis(reg::OUT_Z_H)?,
        })
    }

    fn publish(&self, reading: AccelReading) {
        self.telemetry.x.set(reading.x);
        self.telemetry.y.set(reading.y);
        self.telemetry.z.set(reading.z);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::{CycleOutcome, Origin, TaskState};
    use tessera_display::Screen;

    /// Register-file mock of the accelerometer
    struct MockBus {
        registers: [u8; 0x40],
        fail_writes: bool,
        /// Reads left before the bus starts failing
        reads_left: Option<usize>,
        writes: std::vec::Vec<(u8, u8, u8)>,
    }

    impl MockBus {
        fn new() -> Self {
            Self {
                registers: [0; 0x40],
                fail_writes: false,
                reads_left: None,
                writes: std::vec::Vec::new(),
            }
        }
    }

    impl I2cBus for MockBus {
        type Error = ();

        fn write(&mut self, address: u8, data: &[u8]) -> Result<(), ()> {
            if self.fail_writes || address != ADDRESS {
                return Err(());
            }
            if let [register, value] = data {
                self.writes.push((address, *register, *value));
                self.registers[*register as usize] = *value;
            }
            Ok(())
        }

        fn read(&mut self, _address: u8, _buf: &mut [u8]) -> Result<(), ()> {
            Err(())
        }

        fn write_read(&mut self, address: u8, write: &[u8], read: &mut [u8]) -> Result<(), ()> {
            if address != ADDRESS {
                return Err(());
            }
            if let Some(left) = self.reads_left.as_mut() {
                if *left == 0 {
                    return Err(());
                }
                *left -= 1;
            }
            read[0] = self.registers[write[0] as usize];
            Ok(())
        }
    }

    #[test]
    fn test_configure_writes_ctrl_reg1() {
        let telemetry = AccelTelemetry::new();
        let mut accel = Accelerometer::new(MockBus::new(), &telemetry);
        accel.configure().unwrap();
        assert_eq!(accel.bus.writes, vec![(0x19, 0x20, 0x2F)]);
    }

    #[test]
    fn test_sample_reads_signed_high_bytes() {
        let telemetry = AccelTelemetry::new();
        let mut bus = MockBus::new();
        bus.registers[reg::OUT_X_H as usize] = 0x05;
        bus.registers[reg::OUT_Y_H as usize] = 0xFF;
        bus.registers[reg::OUT_Z_H as usize] = 0x40;

        let mut task = Accelerometer::new(bus, &telemetry).into_task();
        task.start().unwrap();
        assert_eq!(task.cycle(), CycleOutcome::Published);

        assert_eq!(telemetry.x.get(), 5);
        assert_eq!(telemetry.y.get(), -1);
        assert_eq!(telemetry.z.get(), 64);
    }

    #[test]
    fn test_configure_failure_faults() {
        let telemetry = AccelTelemetry::new();
        let mut bus = MockBus::new();
        bus.fail_writes = true;
        bus.registers[reg::OUT_X_H as usize] = 0x11;

        let mut task = Accelerometer::new(bus, &telemetry).into_task();
        assert_eq!(task.start(), Err(AccelError::Configure));
        for _ in 0..50 {
            assert_eq!(task.cycle(), CycleOutcome::Inert);
        }
        assert_eq!(telemetry.x.get(), 0);
    }

    #[test]
    fn test_read_failure_abandons() {
        let telemetry = AccelTelemetry::new();
        let mut bus = MockBus::new();
        bus.registers[reg::OUT_X_H as usize] = 0x07;
        // One full sample, then the bus dies mid-sample
        bus.reads_left = Some(4);

        let mut task = Accelerometer::new(bus, &telemetry).into_task();
        task.start().unwrap();
        assert_eq!(task.cycle(), CycleOutcome::Published);
        assert_eq!(task.cycle(), CycleOutcome::Abandoned(AccelError::Read));
        assert_eq!(task.state(), TaskState::Stopped);
        assert_eq!(telemetry.x.get(), 7);
    }

    #[test]
    fn test_render() {
        let telemetry = AccelTelemetry::new();
        telemetry.x.set(-12);
        telemetry.y.set(3);
        telemetry.z.set(64);

        let mut screen: Screen = Screen::new();
        {
            let mut window = Window::new(&mut screen, Origin { column: 0, row: 0 });
            window.setup();
            telemetry.display(&mut window);
        }
        assert_eq!(screen.line(1).map(str::trim_end), Some("+---------------+"));
        assert_eq!(screen.line(2).map(str::trim_end), Some("| Accelerometer |"));
        assert_eq!(screen.line(3).map(str::trim_end), Some("|    x: -12     |"));
        assert_eq!(screen.line(4).map(str::trim_end), Some("|    y:   3     |"));
        assert_eq!(screen.line(5).map(str::trim_end), Some("|    z:  64     |"));
        assert_eq!(screen.line(6).map(str::trim_end), Some("+---------------+"));
    }
}
