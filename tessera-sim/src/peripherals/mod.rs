//! Simulated board peripherals
//!
//! Each one implements the HAL trait the matching applet is written
//! against, so the applets run unchanged.

pub mod accel;
pub mod button;
pub mod led;
pub mod modem;

pub use accel::{SimAccelBus, SimBusError};
pub use button::{ButtonLine, SimButton, SimPinError};
pub use led::SimLed;
pub use modem::{SharedModem, SimChannel, SimModem, SimModemRx, SimModemTx, SimUartError};
