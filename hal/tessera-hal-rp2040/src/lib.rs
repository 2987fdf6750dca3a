//! RP2040 HAL for the Tessera applet firmware
//!
//! This crate provides RP2040 implementations of the shared `tessera-hal`
//! traits on top of `embassy-rp`:
//!
//! - GPIO output and edge-interrupt input
//! - Blocking I2C master
//! - UART halves over any `embedded-io` stream, with a receive timeout
//! - Pin bank for config-driven pin assignment

#![no_std]

pub mod gpio;
pub mod i2c;
pub mod pins;
pub mod uart;

pub use gpio::{GpioError, RpEdgeInput, RpOutput};
pub use i2c::RpI2c;
pub use pins::{PinBank, PinError};
pub use uart::{IoUartRx, IoUartTx, UartError};
