//! Applet implementations
//!
//! This crate provides the concrete producers that feed the dashboard and
//! the poster, each written against the `tessera-hal` traits:
//!
//! - Accelerometer (LIS3DH-class, I2C)
//! - Push button (GPIO edge interrupt)
//! - Cellular modem status (AT channel)
//! - LED blinker (GPIO output)
//!
//! plus the UART-backed AT channel and the modem start-up helpers.
//!
//! Every telemetry cell doubles as the dashboard element that renders it.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod accel;
pub mod blinky;
pub mod button;
pub mod cell;
pub mod modem;

pub use accel::{AccelError, AccelReading, AccelTelemetry, Accelerometer};
pub use blinky::Blinky;
pub use button::{Button, ButtonError, ButtonTelemetry};
pub use cell::{Carrier, CellError, CellModem, CellPoster, CellReading, CellTelemetry};
pub use modem::{
    describe, link_ready, select_sim, CommandFailure, FailureCause, LinkCheckedTransport,
    SharedChannel, UartAtChannel,
};
