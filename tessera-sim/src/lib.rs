//! Tessera host simulator
//!
//! Runs the same applets, dashboard and poster as the firmware, with the
//! board replaced by simulated peripherals:
//!
//! - an accelerometer register file on a simulated I2C bus
//! - a button line pressed on a timer
//! - a cellular modem answering AT commands over a simulated UART
//! - an LED that counts its transitions
//!
//! Producers run on their own threads and publish into the shared
//! telemetry cells. The dashboard and the poster share the main thread.

pub mod config;
pub mod console;
pub mod harness;
pub mod peripherals;
pub mod transport;

pub use config::{SimConfig, SimOptions};
pub use console::StdoutConsole;
pub use harness::{run, RunOptions, RunSummary};
pub use transport::SimTransport;
