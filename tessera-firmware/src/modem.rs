//! Modem sharing and the outbound transport
//!
//! The cell producer and the poster's link check both talk to the one
//! modem UART. Each command runs to completion under the lock, so the two
//! tasks never interleave bytes.

use core::cell::RefCell;

use defmt::*;
use embassy_sync::blocking_mutex::raw::ThreadModeRawMutex;
use embassy_sync::blocking_mutex::Mutex;

use tessera_applets::SharedChannel;
use tessera_core::traits::{Transport, TransportError};

use crate::board::ModemChannel;

/// The modem channel behind its lock
///
/// Every task runs on the thread-mode executor, so a thread-mode lock is
/// enough and the UART interrupts stay live while a command is in flight.
pub type ModemCell = Mutex<ThreadModeRawMutex, RefCell<ModemChannel>>;

/// Handle to the shared modem channel
pub type SharedModem = SharedChannel<'static, ThreadModeRawMutex, ModemChannel>;

/// Transport that writes each request to the defmt log
///
/// Stands where a modem socket would go; the link check in front of it
/// still gates every post on the real modem state.
pub struct DefmtTransport;

impl Transport for DefmtTransport {
    fn post(&mut self, request: &[u8]) -> Result<(), TransportError> {
        info!("Outbound: {=[u8]:a}", request);
        Ok(())
    }
}
