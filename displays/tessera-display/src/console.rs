//! Console byte sink
//!
//! The dashboard is the console's only writer.

use tessera_hal::UartTx;

/// Console errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConsoleError {
    /// Underlying device failed
    Io,
    /// Console buffer is full
    Overflow,
}

/// Byte sink a VT100 terminal is listening on
pub trait Console {
    /// Write raw bytes
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), ConsoleError>;

    /// Push out anything buffered
    fn flush(&mut self) -> Result<(), ConsoleError> {
        Ok(())
    }
}

impl<C: Console + ?Sized> Console for &mut C {
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), ConsoleError> {
        (**self).write_bytes(bytes)
    }

    fn flush(&mut self) -> Result<(), ConsoleError> {
        (**self).flush()
    }
}

impl<const N: usize> Console for heapless::Vec<u8, N> {
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), ConsoleError> {
        self.extend_from_slice(bytes)
            .map_err(|_| ConsoleError::Overflow)
    }
}

/// Console on a serial port
///
/// Expands `\n` to `\r\n` on the way out, as a terminal on the other end of
/// a raw UART expects.
pub struct UartConsole<T: UartTx> {
    uart: T,
}

impl<T: UartTx> UartConsole<T> {
    /// Wrap a UART transmitter
    pub fn new(uart: T) -> Self {
        Self { uart }
    }

    /// Release the UART
    pub fn into_inner(self) -> T {
        self.uart
    }
}

impl<T: UartTx> Console for UartConsole<T> {
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), ConsoleError> {
        for chunk in bytes.split_inclusive(|&b| b == b'\n') {
            match chunk.split_last() {
                Some((b'\n', line)) => {
                    self.uart
                        .write_blocking(line)
                        .map_err(|_| ConsoleError::Io)?;
                    self.uart
                        .write_blocking(b"\r\n")
                        .map_err(|_| ConsoleError::Io)?;
                }
                _ => self
                    .uart
                    .write_blocking(chunk)
                    .map_err(|_| ConsoleError::Io)?,
            }
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), ConsoleError> {
        self.uart.flush().map_err(|_| ConsoleError::Io)
    }
}
