//! UART halves over `embedded-io` streams
//!
//! The firmware hands in embassy-rp's buffered UART halves. Reads poll the
//! receive buffer against a deadline so a silent modem cannot hang the
//! caller.

use embassy_rp::uart;
use embassy_time::{Duration, Instant};
use embedded_io::{Read, ReadReady, Write};
use tessera_hal::uart::{DataBits, ErrorKind, Parity, StopBits, UartConfig};
use tessera_hal::{UartRx, UartTx};

/// Default receive timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(2000);

/// Translate a HAL UART configuration to embassy-rp's
pub fn rp_config(config: &UartConfig) -> uart::Config {
    let mut rp = uart::Config::default();
    rp.baudrate = config.baudrate;
    rp.data_bits = match config.data_bits {
        DataBits::Seven => uart::DataBits::DataBits7,
        DataBits::Eight => uart::DataBits::DataBits8,
    };
    rp.parity = match config.parity {
        Parity::None => uart::Parity::ParityNone,
        Parity::Even => uart::Parity::ParityEven,
        Parity::Odd => uart::Parity::ParityOdd,
    };
    rp.stop_bits = match config.stop_bits {
        StopBits::One => uart::StopBits::STOP1,
        StopBits::Two => uart::StopBits::STOP2,
    };
    rp
}

/// UART errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UartError {
    /// The peripheral reported an error (overrun, framing, break)
    Io,
    /// No byte arrived before the deadline
    Timeout,
}

impl embedded_io::Error for UartError {
    fn kind(&self) -> ErrorKind {
        match self {
            UartError::Io => ErrorKind::Other,
            UartError::Timeout => ErrorKind::TimedOut,
        }
    }
}

/// Transmit half
pub struct IoUartTx<W: Write> {
    inner: W,
}

impl<W: Write> IoUartTx<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }
}

impl<W: Write> UartTx for IoUartTx<W> {
    type Error = UartError;

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), UartError> {
        self.inner.write_all(data).map_err(|_| UartError::Io)
    }

    fn flush(&mut self) -> Result<(), UartError> {
        self.inner.flush().map_err(|_| UartError::Io)
    }
}

/// Receive half with a per-read deadline
pub struct IoUartRx<R: Read + ReadReady> {
    inner: R,
    timeout: Duration,
}

impl<R: Read + ReadReady> IoUartRx<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Change how long a read waits for data
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl<R: Read + ReadReady> UartRx for IoUartRx<R> {
    type Error = UartError;

    fn read_blocking(&mut self, buf: &mut [u8]) -> Result<usize, UartError> {
        let deadline = Instant::now() + self.timeout;
        let mut filled = 0;

        while filled < buf.len() {
            if self.inner.read_ready().map_err(|_| UartError::Io)? {
                filled += self
                    .inner
                    .read(&mut buf[filled..])
                    .map_err(|_| UartError::Io)?;
            } else if Instant::now() >= deadline {
                return Err(UartError::Timeout);
            }
        }

        Ok(filled)
    }

    fn try_read_byte(&mut self) -> Result<Option<u8>, UartError> {
        if !self.inner.read_ready().map_err(|_| UartError::Io)? {
            return Ok(None);
        }
        let mut byte = [0u8];
        let n = self.inner.read(&mut byte).map_err(|_| UartError::Io)?;
        Ok((n == 1).then_some(byte[0]))
    }
}
