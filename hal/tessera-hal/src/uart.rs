//! Serial port traits
//!
//! The console and the modem both sit on a UART. Reads and writes are
//! blocking; a receiver that has nothing to deliver within its own timeout
//! returns an error instead of hanging its caller.
//!
//! Receive errors are classified with [`embedded_io::ErrorKind`] so protocol
//! code can tell a quiet line ([`ErrorKind::TimedOut`]) from a broken one.

pub use embedded_io::{Error, ErrorKind};

/// Sending half of a serial port
pub trait UartTx {
    type Error;

    /// Queue all of `data` for transmission
    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Wait until everything queued has left the port
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// Receiving half of a serial port
pub trait UartRx {
    type Error: Error;

    /// Fill `buf` completely, returning its length
    ///
    /// Fails with a [`ErrorKind::TimedOut`] error when the line goes quiet
    /// before `buf` is full.
    fn read_blocking(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Take one byte if one has already arrived, without waiting
    fn try_read_byte(&mut self) -> Result<Option<u8>, Self::Error>;

    /// Receive one byte
    fn read_byte(&mut self) -> Result<u8, Self::Error> {
        let mut byte = [0u8];
        self.read_blocking(&mut byte)?;
        Ok(byte[0])
    }
}

/// Line settings shared by every port on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UartConfig {
    pub baudrate: u32,
    pub data_bits: DataBits,
    pub parity: Parity,
    pub stop_bits: StopBits,
}

impl UartConfig {
    /// 115200 8N1, what both the VT100 terminal and the modem expect
    pub const DEFAULT: Self = Self::eight_n_one(115_200);

    /// 8 data bits, no parity, 1 stop bit at `baudrate`
    pub const fn eight_n_one(baudrate: u32) -> Self {
        Self {
            baudrate,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
        }
    }
}

impl Default for UartConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataBits {
    Seven,
    Eight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parity {
    None,
    Even,
    Odd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopBits {
    One,
    Two,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Eq)]
    struct Quiet;

    impl Error for Quiet {
        fn kind(&self) -> ErrorKind {
            ErrorKind::TimedOut
        }
    }

    /// Receiver replaying a fixed byte string, then timing out
    struct Replay<'a> {
        bytes: &'a [u8],
    }

    impl UartRx for Replay<'_> {
        type Error = Quiet;

        fn read_blocking(&mut self, buf: &mut [u8]) -> Result<usize, Quiet> {
            if self.bytes.len() < buf.len() {
                return Err(Quiet);
            }
            let (head, tail) = self.bytes.split_at(buf.len());
            buf.copy_from_slice(head);
            self.bytes = tail;
            Ok(buf.len())
        }

        fn try_read_byte(&mut self) -> Result<Option<u8>, Quiet> {
            let Some((&first, rest)) = self.bytes.split_first() else {
                return Ok(None);
            };
            self.bytes = rest;
            Ok(Some(first))
        }
    }

    #[test]
    fn test_read_byte_walks_input() {
        let mut rx = Replay { bytes: b"OK" };
        assert_eq!(rx.read_byte(), Ok(b'O'));
        assert_eq!(rx.read_byte(), Ok(b'K'));
        let err = rx.read_byte().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TimedOut);
    }

    #[test]
    fn test_try_read_byte_does_not_wait() {
        let mut rx = Replay { bytes: b"A" };
        assert_eq!(rx.try_read_byte(), Ok(Some(b'A')));
        assert_eq!(rx.try_read_byte(), Ok(None));
    }

    #[test]
    fn test_default_is_115200_8n1() {
        let config = UartConfig::default();
        assert_eq!(config, UartConfig::eight_n_one(115_200));
        assert_eq!(config.parity, Parity::None);
    }
}
