//! Modem plumbing
//!
//! An AT channel over a plain UART pair, a lock for sharing it between
//! tasks, plus the two start-up routines the harness runs against the
//! modem: selecting the SIM and checking the data link before posting.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use heapless::{String, Vec};
use tessera_core::traits::{AtChannel, AtError, AtResponse, Transport, TransportError};
use tessera_hal::uart::{Error as _, ErrorKind};
use tessera_hal::{UartRx, UartTx};
use tessera_protocol::at;
use tessera_protocol::FinalResult;

/// Longest command line accepted, without `\r\n`
pub const MAX_COMMAND_LEN: usize = 64;

/// Longest single response line kept
pub const MAX_LINE_LEN: usize = 128;

/// Bytes read for one command before giving up
pub const MAX_RESPONSE_BYTES: usize = 1024;

/// Commands that switch the modem to the second SIM slot
pub const SIM_SELECT_SEQUENCE: [&str; 3] = ["AT+CFUN=4", "AT#SIMSELECT=1", "AT+CFUN=1"];

/// Probes run before posting, with the line each must answer
pub const LINK_CHECKS: [(&str, &str); 2] = [("AT+CFUN?", "+CFUN: 1"), ("AT+CEREG?", "+CEREG: 0,1")];

/// AT channel over a UART transmitter and receiver
///
/// Writes `command\r\n`, then collects response lines until a final result
/// code. The command echo and blank lines are dropped.
///
/// Bytes already waiting before a command is sent belong to an earlier
/// exchange (a reply that arrived after its command timed out) and are
/// discarded, as is whatever is left after a failed exchange.
pub struct UartAtChannel<T: UartTx, R: UartRx> {
    tx: T,
    rx: R,
}

impl<T: UartTx, R: UartRx> UartAtChannel<T, R> {
    pub fn new(tx: T, rx: R) -> Self {
        Self { tx, rx }
    }

    /// Release the UART halves
    pub fn into_inner(self) -> (T, R) {
        (self.tx, self.rx)
    }

    fn send(&mut self, command: &str) -> Result<(), AtError> {
        self.tx
            .write_blocking(command.as_bytes())
            .map_err(|_| AtError::Io)?;
        self.tx.write_blocking(b"\r\n").map_err(|_| AtError::Io)?;
        self.tx.flush().map_err(|_| AtError::Io)
    }

    /// Drop every byte already received
    ///
    /// Bounded so a modem streaming unsolicited output cannot stall the
    /// caller. Line errors on stale bytes are dropped along with them.
    fn discard_pending(&mut self) {
        for _ in 0..MAX_RESPONSE_BYTES {
            match self.rx.try_read_byte() {
                Ok(None) => return,
                Ok(Some(_)) | Err(_) => {}
            }
        }
    }

    fn collect(&mut self, command: &str) -> Result<AtResponse, AtError> {
        let mut response = AtResponse::new(FinalResult::Ok);
        let mut line: Vec<u8, MAX_LINE_LEN> = Vec::new();

        for _ in 0..MAX_RESPONSE_BYTES {
            let byte = self.rx.read_byte().map_err(|e| match e.kind() {
                ErrorKind::TimedOut => AtError::Timeout,
                _ => AtError::Io,
            })?;
            match byte {
                b'\n' => {
                    let text = core::str::from_utf8(&line).unwrap_or("").trim();
                    if let Some(result) = FinalResult::from_line(text) {
                        response.set_result(result);
                        return Ok(response);
                    }
                    if !text.is_empty() && text != command {
                        response.push_line(text)?;
                    }
                    line.clear();
                }
                b'\r' => {}
                _ => line.push(byte).map_err(|_| AtError::Overflow)?,
            }
        }

        Err(AtError::Overflow)
    }
}

impl<T: UartTx, R: UartRx> AtChannel for UartAtChannel<T, R> {
    fn command(&mut self, command: &str) -> Result<AtResponse, AtError> {
        if command.len() > MAX_COMMAND_LEN {
            return Err(AtError::CommandTooLong);
        }

        self.discard_pending();
        self.send(command)?;
        let response = self.collect(command);
        if response.is_err() {
            self.discard_pending();
        }
        response
    }
}

/// AT channel shared by several tasks on one executor
///
/// Each command runs to completion under the lock, so users never
/// interleave bytes on the wire. The raw mutex must leave interrupts
/// enabled: the UART driver underneath moves bytes from its interrupt
/// handler while the command is in flight.
pub struct SharedChannel<'a, M: RawMutex, C: AtChannel> {
    cell: &'a Mutex<M, RefCell<C>>,
}

impl<'a, M: RawMutex, C: AtChannel> SharedChannel<'a, M, C> {
    pub fn new(cell: &'a Mutex<M, RefCell<C>>) -> Self {
        Self { cell }
    }
}

impl<M: RawMutex, C: AtChannel> Clone for SharedChannel<'_, M, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M: RawMutex, C: AtChannel> Copy for SharedChannel<'_, M, C> {}

impl<M: RawMutex, C: AtChannel> AtChannel for SharedChannel<'_, M, C> {
    fn command(&mut self, command: &str) -> Result<AtResponse, AtError> {
        self.cell.lock(|channel| channel.borrow_mut().command(command))
    }
}

/// A start-up command that did not end in `OK`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CommandFailure {
    pub command: &'static str,
    pub cause: FailureCause,
}

/// Why a start-up command failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FailureCause {
    /// The modem answered with an error result (`ERROR`, `+CME ERROR`, ...)
    Result(FinalResult),
    /// The channel itself failed
    Channel(AtError),
    /// The command succeeded but did not report the expected state
    Unexpected,
}

/// Switch the modem to the second SIM slot
///
/// Runs the whole sequence even if a step fails and returns every failure
/// for the caller to report.
pub fn select_sim<C: AtChannel + ?Sized>(channel: &mut C) -> Vec<CommandFailure, 3> {
    let mut failures = Vec::new();

    for command in SIM_SELECT_SEQUENCE {
        let cause = match channel.command(command) {
            Ok(response) if response.is_ok() => continue,
            Ok(response) => FailureCause::Result(response.result()),
            Err(e) => FailureCause::Channel(e),
        };
        // At most one failure per command
        let _ = failures.push(CommandFailure { command, cause });
    }

    failures
}

/// Check the modem is powered up and registered on its home network
///
/// Stops at the first probe that fails.
pub fn link_ready<C: AtChannel + ?Sized>(channel: &mut C) -> Result<(), CommandFailure> {
    for (command, expected) in LINK_CHECKS {
        let response = channel.command(command).map_err(|e| CommandFailure {
            command,
            cause: FailureCause::Channel(e),
        })?;
        if !response.is_ok() {
            return Err(CommandFailure {
                command,
                cause: FailureCause::Result(response.result()),
            });
        }
        if !at::response_has_line(response.body(), expected) {
            return Err(CommandFailure {
                command,
                cause: FailureCause::Unexpected,
            });
        }
    }
    Ok(())
}

/// Transport that refuses to post while the modem link is down
///
/// Runs [`link_ready`] before every request, the way the modem socket
/// would be brought up per post.
pub struct LinkCheckedTransport<C: AtChannel, T: Transport> {
    channel: C,
    inner: T,
    last_failure: Option<CommandFailure>,
}

impl<C: AtChannel, T: Transport> LinkCheckedTransport<C, T> {
    pub fn new(channel: C, inner: T) -> Self {
        Self {
            channel,
            inner,
            last_failure: None,
        }
    }

    /// Probe failure behind the most recent `NotConnected`
    pub fn last_failure(&self) -> Option<CommandFailure> {
        self.last_failure
    }

    /// Borrow the wrapped transport
    pub fn inner(&self) -> &T {
        &self.inner
    }
}

impl<C: AtChannel, T: Transport> Transport for LinkCheckedTransport<C, T> {
    fn post(&mut self, request: &[u8]) -> Result<(), TransportError> {
        if let Err(failure) = link_ready(&mut self.channel) {
            self.last_failure = Some(failure);
            return Err(TransportError::NotConnected);
        }
        self.last_failure = None;
        self.inner.post(request)
    }
}

/// Format a failure as the modem log line, e.g. `AT+CFUN=4: +CME ERROR: 10`
pub fn describe(failure: &CommandFailure) -> String<96> {
    use core::fmt::Write;

    let mut out = String::new();
    let _ = match failure.cause {
        FailureCause::Result(FinalResult::CmeError(code)) => {
            write!(out, "{}: +CME ERROR: {}", failure.command, code)
        }
        FailureCause::Result(FinalResult::CmsError(code)) => {
            write!(out, "{}: +CMS ERROR: {}", failure.command, code)
        }
        FailureCause::Result(_) => write!(out, "{}: ERROR", failure.command),
        FailureCause::Channel(e) => write!(out, "{}: channel {:?}", failure.command, e),
        FailureCause::Unexpected => write!(out, "{}: unexpected response", failure.command),
    };
    out
}
