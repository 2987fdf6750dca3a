//! AT command channel to the cellular modem

use heapless::String;
use tessera_protocol::FinalResult;

/// Largest information text kept from one response
pub const MAX_RESPONSE_LEN: usize = 256;

/// AT channel errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AtError {
    /// Underlying UART failed
    Io,
    /// No final result code arrived in time
    Timeout,
    /// Response did not fit the response buffer
    Overflow,
    /// Command line too long to send
    CommandTooLong,
}

/// Information text and final result of one command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtResponse {
    body: String<MAX_RESPONSE_LEN>,
    result: FinalResult,
}

impl AtResponse {
    /// Create a response with no information text
    pub fn new(result: FinalResult) -> Self {
        Self {
            body: String::new(),
            result,
        }
    }

    /// Append an information line, newline terminated
    pub fn push_line(&mut self, line: &str) -> Result<(), AtError> {
        self.body.push_str(line).map_err(|_| AtError::Overflow)?;
        self.body.push('\n').map_err(|_| AtError::Overflow)
    }

    /// Set the final result code
    pub fn set_result(&mut self, result: FinalResult) {
        self.result = result;
    }

    /// Information lines, without echo or final result
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Final result code
    pub fn result(&self) -> FinalResult {
        self.result
    }

    /// Check if the command ended with `OK`
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Request/response channel to an AT-command modem
pub trait AtChannel {
    /// Send `command` (without `\r\n`) and collect its response
    ///
    /// Returns `Ok` for any final result code, including `ERROR`; only
    /// transport problems are errors.
    fn command(&mut self, command: &str) -> Result<AtResponse, AtError>;
}

impl<C: AtChannel + ?Sized> AtChannel for &mut C {
    fn command(&mut self, command: &str) -> Result<AtResponse, AtError> {
        (**self).command(command)
    }
}
