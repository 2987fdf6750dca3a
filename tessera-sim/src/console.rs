//! Standard output console

use std::io::{self, Write};

use tessera_display::{Console, ConsoleError};

/// Console writing the raw VT100 stream to stdout
pub struct StdoutConsole {
    out: io::Stdout,
}

impl StdoutConsole {
    pub fn new() -> Self {
        Self { out: io::stdout() }
    }
}

impl Default for StdoutConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl Console for StdoutConsole {
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), ConsoleError> {
        self.out.lock().write_all(bytes).map_err(|_| ConsoleError::Io)
    }

    fn flush(&mut self) -> Result<(), ConsoleError> {
        self.out.lock().flush().map_err(|_| ConsoleError::Io)
    }
}
