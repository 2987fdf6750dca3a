//! Display window
//!
//! A window is a short-lived view of the console anchored at one grid
//! cell. The dashboard builds one per element per pass and drops it right
//! after the element has drawn.

use core::fmt::{self, Write};

use tessera_core::Origin;
use tessera_protocol::vt100;

use crate::console::{Console, ConsoleError};

/// Rectangular region of the console addressed by its upper-left corner
pub struct Window<'w> {
    console: &'w mut dyn Console,
    origin: Origin,
    fault: Option<ConsoleError>,
}

impl<'w> Window<'w> {
    /// Create a window at `origin`
    pub fn new(console: &'w mut dyn Console, origin: Origin) -> Self {
        Self {
            console,
            origin,
            fault: None,
        }
    }

    /// Move the cursor to the window's upper-left corner
    ///
    /// Emits `ESC [ {row + 2} ; {column + 1} H`. The extra line leaves the
    /// terminal's top row free.
    pub fn setup(&mut self) {
        let seq = vt100::cursor_position(
            self.origin.row as usize + 2,
            self.origin.column as usize + 1,
        );
        self.emit(seq.as_bytes());
    }

    /// Print formatted text inside the window
    ///
    /// Every `\n` is followed by a cursor-forward to the window's column so
    /// the next line starts inside the window again.
    pub fn print(&mut self, args: fmt::Arguments<'_>) {
        // write_str never fails; faults are latched instead
        let _ = self.write_fmt(args);
    }

    /// Upper-left corner of the window
    pub fn origin(&self) -> Origin {
        self.origin
    }

    /// Check if any write to the console failed
    pub fn is_faulted(&self) -> bool {
        self.fault.is_some()
    }

    /// First console error seen by this window
    pub fn fault(&self) -> Option<ConsoleError> {
        self.fault
    }

    /// Re-align the cursor to the window's column after a newline
    ///
    /// A single-column move is never emitted, matching the terminal
    /// behavior the dashboard layout was drawn against.
    fn realign(&mut self) {
        let column = self.origin.column as usize;
        if column > 1 {
            let seq = vt100::cursor_forward(column);
            self.emit(seq.as_bytes());
        }
    }

    fn emit(&mut self, bytes: &[u8]) {
        if self.fault.is_some() {
            return;
        }
        if let Err(e) = self.console.write_bytes(bytes) {
            self.fault = Some(e);
        }
    }
}

impl Write for Window<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for chunk in s.split_inclusive('\n') {
            self.emit(chunk.as_bytes());
            if chunk.ends_with('\n') {
                self.realign();
            }
        }
        Ok(())
    }
}
