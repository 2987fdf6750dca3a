//! In-memory VT100 terminal
//!
//! A character grid that interprets the subset of VT100 the dashboard
//! emits. Tests render into it and inspect the result; the simulator uses
//! it to print a plain-text snapshot of the dashboard.
//!
//! A line feed also returns the carriage, as a terminal on a UART or a tty
//! in cooked mode does.

use core::fmt;

use tessera_protocol::{Action, Vt100Parser};

use crate::console::{Console, ConsoleError};

/// Default screen width in characters
pub const SCREEN_COLS: usize = 80;

/// Default screen height in lines
pub const SCREEN_ROWS: usize = 26;

/// Character grid driven by a VT100 byte stream
///
/// Characters written past the right or bottom edge are dropped.
#[derive(Clone)]
pub struct Screen<const COLS: usize = SCREEN_COLS, const ROWS: usize = SCREEN_ROWS> {
    cells: [[u8; COLS]; ROWS],
    row: usize,
    column: usize,
    parser: Vt100Parser,
}

impl<const COLS: usize, const ROWS: usize> Default for Screen<COLS, ROWS> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const COLS: usize, const ROWS: usize> Screen<COLS, ROWS> {
    /// Create a blank screen with the cursor at the top-left corner
    pub fn new() -> Self {
        Self {
            cells: [[b' '; COLS]; ROWS],
            row: 0,
            column: 0,
            parser: Vt100Parser::new(),
        }
    }

    /// Blank every cell and home the cursor
    pub fn clear(&mut self) {
        self.cells = [[b' '; COLS]; ROWS];
        self.row = 0;
        self.column = 0;
    }

    /// Cursor position as 0-based `(row, column)`
    pub fn cursor(&self) -> (usize, usize) {
        (self.row, self.column)
    }

    /// Character at 0-based `(row, column)`
    pub fn char_at(&self, row: usize, column: usize) -> Option<char> {
        self.cells
            .get(row)
            .and_then(|line| line.get(column))
            .map(|&b| b as char)
    }

    /// Full line `row`, including trailing blanks
    pub fn line(&self, row: usize) -> Option<&str> {
        // Cells only ever hold printable ASCII
        self.cells
            .get(row)
            .and_then(|line| core::str::from_utf8(line).ok())
    }

    /// `len` characters of line `row` starting at `column`
    pub fn text_at(&self, row: usize, column: usize, len: usize) -> Option<&str> {
        let line = self.line(row)?;
        let end = column.checked_add(len)?.min(COLS);
        line.get(column..end)
    }

    /// Apply raw VT100 bytes
    pub fn feed(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            if let Some(action) = self.parser.feed(byte) {
                self.apply(action);
            }
        }
    }

    fn apply(&mut self, action: Action) {
        match action {
            Action::Print(byte) => {
                if let Some(cell) = self
                    .cells
                    .get_mut(self.row)
                    .and_then(|line| line.get_mut(self.column))
                {
                    *cell = byte;
                }
                self.column = self.column.saturating_add(1);
            }
            Action::LineFeed => {
                self.row = self.row.saturating_add(1);
                self.column = 0;
            }
            Action::CarriageReturn => self.column = 0,
            Action::CursorPosition { row, column } => {
                self.row = row.saturating_sub(1);
                self.column = column.saturating_sub(1);
            }
            Action::CursorForward(count) => {
                self.column = self.column.saturating_add(count);
            }
            Action::EraseDisplay(2) => {
                self.cells = [[b' '; COLS]; ROWS];
            }
            Action::EraseDisplay(_) => {}
        }
    }
}

impl<const COLS: usize, const ROWS: usize> Console for Screen<COLS, ROWS> {
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), ConsoleError> {
        self.feed(bytes);
        Ok(())
    }
}

impl<const COLS: usize, const ROWS: usize> fmt::Display for Screen<COLS, ROWS> {
    /// Every line with trailing blanks trimmed
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..ROWS {
            let line = self.line(row).unwrap_or("");
            writeln!(f, "{}", line.trim_end())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::Window;
    use tessera_core::Origin;

    #[test]
    fn test_print_and_cursor() {
        let mut screen: Screen<10, 3> = Screen::new();
        screen.feed(b"hi");
        assert_eq!(screen.text_at(0, 0, 2), Some("hi"));
        assert_eq!(screen.cursor(), (0, 2));
    }

    #[test]
    fn test_cursor_position_is_one_based() {
        let mut screen: Screen<10, 3> = Screen::new();
        screen.feed(b"\x1b[2;5Hx");
        assert_eq!(screen.char_at(1, 4), Some('x'));
    }

    #[test]
    fn test_clip_at_edges() {
        let mut screen: Screen<4, 2> = Screen::new();
        screen.feed(b"abcdef");
        assert_eq!(screen.line(0), Some("abcd"));
        screen.feed(b"\x1b[9;1Hz");
        assert_eq!(screen.line(1), Some("    "));
    }

    #[test]
    fn test_erase_display() {
        let mut screen: Screen<4, 2> = Screen::new();
        screen.feed(b"ab\x1b[2J");
        assert_eq!(screen.line(0), Some("    "));
        // Cursor is not moved by ED
        assert_eq!(screen.cursor(), (0, 2));
    }

    #[test]
    fn test_window_lines_stay_in_column() {
        let mut screen: Screen = Screen::new();
        {
            let mut window = Window::new(&mut screen, Origin { column: 20, row: 8 });
            window.setup();
            window.print(format_args!("+--+\n|ok|\n+--+"));
        }
        assert_eq!(screen.text_at(9, 20, 4), Some("+--+"));
        assert_eq!(screen.text_at(10, 20, 4), Some("|ok|"));
        assert_eq!(screen.text_at(11, 20, 4), Some("+--+"));
    }

    #[test]
    fn test_display_trims() {
        let mut screen: Screen<6, 2> = Screen::new();
        screen.feed(b"ab\ncd");
        let mut out = std::string::String::new();
        fmt::Write::write_fmt(&mut out, format_args!("{}", screen)).unwrap();
        assert_eq!(out, "ab\ncd\n");
    }
}
