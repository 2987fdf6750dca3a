//! VT100 cursor-control sequences
//!
//! Encoder for the handful of control sequences the dashboard emits, and a
//! byte-at-a-time parser for the same subset. The parser backs the
//! in-memory screen used by tests and the simulator's snapshot mode; it
//! ignores anything outside the subset instead of failing.
//!
//! Coordinates on the wire are 1-based.

use core::fmt::Write;

use heapless::String;

/// Escape byte that introduces every control sequence
pub const ESC: u8 = 0x1B;

/// Longest sequence this module produces
///
/// `ESC [ <20 digits> ; <20 digits> H` is 44 bytes; rounded up.
pub const MAX_SEQUENCE_LEN: usize = 48;

/// Maximum numeric parameters kept per CSI sequence
const MAX_PARAMS: usize = 2;

/// An encoded control sequence
pub type Sequence = String<MAX_SEQUENCE_LEN>;

/// `ESC [ row ; column H` - move the cursor to an absolute position
pub fn cursor_position(row: usize, column: usize) -> Sequence {
    let mut seq = Sequence::new();
    // Capacity covers two usize values, so this cannot overflow
    let _ = write!(seq, "\x1b[{};{}H", row, column);
    seq
}

/// `ESC [ count C` - move the cursor right by `count` columns
pub fn cursor_forward(count: usize) -> Sequence {
    let mut seq = Sequence::new();
    let _ = write!(seq, "\x1b[{}C", count);
    seq
}

/// `ESC [ 2 J` - erase the whole display
pub fn erase_display() -> Sequence {
    let mut seq = Sequence::new();
    let _ = seq.push_str("\x1b[2J");
    seq
}

/// `ESC [ H` - move the cursor to the upper left corner
pub fn cursor_home() -> Sequence {
    let mut seq = Sequence::new();
    let _ = seq.push_str("\x1b[H");
    seq
}

/// Decoded terminal action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Action {
    /// Printable ASCII character
    Print(u8),
    /// `\n` - next line
    LineFeed,
    /// `\r` - first column
    CarriageReturn,
    /// Absolute cursor position (1-based)
    CursorPosition { row: usize, column: usize },
    /// Cursor forward by the given number of columns
    CursorForward(usize),
    /// Erase display (0 = below, 1 = above, 2 = all)
    EraseDisplay(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    /// Plain characters
    Ground,
    /// Got ESC, waiting for `[`
    Escape,
    /// Inside a CSI sequence, collecting parameters
    Csi,
}

/// State machine for decoding a VT100 byte stream
#[derive(Debug, Clone)]
pub struct Vt100Parser {
    state: ParseState,
    params: [usize; MAX_PARAMS],
    /// Number of parameters seen so far (0 = none given)
    count: usize,
}

impl Default for Vt100Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Vt100Parser {
    /// Create a new parser in the ground state
    pub const fn new() -> Self {
        Self {
            state: ParseState::Ground,
            params: [0; MAX_PARAMS],
            count: 0,
        }
    }

    /// Reset to the ground state, dropping any partial sequence
    pub fn reset(&mut self) {
        self.state = ParseState::Ground;
        self.params = [0; MAX_PARAMS];
        self.count = 0;
    }

    /// Feed a single byte
    ///
    /// Returns `Some(action)` when the byte completes something the
    /// terminal should act on.
    pub fn feed(&mut self, byte: u8) -> Option<Action> {
        match self.state {
            ParseState::Ground => match byte {
                ESC => {
                    self.state = ParseState::Escape;
                    None
                }
                b'\n' => Some(Action::LineFeed),
                b'\r' => Some(Action::CarriageReturn),
                0x20..=0x7E => Some(Action::Print(byte)),
                _ => None,
            },
            ParseState::Escape => {
                if byte == b'[' {
                    self.params = [0; MAX_PARAMS];
                    self.count = 0;
                    self.state = ParseState::Csi;
                } else {
                    self.state = ParseState::Ground;
                }
                None
            }
            ParseState::Csi => match byte {
                b'0'..=b'9' => {
                    if self.count == 0 {
                        self.count = 1;
                    }
                    let index = self.count - 1;
                    if index < MAX_PARAMS {
                        let digit = (byte - b'0') as usize;
                        self.params[index] = self.params[index]
                            .saturating_mul(10)
                            .saturating_add(digit);
                    }
                    None
                }
                b';' => {
                    if self.count == 0 {
                        self.count = 1;
                    }
                    self.count = self.count.saturating_add(1);
                    None
                }
                0x40..=0x7E => {
                    self.state = ParseState::Ground;
                    self.dispatch(byte)
                }
                _ => {
                    self.reset();
                    None
                }
            },
        }
    }

    /// Feed multiple bytes, handing every decoded action to `sink`
    pub fn feed_bytes(&mut self, bytes: &[u8], mut sink: impl FnMut(Action)) {
        for &byte in bytes {
            if let Some(action) = self.feed(byte) {
                sink(action);
            }
        }
    }

    fn dispatch(&self, final_byte: u8) -> Option<Action> {
        match final_byte {
            b'H' | b'f' => Some(Action::CursorPosition {
                row: self.param_or_one(0),
                column: self.param_or_one(1),
            }),
            b'C' => Some(Action::CursorForward(self.param_or_one(0))),
            b'J' => Some(Action::EraseDisplay(if self.count > 0 { self.params[0] } else { 0 })),
            _ => None,
        }
    }

    /// Parameter `index`, with VT100's "missing or zero means one" rule
    fn param_or_one(&self, index: usize) -> usize {
        if index < self.count && index < MAX_PARAMS && self.params[index] != 0 {
            self.params[index]
        } else {
            1
        }
    }
}
