//! Tessera wire-level contracts
//!
//! This crate holds the byte formats Tessera exchanges with the outside
//! world. Nothing here touches hardware; every function is a pure encoder
//! or parser so it can be tested on the host.
//!
//! # Contracts
//!
//! - [`vt100`]: the cursor-control sequences the dashboard emits. These are
//!   bit-exact: a VT100-compatible terminal on the other end of the console
//!   UART relies on them to place each applet's window.
//! ```text
//! ESC [ {row} ; {column} H     cursor position (1-based)
//! ESC [ {count} C              cursor forward
//! ESC [ 2 J                    erase display
//! ```
//! - [`at`]: final result codes and the two information responses the
//!   cellular applet parses (`+CESQ`, `+COPS`).
//! - [`http`]: the request line the poster hands to its transport.

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(unsafe_code)]

pub mod at;
pub mod http;
pub mod vt100;

pub use at::{FinalResult, SignalQuality};
pub use http::{HttpError, MAX_REQUEST_SIZE};
pub use vt100::{Action, Sequence, Vt100Parser, ESC};
