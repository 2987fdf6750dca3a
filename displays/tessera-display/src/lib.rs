//! Dashboard compositing for the applet harness
//!
//! This crate provides:
//! - `Console` trait for the byte sink the dashboard renders into
//! - `Window` for drawing inside one grid cell
//! - `Element` trait for anything that renders itself into a window
//! - `Dashboard`, the compositor that lays out and renders every element
//! - `Screen`, an in-memory VT100 terminal for tests and snapshots
//!
//! # Architecture
//!
//! The dashboard owns the console. Once per pass it visits every
//! registered element in registration order, positions a fresh window at
//! the element's grid cell and lets the element print into it. Elements
//! only read telemetry; they never see the console directly.
//!
//! ```text
//! +----------+----------+----------+
//! | slot 0   | slot 1   | slot 2   |
//! +----------+----------+----------+
//! | slot 3   | slot 4   | ...      |
//! ```

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod console;
pub mod dashboard;
pub mod element;
pub mod screen;
pub mod window;

// Re-export key types
pub use console::{Console, ConsoleError, UartConsole};
pub use dashboard::{Dashboard, PassReport, MAX_ELEMENTS};
pub use element::Element;
pub use screen::Screen;
pub use window::Window;
