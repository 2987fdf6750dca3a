//! Renderable dashboard elements

use crate::window::Window;

/// Anything that can draw itself into a dashboard window
///
/// The dashboard has already moved the cursor to the window's corner when
/// `display` is called. Implementations read their telemetry and print;
/// console faults are absorbed by the window.
pub trait Element {
    fn display(&self, window: &mut Window<'_>);
}
