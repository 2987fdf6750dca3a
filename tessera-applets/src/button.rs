//! Push-button applet
//!
//! Counts presses on an active-low button. The count is bumped directly
//! from the edge interrupt; there is no polling cycle. The telemetry cell
//! itself is the interrupt listener, so the handler needs no way back to
//! its owner.

use core::fmt::Write;

use tessera_core::{Counter, Producer, ProducerTask, ReadPolicy};
use tessera_display::{Element, Window};
use tessera_hal::{Edge, EdgeInterrupt, EdgeListener, Pull};

/// Button errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonError {
    /// Pin could not be set up as a pulled-up input
    Configure,
    /// Edge interrupt could not be attached
    Listen,
}

/// Press count, wraps at 256
#[derive(Debug, Default)]
pub struct ButtonTelemetry {
    pub presses: Counter,
}

impl ButtonTelemetry {
    pub const fn new() -> Self {
        Self {
            presses: Counter::new(),
        }
    }
}

impl EdgeListener for ButtonTelemetry {
    fn on_edge(&self) {
        self.presses.increment();
    }
}

impl Element for ButtonTelemetry {
    fn display(&self, window: &mut Window<'_>) {
        let _ = write!(
            window,
            "+---------------+\n\
             |    Button     |\n\
             |  Count:{:4}   |\n\
             +---------------+\n",
            self.presses.get(),
        );
    }
}

/// Button producer
///
/// `configure` arms the interrupt; after that the pin does all the work.
pub struct Button<P: EdgeInterrupt> {
    pin: P,
    telemetry: &'static ButtonTelemetry,
}

impl<P: EdgeInterrupt> Button<P> {
    pub const READ_POLICY: ReadPolicy = ReadPolicy::SkipAndRetry;

    pub fn new(pin: P, telemetry: &'static ButtonTelemetry) -> Self {
        Self { pin, telemetry }
    }

    /// Wrap in a task with this applet's read policy
    pub fn into_task(self) -> ProducerTask<Self> {
        ProducerTask::new(self, Self::READ_POLICY)
    }

    /// Borrow the pin, e.g. to service edge events on targets that
    /// deliver them asynchronously
    pub fn pin_mut(&mut self) -> &mut P {
        &mut self.pin
    }
}

impl<P: EdgeInterrupt> Producer for Button<P> {
    type Reading = u8;
    type Error = ButtonError;

    const NAME: &'static str = "button";

    fn configure(&mut self) -> Result<(), ButtonError> {
        self.pin
            .configure_input(Pull::Up)
            .map_err(|_| ButtonError::Configure)?;
        self.pin
            .listen(Edge::Falling, self.telemetry)
            .map_err(|_| ButtonError::Listen)
    }

    /// The current count; the interrupt has already published it
    fn sample(&mut self) -> Result<u8, ButtonError> {
        Ok(self.telemetry.presses.get())
    }

    fn publish(&self, _reading: u8) {}
}
