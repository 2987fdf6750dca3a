//! LED blinker applet
//!
//! Toggles an output pin every half period. It has no telemetry and is
//! not rendered; it exists to show the board is alive.

use core::convert::Infallible;

use tessera_core::producer::half_period_ms;
use tessera_core::{Producer, ProducerTask, ReadPolicy};
use tessera_hal::OutputPin;

/// Blinker producer
///
/// Each cycle is one toggle, so the task should be scheduled every
/// [`Blinky::toggle_period_ms`].
pub struct Blinky<P: OutputPin> {
    pin: P,
    rate_hz: u32,
}

impl<P: OutputPin> Blinky<P> {
    pub const READ_POLICY: ReadPolicy = ReadPolicy::SkipAndRetry;

    /// Blink `pin` at `rate_hz` full on/off cycles per second
    pub fn new(pin: P, rate_hz: u32) -> Self {
        Self { pin, rate_hz }
    }

    /// Wrap in a task with this applet's read policy
    pub fn into_task(self) -> ProducerTask<Self> {
        ProducerTask::new(self, Self::READ_POLICY)
    }

    /// Interval between toggles
    pub fn toggle_period_ms(&self) -> u32 {
        half_period_ms(self.rate_hz)
    }

    /// Check if the LED is currently lit
    pub fn is_lit(&self) -> bool {
        self.pin.is_set_high()
    }
}

impl<P: OutputPin> Producer for Blinky<P> {
    /// Pin level after the toggle
    type Reading = bool;
    type Error = Infallible;

    const NAME: &'static str = "blinky";

    /// Start dark
    fn configure(&mut self) -> Result<(), Infallible> {
        self.pin.set_low();
        Ok(())
    }

    fn sample(&mut self) -> Result<bool, Infallible> {
        self.pin.toggle();
        Ok(self.pin.is_set_high())
    }

    fn publish(&self, _level: bool) {}
}
