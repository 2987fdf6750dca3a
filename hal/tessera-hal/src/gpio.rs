//! Digital pin traits
//!
//! Outputs drive the LED, inputs read the button. Edge interrupts hand each
//! edge to a listener that owns whatever state the edge updates.

/// Push-pull output
pub trait OutputPin {
    fn set_high(&mut self);

    fn set_low(&mut self);

    /// Flip the driven level
    fn toggle(&mut self) {
        let high = self.is_set_high();
        self.set_state(!high);
    }

    fn set_state(&mut self, high: bool) {
        match high {
            true => self.set_high(),
            false => self.set_low(),
        }
    }

    /// Level currently being driven (not read back from the pad)
    fn is_set_high(&self) -> bool;

    fn is_set_low(&self) -> bool {
        !self.is_set_high()
    }
}

/// Sampled input
pub trait InputPin {
    fn is_high(&self) -> bool;

    fn is_low(&self) -> bool {
        !self.is_high()
    }
}

/// Internal pull resistor selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pull {
    None,
    Up,
    Down,
}

/// Edge that triggers an interrupt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
    Rising,
    Falling,
    Any,
}

/// Receiver of edge interrupts
///
/// The listener carries its own context (typically the telemetry the edge
/// feeds) instead of the HAL handing back a raw callback struct the owner
/// has to be recovered from. Any `Fn() + Sync` closure is a listener.
pub trait EdgeListener: Sync {
    /// Called once per detected edge, in interrupt (or interrupt-like) context
    fn on_edge(&self);
}

impl<F: Fn() + Sync> EdgeListener for F {
    fn on_edge(&self) {
        self()
    }
}

/// Interrupt handler attached to an input edge
pub type EdgeHandler = &'static dyn EdgeListener;

/// Input pin that can raise an interrupt on an edge
pub trait EdgeInterrupt: InputPin {
    /// Error type for interrupt configuration
    type Error;

    /// Configure the pin as an input with the given pull resistor
    fn configure_input(&mut self, pull: Pull) -> Result<(), Self::Error>;

    /// Attach `handler` to `edge` and enable the interrupt
    ///
    /// The handler runs in interrupt (or interrupt-like) context and must
    /// not block.
    fn listen(&mut self, edge: Edge, handler: EdgeHandler) -> Result<(), Self::Error>;
}
