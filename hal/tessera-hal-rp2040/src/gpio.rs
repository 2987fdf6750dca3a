//! GPIO implementations

use embassy_rp::gpio::{AnyPin, Input, Level, Output, Pull as RpPull};
use embassy_rp::Peri;
use tessera_hal::{Edge, EdgeHandler, EdgeInterrupt, InputPin, OutputPin, Pull};

/// Push-pull output pin
pub struct RpOutput {
    pin: Output<'static>,
}

impl RpOutput {
    /// Take `pin` as an output driven low
    pub fn new(pin: Peri<'static, AnyPin>) -> Self {
        Self {
            pin: Output::new(pin, Level::Low),
        }
    }
}

impl OutputPin for RpOutput {
    fn set_high(&mut self) {
        self.pin.set_high();
    }

    fn set_low(&mut self) {
        self.pin.set_low();
    }

    fn toggle(&mut self) {
        self.pin.toggle();
    }

    fn is_set_high(&self) -> bool {
        self.pin.is_set_high()
    }
}

/// GPIO errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GpioError {
    /// The pin was already configured
    AlreadyConfigured,
    /// `listen` called before `configure_input`
    NotConfigured,
}

/// Input pin whose edges are delivered to a listener
///
/// The RP2040 GPIO interrupt is owned by embassy-rp, which exposes edges
/// as futures. [`RpEdgeInput::dispatch`] awaits the configured edge and
/// calls the listener; the owning task loops over it.
pub struct RpEdgeInput {
    pin: Option<Peri<'static, AnyPin>>,
    input: Option<Input<'static>>,
    edge: Edge,
    handler: Option<EdgeHandler>,
}

impl RpEdgeInput {
    pub fn new(pin: Peri<'static, AnyPin>) -> Self {
        Self {
            pin: Some(pin),
            input: None,
            edge: Edge::Falling,
            handler: None,
        }
    }

    /// Wait for the next edge and hand it to the listener
    ///
    /// Pends forever if no listener is attached.
    pub async fn dispatch(&mut self) {
        let (Some(input), Some(handler)) = (self.input.as_mut(), self.handler) else {
            core::future::pending::<()>().await;
            return;
        };
        match self.edge {
            Edge::Rising => input.wait_for_rising_edge().await,
            Edge::Falling => input.wait_for_falling_edge().await,
            Edge::Any => input.wait_for_any_edge().await,
        }
        handler.on_edge();
    }
}

impl InputPin for RpEdgeInput {
    fn is_high(&self) -> bool {
        self.input.as_ref().map(|input| input.is_high()).unwrap_or(false)
    }
}

impl EdgeInterrupt for RpEdgeInput {
    type Error = GpioError;

    fn configure_input(&mut self, pull: Pull) -> Result<(), GpioError> {
        let pin = self.pin.take().ok_or(GpioError::AlreadyConfigured)?;
        let pull = match pull {
            Pull::None => RpPull::None,
            Pull::Up => RpPull::Up,
            Pull::Down => RpPull::Down,
        };
        self.input = Some(Input::new(pin, pull));
        Ok(())
    }

    fn listen(&mut self, edge: Edge, handler: EdgeHandler) -> Result<(), GpioError> {
        if self.input.is_none() {
            return Err(GpioError::NotConfigured);
        }
        self.edge = edge;
        self.handler = Some(handler);
        Ok(())
    }
}
