//! Simulated button line
//!
//! [`SimButton`] is the pin the applet configures. [`ButtonLine`] is the
//! other end of the wire: pressing it delivers a falling edge to whatever
//! listener the pin holds.

use std::sync::{Arc, Mutex, PoisonError};

use tessera_hal::{Edge, EdgeHandler, EdgeInterrupt, InputPin, Pull};

/// Pin errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimPinError {
    /// `listen` called before `configure_input`
    NotConfigured,
}

#[derive(Default)]
struct Wiring {
    pull: Option<Pull>,
    listener: Option<(Edge, EdgeHandler)>,
}

/// Press side of the simulated button
#[derive(Clone, Default)]
pub struct ButtonLine {
    wiring: Arc<Mutex<Wiring>>,
}

impl ButtonLine {
    /// Press and release the button
    ///
    /// Returns whether a listener saw the falling edge.
    pub fn press(&self) -> bool {
        let wiring = self.wiring.lock().unwrap_or_else(PoisonError::into_inner);
        match wiring.listener {
            Some((Edge::Falling | Edge::Any, handler)) => {
                handler.on_edge();
                true
            }
            _ => false,
        }
    }
}

/// Pin side of the simulated button
pub struct SimButton {
    line: ButtonLine,
}

impl SimButton {
    /// Create a pin and the line that presses it
    pub fn new() -> (Self, ButtonLine) {
        let line = ButtonLine::default();
        (Self { line: line.clone() }, line)
    }
}

impl InputPin for SimButton {
    fn is_high(&self) -> bool {
        // Idle high only when pulled up; the press itself is instantaneous
        let wiring = self.line.wiring.lock().unwrap_or_else(PoisonError::into_inner);
        wiring.pull == Some(Pull::Up)
    }
}

impl EdgeInterrupt for SimButton {
    type Error = SimPinError;

    fn configure_input(&mut self, pull: Pull) -> Result<(), SimPinError> {
        let mut wiring = self.line.wiring.lock().unwrap_or_else(PoisonError::into_inner);
        wiring.pull = Some(pull);
        Ok(())
    }

    fn listen(&mut self, edge: Edge, handler: EdgeHandler) -> Result<(), SimPinError> {
        let mut wiring = self.line.wiring.lock().unwrap_or_else(PoisonError::into_inner);
        if wiring.pull.is_none() {
            return Err(SimPinError::NotConfigured);
        }
        wiring.listener = Some((edge, handler));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_applets::{Button, ButtonTelemetry};
    use tessera_core::TaskState;

    #[test]
    fn test_press_before_configure_is_lost() {
        let (_pin, line) = SimButton::new();
        assert!(!line.press());
    }

    #[test]
    fn test_listen_requires_configure() {
        let (mut pin, _line) = SimButton::new();
        let telemetry: &'static ButtonTelemetry = Box::leak(Box::new(ButtonTelemetry::new()));
        assert_eq!(pin.listen(Edge::Falling, telemetry), Err(SimPinError::NotConfigured));
    }

    #[test]
    fn test_rising_listener_ignores_press() {
        let (mut pin, line) = SimButton::new();
        let telemetry: &'static ButtonTelemetry = Box::leak(Box::new(ButtonTelemetry::new()));
        pin.configure_input(Pull::Down).unwrap();
        pin.listen(Edge::Rising, telemetry).unwrap();

        assert!(!line.press());
        assert_eq!(telemetry.presses.get(), 0);
    }

    #[test]
    fn test_button_counts_presses() {
        let (pin, line) = SimButton::new();
        let telemetry: &'static ButtonTelemetry = Box::leak(Box::new(ButtonTelemetry::new()));
        let mut task = Button::new(pin, telemetry).into_task();

        task.start().unwrap();
        assert_eq!(task.state(), TaskState::Running);
        assert!(task.producer_mut().pin_mut().is_high());

        for _ in 0..3 {
            assert!(line.press());
        }
        assert_eq!(telemetry.presses.get(), 3);
    }
}
