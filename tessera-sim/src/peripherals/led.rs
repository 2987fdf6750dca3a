//! Simulated LED

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use log::trace;
use tessera_hal::OutputPin;

/// LED that logs and counts its transitions
pub struct SimLed {
    lit: bool,
    transitions: Arc<AtomicU32>,
}

impl SimLed {
    pub fn new() -> Self {
        Self {
            lit: false,
            transitions: Arc::new(AtomicU32::new(0)),
        }
    }

    /// Shared transition counter, readable after the LED moves to its task
    pub fn transitions(&self) -> Arc<AtomicU32> {
        Arc::clone(&self.transitions)
    }

    fn drive(&mut self, lit: bool) {
        if self.lit != lit {
            self.lit = lit;
            self.transitions.fetch_add(1, Ordering::Relaxed);
            trace!("LED {}", if lit { "on" } else { "off" });
        }
    }
}

impl Default for SimLed {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputPin for SimLed {
    fn set_high(&mut self) {
        self.drive(true);
    }

    fn set_low(&mut self) {
        self.drive(false);
    }

    fn is_set_high(&self) -> bool {
        self.lit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_applets::Blinky;

    #[test]
    fn test_blinky_toggles_sim_led() {
        let led = SimLed::new();
        let transitions = led.transitions();
        let mut task = Blinky::new(led, 2).into_task();

        task.start().unwrap();
        for _ in 0..4 {
            task.cycle();
        }

        assert_eq!(transitions.load(Ordering::Relaxed), 4);
        assert!(!task.producer().is_lit());
    }
}
