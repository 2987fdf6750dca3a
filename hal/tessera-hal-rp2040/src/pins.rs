//! Pin bank for config-driven pin assignment
//!
//! Bus pins are wired by type in the firmware. The remaining GPIOs go into
//! a bank so that pins named in `harness.toml` can be taken by number.

use embassy_rp::gpio::AnyPin;
use embassy_rp::Peri;

/// Number of user GPIOs on the RP2040
pub const GPIO_COUNT: usize = 30;

/// Macro to build a pin bank from peripherals
///
/// Usage:
/// ```ignore
/// let mut bank = pin_bank!(p; 6 => PIN_6, 25 => PIN_25);
/// let led = bank.take(config.blinky.pin)?;
/// ```
#[macro_export]
macro_rules! pin_bank {
    ($p:expr; $($n:literal => $pin:ident),* $(,)?) => {{
        let mut bank = $crate::pins::PinBank::empty();
        $(
            bank.insert($n, embassy_rp::Peri::<embassy_rp::gpio::AnyPin>::from($p.$pin));
        )*
        bank
    }};
}

/// Error when requesting a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinError {
    /// Pin number out of range (0-29 valid)
    InvalidPin,
    /// Pin already taken, or never put in the bank
    Unavailable,
}

/// GPIOs that can be taken by number
pub struct PinBank {
    pins: [Option<Peri<'static, AnyPin>>; GPIO_COUNT],
}

impl PinBank {
    /// Create an empty bank
    pub fn empty() -> Self {
        Self {
            pins: core::array::from_fn(|_| None),
        }
    }

    /// Put pin `number` in the bank
    pub fn insert(&mut self, number: u8, pin: Peri<'static, AnyPin>) {
        if let Some(slot) = self.pins.get_mut(number as usize) {
            *slot = Some(pin);
        }
    }

    /// Take a pin by number
    pub fn take(&mut self, number: u8) -> Result<Peri<'static, AnyPin>, PinError> {
        self.pins
            .get_mut(number as usize)
            .ok_or(PinError::InvalidPin)?
            .take()
            .ok_or(PinError::Unavailable)
    }

    /// Check if a pin is available
    pub fn is_available(&self, number: u8) -> bool {
        self.pins
            .get(number as usize)
            .map(Option::is_some)
            .unwrap_or(false)
    }
}
