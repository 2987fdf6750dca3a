//! Board wiring
//!
//! Bus pins are fixed by the board layout; the LED pin comes from
//! harness.toml and is taken from the pin bank.
//!
//! | GPIO | Function                       |
//! |------|--------------------------------|
//! | 0/1  | UART0 TX/RX - VT100 console    |
//! | 2/3  | I2C1 SDA/SCL - accelerometer   |
//! | 4/5  | UART1 TX/RX - cellular modem   |
//! | 6    | Button (active low)            |

use embassy_rp::peripherals::I2C1;
use embassy_rp::uart::{BufferedUartRx, BufferedUartTx};

use tessera_applets::UartAtChannel;
use tessera_display::UartConsole;
use tessera_hal_rp2040::{IoUartRx, IoUartTx, RpI2c};

/// GPIO wired to the button
pub const BUTTON_PIN: u8 = 6;

/// Console transmit buffer; one dashboard pass fits without blocking
pub const CONSOLE_TX_BUF_SIZE: usize = 2048;
/// Console receive buffer (input is ignored)
pub const CONSOLE_RX_BUF_SIZE: usize = 16;
/// Modem buffers
pub const MODEM_TX_BUF_SIZE: usize = 256;
pub const MODEM_RX_BUF_SIZE: usize = 1024;

/// Dashboard console on UART0
pub type Console = UartConsole<IoUartTx<BufferedUartTx>>;

/// AT channel on UART1
pub type ModemChannel = UartAtChannel<IoUartTx<BufferedUartTx>, IoUartRx<BufferedUartRx>>;

/// Accelerometer bus
pub type AccelBus = RpI2c<I2C1>;
