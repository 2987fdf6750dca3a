//! Tessera - Applet Dashboard Firmware
//!
//! Main firmware binary for RP2040 boards carrying an accelerometer, a
//! button and a cellular modem. Each applet runs as its own task and
//! publishes into a telemetry cell; the dashboard task draws every cell
//! onto a VT100 console and the poster task reports cell status upstream.

#![no_std]
#![no_main]

use core::cell::RefCell;

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::i2c::I2c;
use embassy_rp::peripherals::{UART0, UART1};
use embassy_rp::uart::{BufferedInterruptHandler, Uart};
use embassy_sync::blocking_mutex::Mutex;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use tessera_applets::{
    describe, select_sim, AccelTelemetry, Accelerometer, Blinky, Button, ButtonTelemetry,
    CellModem, CellPoster, CellTelemetry, LinkCheckedTransport, UartAtChannel,
};
use tessera_core::Poster;
use tessera_display::{Dashboard, Element, UartConsole};
use tessera_hal::i2c::I2cConfig;
use tessera_hal::uart::UartConfig;
use tessera_hal_rp2040::{i2c, pin_bank, uart, IoUartRx, IoUartTx, RpEdgeInput, RpI2c, RpOutput};

use crate::board::{
    CONSOLE_RX_BUF_SIZE, CONSOLE_TX_BUF_SIZE, MODEM_RX_BUF_SIZE, MODEM_TX_BUF_SIZE,
};
use crate::modem::{DefmtTransport, ModemCell, SharedModem};

mod board;
mod config;
mod modem;
mod tasks;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
    UART1_IRQ => BufferedInterruptHandler<UART1>;
});

// UART buffers (must live forever)
static CONSOLE_TX_BUF: StaticCell<[u8; CONSOLE_TX_BUF_SIZE]> = StaticCell::new();
static CONSOLE_RX_BUF: StaticCell<[u8; CONSOLE_RX_BUF_SIZE]> = StaticCell::new();
static MODEM_TX_BUF: StaticCell<[u8; MODEM_TX_BUF_SIZE]> = StaticCell::new();
static MODEM_RX_BUF: StaticCell<[u8; MODEM_RX_BUF_SIZE]> = StaticCell::new();

// Telemetry cells, shared between a producer and its readers
static ACCEL: AccelTelemetry = AccelTelemetry::new();
static BUTTON: ButtonTelemetry = ButtonTelemetry::new();
static CELL: StaticCell<CellTelemetry> = StaticCell::new();

// Consumers and the shared modem
static MODEM: StaticCell<ModemCell> = StaticCell::new();
static CELL_POSTER: StaticCell<CellPoster<'static>> = StaticCell::new();
static POSTER: StaticCell<Poster<'static>> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Tessera firmware starting...");

    let harness = match config::harness() {
        Ok(harness) => harness,
        // build.rs validated the same values; this only trips if the
        // two checks drift apart
        Err(e) => defmt::panic!("Harness configuration rejected: {}", e),
    };
    info!("Harness: {}", harness);

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    // Console on UART0
    let console_tx_buf = CONSOLE_TX_BUF.init([0u8; CONSOLE_TX_BUF_SIZE]);
    let console_rx_buf = CONSOLE_RX_BUF.init([0u8; CONSOLE_RX_BUF_SIZE]);
    let console_uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart::rp_config(&UartConfig::default()));
    let (console_tx, _console_rx) = console_uart
        .into_buffered(Irqs, console_tx_buf, console_rx_buf)
        .split();
    let console = UartConsole::new(IoUartTx::new(console_tx));

    info!("Console UART initialized");

    // Modem on UART1
    let modem_tx_buf = MODEM_TX_BUF.init([0u8; MODEM_TX_BUF_SIZE]);
    let modem_rx_buf = MODEM_RX_BUF.init([0u8; MODEM_RX_BUF_SIZE]);
    let modem_uart = Uart::new_blocking(p.UART1, p.PIN_4, p.PIN_5, uart::rp_config(&UartConfig::default()));
    let (modem_tx, modem_rx) = modem_uart
        .into_buffered(Irqs, modem_tx_buf, modem_rx_buf)
        .split();
    let mut channel = UartAtChannel::new(IoUartTx::new(modem_tx), IoUartRx::new(modem_rx));

    if harness.cell.select_sim {
        let failures = select_sim(&mut channel);
        for failure in failures.iter() {
            warn!("SIM select: {}", describe(failure).as_str());
        }
        if failures.is_empty() {
            info!("External SIM selected");
        }
    }

    let modem = SharedModem::new(MODEM.init(Mutex::new(RefCell::new(channel))));
    info!("Modem UART initialized");

    // Accelerometer on I2C1
    let i2c = I2c::new_blocking(p.I2C1, p.PIN_3, p.PIN_2, i2c::rp_config(&I2cConfig::FAST));
    let accel = Accelerometer::new(RpI2c::new(i2c), &ACCEL).into_task();

    // Config-driven pins
    let mut bank = pin_bank!(p;
        6 => PIN_6, 7 => PIN_7, 8 => PIN_8, 9 => PIN_9, 10 => PIN_10, 11 => PIN_11,
        12 => PIN_12, 13 => PIN_13, 14 => PIN_14, 15 => PIN_15, 16 => PIN_16, 17 => PIN_17,
        18 => PIN_18, 19 => PIN_19, 20 => PIN_20, 21 => PIN_21, 22 => PIN_22, 23 => PIN_23,
        24 => PIN_24, 25 => PIN_25, 26 => PIN_26, 27 => PIN_27, 28 => PIN_28, 29 => PIN_29,
    );

    let button_pin = match bank.take(board::BUTTON_PIN) {
        Ok(pin) => pin,
        Err(e) => defmt::panic!("Button pin {} unavailable: {}", board::BUTTON_PIN, e),
    };
    let button = Button::new(RpEdgeInput::new(button_pin), &BUTTON).into_task();

    let led_pin = match bank.take(harness.blinky.pin) {
        Ok(pin) => pin,
        Err(e) => defmt::panic!("LED pin {} unavailable: {}", harness.blinky.pin, e),
    };
    let blinky = Blinky::new(RpOutput::new(led_pin), u32::from(harness.blinky.rate_hz)).into_task();

    info!("GPIO initialized");

    // Cell producer and its poster source
    let cell_telemetry: &'static CellTelemetry = CELL.init(CellTelemetry::new());
    let cell = CellModem::new(modem, cell_telemetry).into_task();

    // Dashboard; registration order is the on-screen order
    let grid = match harness.dashboard.geometry() {
        Ok(grid) => grid,
        Err(e) => defmt::panic!("Dashboard grid rejected: {}", e),
    };
    let mut dashboard = Dashboard::new(console, grid);
    let entrants: [(&str, &'static dyn Element); 3] = [
        ("accelerometer", &ACCEL),
        ("cell", cell_telemetry),
        ("button", &BUTTON),
    ];
    for (name, element) in entrants {
        match dashboard.register(element) {
            Ok(slot) => info!("Dashboard slot {}: {}", slot, name),
            Err(e) => warn!("Dashboard has no room for {}: {}", name, e),
        }
    }

    // Poster
    let poster = POSTER.init(Poster::new(harness.poster.thing.as_str()));
    let cell_source: &'static CellPoster<'static> = CELL_POSTER.init(CellPoster::new(cell_telemetry));
    if let Err(e) = poster.register(cell_source) {
        warn!("Poster has no room for cell: {}", e);
    }
    let transport = LinkCheckedTransport::new(modem, DefmtTransport);

    // Spawn tasks
    spawner
        .spawn(tasks::accel_task(accel, u32::from(harness.accel.sample_rate_hz)))
        .unwrap();
    spawner.spawn(tasks::button_task(button)).unwrap();
    spawner.spawn(tasks::cell_task(cell, harness.cell.period_s)).unwrap();
    spawner.spawn(tasks::blinky_task(blinky)).unwrap();
    spawner
        .spawn(tasks::dashboard_task(dashboard, harness.dashboard.period_s))
        .unwrap();
    spawner
        .spawn(tasks::poster_task(poster, transport, harness.poster.period_s))
        .unwrap();

    info!("All tasks spawned, firmware running");

    // Main task has nothing else to do - all work happens in spawned tasks
    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}
