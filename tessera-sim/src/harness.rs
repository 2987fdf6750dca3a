//! Harness composition and run loop
//!
//! Builds the cells, producers and consumers, registers the elements and
//! sources, then runs until the requested number of dashboard passes.
//! Producers each get a thread; the dashboard and the poster share the
//! calling thread because their registries hold plain trait objects.

use std::sync::atomic::Ordering;
use std::sync::{Condvar, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use log::{debug, info, trace, warn};
use tessera_applets::{
    describe, select_sim, AccelTelemetry, Accelerometer, Blinky, Button, ButtonTelemetry,
    CellModem, CellPoster, CellTelemetry, LinkCheckedTransport, UartAtChannel,
};
use tessera_core::producer::period_ms;
use tessera_core::{CycleOutcome, Poster, Producer, ProducerTask, TaskState};
use tessera_display::{Console, Dashboard, Element, PassReport};

use crate::config::SimConfig;
use crate::peripherals::{SharedModem, SimAccelBus, SimButton, SimLed, SimModem};
use crate::transport::SimTransport;

/// How a run is driven
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Dashboard passes before stopping; `None` runs forever
    pub passes: Option<u32>,
    /// Divides every period, so tests can run the board faster than real time
    pub speed: u32,
    /// Where the poster's requests go
    pub transport: SimTransport,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            passes: None,
            speed: 1,
            transport: SimTransport::Log,
        }
    }
}

/// What happened during a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Dashboard passes, including the final one after producers stop
    pub passes: u32,
    /// Report of the final dashboard pass
    pub last_pass: PassReport,
    /// Requests the transport accepted
    pub posted: u32,
    /// Requests that were not delivered
    pub post_failures: u32,
    pub accel: TaskState,
    pub cell: TaskState,
    /// Cell polls that published
    pub cell_published: u32,
    /// Cell polls that failed and were retried
    pub cell_skipped: u32,
    pub button: TaskState,
    pub blinky: TaskState,
    /// Presses counted by the button cell
    pub presses: u8,
    /// LED transitions
    pub led_transitions: u32,
}

/// Stop signal shared by the producer threads
struct Shutdown {
    stopped: Mutex<bool>,
    signal: Condvar,
}

impl Shutdown {
    fn new() -> Self {
        Self {
            stopped: Mutex::new(false),
            signal: Condvar::new(),
        }
    }

    /// Sleep for `period` or until stopped; returns whether stopped
    fn wait(&self, period: Duration) -> bool {
        let stopped = self.stopped.lock().unwrap_or_else(PoisonError::into_inner);
        let (stopped, _) = self
            .signal
            .wait_timeout_while(stopped, period, |stopped| !*stopped)
            .unwrap_or_else(PoisonError::into_inner);
        *stopped
    }

    fn trigger(&self) {
        *self.stopped.lock().unwrap_or_else(PoisonError::into_inner) = true;
        self.signal.notify_all();
    }
}

fn scaled(period: Duration, speed: u32) -> Duration {
    period / speed.max(1)
}

fn secs(period_s: u16, speed: u32) -> Duration {
    scaled(Duration::from_secs(u64::from(period_s)), speed)
}

/// Configure a producer, then sample it every `period` until stopped
fn run_producer<P: Producer>(
    mut task: ProducerTask<P>,
    period: Duration,
    shutdown: &Shutdown,
) -> ProducerTask<P> {
    if let Err(e) = task.start() {
        warn!("{}: setup failed ({:?}), values stay unknown", task.name(), e);
        return task;
    }
    info!("{}: running every {:?}", task.name(), period);

    while !shutdown.wait(period) {
        match task.cycle() {
            CycleOutcome::Published => trace!("{}: published", task.name()),
            CycleOutcome::Skipped(e) => warn!("{}: read failed ({:?}), retrying", task.name(), e),
            CycleOutcome::Abandoned(e) => {
                warn!("{}: read failed ({:?}), task stopped", task.name(), e);
                break;
            }
            CycleOutcome::Inert => break,
        }
    }
    task
}

/// Run the harness with `console` as the dashboard output
///
/// Returns the console so callers can inspect what was drawn.
pub fn run<C: Console>(config: &SimConfig, options: &RunOptions, console: C) -> Result<(C, RunSummary)> {
    config.validate()?;
    let harness = &config.harness;
    let speed = options.speed;

    // Telemetry cells. The button cell is the edge listener and has to
    // outlive every pin that may hold it.
    let accel_cell = AccelTelemetry::new();
    let cell_cell = CellTelemetry::new();
    let button_cell: &'static ButtonTelemetry = Box::leak(Box::new(ButtonTelemetry::new()));

    // Modem bring-up
    let modem = SimModem::new(&config.sim.operator, config.sim.link_up);
    let (modem_tx, modem_rx) = modem.uart();
    let mut channel = UartAtChannel::new(modem_tx, modem_rx);
    if harness.cell.select_sim {
        let failures = select_sim(&mut channel);
        for failure in &failures {
            warn!("SIM select: {}", describe(failure));
        }
        if failures.is_empty() {
            info!("External SIM selected");
        }
    }
    modem.set_late_every(config.sim.late_reply_every);
    let shared_modem = SharedModem::new(channel);

    // Producers
    let accel = Accelerometer::new(SimAccelBus::new(config.sim.accel_present), &accel_cell).into_task();
    let cell = CellModem::new(shared_modem.clone(), &cell_cell).into_task();
    let (button_pin, button_line) = SimButton::new();
    let button = Button::new(button_pin, button_cell).into_task();
    let led = SimLed::new();
    let led_transitions = led.transitions();
    let blinky = Blinky::new(led, u32::from(harness.blinky.rate_hz)).into_task();

    // Dashboard; registration order is the on-screen order
    let grid = harness
        .dashboard
        .geometry()
        .map_err(|e| anyhow!("invalid dashboard grid: {:?}", e))?;
    let mut dashboard = Dashboard::new(console, grid);
    let entrants: [(&str, &dyn Element); 3] = [
        ("accelerometer", &accel_cell),
        ("cell", &cell_cell),
        ("button", button_cell),
    ];
    for (name, element) in entrants {
        match dashboard.register(element) {
            Ok(slot) => info!("Dashboard slot {}: {}", slot, name),
            Err(e) => warn!("Dashboard has no room for {}: {:?}", name, e),
        }
    }

    // Poster
    let cell_source = CellPoster::new(&cell_cell);
    let mut poster: Box<Poster<'_>> = Box::new(Poster::new(harness.poster.thing.as_str()));
    if let Err(e) = poster.register(&cell_source) {
        warn!("Poster has no room for cell: {:?}", e);
    }
    let mut transport = LinkCheckedTransport::new(shared_modem, options.transport.clone());

    let shutdown = Shutdown::new();
    let dashboard_period = secs(harness.dashboard.period_s, speed);
    let poster_period = secs(harness.poster.period_s, speed);

    let mut passes = 0u32;
    let mut posted = 0u32;
    let mut post_failures = 0u32;

    let (accel, cell, button, blinky) = thread::scope(|s| -> Result<_> {
        let shutdown = &shutdown;
        let accel_period = scaled(
            Duration::from_millis(u64::from(period_ms(u32::from(harness.accel.sample_rate_hz)))),
            speed,
        );
        let accel = thread::Builder::new()
            .name("accel".into())
            .spawn_scoped(s, move || run_producer(accel, accel_period, shutdown))
            .context("failed to spawn accel thread")?;

        let cell_period = secs(harness.cell.period_s, speed);
        let cell = thread::Builder::new()
            .name("cell".into())
            .spawn_scoped(s, move || run_producer(cell, cell_period, shutdown))
            .context("failed to spawn cell thread")?;

        let blink_period = scaled(
            Duration::from_millis(u64::from(blinky.producer().toggle_period_ms())),
            speed,
        );
        let blinky = thread::Builder::new()
            .name("blinky".into())
            .spawn_scoped(s, move || run_producer(blinky, blink_period, shutdown))
            .context("failed to spawn blinky thread")?;

        // Button: arm the interrupt, then press the line on a timer
        let mut button = button;
        if let Err(e) = button.start() {
            warn!("button: setup failed ({:?}), presses will not be counted", e);
        }
        if config.sim.button_interval_ms > 0 {
            let press_period = scaled(Duration::from_millis(config.sim.button_interval_ms), speed);
            let line = button_line.clone();
            thread::Builder::new()
                .name("button".into())
                .spawn_scoped(s, move || {
                    while !shutdown.wait(press_period) {
                        if line.press() {
                            trace!("button: pressed");
                        }
                    }
                })
                .context("failed to spawn button thread")?;
        }

        if let Err(e) = dashboard.clear() {
            warn!("Failed to clear console: {:?}", e);
        }

        let mut next_pass = Instant::now();
        let mut next_post = next_pass + poster_period;
        loop {
            let now = Instant::now();

            if now >= next_post {
                let report = poster.pass(&mut transport);
                posted += u32::from(report.posted);
                post_failures += u32::from(report.framing_errors) + u32::from(report.transport_errors);
                if report.is_clean() {
                    debug!("Poster pass: {} posted, {} truncated", report.posted, report.truncated);
                } else {
                    warn!("Poster pass incomplete: {:?}", report);
                    if let Some(failure) = transport.last_failure() {
                        warn!("Modem link: {}", describe(&failure));
                    }
                }
                next_post += poster_period;
            }

            if now >= next_pass {
                let report = dashboard.pass();
                passes += 1;
                if !report.is_clean() {
                    warn!("Dashboard pass had faults: {:?}", report);
                }
                if options.passes.is_some_and(|limit| passes >= limit) {
                    break;
                }
                next_pass += dashboard_period;
            }

            let wake = next_pass.min(next_post);
            thread::sleep(wake.saturating_duration_since(Instant::now()));
        }

        shutdown.trigger();
        let join = |name: &str| anyhow!("{} thread panicked", name);
        Ok((
            accel.join().map_err(|_| join("accel"))?,
            cell.join().map_err(|_| join("cell"))?,
            button,
            blinky.join().map_err(|_| join("blinky"))?,
        ))
    })?;

    // One last pass so the output shows the final state of every cell
    let last_pass = dashboard.pass();
    passes += 1;

    let summary = RunSummary {
        passes,
        last_pass,
        posted,
        post_failures,
        accel: accel.state(),
        cell: cell.state(),
        cell_published: cell.published(),
        cell_skipped: cell.skipped(),
        button: button.state(),
        blinky: blinky.state(),
        presses: button_cell.presses.get(),
        led_transitions: led_transitions.load(Ordering::Relaxed),
    };
    info!("Run finished: {:?}", summary);

    Ok((dashboard.into_console(), summary))
}
