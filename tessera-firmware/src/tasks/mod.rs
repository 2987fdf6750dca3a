//! Embassy async tasks
//!
//! Producers, the dashboard and the poster each run on their own ticker.
//! Library code returns what happened on each tick; the logging is done
//! here.

pub mod accel;
pub mod blinky;
pub mod button;
pub mod cell;
pub mod dashboard;
pub mod poster;

pub use accel::accel_task;
pub use blinky::blinky_task;
pub use button::button_task;
pub use cell::cell_task;
pub use dashboard::dashboard_task;
pub use poster::poster_task;

use defmt::*;
use embassy_time::{Duration, Ticker};
use tessera_core::{CycleOutcome, Producer, ProducerTask};

/// Configure a producer, then sample it every `period` until it stops
async fn run_producer<P>(task: &mut ProducerTask<P>, period: Duration)
where
    P: Producer,
    P::Error: Format,
{
    if let Err(e) = task.start() {
        warn!("{}: setup failed ({}), values stay unknown", task.name(), e);
        return;
    }
    info!("{}: running every {} ms", task.name(), period.as_millis());

    let mut ticker = Ticker::every(period);
    loop {
        ticker.next().await;

        match task.cycle() {
            CycleOutcome::Published => trace!("{}: published", task.name()),
            CycleOutcome::Skipped(e) => warn!("{}: read failed ({}), retrying", task.name(), e),
            CycleOutcome::Abandoned(e) => {
                warn!("{}: read failed ({}), task stopped", task.name(), e);
                return;
            }
            CycleOutcome::Inert => return,
        }
    }
}
