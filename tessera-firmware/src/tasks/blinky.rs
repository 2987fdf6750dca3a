//! LED blink task

use defmt::*;
use embassy_time::Duration;
use tessera_applets::Blinky;
use tessera_core::ProducerTask;
use tessera_hal_rp2040::RpOutput;

/// Toggle the LED twice per blink period
#[embassy_executor::task]
pub async fn blinky_task(mut task: ProducerTask<Blinky<RpOutput>>) {
    let toggle_ms = task.producer().toggle_period_ms();
    info!("Blinky task started (toggle every {} ms)", toggle_ms);

    super::run_producer(&mut task, Duration::from_millis(u64::from(toggle_ms))).await;
}
