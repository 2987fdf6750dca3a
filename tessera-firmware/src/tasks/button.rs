//! Button edge task
//!
//! Presses are counted by the edge listener itself; this task only waits
//! on the pin and hands each edge over.

use defmt::*;
use tessera_applets::Button;
use tessera_core::ProducerTask;
use tessera_hal_rp2040::RpEdgeInput;

#[embassy_executor::task]
pub async fn button_task(mut task: ProducerTask<Button<RpEdgeInput>>) {
    info!("Button task started");

    if let Err(e) = task.start() {
        warn!("Button setup failed ({}), presses will not be counted", e);
        return;
    }

    loop {
        task.producer_mut().pin_mut().dispatch().await;
        trace!("Button edge");
    }
}
