//! Cellular signal polling task

use defmt::*;
use embassy_time::Duration;
use tessera_applets::CellModem;
use tessera_core::ProducerTask;

use crate::modem::SharedModem;

/// Poll signal quality and operator every `period_s`
#[embassy_executor::task]
pub async fn cell_task(mut task: ProducerTask<CellModem<'static, SharedModem>>, period_s: u16) {
    info!("Cell task started (every {} s)", period_s);

    super::run_producer(&mut task, Duration::from_secs(u64::from(period_s))).await;

    warn!("Cell task ended, state {}", task.state());
}
