//! Accelerometer sampling task

use defmt::*;
use embassy_time::Duration;
use tessera_applets::Accelerometer;
use tessera_core::producer::period_ms;
use tessera_core::ProducerTask;

use crate::board::AccelBus;

/// Sample the accelerometer at `sample_rate_hz`
#[embassy_executor::task]
pub async fn accel_task(mut task: ProducerTask<Accelerometer<'static, AccelBus>>, sample_rate_hz: u32) {
    info!("Accelerometer task started ({} Hz)", sample_rate_hz);

    let period = Duration::from_millis(u64::from(period_ms(sample_rate_hz)));
    super::run_producer(&mut task, period).await;

    warn!(
        "Accelerometer task ended after {} samples, state {}",
        task.published(),
        task.state()
    );
}
