//! Dashboard rendering task
//!
//! Sole writer of the console. Clears the screen once, then redraws every
//! registered element each period.

use defmt::*;
use embassy_time::{Duration, Ticker};
use tessera_display::Dashboard;

use crate::board::Console;

#[embassy_executor::task]
pub async fn dashboard_task(mut dashboard: Dashboard<'static, Console>, period_s: u16) {
    info!(
        "Dashboard task started ({} elements, every {} s)",
        dashboard.len(),
        period_s
    );

    if let Err(e) = dashboard.clear() {
        warn!("Failed to clear console: {}", e);
    }

    let mut ticker = Ticker::every(Duration::from_secs(u64::from(period_s)));
    loop {
        let report = dashboard.pass();
        if report.is_clean() {
            trace!("Dashboard pass: {} windows", report.rendered);
        } else {
            warn!("Dashboard pass had faults: {}", report);
        }

        ticker.next().await;
    }
}
