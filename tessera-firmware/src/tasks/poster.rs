//! Outbound poster task

use defmt::*;
use embassy_time::{Duration, Ticker};
use tessera_applets::{describe, LinkCheckedTransport};
use tessera_core::Poster;

use crate::modem::{DefmtTransport, SharedModem};

/// Post every registered source each `period_s`
#[embassy_executor::task]
pub async fn poster_task(
    poster: &'static mut Poster<'static>,
    mut transport: LinkCheckedTransport<SharedModem, DefmtTransport>,
    period_s: u16,
) {
    info!(
        "Poster task started ({} sources for '{}', every {} s)",
        poster.len(),
        poster.thing(),
        period_s
    );

    let mut ticker = Ticker::every(Duration::from_secs(u64::from(period_s)));
    loop {
        ticker.next().await;

        let report = poster.pass(&mut transport);
        if report.is_clean() {
            debug!("Poster pass: {} posted, {} truncated", report.posted, report.truncated);
            continue;
        }

        warn!("Poster pass incomplete: {}", report);
        if let Some(failure) = transport.last_failure() {
            warn!("Modem link: {}", describe(&failure).as_str());
        }
    }
}
