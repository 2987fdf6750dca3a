//! Cellular modem status applet
//!
//! Polls the modem for LTE signal quality (`AT+CESQ`) and the registered
//! operator (`AT+COPS?`). The operator is matched against a short table of
//! US carriers; anything else leaves the carrier unchanged.

use core::fmt::Write;

use tessera_core::traits::{AtChannel, AtError, DataSource, QueryWriter};
use tessera_core::{Field, Producer, ProducerTask, ReadPolicy, Scalar};
use tessera_display::{Element, Window};
use tessera_protocol::at::{self, SignalQuality, NOT_DETECTABLE};
use tessera_protocol::FinalResult;

/// Mobile network operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Carrier {
    #[default]
    Unknown,
    Verizon,
    Att,
    TMobile,
}

impl Carrier {
    /// Match a numeric MCC/MNC operator code
    pub fn from_plmn(plmn: &str) -> Option<Self> {
        match plmn {
            "311480" => Some(Carrier::Verizon),
            "310410" => Some(Carrier::Att),
            "311260" => Some(Carrier::TMobile),
            _ => None,
        }
    }

    /// Three-letter label shown on the dashboard and posted
    pub fn as_str(&self) -> &'static str {
        match self {
            Carrier::Unknown => "N/A",
            Carrier::Verizon => "VZW",
            Carrier::Att => "ATT",
            Carrier::TMobile => "TMB",
        }
    }
}

impl Scalar for Carrier {
    const UNKNOWN: u32 = 0;

    fn into_bits(self) -> u32 {
        match self {
            Carrier::Unknown => 0,
            Carrier::Verizon => 1,
            Carrier::Att => 2,
            Carrier::TMobile => 3,
        }
    }

    fn from_bits(bits: u32) -> Self {
        match bits {
            1 => Carrier::Verizon,
            2 => Carrier::Att,
            3 => Carrier::TMobile,
            _ => Carrier::Unknown,
        }
    }
}

/// Latest modem status
///
/// Signal indices start at 255, the 3GPP "not known" value.
#[derive(Debug)]
pub struct CellTelemetry {
    pub rsrp: Field<u8>,
    pub rsrq: Field<u8>,
    pub carrier: Field<Carrier>,
}

impl CellTelemetry {
    pub fn new() -> Self {
        Self {
            rsrp: Field::new(NOT_DETECTABLE),
            rsrq: Field::new(NOT_DETECTABLE),
            carrier: Field::unknown(),
        }
    }
}

impl Default for CellTelemetry {
    fn default() -> Self {
        Self::new()
    }
}

impl Element for CellTelemetry {
    fn display(&self, window: &mut Window<'_>) {
        let _ = write!(
            window,
            "+--------------+\n\
             |  Networking  |\n\
             |  rsrp:{:4}   |\n\
             |  rsrq:{:4}   |\n\
             | carrier: {} |\n\
             +--------------+\n",
            self.rsrp.get(),
            self.rsrq.get(),
            self.carrier.get().as_str(),
        );
    }
}

/// Cell applet errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CellError {
    /// The AT channel failed
    Channel(AtError),
    /// The modem answered with an error result
    Command(FinalResult),
    /// The `+CESQ` response could not be parsed
    Parse,
}

/// One poll of the modem
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CellReading {
    pub quality: SignalQuality,
    /// `None` when the operator query failed or named an unlisted carrier
    pub carrier: Option<Carrier>,
}

/// Cellular modem producer
pub struct CellModem<'a, C: AtChannel> {
    channel: C,
    telemetry: &'a CellTelemetry,
}

impl<'a, C: AtChannel> CellModem<'a, C> {
    /// A failed poll is skipped; the modem is asked again next period
    pub const READ_POLICY: ReadPolicy = ReadPolicy::SkipAndRetry;

    pub fn new(channel: C, telemetry: &'a CellTelemetry) -> Self {
        Self { channel, telemetry }
    }

    /// Wrap in a task with this applet's read policy
    pub fn into_task(self) -> ProducerTask<Self> {
        ProducerTask::new(self, Self::READ_POLICY)
    }

    fn signal_quality(&mut self) -> Result<SignalQuality, CellError> {
        let response = self.channel.command("AT+CESQ").map_err(CellError::Channel)?;
        if !response.is_ok() {
            return Err(CellError::Command(response.result()));
        }
        at::parse_cesq(response.body()).ok_or(CellError::Parse)
    }

    fn carrier(&mut self) -> Option<Carrier> {
        let response = self.channel.command("AT+COPS?").ok()?;
        if !response.is_ok() {
            return None;
        }
        at::parse_cops_operator(response.body()).and_then(Carrier::from_plmn)
    }
}

impl<C: AtChannel> Producer for CellModem<'_, C> {
    type Reading = CellReading;
    type Error = CellError;

    const NAME: &'static str = "cell";

    /// Nothing to set up; the channel already exists
    fn configure(&mut self) -> Result<(), CellError> {
        Ok(())
    }

    fn sample(&mut self) -> Result<CellReading, CellError> {
        let quality = self.signal_quality()?;
        let carrier = self.carrier();
        Ok(CellReading { quality, carrier })
    }

    fn publish(&self, reading: CellReading) {
        self.telemetry.rsrp.set(reading.quality.rsrp);
        self.telemetry.rsrq.set(reading.quality.rsrq);
        if let Some(carrier) = reading.carrier {
            self.telemetry.carrier.set(carrier);
        }
    }
}

/// Serializes the cell status for the poster
pub struct CellPoster<'a> {
    telemetry: &'a CellTelemetry,
}

impl<'a> CellPoster<'a> {
    pub fn new(telemetry: &'a CellTelemetry) -> Self {
        Self { telemetry }
    }
}

impl DataSource for CellPoster<'_> {
    fn retrieve(&self, out: &mut QueryWriter<'_>) {
        let _ = write!(
            out,
            "rsrp={}&rsrq={}&carrier={}",
            self.telemetry.rsrp.get(),
            self.telemetry.rsrq.get(),
            self.telemetry.carrier.get().as_str(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::VecDeque;
    use tessera_core::traits::AtResponse;
    use tessera_core::{CycleOutcome, Origin};
    use tessera_display::Screen;

    /// AT channel replaying scripted responses
    #[derive(Default)]
    struct ScriptedChannel {
        replies: VecDeque<Result<(FinalResult, &'static str), AtError>>,
        sent: std::vec::Vec<std::string::String>,
    }

    impl ScriptedChannel {
        fn reply(mut self, result: FinalResult, body: &'static str) -> Self {
            self.replies.push_back(Ok((result, body)));
            self
        }

        fn fail(mut self, error: AtError) -> Self {
            self.replies.push_back(Err(error));
            self
        }
    }

    impl AtChannel for ScriptedChannel {
        fn command(&mut self, command: &str) -> Result<AtResponse, AtError> {
            self.sent.push(command.to_string());
            let (result, body) = self.replies.pop_front().unwrap_or(Err(AtError::Timeout))?;
            let mut response = AtResponse::new(result);
            for line in body.lines() {
                response.push_line(line)?;
            }
            Ok(response)
        }
    }

    #[test]
    fn test_sentinels() {
        let telemetry = CellTelemetry::new();
        assert_eq!(telemetry.rsrp.get(), 255);
        assert_eq!(telemetry.rsrq.get(), 255);
        assert_eq!(telemetry.carrier.get(), Carrier::Unknown);
    }

    #[test]
    fn test_poll_publishes() {
        let telemetry = CellTelemetry::new();
        let channel = ScriptedChannel::default()
            .reply(FinalResult::Ok, "+CESQ: 99,99,255,255,20,45")
            .reply(FinalResult::Ok, "+COPS: 0,2,\"311480\",7");

        let mut task = CellModem::new(channel, &telemetry).into_task();
        task.start().unwrap();
        assert_eq!(task.cycle(), CycleOutcome::Published);

        assert_eq!(telemetry.rsrp.get(), 45);
        assert_eq!(telemetry.rsrq.get(), 20);
        assert_eq!(telemetry.carrier.get(), Carrier::Verizon);
        assert_eq!(task.producer().channel.sent, vec!["AT+CESQ", "AT+COPS?"]);
    }

    #[test]
    fn test_unlisted_operator_leaves_carrier() {
        let telemetry = CellTelemetry::new();
        telemetry.carrier.set(Carrier::Att);
        let channel = ScriptedChannel::default()
            .reply(FinalResult::Ok, "+CESQ: 99,99,255,255,10,30")
            .reply(FinalResult::Ok, "+COPS: 0,2,\"23415\",7");

        let mut task = CellModem::new(channel, &telemetry).into_task();
        task.start().unwrap();
        assert_eq!(task.cycle(), CycleOutcome::Published);
        assert_eq!(telemetry.carrier.get(), Carrier::Att);
        assert_eq!(telemetry.rsrp.get(), 30);
    }

    #[test]
    fn test_failed_poll_skips_and_retries() {
        let telemetry = CellTelemetry::new();
        let channel = ScriptedChannel::default()
            .fail(AtError::Timeout)
            .reply(FinalResult::CmeError(30), "")
            .reply(FinalResult::Ok, "+CESQ: 99,99,255,255,12,40")
            .reply(FinalResult::Error, "");

        let mut task = CellModem::new(channel, &telemetry).into_task();
        task.start().unwrap();
        assert_eq!(
            task.cycle(),
            CycleOutcome::Skipped(CellError::Channel(AtError::Timeout))
        );
        assert_eq!(
            task.cycle(),
            CycleOutcome::Skipped(CellError::Command(FinalResult::CmeError(30)))
        );
        assert_eq!(telemetry.rsrp.get(), 255);

        assert_eq!(task.cycle(), CycleOutcome::Published);
        assert_eq!(telemetry.rsrp.get(), 40);
        assert_eq!(telemetry.carrier.get(), Carrier::Unknown);
        assert_eq!(task.skipped(), 2);
    }

    #[test]
    fn test_poster_query() {
        let telemetry = CellTelemetry::new();
        telemetry.rsrp.set(45);
        telemetry.rsrq.set(20);
        telemetry.carrier.set(Carrier::TMobile);

        let mut buf = [0u8; 64];
        let mut out = QueryWriter::new(&mut buf, 64);
        CellPoster::new(&telemetry).retrieve(&mut out);
        assert_eq!(out.as_str(), "rsrp=45&rsrq=20&carrier=TMB");
    }

    #[test]
    fn test_render() {
        let telemetry = CellTelemetry::new();
        let mut screen: Screen = Screen::new();
        {
            let mut window = Window::new(&mut screen, Origin { column: 20, row: 0 });
            window.setup();
            telemetry.display(&mut window);
        }
        assert_eq!(screen.text_at(1, 20, 16), Some("+--------------+"));
        assert_eq!(screen.text_at(2, 20, 16), Some("|  Networking  |"));
        assert_eq!(screen.text_at(3, 20, 16), Some("|  rsrp: 255   |"));
        assert_eq!(screen.text_at(4, 20, 16), Some("|  rsrq: 255   |"));
        assert_eq!(screen.text_at(5, 20, 16), Some("| carrier: N/A |"));
        assert_eq!(screen.text_at(6, 20, 16), Some("+--------------+"));
    }

    #[test]
    fn test_carrier_bits() {
        for carrier in [Carrier::Unknown, Carrier::Verizon, Carrier::Att, Carrier::TMobile] {
            assert_eq!(Carrier::from_bits(carrier.into_bits()), carrier);
        }
        assert_eq!(Carrier::from_bits(99), Carrier::Unknown);
    }

    proptest! {
        #[test]
        fn prop_any_reported_signal_is_published(rsrq in 0u8..=34, rsrp in 0u8..=97) {
            let telemetry = CellTelemetry::new();
            let line = std::format!("+CESQ: 99,99,255,255,{},{}", rsrq, rsrp);
            let channel = ScriptedChannel::default()
                .reply(FinalResult::Ok, std::boxed::Box::leak(line.into_boxed_str()))
                .reply(FinalResult::Error, "");

            let mut task = CellModem::new(channel, &telemetry).into_task();
            task.start().unwrap();
            prop_assert_eq!(task.cycle(), CycleOutcome::Published);
            prop_assert_eq!(telemetry.rsrq.get(), rsrq);
            prop_assert_eq!(telemetry.rsrp.get(), rsrp);
        }
    }
}
