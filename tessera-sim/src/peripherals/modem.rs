//! Simulated cellular modem
//!
//! The modem sits behind a pair of UART halves. Bytes written to
//! [`SimModemTx`] are collected into command lines; each complete line is
//! echoed and answered immediately, and [`SimModemRx`] hands the answer
//! back byte by byte. The applets' [`UartAtChannel`] drives it exactly as
//! it drives the real modem UART.
//!
//! A slow modem can be simulated: every Nth reply is held back and only
//! shows up on the wire after the host's read has timed out.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use tessera_applets::UartAtChannel;
use tessera_core::traits::{AtChannel, AtError, AtResponse};
use tessera_hal::uart::{Error, ErrorKind};
use tessera_hal::{UartRx, UartTx};

/// UART errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimUartError {
    /// Nothing left to read
    Timeout,
}

impl Error for SimUartError {
    fn kind(&self) -> ErrorKind {
        match self {
            SimUartError::Timeout => ErrorKind::TimedOut,
        }
    }
}

/// Modem state shared by both UART halves
#[derive(Debug)]
struct ModemState {
    line: Vec<u8>,
    outgoing: VecDeque<u8>,
    /// Reply waiting for the host to give up on it
    held: Vec<u8>,
    /// Hold back every Nth reply; 0 answers everything on time
    late_every: u32,
    answered: u32,
    /// `AT+CFUN` level: 1 full, 4 airplane
    functionality: u8,
    external_sim: bool,
    link_up: bool,
    operator: String,
    polls: u32,
}

impl ModemState {
    fn receive(&mut self, byte: u8) {
        match byte {
            b'\r' => {
                let line = std::mem::take(&mut self.line);
                let command = String::from_utf8_lossy(&line).trim().to_string();
                if !command.is_empty() {
                    self.respond(&command);
                }
            }
            b'\n' => {}
            _ => self.line.push(byte),
        }
    }

    fn respond(&mut self, command: &str) {
        // Echo is on, as on a freshly powered modem
        let mut reply = Vec::new();
        reply.extend(command.as_bytes());
        reply.extend(b"\r\n");

        let (lines, result) = self.execute(command);
        for line in lines.iter().chain([&result]) {
            reply.extend(b"\r\n");
            reply.extend(line.as_bytes());
            reply.extend(b"\r\n");
        }

        self.answered = self.answered.wrapping_add(1);
        if self.late_every > 0 && self.answered % self.late_every == 0 {
            self.held = reply;
        } else {
            self.outgoing.extend(reply);
        }
    }

    /// The host stopped waiting; a held reply arrives now
    fn timed_out(&mut self) {
        let held = std::mem::take(&mut self.held);
        self.outgoing.extend(held);
    }

    fn registered(&self) -> bool {
        self.functionality == 1 && self.link_up
    }

    fn execute(&mut self, command: &str) -> (Vec<String>, String) {
        let ok = "OK".to_string();
        match command {
            "AT" => (vec![], ok),
            "AT+CFUN=1" => {
                self.functionality = 1;
                (vec![], ok)
            }
            "AT+CFUN=4" => {
                self.functionality = 4;
                (vec![], ok)
            }
            "AT+CFUN?" => (vec![format!("+CFUN: {}", self.functionality)], ok),
            "AT#SIMSELECT=1" => {
                // SIM slot can only change with the radio off
                if self.functionality == 4 {
                    self.external_sim = true;
                    (vec![], ok)
                } else {
                    (vec![], "+CME ERROR: 3".to_string())
                }
            }
            "AT+CEREG?" => {
                let stat = if self.registered() { 1 } else { 2 };
                (vec![format!("+CEREG: 0,{}", stat)], ok)
            }
            "AT+CESQ" => {
                let line = if self.registered() {
                    self.polls = self.polls.wrapping_add(1);
                    let (rsrq, rsrp) = signal(self.polls);
                    format!("+CESQ: 99,99,255,255,{},{}", rsrq, rsrp)
                } else {
                    "+CESQ: 99,99,255,255,255,255".to_string()
                };
                (vec![line], ok)
            }
            "AT+COPS?" => {
                let line = if self.registered() {
                    format!("+COPS: 0,2,\"{}\",7", self.operator)
                } else {
                    "+COPS: 0".to_string()
                };
                (vec![line], ok)
            }
            _ => (vec![], "ERROR".to_string()),
        }
    }
}

/// Slowly drifting `(rsrq, rsrp)` indices
fn signal(poll: u32) -> (u8, u8) {
    let rsrq = 20 + (poll % 10) as u8;
    let rsrp = 40 + (poll.wrapping_mul(3) % 20) as u8;
    (rsrq, rsrp)
}

/// Handle for building and inspecting a simulated modem
#[derive(Clone)]
pub struct SimModem {
    state: Arc<Mutex<ModemState>>,
}

impl SimModem {
    /// Create a powered-up modem reporting `operator` once registered
    pub fn new(operator: &str, link_up: bool) -> Self {
        Self {
            state: Arc::new(Mutex::new(ModemState {
                line: Vec::new(),
                outgoing: VecDeque::new(),
                held: Vec::new(),
                late_every: 0,
                answered: 0,
                functionality: 1,
                external_sim: false,
                link_up,
                operator: operator.to_string(),
                polls: 0,
            })),
        }
    }

    /// UART halves to hand to an AT channel
    pub fn uart(&self) -> (SimModemTx, SimModemRx) {
        (
            SimModemTx {
                state: Arc::clone(&self.state),
            },
            SimModemRx {
                state: Arc::clone(&self.state),
            },
        )
    }

    /// Answer every `every`th command only after the host times out
    ///
    /// Zero turns slow replies off.
    pub fn set_late_every(&self, every: u32) {
        self.lock().late_every = every;
    }

    /// Bring the network link up or down
    pub fn set_link(&self, up: bool) {
        self.lock().link_up = up;
    }

    /// Check if `AT#SIMSELECT=1` has taken effect
    pub fn external_sim(&self) -> bool {
        self.lock().external_sim
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ModemState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Host-to-modem half
pub struct SimModemTx {
    state: Arc<Mutex<ModemState>>,
}

impl UartTx for SimModemTx {
    type Error = SimUartError;

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), SimUartError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        for &byte in data {
            state.receive(byte);
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SimUartError> {
        Ok(())
    }
}

/// Modem-to-host half
pub struct SimModemRx {
    state: Arc<Mutex<ModemState>>,
}

impl UartRx for SimModemRx {
    type Error = SimUartError;

    fn read_blocking(&mut self, buf: &mut [u8]) -> Result<usize, SimUartError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.outgoing.len() < buf.len() {
            state.timed_out();
            return Err(SimUartError::Timeout);
        }
        for slot in buf.iter_mut() {
            if let Some(byte) = state.outgoing.pop_front() {
                *slot = byte;
            }
        }
        Ok(buf.len())
    }

    fn try_read_byte(&mut self) -> Result<Option<u8>, SimUartError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(state.outgoing.pop_front())
    }
}

/// AT channel over the simulated modem UART
pub type SimChannel = UartAtChannel<SimModemTx, SimModemRx>;

/// AT channel shared by the cell producer and the poster's link check
///
/// Each command runs to completion under the lock.
#[derive(Clone)]
pub struct SharedModem {
    channel: Arc<Mutex<SimChannel>>,
}

impl SharedModem {
    pub fn new(channel: SimChannel) -> Self {
        Self {
            channel: Arc::new(Mutex::new(channel)),
        }
    }
}

impl AtChannel for SharedModem {
    fn command(&mut self, command: &str) -> Result<AtResponse, AtError> {
        self.channel
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .command(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_applets::{link_ready, select_sim, Carrier, CellError, CellModem, CellTelemetry};
    use tessera_core::CycleOutcome;
    use tessera_protocol::at::FinalResult;

    fn channel(modem: &SimModem) -> SimChannel {
        let (tx, rx) = modem.uart();
        UartAtChannel::new(tx, rx)
    }

    #[test]
    fn test_echo_is_dropped_and_lines_collected() {
        let modem = SimModem::new("311480", true);
        let mut channel = channel(&modem);

        let response = channel.command("AT+CFUN?").unwrap();
        assert!(response.is_ok());
        assert_eq!(response.body(), "+CFUN: 1\n");
    }

    #[test]
    fn test_unknown_command_is_error() {
        let modem = SimModem::new("311480", true);
        let mut channel = channel(&modem);

        let response = channel.command("AT+BOGUS").unwrap();
        assert_eq!(response.result(), FinalResult::Error);
    }

    #[test]
    fn test_select_sim_sequence_succeeds() {
        let modem = SimModem::new("311480", true);
        let mut channel = channel(&modem);

        assert!(select_sim(&mut channel).is_empty());
        assert!(modem.external_sim());
        assert_eq!(link_ready(&mut channel), Ok(()));
    }

    #[test]
    fn test_sim_select_with_radio_on_is_refused() {
        let modem = SimModem::new("311480", true);
        let mut channel = channel(&modem);

        let response = channel.command("AT#SIMSELECT=1").unwrap();
        assert_eq!(response.result(), FinalResult::CmeError(3));
        assert!(!modem.external_sim());
    }

    #[test]
    fn test_link_down_fails_registration_check() {
        let modem = SimModem::new("311480", false);
        let mut channel = channel(&modem);

        let failure = link_ready(&mut channel).unwrap_err();
        assert_eq!(failure.command, "AT+CEREG?");

        modem.set_link(true);
        assert_eq!(link_ready(&mut channel), Ok(()));
    }

    #[test]
    fn test_cell_modem_publishes_signal_and_carrier() {
        let modem = SimModem::new("310410", true);
        let telemetry = CellTelemetry::new();
        let mut task = CellModem::new(SharedModem::new(channel(&modem)), &telemetry).into_task();

        task.start().unwrap();
        assert_eq!(task.cycle(), CycleOutcome::Published);

        let (rsrq, rsrp) = signal(1);
        assert_eq!(telemetry.rsrq.get(), rsrq);
        assert_eq!(telemetry.rsrp.get(), rsrp);
        assert_eq!(telemetry.carrier.get(), Carrier::Att);
    }

    #[test]
    fn test_unregistered_modem_reports_unknown_signal() {
        let modem = SimModem::new("310410", false);
        let telemetry = CellTelemetry::new();
        let mut task = CellModem::new(SharedModem::new(channel(&modem)), &telemetry).into_task();

        task.start().unwrap();
        task.cycle();

        assert_eq!(telemetry.rsrp.get(), 255);
        assert_eq!(telemetry.carrier.get(), Carrier::Unknown);
    }

    #[test]
    fn test_late_reply_is_dropped_and_next_command_answered() {
        let modem = SimModem::new("311480", true);
        modem.set_late_every(2);
        let mut channel = channel(&modem);

        assert_eq!(channel.command("AT").map(|r| r.result()), Ok(FinalResult::Ok));
        assert_eq!(channel.command("AT+CFUN?"), Err(AtError::Timeout));

        let response = channel.command("AT+CEREG?").unwrap();
        assert_eq!(response.body(), "+CEREG: 0,1\n");
    }

    #[test]
    fn test_cell_modem_recovers_after_slow_poll() {
        let modem = SimModem::new("311260", true);
        modem.set_late_every(1);
        let telemetry = CellTelemetry::new();
        let mut task = CellModem::new(SharedModem::new(channel(&modem)), &telemetry).into_task();

        task.start().unwrap();
        assert_eq!(
            task.cycle(),
            CycleOutcome::Skipped(CellError::Channel(AtError::Timeout))
        );
        assert_eq!(telemetry.rsrp.get(), 255);

        modem.set_late_every(0);
        assert_eq!(task.cycle(), CycleOutcome::Published);
        let (rsrq, rsrp) = signal(2);
        assert_eq!(telemetry.rsrq.get(), rsrq);
        assert_eq!(telemetry.rsrp.get(), rsrp);
        assert_eq!(telemetry.carrier.get(), Carrier::TMobile);
    }
}
