//! Producer lifecycle
//!
//! A producer owns one telemetry cell. It configures its peripheral once,
//! then samples and publishes on a fixed cadence. [`ProducerTask`] drives
//! that lifecycle synchronously; the firmware and the simulator wrap it in
//! their own periodic loop and log the [`CycleOutcome`] of each tick.
//!
//! ```text
//! Uninitialized --start--> Configuring --ok--> Running --abandon--> Stopped
//!                                      \--err--> Faulted
//! ```
//!
//! `Faulted` and `Stopped` are terminal: the task never touches its
//! peripheral or its cell again.

use core::fmt;

/// A sensor or peripheral that publishes into a telemetry cell
pub trait Producer {
    /// One complete sample
    type Reading: Copy;
    /// Peripheral error
    type Error: fmt::Debug;

    /// Short name used in logs
    const NAME: &'static str;

    /// One-time peripheral setup
    fn configure(&mut self) -> Result<(), Self::Error>;

    /// Read one sample from the peripheral
    fn sample(&mut self) -> Result<Self::Reading, Self::Error>;

    /// Store a sample into the telemetry cell
    fn publish(&self, reading: Self::Reading);
}

/// What a running task does when a sample fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReadPolicy {
    /// Leave the cell untouched and try again next period
    SkipAndRetry,
    /// Stop the task for good
    Abandon,
}

/// Lifecycle state of a producer task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TaskState {
    /// Created, `start` not called yet
    Uninitialized,
    /// Peripheral setup in progress
    Configuring,
    /// Sampling every period
    Running,
    /// Setup failed; cell stays at its sentinel
    Faulted,
    /// A read failed under [`ReadPolicy::Abandon`]
    Stopped,
}

impl TaskState {
    /// Check if the task will never sample again
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskState::Faulted | TaskState::Stopped)
    }
}

/// Result of one scheduled tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CycleOutcome<E> {
    /// Sample taken and published
    Published,
    /// Sample failed, cell unchanged, task still running
    Skipped(E),
    /// Sample failed, task stopped
    Abandoned(E),
    /// Task is not running; the producer was not called
    Inert,
}

/// Drives one [`Producer`] through its lifecycle
pub struct ProducerTask<P: Producer> {
    producer: P,
    policy: ReadPolicy,
    state: TaskState,
    published: u32,
    skipped: u32,
}

impl<P: Producer> ProducerTask<P> {
    /// Wrap a producer with the given read-failure policy
    pub fn new(producer: P, policy: ReadPolicy) -> Self {
        Self {
            producer,
            policy,
            state: TaskState::Uninitialized,
            published: 0,
            skipped: 0,
        }
    }

    /// Configure the peripheral
    ///
    /// Only acts from `Uninitialized`. A configuration failure leaves the
    /// task `Faulted` with no retry; calling `start` again does nothing.
    pub fn start(&mut self) -> Result<(), P::Error> {
        if self.state != TaskState::Uninitialized {
            return Ok(());
        }

        self.state = TaskState::Configuring;
        match self.producer.configure() {
            Ok(()) => {
                self.state = TaskState::Running;
                Ok(())
            }
            Err(e) => {
                self.state = TaskState::Faulted;
                Err(e)
            }
        }
    }

    /// Run one sampling cycle
    pub fn cycle(&mut self) -> CycleOutcome<P::Error> {
        if self.state != TaskState::Running {
            return CycleOutcome::Inert;
        }

        match self.producer.sample() {
            Ok(reading) => {
                self.producer.publish(reading);
                self.published = self.published.saturating_add(1);
                CycleOutcome::Published
            }
            Err(e) => match self.policy {
                ReadPolicy::SkipAndRetry => {
                    self.skipped = self.skipped.saturating_add(1);
                    CycleOutcome::Skipped(e)
                }
                ReadPolicy::Abandon => {
                    self.state = TaskState::Stopped;
                    CycleOutcome::Abandoned(e)
                }
            },
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> TaskState {
        self.state
    }

    /// Read-failure policy
    pub fn policy(&self) -> ReadPolicy {
        self.policy
    }

    /// Cycles that published a sample
    pub fn published(&self) -> u32 {
        self.published
    }

    /// Cycles skipped after a failed sample
    pub fn skipped(&self) -> u32 {
        self.skipped
    }

    /// Producer name
    pub fn name(&self) -> &'static str {
        P::NAME
    }

    /// Borrow the wrapped producer
    pub fn producer(&self) -> &P {
        &self.producer
    }

    /// Mutably borrow the wrapped producer, e.g. to drive its pin
    pub fn producer_mut(&mut self) -> &mut P {
        &mut self.producer
    }
}

/// Sampling period in milliseconds for a rate in Hz
///
/// A zero rate is treated as 1 Hz.
pub fn period_ms(rate_hz: u32) -> u32 {
    1000 / rate_hz.max(1)
}

/// Half period in milliseconds, the interval between toggles of a blinker
///
/// Never returns zero, so a very high rate still yields a finite loop.
pub fn half_period_ms(rate_hz: u32) -> u32 {
    (period_ms(rate_hz) / 2).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::Field;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum MockError {
        Setup,
        Read,
    }

    /// Producer whose failures are scripted
    struct MockProducer<'a> {
        cell: &'a Field<u8>,
        fail_configure: bool,
        fail_reads: &'a [bool],
        reads: usize,
        configures: usize,
    }

    impl<'a> MockProducer<'a> {
        fn new(cell: &'a Field<u8>) -> Self {
            Self {
                cell,
                fail_configure: false,
                fail_reads: &[],
                reads: 0,
                configures: 0,
            }
        }
    }

    impl Producer for MockProducer<'_> {
        type Reading = u8;
        type Error = MockError;

        const NAME: &'static str = "mock";

        fn configure(&mut self) -> Result<(), MockError> {
            self.configures += 1;
            if self.fail_configure {
                Err(MockError::Setup)
            } else {
                Ok(())
            }
        }

        fn sample(&mut self) -> Result<u8, MockError> {
            let index = self.reads;
            self.reads += 1;
            if self.fail_reads.get(index).copied().unwrap_or(false) {
                Err(MockError::Read)
            } else {
                Ok(index as u8 + 1)
            }
        }

        fn publish(&self, reading: u8) {
            self.cell.set(reading);
        }
    }

    #[test]
    fn test_start_then_publish() {
        let cell = Field::unknown();
        let mut task = ProducerTask::new(MockProducer::new(&cell), ReadPolicy::SkipAndRetry);
        assert_eq!(task.state(), TaskState::Uninitialized);

        task.start().unwrap();
        assert_eq!(task.state(), TaskState::Running);

        assert_eq!(task.cycle(), CycleOutcome::Published);
        assert_eq!(cell.get(), 1);
        assert_eq!(task.cycle(), CycleOutcome::Published);
        assert_eq!(cell.get(), 2);
        assert_eq!(task.published(), 2);
    }

    #[test]
    fn test_cycle_before_start_is_inert() {
        let cell = Field::unknown();
        let mut task = ProducerTask::new(MockProducer::new(&cell), ReadPolicy::SkipAndRetry);
        assert_eq!(task.cycle(), CycleOutcome::Inert);
        assert_eq!(task.producer().reads, 0);
    }

    #[test]
    fn test_faulted_producer_never_writes() {
        let cell = Field::unknown();
        let mut producer = MockProducer::new(&cell);
        producer.fail_configure = true;
        let mut task = ProducerTask::new(producer, ReadPolicy::SkipAndRetry);

        assert_eq!(task.start(), Err(MockError::Setup));
        assert_eq!(task.state(), TaskState::Faulted);

        for _ in 0..100 {
            assert_eq!(task.cycle(), CycleOutcome::Inert);
        }
        assert_eq!(cell.get(), 0);
        assert_eq!(task.producer().reads, 0);
        assert_eq!(task.published(), 0);
    }

    #[test]
    fn test_no_retry_after_fault() {
        let cell = Field::unknown();
        let mut producer = MockProducer::new(&cell);
        producer.fail_configure = true;
        let mut task = ProducerTask::new(producer, ReadPolicy::SkipAndRetry);

        let _ = task.start();
        assert_eq!(task.start(), Ok(()));
        assert_eq!(task.state(), TaskState::Faulted);
        assert_eq!(task.producer().configures, 1);
    }

    #[test]
    fn test_skip_and_retry_keeps_running() {
        let cell = Field::unknown();
        let mut producer = MockProducer::new(&cell);
        producer.fail_reads = &[false, true, false];
        let mut task = ProducerTask::new(producer, ReadPolicy::SkipAndRetry);
        task.start().unwrap();

        assert_eq!(task.cycle(), CycleOutcome::Published);
        assert_eq!(task.cycle(), CycleOutcome::Skipped(MockError::Read));
        // Cell keeps the last good value
        assert_eq!(cell.get(), 1);
        assert_eq!(task.state(), TaskState::Running);

        assert_eq!(task.cycle(), CycleOutcome::Published);
        assert_eq!(cell.get(), 3);
        assert_eq!(task.skipped(), 1);
        assert_eq!(task.published(), 2);
    }

    #[test]
    fn test_abandon_stops_task() {
        let cell = Field::unknown();
        let mut producer = MockProducer::new(&cell);
        producer.fail_reads = &[false, true];
        let mut task = ProducerTask::new(producer, ReadPolicy::Abandon);
        task.start().unwrap();

        assert_eq!(task.cycle(), CycleOutcome::Published);
        assert_eq!(task.cycle(), CycleOutcome::Abandoned(MockError::Read));
        assert_eq!(task.state(), TaskState::Stopped);
        assert!(task.state().is_terminal());

        for _ in 0..10 {
            assert_eq!(task.cycle(), CycleOutcome::Inert);
        }
        assert_eq!(task.producer().reads, 2);
        assert_eq!(cell.get(), 1);
    }

    #[test]
    fn test_periods() {
        assert_eq!(period_ms(10), 100);
        assert_eq!(period_ms(1), 1000);
        assert_eq!(period_ms(0), 1000);
        assert_eq!(half_period_ms(1), 500);
        assert_eq!(half_period_ms(4), 125);
        assert_eq!(half_period_ms(5000), 1);
    }
}
