//! Bus session: handshake, data-format query and telemetry reads.
//!
//! [`BusSession`] owns the I2C peripheral for the lifetime of the bridge.
//! Every transaction is bounded by [`BusConfig::transaction_timeout`].

use embassy_time::{with_timeout, Duration, Timer};
use embedded_hal_async::i2c::{Error as _, ErrorKind, I2c, NoAcknowledgeSource};
use nunchuk_proto::protocol::{
    DATA_FORMAT_REGISTER, INIT_CLEAR_KEY, INIT_DISABLE_ENCRYPTION, TELEMETRY_LEN,
    TELEMETRY_SELECTOR,
};
use nunchuk_proto::{RawTelemetry, CONTROLLER_ADDRESS};

use crate::input::TelemetrySource;

/// Error type for bus transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusError {
    /// NACK, arbitration loss or any other driver failure.
    TransactionFailed,
    /// The read phase ended before all requested bytes arrived.
    IncompleteRead,
    /// The transaction did not finish within the configured timeout.
    Timeout,
}

impl BusError {
    fn from_write<E: embedded_hal_async::i2c::Error>(_err: E) -> Self {
        BusError::TransactionFailed
    }

    fn from_read<E: embedded_hal_async::i2c::Error>(err: E) -> Self {
        match err.kind() {
            ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data) | ErrorKind::Overrun => {
                BusError::IncompleteRead
            }
            _ => BusError::TransactionFailed,
        }
    }
}

/// Bus session configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusConfig {
    /// Upper bound for a single write or read.
    pub transaction_timeout: Duration,
}

impl BusConfig {
    pub const DEFAULT: Self = Self {
        transaction_timeout: Duration::from_millis(10),
    };
}

impl Default for BusConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Exponential backoff between failed initialization attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    /// Delay after the first failure.
    pub initial: Duration,
    /// Ceiling for the delay.
    pub max: Duration,
}

impl BackoffPolicy {
    pub const DEFAULT: Self = Self {
        initial: Duration::from_millis(10),
        max: Duration::from_secs(1),
    };

    /// Delay to wait after the `failures`-th consecutive failure (1-based).
    ///
    /// Doubles per failure and saturates at [`BackoffPolicy::max`].
    #[must_use]
    pub fn delay_for(&self, failures: u32) -> Duration {
        let shift = failures.saturating_sub(1).min(31);
        let ticks = self.initial.as_ticks().saturating_mul(1u64 << shift);
        Duration::from_ticks(ticks).min(self.max)
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Exclusive session with the controller at [`CONTROLLER_ADDRESS`].
pub struct BusSession<I2C> {
    i2c: I2C,
    config: BusConfig,
    data_format: Option<u8>,
}

impl<I2C: I2c> BusSession<I2C> {
    /// Create a session with the default timeout.
    #[must_use]
    pub fn new(i2c: I2C) -> Self {
        Self::with_config(i2c, BusConfig::DEFAULT)
    }

    #[must_use]
    pub fn with_config(i2c: I2C, config: BusConfig) -> Self {
        Self {
            i2c,
            config,
            data_format: None,
        }
    }

    /// Disable the controller's data obfuscation.
    ///
    /// Two writes, `0xF0 <- 0x55` then `0xFB <- 0x00`. Stops at the first
    /// failure.
    pub async fn initialize(&mut self) -> Result<(), BusError> {
        self.write(&INIT_DISABLE_ENCRYPTION).await?;
        self.write(&INIT_CLEAR_KEY).await
    }

    /// Retry [`BusSession::initialize`] until it succeeds.
    ///
    /// There is no other way to recover a controller that never answers, so
    /// this never gives up. `on_failure` runs after every failed attempt with
    /// the attempt count and error, before the backoff delay. Returns the
    /// number of failed attempts.
    pub async fn initialize_with_backoff<F>(
        &mut self,
        policy: &BackoffPolicy,
        mut on_failure: F,
    ) -> u32
    where
        F: FnMut(u32, BusError),
    {
        let mut failures = 0u32;
        loop {
            match self.initialize().await {
                Ok(()) => {
                    info!("controller initialized after {} failed attempts", failures);
                    return failures;
                }
                Err(e) => {
                    failures = failures.saturating_add(1);
                    let delay = policy.delay_for(failures);
                    warn!(
                        "controller init failed: {:?} (attempt {}), retrying in {} ms",
                        e,
                        failures,
                        delay.as_millis()
                    );
                    on_failure(failures, e);
                    Timer::after(delay).await;
                }
            }
        }
    }

    /// Read the data-format byte from register `0xFE`.
    ///
    /// The value is stored but not interpreted.
    pub async fn query_data_format(&mut self) -> Result<u8, BusError> {
        self.write(&[DATA_FORMAT_REGISTER]).await?;
        let mut buf = [0u8; 1];
        self.read(&mut buf).await?;
        self.data_format = Some(buf[0]);
        debug!("data format: {:#x}", buf[0]);
        Ok(buf[0])
    }

    /// Write the selector byte and read one 6-byte capture.
    pub async fn poll_raw(&mut self) -> Result<RawTelemetry, BusError> {
        self.write(&[TELEMETRY_SELECTOR]).await?;
        let mut buf = [0u8; TELEMETRY_LEN];
        self.read(&mut buf).await?;
        Ok(RawTelemetry(buf))
    }

    /// Last data-format byte read, if any.
    #[inline]
    #[must_use]
    pub fn data_format(&self) -> Option<u8> {
        self.data_format
    }

    /// Give the bus back.
    pub fn release(self) -> I2C {
        self.i2c
    }

    async fn write(&mut self, bytes: &[u8]) -> Result<(), BusError> {
        let timeout = self.config.transaction_timeout;
        with_timeout(timeout, self.i2c.write(CONTROLLER_ADDRESS, bytes))
            .await
            .map_err(|_| BusError::Timeout)?
            .map_err(BusError::from_write)
    }

    async fn read(&mut self, buf: &mut [u8]) -> Result<(), BusError> {
        let timeout = self.config.transaction_timeout;
        with_timeout(timeout, self.i2c.read(CONTROLLER_ADDRESS, buf))
            .await
            .map_err(|_| BusError::Timeout)?
            .map_err(BusError::from_read)
    }
}

impl<I2C: I2c> TelemetrySource for BusSession<I2C> {
    async fn poll(&mut self) -> Result<RawTelemetry, BusError> {
        self.poll_raw().await
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use embassy_futures::block_on;
    use embedded_hal_async::i2c::{ErrorType, Operation};
    use std::collections::VecDeque;
    use std::vec;
    use std::vec::Vec;

    /// Scripted bus: records writes, serves queued reads, fails on demand.
    #[derive(Default)]
    struct MockI2c {
        writes: Vec<(u8, Vec<u8>)>,
        reads: VecDeque<Result<Vec<u8>, ErrorKind>>,
        write_errors: VecDeque<ErrorKind>,
        hang: bool,
    }

    impl ErrorType for MockI2c {
        type Error = ErrorKind;
    }

    impl I2c for MockI2c {
        async fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            if self.hang {
                core::future::pending::<()>().await;
            }
            for op in operations.iter_mut() {
                match op {
                    Operation::Write(bytes) => {
                        if let Some(err) = self.write_errors.pop_front() {
                            return Err(err);
                        }
                        self.writes.push((address, bytes.to_vec()));
                    }
                    Operation::Read(buf) => match self.reads.pop_front() {
                        Some(Ok(data)) => buf.copy_from_slice(&data[..buf.len()]),
                        Some(Err(err)) => return Err(err),
                        None => return Err(ErrorKind::Other),
                    },
                }
            }
            Ok(())
        }
    }

    #[test]
    fn test_initialize_writes_handshake() {
        let mut session = BusSession::new(MockI2c::default());
        assert_eq!(block_on(session.initialize()), Ok(()));

        let i2c = session.release();
        assert_eq!(
            i2c.writes,
            vec![(0x52, vec![0xF0, 0x55]), (0x52, vec![0xFB, 0x00])]
        );
    }

    #[test]
    fn test_initialize_stops_at_first_failure() {
        let mut i2c = MockI2c::default();
        i2c.write_errors
            .push_back(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        let mut session = BusSession::new(i2c);

        assert_eq!(
            block_on(session.initialize()),
            Err(BusError::TransactionFailed)
        );
        assert!(session.release().writes.is_empty());
    }

    #[test]
    fn test_initialize_with_backoff_retries_until_success() {
        let mut i2c = MockI2c::default();
        i2c.write_errors.push_back(ErrorKind::Bus);
        i2c.write_errors.push_back(ErrorKind::ArbitrationLoss);
        let mut session = BusSession::new(i2c);
        let policy = BackoffPolicy {
            initial: Duration::from_millis(1),
            max: Duration::from_millis(2),
        };

        let mut seen = Vec::new();
        let failures = block_on(
            session.initialize_with_backoff(&policy, |attempt, err| seen.push((attempt, err))),
        );

        assert_eq!(failures, 2);
        assert_eq!(
            seen,
            vec![
                (1, BusError::TransactionFailed),
                (2, BusError::TransactionFailed)
            ]
        );
        assert_eq!(session.release().writes.len(), 2);
    }

    #[test]
    fn test_backoff_doubles_and_saturates() {
        let policy = BackoffPolicy::DEFAULT;
        assert_eq!(policy.delay_for(1), Duration::from_millis(10));
        assert_eq!(policy.delay_for(2), Duration::from_millis(20));
        assert_eq!(policy.delay_for(4), Duration::from_millis(80));
        assert_eq!(policy.delay_for(8), Duration::from_secs(1));
        assert_eq!(policy.delay_for(u32::MAX), Duration::from_secs(1));
    }

    #[test]
    fn test_query_data_format() {
        let mut i2c = MockI2c::default();
        i2c.reads.push_back(Ok(vec![0x01]));
        let mut session = BusSession::new(i2c);

        assert_eq!(session.data_format(), None);
        assert_eq!(block_on(session.query_data_format()), Ok(0x01));
        assert_eq!(session.data_format(), Some(0x01));
        assert_eq!(session.release().writes, vec![(0x52, vec![0xFE])]);
    }

    #[test]
    fn test_poll_raw_reads_six_bytes() {
        let mut i2c = MockI2c::default();
        i2c.reads
            .push_back(Ok(vec![0x10, 0x20, 0x30, 0x40, 0xEF, 0xFF]));
        let mut session = BusSession::new(i2c);

        let raw = block_on(session.poll()).unwrap();
        assert_eq!(raw.0, [0x10, 0x20, 0x30, 0x40, 0xEF, 0xFF]);
        assert_eq!(raw.button_word(), 0xFFEF);
        assert_eq!(session.release().writes, vec![(0x52, vec![0x00])]);
    }

    #[test]
    fn test_short_read_is_incomplete() {
        let mut i2c = MockI2c::default();
        i2c.reads
            .push_back(Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data)));
        i2c.reads.push_back(Err(ErrorKind::Overrun));
        let mut session = BusSession::new(i2c);

        assert_eq!(block_on(session.poll_raw()), Err(BusError::IncompleteRead));
        assert_eq!(block_on(session.poll_raw()), Err(BusError::IncompleteRead));
    }

    #[test]
    fn test_read_driver_failure_is_transaction_failed() {
        let mut i2c = MockI2c::default();
        i2c.reads.push_back(Err(ErrorKind::Bus));
        let mut session = BusSession::new(i2c);

        assert_eq!(
            block_on(session.poll_raw()),
            Err(BusError::TransactionFailed)
        );
    }

    #[test]
    fn test_stalled_transaction_times_out() {
        let i2c = MockI2c {
            hang: true,
            ..MockI2c::default()
        };
        let mut session = BusSession::with_config(
            i2c,
            BusConfig {
                transaction_timeout: Duration::from_millis(2),
            },
        );

        assert_eq!(block_on(session.poll_raw()), Err(BusError::Timeout));
        assert_eq!(block_on(session.initialize()), Err(BusError::Timeout));
    }
}
