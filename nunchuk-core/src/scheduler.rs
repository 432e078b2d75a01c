//! DeliveryScheduler: paces poll -> decode -> encode cycles onto the host transport.
//!
//! The scheduler is an explicit state machine. Everything it remembers
//! between steps lives in [`DeliveryState`], which the caller owns and hands
//! in by exclusive reference; transport callbacks arrive as
//! [`DeliveryEvent`] values instead of free-standing hooks.
//!
//! # Transitions
//!
//! | Phase                    | Event                      | Effect                                   |
//! |--------------------------|----------------------------|------------------------------------------|
//! | `Idle` / `SendingChain`  | `PollTick` (interval due)  | poll, then wake / defer / send id 0      |
//! | `AwaitingTransportReady` | `PollTick` (any time)      | same, without waiting for the interval   |
//! | any                      | `ReportComplete(id)`       | send `id + 1` if it exists, else `Idle`  |
//! | any                      | `TransportSuspended`       | mark suspended, `Idle`                   |
//! | any                      | `TransportResumed`         | clear suspended                          |

use nunchuk_proto::{decode, encode, HidGamepadReport, LogicalInputState};

use crate::bus::BusError;
use crate::input::TelemetrySource;
use crate::output::{OutputError, ReportId, Transport};

/// Scheduler configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeliveryConfig {
    /// Minimum time between poll cycles.
    pub poll_interval_ms: u64,
    /// Number of report profiles chained per input event.
    pub report_id_count: u8,
}

impl DeliveryConfig {
    /// 10 ms cadence, one report profile.
    pub const DEFAULT: Self = Self {
        poll_interval_ms: 10,
        report_id_count: 1,
    };

    /// Same cadence, `count` chained profiles (at least one).
    #[must_use]
    pub const fn with_report_id_count(count: u8) -> Self {
        Self {
            report_id_count: if count == 0 { 1 } else { count },
            ..Self::DEFAULT
        }
    }
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Where the scheduler is in its delivery cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    #[default]
    Idle,
    /// A cycle came due while the transport was busy.
    AwaitingTransportReady,
    /// Report `in_flight` of a multi-profile chain has been submitted.
    SendingChain { in_flight: ReportId },
}

/// Process-lifetime scheduler state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeliveryState {
    pub phase: Phase,
    /// Millisecond timestamp of the last cycle that came due.
    pub last_poll_ms: u64,
    /// Last transmitted head report was non-idle.
    pub had_gamepad_key: bool,
    /// Host has suspended the bus.
    pub suspended: bool,
    /// Poll cycles skipped because the bus transaction failed.
    pub poll_faults: u32,
    /// Most recent successfully decoded input.
    pub last_input: LogicalInputState,
}

impl DeliveryState {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            phase: Phase::Idle,
            last_poll_ms: 0,
            had_gamepad_key: false,
            suspended: false,
            poll_faults: 0,
            last_input: LogicalInputState::idle(),
        }
    }
}

/// Inputs to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeliveryEvent {
    /// Periodic tick carrying the monotonic clock in milliseconds.
    PollTick { now_ms: u64 },
    /// The transport finished delivering report `id`.
    ReportComplete(ReportId),
    TransportSuspended,
    TransportResumed,
}

/// What a single step did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[must_use]
pub enum StepOutcome {
    /// Nothing to do yet.
    Waiting,
    /// Cycle due but the transport was not ready.
    Deferred,
    /// A report went out under this id.
    Sent(ReportId),
    /// Idle report withheld (already reported, or host suspended).
    Suppressed,
    /// Host asked to resume instead of sending.
    WakeRequested,
    /// Last profile of the chain delivered.
    ChainDone,
}

/// Error type for scheduler steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeliveryError {
    /// Poll failed; the cycle was skipped.
    Bus(BusError),
    /// The transport rejected the report.
    Output(OutputError),
}

/// Drives telemetry from a [`TelemetrySource`] onto a [`Transport`].
///
/// # Error Handling
///
/// A failed poll is never decoded: the cycle is skipped, counted in
/// [`DeliveryState::poll_faults`] and returned as [`DeliveryError::Bus`].
/// The next due tick polls again.
pub struct DeliveryScheduler<I, T> {
    input: I,
    transport: T,
    config: DeliveryConfig,
}

impl<I: TelemetrySource, T: Transport> DeliveryScheduler<I, T> {
    /// Create a scheduler with the default configuration.
    pub fn new(input: I, transport: T) -> Self {
        Self::with_config(input, transport, DeliveryConfig::DEFAULT)
    }

    pub fn with_config(input: I, transport: T, config: DeliveryConfig) -> Self {
        Self {
            input,
            transport,
            config,
        }
    }

    /// Advance the state machine by one event.
    pub async fn step(
        &mut self,
        state: &mut DeliveryState,
        event: DeliveryEvent,
    ) -> Result<StepOutcome, DeliveryError> {
        match event {
            DeliveryEvent::PollTick { now_ms } => self.on_poll_tick(state, now_ms).await,
            DeliveryEvent::ReportComplete(id) => self.on_report_complete(state, id).await,
            DeliveryEvent::TransportSuspended => {
                debug!("transport suspended");
                state.suspended = true;
                state.phase = Phase::Idle;
                Ok(StepOutcome::Waiting)
            }
            DeliveryEvent::TransportResumed => {
                debug!("transport resumed");
                state.suspended = false;
                Ok(StepOutcome::Waiting)
            }
        }
    }

    async fn on_poll_tick(
        &mut self,
        state: &mut DeliveryState,
        now_ms: u64,
    ) -> Result<StepOutcome, DeliveryError> {
        let elapsed = now_ms.saturating_sub(state.last_poll_ms);
        if state.phase != Phase::AwaitingTransportReady && elapsed < self.config.poll_interval_ms {
            return Ok(StepOutcome::Waiting);
        }
        state.last_poll_ms = now_ms;

        // A suspended host is never "ready", but it still has to be polled
        // so that a press can wake it.
        if !state.suspended && !self.transport.is_ready() {
            state.phase = Phase::AwaitingTransportReady;
            return Ok(StepOutcome::Deferred);
        }

        let input = self.poll_input(state).await?;

        if state.suspended {
            state.phase = Phase::Idle;
            if input.is_idle() {
                return Ok(StepOutcome::Suppressed);
            }
            info!("input while suspended, requesting remote wakeup");
            self.transport.request_remote_wakeup();
            return Ok(StepOutcome::WakeRequested);
        }

        let report = encode(input);
        let pressed = !report.is_neutral();
        if !pressed && !state.had_gamepad_key {
            state.phase = Phase::Idle;
            return Ok(StepOutcome::Suppressed);
        }

        self.send(state, 0, &report).await?;
        state.had_gamepad_key = pressed;
        Ok(StepOutcome::Sent(0))
    }

    async fn on_report_complete(
        &mut self,
        state: &mut DeliveryState,
        id: ReportId,
    ) -> Result<StepOutcome, DeliveryError> {
        let next = match id.checked_add(1) {
            Some(next) if next < self.config.report_id_count => next,
            _ => {
                state.phase = Phase::Idle;
                return Ok(StepOutcome::ChainDone);
            }
        };

        // The chain is dropped, not resumed; the next tick starts over at id 0.
        if state.suspended || !self.transport.is_ready() {
            state.phase = Phase::Idle;
            return Ok(StepOutcome::Deferred);
        }

        let input = self.poll_input(state).await?;
        let report = encode(input);
        trace!("chaining report {} after {}", next, id);
        self.send(state, next, &report).await?;
        Ok(StepOutcome::Sent(next))
    }

    /// Poll and decode, skipping the cycle on failure.
    async fn poll_input(
        &mut self,
        state: &mut DeliveryState,
    ) -> Result<LogicalInputState, DeliveryError> {
        match self.input.poll().await {
            Ok(raw) => {
                let input = decode(raw);
                if input != state.last_input {
                    debug!(
                        "input changed: buttons={:?} dpad={}",
                        input.buttons,
                        input.dpad.name()
                    );
                    state.last_input = input;
                }
                Ok(input)
            }
            Err(e) => {
                state.poll_faults = state.poll_faults.saturating_add(1);
                state.phase = Phase::Idle;
                warn!("poll failed: {:?} ({} faults)", e, state.poll_faults);
                Err(DeliveryError::Bus(e))
            }
        }
    }

    async fn send(
        &mut self,
        state: &mut DeliveryState,
        id: ReportId,
        report: &HidGamepadReport,
    ) -> Result<(), DeliveryError> {
        if let Err(e) = self.transport.send_report(id, report).await {
            error!("report {} not sent: {:?}", id, e);
            state.phase = Phase::Idle;
            return Err(DeliveryError::Output(e));
        }
        state.phase = if self.config.report_id_count > 1 {
            Phase::SendingChain { in_flight: id }
        } else {
            Phase::Idle
        };
        Ok(())
    }

    /// Get a reference to the telemetry source.
    pub fn input(&self) -> &I {
        &self.input
    }

    /// Get a mutable reference to the telemetry source.
    pub fn input_mut(&mut self) -> &mut I {
        &mut self.input
    }

    /// Get a reference to the transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Get a mutable reference to the transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn config(&self) -> &DeliveryConfig {
        &self.config
    }

    /// Decompose the scheduler into its source and transport.
    pub fn into_parts(self) -> (I, T) {
        (self.input, self.transport)
    }
}
