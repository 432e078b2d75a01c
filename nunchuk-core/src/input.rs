//! Telemetry source trait.

use core::future::Future;
use nunchuk_proto::RawTelemetry;

use crate::bus::BusError;

/// Async trait for controller telemetry sources.
///
/// This trait abstracts where raw captures come from, so the delivery
/// scheduler can be driven by the real bus session or by a scripted source
/// in tests.
///
/// # `no_std` Compatibility
///
/// All implementations must be `#![no_std]` compatible with no heap allocation.
pub trait TelemetrySource {
    /// Capture one 6-byte telemetry buffer.
    ///
    /// A failed capture must be reported as an error, never as a buffer of
    /// undefined contents.
    fn poll(&mut self) -> impl Future<Output = Result<RawTelemetry, BusError>>;
}
