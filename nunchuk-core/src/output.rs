//! Report transport trait and error types.

use core::future::Future;
use nunchuk_proto::HidGamepadReport;

/// Identifier of a report profile, `0..report_id_count`.
pub type ReportId = u8;

/// Error type for transport operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputError {
    /// USB/communication I/O error.
    Io,
    /// Device not ready (e.g., USB not enumerated).
    NotReady,
    /// Host went away mid-transfer.
    Disconnected,
}

/// Host transport for HID reports.
///
/// This trait abstracts the destination for gamepad reports (USB HID in the
/// firmware, a recorder in tests).
///
/// # `no_std` Compatibility
///
/// All implementations must be `#![no_std]` compatible with no heap allocation.
pub trait Transport {
    /// Check if the transport can accept a report right now.
    fn is_ready(&self) -> bool;

    /// Submit one report under the given profile id.
    ///
    /// Resolves once the transport has taken the report; the caller then
    /// feeds the matching completion back to the scheduler.
    fn send_report(
        &mut self,
        id: ReportId,
        report: &HidGamepadReport,
    ) -> impl Future<Output = Result<(), OutputError>>;

    /// Ask a suspended host to resume.
    fn request_remote_wakeup(&mut self);
}
