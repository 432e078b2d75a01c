//! Heartbeat / fault LED patterns.

use embassy_time::Duration;

use crate::usb_output::UsbState;

/// What the on-board LED is currently reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum LinkStatus {
    /// Controller handshake is failing and being retried.
    ControllerFault,
    NotConfigured,
    Configured,
    Suspended,
}

impl LinkStatus {
    /// Derive the status from the USB state and the init fault flag.
    #[must_use]
    pub fn current(usb: &UsbState, controller_fault: bool) -> Self {
        if controller_fault {
            LinkStatus::ControllerFault
        } else if usb.is_suspended() {
            LinkStatus::Suspended
        } else if usb.is_configured() {
            LinkStatus::Configured
        } else {
            LinkStatus::NotConfigured
        }
    }

    /// Time between LED toggles.
    #[must_use]
    pub const fn blink_interval(self) -> Duration {
        match self {
            LinkStatus::ControllerFault => Duration::from_millis(100),
            LinkStatus::NotConfigured => Duration::from_millis(250),
            LinkStatus::Configured => Duration::from_millis(1000),
            LinkStatus::Suspended => Duration::from_millis(2500),
        }
    }
}
