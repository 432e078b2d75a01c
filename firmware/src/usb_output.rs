//! USB HID gamepad transport implementation.

use defmt::{info, warn};
use embassy_rp::peripherals::USB;
use embassy_rp::usb::Driver;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_usb::class::hid::{HidWriter, State};
use embassy_usb::driver::EndpointError;
use embassy_usb::{Builder, Handler};
use nunchuk_core::{
    report_frame, HidGamepadReport, LinkState, OutputError, ReportId, Transport, MAX_FRAME_SIZE,
};

/// Interrupt endpoint packet size; one frame fits in a single packet.
const MAX_PACKET_SIZE: u16 = 16;

/// USB device state shared between the stack's callbacks and the bridge.
///
/// Written from [`UsbStateHandler`] inside the USB task, read from the
/// bridge and status tasks.
pub type UsbState = LinkState<CriticalSectionRawMutex>;

/// Device-level USB callbacks, mirrored into [`UsbState`].
pub struct UsbStateHandler {
    state: &'static UsbState,
}

impl UsbStateHandler {
    #[must_use]
    pub fn new(state: &'static UsbState) -> Self {
        Self { state }
    }
}

impl Handler for UsbStateHandler {
    fn enabled(&mut self, enabled: bool) {
        if !enabled {
            self.state.set_configured(false);
        }
    }

    fn reset(&mut self) {
        self.state.set_configured(false);
    }

    fn configured(&mut self, configured: bool) {
        info!("USB configured: {}", configured);
        self.state.set_configured(configured);
    }

    fn suspended(&mut self, suspended: bool) {
        info!("USB suspended: {}", suspended);
        self.state.set_suspended(suspended);
    }

    fn remote_wakeup_enabled(&mut self, enabled: bool) {
        self.state.set_remote_wakeup_enabled(enabled);
    }
}

/// USB HID gamepad transport.
///
/// Wraps an embassy-usb HID writer; readiness and suspension come from the
/// shared [`UsbState`].
pub struct UsbHidTransport<'d> {
    writer: HidWriter<'d, Driver<'d, USB>, MAX_FRAME_SIZE>,
    usb: &'d UsbState,
    report_id_count: u8,
}

impl<'d> UsbHidTransport<'d> {
    /// Create a new transport from the given HID writer.
    #[must_use]
    pub fn new(
        writer: HidWriter<'d, Driver<'d, USB>, MAX_FRAME_SIZE>,
        usb: &'d UsbState,
        report_id_count: u8,
    ) -> Self {
        Self {
            writer,
            usb,
            report_id_count,
        }
    }
}

impl Transport for UsbHidTransport<'_> {
    fn is_ready(&self) -> bool {
        self.usb.is_configured() && !self.usb.is_suspended()
    }

    async fn send_report(
        &mut self,
        id: ReportId,
        report: &HidGamepadReport,
    ) -> Result<(), OutputError> {
        let frame = report_frame(id, report, self.report_id_count);
        self.writer.write(frame.as_slice()).await.map_err(|e| match e {
            EndpointError::Disabled => OutputError::Disconnected,
            _ => OutputError::Io,
        })
    }

    fn request_remote_wakeup(&mut self) {
        if !self.usb.request_wake() {
            warn!("host has not enabled remote wakeup");
        }
    }
}

/// Configure the USB HID class in the USB builder.
///
/// `report_descriptor` must come from `write_report_descriptor` with the
/// same report id count the transport is created with. Returns the HID
/// writer for use by the application.
pub fn configure_usb_hid<'d>(
    builder: &mut Builder<'d, Driver<'d, USB>>,
    state: &'d mut State<'d>,
    report_descriptor: &'d [u8],
) -> HidWriter<'d, Driver<'d, USB>, MAX_FRAME_SIZE> {
    let config = embassy_usb::class::hid::Config {
        report_descriptor,
        request_handler: None,
        poll_ms: 1,
        max_packet_size: MAX_PACKET_SIZE,
        hid_subclass: embassy_usb::class::hid::HidSubclass::No,
        hid_boot_protocol: embassy_usb::class::hid::HidBootProtocol::None,
    };

    HidWriter::new(builder, state, config)
}
