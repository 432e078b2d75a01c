//! Classic Controller to USB Gamepad bridge for RP2040.
//!
//! This crate provides the embedded implementation of a gamepad bridge
//! that reads a Nunchuk/Classic Controller over I2C and outputs it as
//! USB HID.
//!
//! # Overview
//!
//! The firmware runs on a Raspberry Pi Pico (RP2040) and:
//! 1. Disables the controller's data obfuscation (retrying with backoff)
//! 2. Reads the 6-byte telemetry block every 10 ms
//! 3. Decodes buttons and D-pad, encodes a HID gamepad report
//! 4. Sends it to the host, suppressing repeated idle reports
//!
//! # Hardware Configuration
//!
//! | Function  | GPIO | Description |
//! |-----------|------|-------------|
//! | I2C0 SDA  | 4    | Controller data |
//! | I2C0 SCL  | 5    | Controller clock |
//! | LED       | 25   | On-board LED (heartbeat / fault indicator) |
//!
//! # Architecture
//!
//! The firmware uses the Embassy async runtime with three tasks on one
//! thread-mode executor:
//!
//! - **USB Task**: Runs the USB stack, performs remote wakeup on request
//! - **Bridge Task**: Initializes the controller, then steps the
//!   [`DeliveryScheduler`](nunchuk_core::DeliveryScheduler) every millisecond
//! - **Status Task**: Blinks the LED according to [`LinkStatus`]
//!
//! USB callbacks reach the bridge through [`UsbState`], which holds
//! atomics for readiness and a [`Signal`](embassy_sync::signal::Signal) for
//! suspend/resume transitions.
//!
//! # Features
//!
//! - **`dev-panic`** (default): Use `panic-probe` for development (prints panic info via RTT)
//! - **`prod-panic`**: Use `panic-reset` for production (silent watchdog reset)
//! - **`i2c-fast-mode`**: Run the controller bus at 400 kHz
//!
//! # Re-exports
//!
//! This crate re-exports the public items of [`nunchuk_core`] used by the
//! binary, so consumers only need to depend on this crate.

#![no_std]

#[cfg(all(feature = "dev-panic", feature = "prod-panic"))]
compile_error!("Cannot enable both `dev-panic` and `prod-panic` features");

pub use nunchuk_core::{
    report_descriptor_len, write_report_descriptor, BackoffPolicy, BusError, BusSession,
    DeliveryConfig, DeliveryError, DeliveryEvent, DeliveryScheduler, DeliveryState,
    HidGamepadReport, OutputError, StepOutcome, Transport,
};

pub mod config;
pub mod status;
pub mod usb_output;

pub use status::LinkStatus;
pub use usb_output::{configure_usb_hid, UsbHidTransport, UsbState, UsbStateHandler};
