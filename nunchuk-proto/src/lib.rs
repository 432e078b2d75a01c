//! Classic Controller telemetry decoding and HID gamepad report encoding.
//!
//! This crate is the pure half of the bridge. It knows the controller's
//! wire constants and how to turn one telemetry capture into a HID report:
//!
//! - **Protocol**: [`protocol`] - bus address, handshake registers, bit table
//! - **Types**: [`RawTelemetry`], [`Buttons`], [`DPad`], [`LogicalInputState`]
//! - **Decoding**: [`decode()`] - active-low word to logical state
//! - **Encoding**: [`encode()`] - logical state to [`HidGamepadReport`]
//!
//! # Telemetry Format
//!
//! Each poll returns six bytes. Bytes 4 and 5 form a little-endian, active-low
//! word (a cleared bit means pressed):
//!
//! | Bit | Input  |
//! |-----|--------|
//! | 2   | Start  |
//! | 4   | Select |
//! | 6   | Down   |
//! | 7   | Right  |
//! | 8   | Up     |
//! | 9   | Left   |
//! | 12  | A      |
//! | 14  | B      |
//!
//! # Example
//!
//! ```
//! use nunchuk_proto::{decode, encode, Hat, HidButtons, RawTelemetry};
//!
//! // bits 12 (A) and 8 (Up) cleared
//! let raw = RawTelemetry::from_word(!((1 << 12) | (1 << 8)));
//! let report = encode(decode(raw));
//! assert_eq!(report.buttons, HidButtons::A);
//! assert_eq!(report.hat, Hat::Up);
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Enable defmt formatting (for embedded logging)
//!
//! # No-std Support
//!
//! This crate is `#![no_std]` by default and uses no heap allocations.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

pub mod decode;
pub mod protocol;
pub mod report;
pub mod types;

pub use decode::{decode, decode_word};
pub use protocol::CONTROLLER_ADDRESS;
pub use report::{
    encode, report_descriptor_len, report_frame, write_report_descriptor, Hat, HidButtons,
    HidGamepadReport, ReportFrame, MAX_FRAME_SIZE, REPORT_DESCRIPTOR,
};
pub use types::{Buttons, DPad, LogicalInputState, RawTelemetry};
