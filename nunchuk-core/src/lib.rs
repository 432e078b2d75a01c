//! Platform-agnostic controller bus session and HID report delivery.
//!
//! This crate provides the stateful half of the bridge without any
//! chip-specific dependencies. It can be used both in embedded `no_std`
//! environments and on host for testing.
//!
//! # Overview
//!
//! - [`bus`]: Controller handshake and telemetry reads ([`BusSession`])
//! - [`input`]: Telemetry source trait ([`TelemetrySource`])
//! - [`link`]: Host link flags and wake requests shared with the USB stack
//!   ([`LinkState`])
//! - [`output`]: Report transport trait ([`Transport`])
//! - [`scheduler`]: Poll/decode/encode pacing and report chaining
//!   ([`DeliveryScheduler`], [`DeliveryState`], [`DeliveryEvent`])
//!
//! Decoding and encoding themselves live in [`nunchuk_proto`], re-exported
//! here for convenience.
//!
//! # Example
//!
//! ```ignore
//! let mut session = BusSession::new(i2c);
//! session.initialize_with_backoff(&BackoffPolicy::DEFAULT, |_, _| led.toggle()).await;
//! session.query_data_format().await?;
//!
//! let mut scheduler = DeliveryScheduler::new(session, transport);
//! let mut state = DeliveryState::new();
//! loop {
//!     let now_ms = Instant::now().as_millis();
//!     if let Ok(StepOutcome::Sent(id)) =
//!         scheduler.step(&mut state, DeliveryEvent::PollTick { now_ms }).await
//!     {
//!         scheduler.step(&mut state, DeliveryEvent::ReportComplete(id)).await.ok();
//!     }
//! }
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Enable defmt formatting and logging (for embedded targets)
//! - **`log`**: Route log statements through the `log` facade instead
//!
//! # No-std Support
//!
//! This crate is `#![no_std]` by default and uses no heap allocations.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod bus;
pub mod input;
pub mod link;
pub mod output;
pub mod scheduler;

// Re-export main types at crate root
pub use bus::{BackoffPolicy, BusConfig, BusError, BusSession};
pub use input::TelemetrySource;
pub use link::LinkState;
pub use output::{OutputError, ReportId, Transport};
pub use scheduler::{
    DeliveryConfig, DeliveryError, DeliveryEvent, DeliveryScheduler, DeliveryState, Phase,
    StepOutcome,
};

pub use nunchuk_proto::{
    decode, encode, report_descriptor_len, report_frame, write_report_descriptor, Buttons, DPad,
    Hat, HidButtons, HidGamepadReport, LogicalInputState, RawTelemetry, ReportFrame,
    MAX_FRAME_SIZE, REPORT_DESCRIPTOR,
};
