//! Compile-time board and USB configuration.

/// Controller bus clock.
#[cfg(not(feature = "i2c-fast-mode"))]
pub const I2C_FREQUENCY_HZ: u32 = 100_000;

/// Controller bus clock.
#[cfg(feature = "i2c-fast-mode")]
pub const I2C_FREQUENCY_HZ: u32 = 400_000;

/// Report profiles chained per input event. Above 1 the descriptor gets a
/// Report ID per profile and every frame is prefixed with it.
pub const REPORT_ID_COUNT: u8 = 1;

/// Control loop tick; the scheduler applies its own 10 ms poll interval.
pub const LOOP_TICK_MS: u64 = 1;

// pid.codes test VID/PID
pub const USB_VID: u16 = 0x1209;
pub const USB_PID: u16 = 0x0001;
pub const USB_MANUFACTURER: &str = "Rust Gamepad";
pub const USB_PRODUCT: &str = "Classic Controller Bridge";
pub const USB_SERIAL: &str = "001";
