//! Wire constants for the Nunchuk/Classic Controller extension protocol.
//!
//! These are protocol facts, not tunables.

/// Fixed 7-bit bus address of the controller.
pub const CONTROLLER_ADDRESS: u8 = 0x52;

/// First handshake write: `0xF0 <- 0x55` disables data obfuscation.
pub const INIT_DISABLE_ENCRYPTION: [u8; 2] = [0xF0, 0x55];

/// Second handshake write: `0xFB <- 0x00`.
pub const INIT_CLEAR_KEY: [u8; 2] = [0xFB, 0x00];

/// Register holding the data-format byte.
pub const DATA_FORMAT_REGISTER: u8 = 0xFE;

/// Selector written before every telemetry read.
pub const TELEMETRY_SELECTOR: u8 = 0x00;

/// Length of one telemetry read.
pub const TELEMETRY_LEN: usize = 6;

// Bit positions inside the little-endian word at bytes 4..6.
// Lines are active-low: a cleared bit means pressed.
pub const BIT_A: u16 = 1 << 12;
pub const BIT_B: u16 = 1 << 14;
pub const BIT_START: u16 = 1 << 2;
pub const BIT_SELECT: u16 = 1 << 4;
pub const BIT_UP: u16 = 1 << 8;
pub const BIT_DOWN: u16 = 1 << 6;
pub const BIT_LEFT: u16 = 1 << 9;
pub const BIT_RIGHT: u16 = 1 << 7;

/// Raw word reported when nothing is pressed.
pub const IDLE_WORD: u16 = 0xFFFF;
