//! Core input types: RawTelemetry, Buttons, DPad, LogicalInputState.

use core::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Not};

use crate::protocol::{IDLE_WORD, TELEMETRY_LEN};

/// One 6-byte telemetry capture, as read from the controller.
///
/// Only bytes 4 and 5 carry the button/D-pad word; the rest are analog
/// data this pipeline ignores.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawTelemetry(pub [u8; TELEMETRY_LEN]);

impl RawTelemetry {
    /// A capture with every line inactive.
    pub const IDLE: Self = Self::from_word(IDLE_WORD);

    /// Build a capture whose button word is `word`, analog bytes zeroed.
    #[must_use]
    pub const fn from_word(word: u16) -> Self {
        let [lo, hi] = word.to_le_bytes();
        Self([0, 0, 0, 0, lo, hi])
    }

    /// The raw, still active-low, button word.
    #[inline]
    #[must_use]
    pub const fn button_word(&self) -> u16 {
        u16::from_le_bytes([self.0[4], self.0[5]])
    }

    /// The button word with the active-low convention removed.
    #[inline]
    #[must_use]
    pub const fn active_bits(&self) -> u16 {
        !self.button_word()
    }
}

/// Discrete buttons of the controller as a bitfield.
///
/// Bit values here are logical and independent of both the controller's
/// wire positions and the HID button assignment.
///
/// # Example
///
/// ```
/// use nunchuk_proto::Buttons;
///
/// let buttons = Buttons::A | Buttons::START;
/// assert!(buttons.contains(Buttons::A));
/// assert!(!buttons.contains(Buttons::B));
/// ```
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Buttons(pub u8);

impl Buttons {
    pub const A: Self = Self(1 << 0);
    pub const B: Self = Self(1 << 1);
    pub const START: Self = Self(1 << 2);
    pub const SELECT: Self = Self(1 << 3);

    /// No buttons pressed.
    pub const NONE: Self = Self(0);

    /// Every button, in the order they are reported by [`Buttons::iter_names`].
    pub const ALL: [(Self, &'static str); 4] = [
        (Self::A, "A"),
        (Self::B, "B"),
        (Self::START, "START"),
        (Self::SELECT, "SELECT"),
    ];

    /// Check if the given button(s) are pressed.
    #[inline]
    #[must_use]
    pub const fn contains(self, button: Buttons) -> bool {
        (self.0 & button.0) == button.0
    }

    /// Set or clear button(s).
    #[inline]
    pub fn set(&mut self, button: Buttons, pressed: bool) {
        if pressed {
            self.0 |= button.0;
        } else {
            self.0 &= !button.0;
        }
    }

    /// Check if no buttons are pressed.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Names of the pressed buttons.
    pub fn iter_names(self) -> impl Iterator<Item = &'static str> {
        Self::ALL
            .into_iter()
            .filter(move |(button, _)| self.contains(*button))
            .map(|(_, name)| name)
    }
}

impl BitOr for Buttons {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for Buttons {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for Buttons {
    type Output = Self;

    #[inline]
    fn bitand(self, rhs: Self) -> Self::Output {
        Self(self.0 & rhs.0)
    }
}

impl BitAndAssign for Buttons {
    #[inline]
    fn bitand_assign(&mut self, rhs: Self) {
        self.0 &= rhs.0;
    }
}

impl Not for Buttons {
    type Output = Self;

    #[inline]
    fn not(self) -> Self::Output {
        Self(!self.0)
    }
}

/// Merged D-pad direction. Opposing directions are not representable.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DPad {
    #[default]
    None,
    Up,
    Down,
    Left,
    Right,
    UpLeft,
    UpRight,
    DownLeft,
    DownRight,
}

impl DPad {
    /// All nine directions, centered first.
    pub const ALL: [DPad; 9] = [
        DPad::None,
        DPad::Up,
        DPad::Down,
        DPad::Left,
        DPad::Right,
        DPad::UpLeft,
        DPad::UpRight,
        DPad::DownLeft,
        DPad::DownRight,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            DPad::None => "NONE",
            DPad::Up => "UP",
            DPad::Down => "DOWN",
            DPad::Left => "LEFT",
            DPad::Right => "RIGHT",
            DPad::UpLeft => "UP-LEFT",
            DPad::UpRight => "UP-RIGHT",
            DPad::DownLeft => "DOWN-LEFT",
            DPad::DownRight => "DOWN-RIGHT",
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_none(self) -> bool {
        matches!(self, DPad::None)
    }
}

/// Decoded controller state for one poll cycle.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LogicalInputState {
    pub buttons: Buttons,
    pub dpad: DPad,
}

impl LogicalInputState {
    /// Nothing pressed.
    #[must_use]
    pub const fn idle() -> Self {
        Self {
            buttons: Buttons::NONE,
            dpad: DPad::None,
        }
    }

    /// True when no button and no direction is active.
    #[inline]
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        self.buttons.is_empty() && self.dpad.is_none()
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use std::vec::Vec;

    #[test]
    fn test_raw_telemetry_word_is_little_endian() {
        let raw = RawTelemetry([9, 9, 9, 9, 0xEF, 0xFF]);
        assert_eq!(raw.button_word(), 0xFFEF);
        assert_eq!(raw.active_bits(), 0x0010);
    }

    #[test]
    fn test_raw_telemetry_from_word() {
        assert_eq!(RawTelemetry::from_word(0x1234).0, [0, 0, 0, 0, 0x34, 0x12]);
        assert_eq!(RawTelemetry::IDLE.active_bits(), 0);
    }

    #[test]
    fn test_buttons_set_clear() {
        let mut buttons = Buttons::NONE;
        buttons.set(Buttons::SELECT, true);
        assert!(buttons.contains(Buttons::SELECT));
        buttons.set(Buttons::SELECT, false);
        assert!(buttons.is_empty());
    }

    #[test]
    fn test_buttons_iter_names_in_print_order() {
        let names: Vec<_> = (Buttons::SELECT | Buttons::A | Buttons::START)
            .iter_names()
            .collect();
        assert_eq!(names, ["A", "START", "SELECT"]);
        assert_eq!(Buttons::NONE.iter_names().count(), 0);
    }

    #[test]
    fn test_logical_state_idle() {
        assert!(LogicalInputState::idle().is_idle());
        let state = LogicalInputState {
            buttons: Buttons::NONE,
            dpad: DPad::Left,
        };
        assert!(!state.is_idle());
    }
}
