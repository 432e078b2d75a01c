//! Telemetry decoder: raw active-low word to [`LogicalInputState`].

use crate::protocol::{
    BIT_A, BIT_B, BIT_DOWN, BIT_LEFT, BIT_RIGHT, BIT_SELECT, BIT_START, BIT_UP,
};
use crate::types::{Buttons, DPad, LogicalInputState, RawTelemetry};

/// Decode one telemetry capture.
///
/// Total and pure: every raw pattern maps to exactly one state.
///
/// The D-pad is merged in a fixed order. Vertical is resolved first, with
/// Up taking precedence over Down. Left is then combined with the vertical
/// result, and Right after it, so Right wins when Left and Right are both
/// asserted. Neither tie-break reflects anything the hardware promises.
///
/// # Example
///
/// ```
/// use nunchuk_proto::{decode, Buttons, DPad, RawTelemetry};
///
/// // bit 4 cleared: Select only
/// let state = decode(RawTelemetry([0, 0, 0, 0, 0xEF, 0xFF]));
/// assert_eq!(state.buttons, Buttons::SELECT);
/// assert_eq!(state.dpad, DPad::None);
/// ```
#[must_use]
pub fn decode(raw: RawTelemetry) -> LogicalInputState {
    decode_word(raw.button_word())
}

/// Decode a raw button word as read off the wire (active-low).
#[must_use]
pub fn decode_word(word: u16) -> LogicalInputState {
    let active = !word;
    let pressed = |bit: u16| active & bit != 0;

    let mut buttons = Buttons::NONE;
    buttons.set(Buttons::A, pressed(BIT_A));
    buttons.set(Buttons::B, pressed(BIT_B));
    buttons.set(Buttons::START, pressed(BIT_START));
    buttons.set(Buttons::SELECT, pressed(BIT_SELECT));

    let vertical = if pressed(BIT_UP) {
        DPad::Up
    } else if pressed(BIT_DOWN) {
        DPad::Down
    } else {
        DPad::None
    };

    let mut dpad = vertical;
    if pressed(BIT_LEFT) {
        dpad = match vertical {
            DPad::Down => DPad::DownLeft,
            DPad::Up => DPad::UpLeft,
            _ => DPad::Left,
        };
    }
    if pressed(BIT_RIGHT) {
        dpad = match vertical {
            DPad::Down => DPad::DownRight,
            DPad::Up => DPad::UpRight,
            _ => DPad::Right,
        };
    }

    LogicalInputState { buttons, dpad }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::IDLE_WORD;

    fn with_cleared(bits: u16) -> RawTelemetry {
        RawTelemetry::from_word(!bits)
    }

    #[test]
    fn test_decode_is_total() {
        for word in 0..=u16::MAX {
            let state = decode_word(word);
            assert!(DPad::ALL.contains(&state.dpad));
            assert_eq!(state.buttons.0 & !0x0F, 0);
        }
    }

    #[test]
    fn test_idle_word_decodes_idle() {
        assert!(decode_word(IDLE_WORD).is_idle());
        assert!(decode(RawTelemetry::IDLE).is_idle());
    }

    #[test]
    fn test_all_lines_active() {
        let state = decode_word(0x0000);
        assert_eq!(
            state.buttons,
            Buttons::A | Buttons::B | Buttons::START | Buttons::SELECT
        );
        // Up beats Down, Right is evaluated after Left.
        assert_eq!(state.dpad, DPad::UpRight);
    }

    #[test]
    fn test_single_buttons() {
        let cases = [
            (BIT_A, Buttons::A),
            (BIT_B, Buttons::B),
            (BIT_START, Buttons::START),
            (BIT_SELECT, Buttons::SELECT),
        ];
        for (bit, button) in cases {
            let state = decode(with_cleared(bit));
            assert_eq!(state.buttons, button);
            assert_eq!(state.dpad, DPad::None);
        }
    }

    #[test]
    fn test_single_directions() {
        let cases = [
            (BIT_UP, DPad::Up),
            (BIT_DOWN, DPad::Down),
            (BIT_LEFT, DPad::Left),
            (BIT_RIGHT, DPad::Right),
        ];
        for (bit, dpad) in cases {
            let state = decode(with_cleared(bit));
            assert_eq!(state.dpad, dpad);
            assert!(state.buttons.is_empty());
        }
    }

    #[test]
    fn test_diagonals() {
        assert_eq!(decode(with_cleared(BIT_UP | BIT_LEFT)).dpad, DPad::UpLeft);
        assert_eq!(decode(with_cleared(BIT_UP | BIT_RIGHT)).dpad, DPad::UpRight);
        assert_eq!(decode(with_cleared(BIT_DOWN | BIT_LEFT)).dpad, DPad::DownLeft);
        assert_eq!(
            decode(with_cleared(BIT_DOWN | BIT_RIGHT)).dpad,
            DPad::DownRight
        );
    }

    // Regression pins for an arbitrary tie-break, not a hardware guarantee.
    #[test]
    fn test_up_down_resolves_to_up() {
        assert_eq!(decode(with_cleared(BIT_UP | BIT_DOWN)).dpad, DPad::Up);
    }

    #[test]
    fn test_left_right_resolves_to_right() {
        assert_eq!(decode(with_cleared(BIT_LEFT | BIT_RIGHT)).dpad, DPad::Right);
        assert_eq!(
            decode(with_cleared(BIT_DOWN | BIT_LEFT | BIT_RIGHT)).dpad,
            DPad::DownRight
        );
    }

    #[test]
    fn test_unmapped_bits_ignored() {
        // bits 0, 1, 3, 5, 10, 11, 13, 15 carry nothing here
        let unmapped = 0b1010_1100_0010_1011;
        assert!(decode(with_cleared(unmapped)).is_idle());
    }

    #[test]
    fn test_select_scenario() {
        let state = decode(RawTelemetry([0x11, 0x22, 0x33, 0x44, 0xEF, 0xFF]));
        assert_eq!(state.buttons, Buttons::SELECT);
        assert_eq!(state.dpad, DPad::None);
    }

    #[test]
    fn test_buttons_combine_with_direction() {
        let state = decode(with_cleared(BIT_A | BIT_B | BIT_DOWN | BIT_LEFT));
        assert_eq!(state.buttons, Buttons::A | Buttons::B);
        assert_eq!(state.dpad, DPad::DownLeft);
    }
}
