//! HID gamepad report: structure, wire layout, descriptor and encoder.

use crate::types::{Buttons, DPad, LogicalInputState};

/// Hat switch value.
///
/// Centered is 0 so that an idle report is all-zero; the eight directions
/// run clockwise from Up = 1. This is the 0..=7-plus-sentinel convention
/// shifted by one: the descriptor declares a logical range of 1..=8 with a
/// null state, so hosts read 0 as "no direction".
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Hat {
    #[default]
    Centered = 0,
    Up = 1,
    UpRight = 2,
    Right = 3,
    DownRight = 4,
    Down = 5,
    DownLeft = 6,
    Left = 7,
    UpLeft = 8,
}

impl Hat {
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u8 {
        self as u8
    }

    /// Inverse of the D-pad mapping used by [`encode`].
    #[must_use]
    pub const fn to_dpad(self) -> DPad {
        match self {
            Hat::Centered => DPad::None,
            Hat::Up => DPad::Up,
            Hat::UpRight => DPad::UpRight,
            Hat::Right => DPad::Right,
            Hat::DownRight => DPad::DownRight,
            Hat::Down => DPad::Down,
            Hat::DownLeft => DPad::DownLeft,
            Hat::Left => DPad::Left,
            Hat::UpLeft => DPad::UpLeft,
        }
    }
}

impl From<DPad> for Hat {
    fn from(dpad: DPad) -> Self {
        match dpad {
            DPad::None => Hat::Centered,
            DPad::Up => Hat::Up,
            DPad::Down => Hat::Down,
            DPad::Left => Hat::Left,
            DPad::Right => Hat::Right,
            DPad::UpLeft => Hat::UpLeft,
            DPad::UpRight => Hat::UpRight,
            DPad::DownLeft => Hat::DownLeft,
            DPad::DownRight => Hat::DownRight,
        }
    }
}

/// HID buttons bitfield (32 buttons, Button 1 = bit 0).
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HidButtons(pub u32);

impl HidButtons {
    pub const A: Self = Self(1 << 0);
    pub const B: Self = Self(1 << 1);
    pub const SELECT: Self = Self(1 << 10);
    pub const START: Self = Self(1 << 11);

    pub const NONE: Self = Self(0);

    #[inline]
    #[must_use]
    pub const fn contains(self, other: HidButtons) -> bool {
        (self.0 & other.0) == other.0
    }

    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl core::ops::BitOr for HidButtons {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl core::ops::BitOrAssign for HidButtons {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// HID gamepad report.
///
/// Matches [`REPORT_DESCRIPTOR`]. Total size: 11 bytes
/// (axes: 6x1, hat: 1, buttons: 4).
///
/// The axes exist for descriptor compatibility; this controller path never
/// produces analog data, so [`encode`] always leaves them at zero.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HidGamepadReport {
    pub x: i8,
    pub y: i8,
    pub z: i8,
    pub rz: i8,
    pub rx: i8,
    pub ry: i8,
    pub hat: Hat,
    pub buttons: HidButtons,
}

impl HidGamepadReport {
    /// Size of the report in bytes, without a report id.
    pub const SIZE: usize = 11;

    /// All-zero report.
    #[must_use]
    pub const fn neutral() -> Self {
        Self {
            x: 0,
            y: 0,
            z: 0,
            rz: 0,
            rx: 0,
            ry: 0,
            hat: Hat::Centered,
            buttons: HidButtons::NONE,
        }
    }

    /// True when the report carries no direction and no buttons.
    #[inline]
    #[must_use]
    pub const fn is_neutral(&self) -> bool {
        matches!(self.hat, Hat::Centered)
            && self.buttons.0 == 0
            && self.x == 0
            && self.y == 0
            && self.z == 0
            && self.rz == 0
            && self.rx == 0
            && self.ry == 0
    }

    /// Convert the report to its wire bytes.
    #[must_use]
    pub fn as_bytes(&self) -> [u8; Self::SIZE] {
        let [b0, b1, b2, b3] = self.buttons.0.to_le_bytes();
        [
            self.x as u8,
            self.y as u8,
            self.z as u8,
            self.rz as u8,
            self.rx as u8,
            self.ry as u8,
            self.hat.raw(),
            b0,
            b1,
            b2,
            b3,
        ]
    }
}

/// Largest frame on the wire: one report-id byte plus the report.
pub const MAX_FRAME_SIZE: usize = HidGamepadReport::SIZE + 1;

/// One report laid out for the interrupt endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReportFrame {
    buf: [u8; MAX_FRAME_SIZE],
    len: usize,
}

impl ReportFrame {
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.buf[..self.len]
    }
}

impl core::ops::Deref for ReportFrame {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_slice()
    }
}

/// Lay out report profile `id` for the wire.
///
/// With more than one profile the descriptor from
/// [`write_report_descriptor`] carries report ids starting at 1, so the
/// frame is prefixed with `id + 1`. A single profile sends the bare report.
#[must_use]
pub fn report_frame(id: u8, report: &HidGamepadReport, report_id_count: u8) -> ReportFrame {
    let mut buf = [0u8; MAX_FRAME_SIZE];
    let bytes = report.as_bytes();
    if report_id_count > 1 {
        buf[0] = id.wrapping_add(1);
        buf[1..].copy_from_slice(&bytes);
        ReportFrame {
            buf,
            len: MAX_FRAME_SIZE,
        }
    } else {
        buf[..HidGamepadReport::SIZE].copy_from_slice(&bytes);
        ReportFrame {
            buf,
            len: HidGamepadReport::SIZE,
        }
    }
}

impl From<&LogicalInputState> for HidGamepadReport {
    fn from(state: &LogicalInputState) -> Self {
        encode(*state)
    }
}

/// Map a decoded input state onto a HID gamepad report.
///
/// Pure: an idle state produces [`HidGamepadReport::neutral`]. Whether an
/// idle report is worth sending is decided by the caller.
#[must_use]
pub fn encode(state: LogicalInputState) -> HidGamepadReport {
    const BUTTON_MAP: [(Buttons, HidButtons); 4] = [
        (Buttons::A, HidButtons::A),
        (Buttons::B, HidButtons::B),
        (Buttons::START, HidButtons::START),
        (Buttons::SELECT, HidButtons::SELECT),
    ];

    let mut buttons = HidButtons::NONE;
    for (logical, hid) in BUTTON_MAP {
        if state.buttons.contains(logical) {
            buttons |= hid;
        }
    }

    HidGamepadReport {
        hat: Hat::from(state.dpad),
        buttons,
        ..HidGamepadReport::neutral()
    }
}

/// HID gamepad report descriptor.
///
/// This descriptor defines a gamepad with:
/// - 6 signed 8-bit axes (X, Y, Z, Rz, Rx, Ry)
/// - 1 hat switch (8 directions, null state when 0)
/// - 32 buttons
pub const REPORT_DESCRIPTOR: &[u8] = &[
    0x05, 0x01, // Usage Page (Generic Desktop)
    0x09, 0x05, // Usage (Gamepad)
    0xA1, 0x01, // Collection (Application)
    //
    // --- Axes ---
    0x05, 0x01, //   Usage Page (Generic Desktop)
    0x09, 0x30, //   Usage (X)
    0x09, 0x31, //   Usage (Y)
    0x09, 0x32, //   Usage (Z)
    0x09, 0x35, //   Usage (Rz)
    0x09, 0x33, //   Usage (Rx)
    0x09, 0x34, //   Usage (Ry)
    0x15, 0x81, //   Logical Minimum (-127)
    0x25, 0x7F, //   Logical Maximum (127)
    0x95, 0x06, //   Report Count (6)
    0x75, 0x08, //   Report Size (8)
    0x81, 0x02, //   Input (Data, Variable, Absolute)
    //
    // --- Hat switch ---
    0x05, 0x01, //   Usage Page (Generic Desktop)
    0x09, 0x39, //   Usage (Hat switch)
    0x15, 0x01, //   Logical Minimum (1)
    0x25, 0x08, //   Logical Maximum (8)
    0x35, 0x00, //   Physical Minimum (0)
    0x46, 0x3B, 0x01, //   Physical Maximum (315)
    0x65, 0x14, //   Unit (Degrees)
    0x95, 0x01, //   Report Count (1)
    0x75, 0x08, //   Report Size (8)
    0x81, 0x42, //   Input (Data, Variable, Absolute, Null State)
    0x65, 0x00, //   Unit (None)
    //
    // --- Buttons (32 buttons) ---
    0x05, 0x09, //   Usage Page (Button)
    0x19, 0x01, //   Usage Minimum (Button 1)
    0x29, 0x20, //   Usage Maximum (Button 32)
    0x15, 0x00, //   Logical Minimum (0)
    0x25, 0x01, //   Logical Maximum (1)
    0x95, 0x20, //   Report Count (32)
    0x75, 0x01, //   Report Size (1)
    0x81, 0x02, //   Input (Data, Variable, Absolute)
    //
    0xC0, // End Collection
];

// Usage Page, Usage, Collection: the Report ID item goes right after these.
const COLLECTION_HEADER_LEN: usize = 6;

/// Descriptor length for `report_id_count` profiles (0 counts as 1).
#[must_use]
pub const fn report_descriptor_len(report_id_count: u8) -> usize {
    if report_id_count <= 1 {
        REPORT_DESCRIPTOR.len()
    } else {
        report_id_count as usize * (REPORT_DESCRIPTOR.len() + 2)
    }
}

/// Write the descriptor for `report_id_count` profiles into `out`.
///
/// One profile yields [`REPORT_DESCRIPTOR`] unchanged. More than one yields
/// one application collection per profile, each tagged with
/// `Report ID (n)` for n in 1..=count. Returns the number of bytes written,
/// or `None` if `out` is shorter than [`report_descriptor_len`].
pub fn write_report_descriptor(report_id_count: u8, out: &mut [u8]) -> Option<usize> {
    let len = report_descriptor_len(report_id_count);
    let out = out.get_mut(..len)?;

    if report_id_count <= 1 {
        out.copy_from_slice(REPORT_DESCRIPTOR);
        return Some(len);
    }

    let (header, body) = REPORT_DESCRIPTOR.split_at(COLLECTION_HEADER_LEN);
    for (n, chunk) in out.chunks_exact_mut(REPORT_DESCRIPTOR.len() + 2).enumerate() {
        let (head, rest) = chunk.split_at_mut(COLLECTION_HEADER_LEN);
        head.copy_from_slice(header);
        rest[0] = 0x85; // Report ID
        rest[1] = n as u8 + 1;
        rest[2..].copy_from_slice(body);
    }
    Some(len)
}
