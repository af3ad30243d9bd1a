//! Cursor/button sample types shared by the timeline and its consumers.

use std::fmt;

/// Nominal playfield width in osu!pixels. Coordinates outside the playfield
/// are preserved, not clamped.
pub const PLAYFIELD_WIDTH: f32 = 512.0;
/// Nominal playfield height in osu!pixels. Also the HardRock mirror axis.
pub const PLAYFIELD_HEIGHT: f32 = 384.0;

bitflags::bitflags! {
    /// Resolved button state for one millisecond.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ButtonState: u8 {
        const KEY1   = 1 << 0;
        const KEY2   = 1 << 1;
        const MOUSE1 = 1 << 2;
        const MOUSE2 = 1 << 3;
        const SMOKE  = 1 << 4;
    }
}

impl ButtonState {
    /// Resolve a raw input bitfield into button states.
    ///
    /// The capture encoding aliases keys onto mouse bits: a key press sets
    /// both its key bit and the matching mouse bit (K1 = bits 0+2, K2 =
    /// bits 1+3). A mouse flag here is therefore only set for a bare mouse
    /// button with no key behind it. A stray key bit without its mouse
    /// alias resolves to nothing.
    pub fn from_raw(z: u32) -> Self {
        let k1 = z & 0b0101 == 0b0101;
        let k2 = z & 0b1010 == 0b1010;
        let mut b = ButtonState::empty();
        if k1 {
            b |= ButtonState::KEY1;
        }
        if k2 {
            b |= ButtonState::KEY2;
        }
        if !k1 && z & 0b0001 != 0 {
            b |= ButtonState::MOUSE1;
        }
        if !k2 && z & 0b0010 != 0 {
            b |= ButtonState::MOUSE2;
        }
        if z & 0b1_0000 != 0 {
            b |= ButtonState::SMOKE;
        }
        b
    }
}

/// Fixed-width `K1 K2 M1 M2 SMOKE` columns; inactive buttons render blank.
impl fmt::Display for ButtonState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            if self.contains(ButtonState::KEY1) { "K1" } else { "  " },
            if self.contains(ButtonState::KEY2) { "K2" } else { "  " },
            if self.contains(ButtonState::MOUSE1) { "M1" } else { "  " },
            if self.contains(ButtonState::MOUSE2) { "M2" } else { "  " },
            if self.contains(ButtonState::SMOKE) { "SMOKE" } else { "     " },
        )
    }
}

/// One millisecond of input: cursor position plus resolved buttons.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub x: f32,
    pub y: f32,
    pub buttons: ButtonState,
}
