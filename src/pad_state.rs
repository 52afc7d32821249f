use crate::constants::*;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::Cursor;
use thiserror::Error;

/// Encoded size of a [`GamepadSnapshot`] on the wire.
pub const SNAPSHOT_LEN: usize = 24;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("snapshot truncated: need {needed} bytes, got {available}")]
    Truncated { needed: usize, available: usize },
    #[error("snapshot declares size {declared}, expected {expected}")]
    SizeMismatch { declared: i32, expected: usize },
}

/// A pair of normalized axis values, each in `[-1.0, 1.0]`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Stick {
    pub x: f32,
    pub y: f32,
}

/// Gamepad state at one instant, as sent to the client.
///
/// Layout (little-endian): `size: i32`, left stick `x, y: f32`,
/// right stick `x, y: f32`, `buttons: u32`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GamepadSnapshot {
    pub size: i32,
    pub left: Stick,
    pub right: Stick,
    pub buttons: u32,
}

impl Default for GamepadSnapshot {
    fn default() -> Self {
        Self::neutral()
    }
}

impl GamepadSnapshot {
    /// Centered sticks, nothing pressed.
    pub fn neutral() -> Self {
        Self {
            size: SNAPSHOT_LEN as i32,
            left: Stick::default(),
            right: Stick::default(),
            buttons: 0,
        }
    }

    #[inline]
    pub fn is_pressed(&self, bit: u32) -> bool {
        self.buttons & (1 << bit) != 0
    }

    pub fn to_bytes(&self) -> [u8; SNAPSHOT_LEN] {
        let mut buf = [0u8; SNAPSHOT_LEN];
        let mut cursor = Cursor::new(&mut buf[..]);

        // Writes into a fixed buffer of exactly SNAPSHOT_LEN cannot fail.
        let _ = cursor.write_i32::<LittleEndian>(self.size);
        let _ = cursor.write_f32::<LittleEndian>(self.left.x);
        let _ = cursor.write_f32::<LittleEndian>(self.left.y);
        let _ = cursor.write_f32::<LittleEndian>(self.right.x);
        let _ = cursor.write_f32::<LittleEndian>(self.right.y);
        let _ = cursor.write_u32::<LittleEndian>(self.buttons);

        buf
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SnapshotError> {
        if bytes.len() < SNAPSHOT_LEN {
            return Err(SnapshotError::Truncated {
                needed: SNAPSHOT_LEN,
                available: bytes.len(),
            });
        }

        let truncated = |_: std::io::Error| SnapshotError::Truncated {
            needed: SNAPSHOT_LEN,
            available: bytes.len(),
        };
        let mut cursor = Cursor::new(bytes);

        let size = cursor.read_i32::<LittleEndian>().map_err(truncated)?;
        if size != SNAPSHOT_LEN as i32 {
            return Err(SnapshotError::SizeMismatch {
                declared: size,
                expected: SNAPSHOT_LEN,
            });
        }

        let left = Stick {
            x: cursor.read_f32::<LittleEndian>().map_err(truncated)?,
            y: cursor.read_f32::<LittleEndian>().map_err(truncated)?,
        };
        let right = Stick {
            x: cursor.read_f32::<LittleEndian>().map_err(truncated)?,
            y: cursor.read_f32::<LittleEndian>().map_err(truncated)?,
        };
        let buttons = cursor.read_u32::<LittleEndian>().map_err(truncated)?;

        Ok(Self {
            size,
            left,
            right,
            buttons,
        })
    }
}

/// Map a raw unsigned axis reading onto `[-1.0, 1.0]`, then snap anything
/// inside the deadzone to exactly zero.
pub fn normalize_axis(raw: u32, deadzone: f32) -> f32 {
    let n = ((raw as f32 - AXIS_MIDPOINT) / AXIS_MIDPOINT).clamp(-1.0, 1.0);
    if n.abs() < deadzone { 0.0 } else { n }
}

/// Directional bit synthesized from a hat reading; only the four cardinal
/// readings produce one.
pub fn pov_bits(raw: u32) -> u32 {
    match raw {
        pov::UP => 1 << button_bits::UP,
        pov::RIGHT => 1 << button_bits::RIGHT,
        pov::DOWN => 1 << button_bits::DOWN,
        pov::LEFT => 1 << button_bits::LEFT,
        _ => 0,
    }
}
