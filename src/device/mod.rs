//! Physical joystick access.
//!
//! The sampler only ever sees a [`RawJoystickState`]: unsigned axes in
//! `0..=65534` centered on 32767, a button bitmask, and a point-of-view hat
//! reading in hundredths of a degree. Backends translate whatever their
//! platform API reports into that shape.
//!
//! Tests use [`mock::MockJoystick`] in place of real hardware.

pub mod gilrs_backend;
pub mod mock;

pub use gilrs_backend::GilrsJoystick;
pub use mock::MockJoystick;

use crate::constants::{AXIS_MIDPOINT, pov};

/// Full extended state of one joystick-class device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawJoystickState {
    /// Left stick horizontal.
    pub x: u32,
    /// Left stick vertical, grows downward.
    pub y: u32,
    /// Right stick vertical, grows downward.
    pub z: u32,
    /// Right stick horizontal.
    pub r: u32,
    pub buttons: u32,
    pub pov: u32,
}

impl RawJoystickState {
    /// Sticks at rest, nothing pressed, hat centered.
    pub fn centered() -> Self {
        let mid = AXIS_MIDPOINT as u32;
        Self {
            x: mid,
            y: mid,
            z: mid,
            r: mid,
            buttons: 0,
            pov: pov::CENTERED,
        }
    }
}

impl Default for RawJoystickState {
    fn default() -> Self {
        Self::centered()
    }
}

/// A source of raw joystick readings.
pub trait JoystickDevice {
    /// Read the device's current state. `None` when the device is absent or
    /// the query failed; callers get no further detail.
    fn query(&mut self) -> Option<RawJoystickState>;
}

impl<D: JoystickDevice + ?Sized> JoystickDevice for Box<D> {
    fn query(&mut self) -> Option<RawJoystickState> {
        (**self).query()
    }
}
