use gilrs::{Axis, Button, Gamepad, Gilrs};
use tracing::{debug, info, warn};

use super::{JoystickDevice, RawJoystickState};
use crate::constants::{AXIS_MIDPOINT, AXIS_RAW_MAX, button_bits, pov};

/// Joystick backed by gilrs, reading the `index`-th connected gamepad.
///
/// If gilrs cannot start on this host, the device stays absent for the
/// lifetime of the process and every query returns `None`.
pub struct GilrsJoystick {
    gilrs: Option<Gilrs>,
    index: usize,
    was_present: Option<bool>,
}

impl GilrsJoystick {
    pub fn new(index: usize) -> Self {
        let gilrs = match Gilrs::new() {
            Ok(g) => {
                for (id, gamepad) in g.gamepads() {
                    info!("Found gamepad '{}' (id {:?})", gamepad.name(), id);
                }
                Some(g)
            }
            Err(e) => {
                warn!("Gamepad subsystem unavailable, serving idle input: {e}");
                None
            }
        };

        Self {
            gilrs,
            index,
            was_present: None,
        }
    }

    fn note_presence(&mut self, present: bool, name: Option<&str>) {
        if self.was_present == Some(present) {
            return;
        }
        match name {
            Some(name) if present => info!("Using gamepad '{}' at index {}", name, self.index),
            _ => warn!("No gamepad at index {}; replies carry idle input", self.index),
        }
        self.was_present = Some(present);
    }
}

impl JoystickDevice for GilrsJoystick {
    fn query(&mut self) -> Option<RawJoystickState> {
        let gilrs = self.gilrs.as_mut()?;

        // gilrs only refreshes its cached gamepad state while events are drained.
        while let Some(ev) = gilrs.next_event() {
            debug!("gilrs event: {:?}", ev.event);
        }

        let (state, name) = match gilrs.gamepads().nth(self.index) {
            Some((_, gamepad)) => (Some(read_state(&gamepad)), Some(gamepad.name().to_owned())),
            None => (None, None),
        };
        self.note_presence(state.is_some(), name.as_deref());
        state
    }
}

fn read_state(gamepad: &Gamepad<'_>) -> RawJoystickState {
    // gilrs reports Y up-positive; the raw joystick convention grows downward.
    RawJoystickState {
        x: axis_to_raw(gamepad.value(Axis::LeftStickX)),
        y: axis_to_raw(-gamepad.value(Axis::LeftStickY)),
        z: axis_to_raw(-gamepad.value(Axis::RightStickY)),
        r: axis_to_raw(gamepad.value(Axis::RightStickX)),
        buttons: button_mask(|b| gamepad.is_pressed(b)),
        pov: dpad_to_pov(
            gamepad.is_pressed(Button::DPadUp),
            gamepad.is_pressed(Button::DPadRight),
            gamepad.is_pressed(Button::DPadDown),
            gamepad.is_pressed(Button::DPadLeft),
        ),
    }
}

/// Physical buttons in snapshot bit order. The D-pad is reported through the
/// hat instead.
const BUTTON_MAP: [(Button, u32); 12] = [
    (Button::North, button_bits::TRIANGLE),
    (Button::East, button_bits::CIRCLE),
    (Button::South, button_bits::CROSS),
    (Button::West, button_bits::SQUARE),
    (Button::LeftTrigger2, button_bits::L2),
    (Button::RightTrigger2, button_bits::R2),
    (Button::LeftTrigger, button_bits::L1),
    (Button::RightTrigger, button_bits::R1),
    (Button::Select, button_bits::SELECT),
    (Button::Start, button_bits::START),
    (Button::LeftThumb, button_bits::L3),
    (Button::RightThumb, button_bits::R3),
];

fn button_mask(is_pressed: impl Fn(Button) -> bool) -> u32 {
    BUTTON_MAP
        .iter()
        .filter(|(button, _)| is_pressed(*button))
        .fold(0, |mask, (_, bit)| mask | (1 << bit))
}

#[inline]
fn axis_to_raw(value: f32) -> u32 {
    ((value.clamp(-1.0, 1.0) + 1.0) * AXIS_MIDPOINT)
        .round()
        .clamp(0.0, AXIS_RAW_MAX as f32) as u32
}

fn dpad_to_pov(up: bool, right: bool, down: bool, left: bool) -> u32 {
    match (up, right, down, left) {
        (true, false, false, false) => pov::UP,
        (true, true, false, false) => 4500,
        (false, true, false, false) => pov::RIGHT,
        (false, true, true, false) => 13500,
        (false, false, true, false) => pov::DOWN,
        (false, false, true, true) => 22500,
        (false, false, false, true) => pov::LEFT,
        (true, false, false, true) => 31500,
        _ => pov::CENTERED,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pad_state::{normalize_axis, pov_bits};

    #[test]
    fn test_axis_to_raw_endpoints() {
        assert_eq!(axis_to_raw(-1.0), 0);
        assert_eq!(axis_to_raw(0.0), 32767);
        assert_eq!(axis_to_raw(1.0), AXIS_RAW_MAX);
        assert_eq!(axis_to_raw(3.0), AXIS_RAW_MAX);
    }

    #[test]
    fn test_axis_to_raw_survives_normalization() {
        let v = normalize_axis(axis_to_raw(0.5), 0.2);
        assert!((v - 0.5).abs() < 1e-4, "got {v}");
    }

    #[test]
    fn test_button_mask_maps_face_buttons() {
        let mask = button_mask(|b| matches!(b, Button::North | Button::RightThumb));
        assert_eq!(mask, (1 << button_bits::TRIANGLE) | (1 << button_bits::R3));
    }

    #[test]
    fn test_button_mask_ignores_dpad() {
        let mask = button_mask(|b| matches!(b, Button::DPadUp | Button::DPadLeft));
        assert_eq!(mask, 0);
    }

    #[test]
    fn test_dpad_cardinals_become_direction_bits() {
        assert_eq!(pov_bits(dpad_to_pov(true, false, false, false)), 1 << button_bits::UP);
        assert_eq!(pov_bits(dpad_to_pov(false, true, false, false)), 1 << button_bits::RIGHT);
        assert_eq!(pov_bits(dpad_to_pov(false, false, true, false)), 1 << button_bits::DOWN);
        assert_eq!(pov_bits(dpad_to_pov(false, false, false, true)), 1 << button_bits::LEFT);
    }

    #[test]
    fn test_dpad_diagonals_and_rest() {
        assert_eq!(dpad_to_pov(true, true, false, false), 4500);
        assert_eq!(dpad_to_pov(false, false, false, false), pov::CENTERED);
        assert_eq!(dpad_to_pov(true, false, true, false), pov::CENTERED);
    }
}
