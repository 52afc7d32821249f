//! Property tests for axis normalization and hat decoding.

use pad_server::{
    constants::{AXIS_MIDPOINT, AXIS_RAW_MAX, DEFAULT_DEADZONE, button_bits},
    pad_state::{normalize_axis, pov_bits},
};
use proptest::prelude::*;

const DIRECTION_MASK: u32 = (1 << button_bits::LEFT)
    | (1 << button_bits::RIGHT)
    | (1 << button_bits::UP)
    | (1 << button_bits::DOWN);

proptest! {
    #[test]
    fn normalized_axis_stays_in_range(raw in 0u32..=AXIS_RAW_MAX * 2) {
        let v = normalize_axis(raw, DEFAULT_DEADZONE);
        prop_assert!((-1.0..=1.0).contains(&v));
    }

    #[test]
    fn axis_is_zero_inside_deadzone_else_linear(raw in 0u32..=AXIS_RAW_MAX) {
        let n = ((raw as f32 - AXIS_MIDPOINT) / AXIS_MIDPOINT).clamp(-1.0, 1.0);
        let v = normalize_axis(raw, DEFAULT_DEADZONE);

        if n.abs() < DEFAULT_DEADZONE {
            prop_assert_eq!(v, 0.0);
        } else {
            prop_assert_eq!(v, n);
        }
    }

    #[test]
    fn axis_is_odd_around_midpoint(offset in 0u32..=32767) {
        let mid = AXIS_MIDPOINT as u32;
        let up = normalize_axis(mid + offset, DEFAULT_DEADZONE);
        let down = normalize_axis(mid - offset, DEFAULT_DEADZONE);
        prop_assert_eq!(up, -down);
    }

    #[test]
    fn non_cardinal_hat_sets_no_direction(raw in any::<u32>()) {
        prop_assume!(![0, 9000, 18000, 27000].contains(&raw));
        prop_assert_eq!(pov_bits(raw), 0);
    }

    #[test]
    fn hat_never_touches_physical_bits(raw in any::<u32>()) {
        prop_assert_eq!(pov_bits(raw) & !DIRECTION_MASK, 0);
        prop_assert!(pov_bits(raw).count_ones() <= 1);
    }
}
