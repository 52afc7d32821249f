use tracing::trace;

use crate::{
    constants::DEFAULT_DEADZONE,
    device::JoystickDevice,
    pad_state::{GamepadSnapshot, Stick, normalize_axis, pov_bits},
};

/// Turns raw device readings into [`GamepadSnapshot`]s.
///
/// Owns the single snapshot the server replies with. Every call to
/// [`Sampler::sample`] overwrites it in full.
pub struct Sampler<D> {
    device: D,
    deadzone: f32,
    snapshot: GamepadSnapshot,
}

impl<D: JoystickDevice> Sampler<D> {
    pub fn new(device: D) -> Self {
        Self::with_deadzone(device, DEFAULT_DEADZONE)
    }

    pub fn with_deadzone(device: D, deadzone: f32) -> Self {
        Self {
            device,
            deadzone,
            snapshot: GamepadSnapshot::neutral(),
        }
    }

    /// Query the device once. `None` if it is absent or the query failed.
    pub fn try_sample(&mut self) -> Option<GamepadSnapshot> {
        let raw = self.device.query()?;
        let dz = self.deadzone;

        Some(GamepadSnapshot {
            left: Stick {
                x: normalize_axis(raw.x, dz),
                y: normalize_axis(raw.y, dz),
            },
            right: Stick {
                x: normalize_axis(raw.r, dz),
                y: normalize_axis(raw.z, dz),
            },
            buttons: raw.buttons | pov_bits(raw.pov),
            ..GamepadSnapshot::neutral()
        })
    }

    /// Sample the device and return the refreshed snapshot.
    ///
    /// A failed query yields the neutral snapshot, which is indistinguishable
    /// on the wire from an idle, centered pad.
    pub fn sample(&mut self) -> &GamepadSnapshot {
        self.snapshot = match self.try_sample() {
            Some(snap) => snap,
            None => {
                trace!("device query failed, replying with neutral snapshot");
                GamepadSnapshot::neutral()
            }
        };
        &self.snapshot
    }

    /// The snapshot produced by the most recent [`Sampler::sample`].
    pub fn snapshot(&self) -> &GamepadSnapshot {
        &self.snapshot
    }

    #[cfg(test)]
    pub(crate) fn device(&self) -> &D {
        &self.device
    }
}
