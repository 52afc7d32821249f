//! Mock joystick for unit and integration tests.
//!
//! The state is shared behind an `Arc<Mutex<_>>` so a test can keep a clone
//! and move the stick while a server thread owns the device.

use std::sync::{Arc, Mutex};

use super::{JoystickDevice, RawJoystickState};

#[derive(Debug, Clone)]
pub struct MockJoystick {
    state: Arc<Mutex<Option<RawJoystickState>>>,
    queries: Arc<Mutex<u32>>,
}

impl MockJoystick {
    /// A connected device at rest.
    pub fn new() -> Self {
        Self::with_state(Some(RawJoystickState::centered()))
    }

    /// A device that never answers.
    pub fn absent() -> Self {
        Self::with_state(None)
    }

    pub fn with_state(state: Option<RawJoystickState>) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
            queries: Arc::new(Mutex::new(0)),
        }
    }

    /// Replace what the next query will report. `None` unplugs the device.
    pub fn set(&self, state: Option<RawJoystickState>) {
        if let Ok(mut guard) = self.state.lock() {
            *guard = state;
        }
    }

    /// Number of times the device has been queried.
    pub fn query_count(&self) -> u32 {
        self.queries.lock().map(|g| *g).unwrap_or(0)
    }
}

impl Default for MockJoystick {
    fn default() -> Self {
        Self::new()
    }
}

impl JoystickDevice for MockJoystick {
    fn query(&mut self) -> Option<RawJoystickState> {
        if let Ok(mut count) = self.queries.lock() {
            *count += 1;
        }
        self.state.lock().ok().and_then(|g| *g)
    }
}
