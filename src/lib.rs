//! Serve a locally attached gamepad to a remote handheld over TCP.
//!
//! The client sends one byte per request: `'s'` or a zero byte ends the
//! session, `'q'` ends it and stops the server, anything else is a poll
//! answered with one 24-byte [`GamepadSnapshot`].

pub mod client;
pub mod config;
pub mod constants;
pub mod device;
pub mod network;
pub mod pad_state;
pub mod sampler;

pub use client::{ClientError, ControllerProfile, HandheldButtons, PadClient};
pub use network::{Command, PadServer, ServerError, SessionEnd};
pub use pad_state::{GamepadSnapshot, SNAPSHOT_LEN, SnapshotError, Stick};
pub use sampler::Sampler;
