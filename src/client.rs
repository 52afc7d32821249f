//! Client side of the pad protocol, as used by the handheld target.
//!
//! A [`PadClient`] holds one session open: each [`PadClient::poll`] sends a
//! single poll byte and blocks for the 24-byte snapshot. Raw button bits are
//! turned into the handheld's own button set by a [`ControllerProfile`], since
//! pads disagree about where Start and Select sit.

use std::{
    fmt,
    io::{self, Read, Write},
    net::{Shutdown, TcpStream, ToSocketAddrs},
    str::FromStr,
};

use bitflags::bitflags;
use thiserror::Error;
use tracing::debug;

use crate::{
    constants::{CMD_POLL, CMD_SHUTDOWN, CMD_STOP, button_bits},
    pad_state::{GamepadSnapshot, SNAPSHOT_LEN, SnapshotError},
};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("unable to reach pad server: {0}")]
    Connect(#[source] io::Error),
    #[error("pad server connection failed: {0}")]
    Io(#[from] io::Error),
    #[error("invalid data received from pad server: {0}")]
    InvalidSnapshot(#[from] SnapshotError),
}

bitflags! {
    /// Buttons as the handheld understands them.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct HandheldButtons: u32 {
        const LEFT     = 1 << 0;
        const UP       = 1 << 1;
        const RIGHT    = 1 << 2;
        const DOWN     = 1 << 3;
        const SQUARE   = 1 << 4;
        const CROSS    = 1 << 5;
        const CIRCLE   = 1 << 6;
        const TRIANGLE = 1 << 7;
        const L        = 1 << 8;
        const R        = 1 << 9;
        const START    = 1 << 10;
        const SELECT   = 1 << 11;
    }
}

/// How a given pad family lays out its raw buttons.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ControllerProfile {
    /// Sixaxis / DualShock 3 on the stock driver: Start before Select.
    #[default]
    SonySixaxis,
    /// MotionInJoy driver: Select before Start.
    MotionInJoy,
}

impl ControllerProfile {
    /// Map raw snapshot bits onto handheld buttons. L2, R2, L3 and R3 have no
    /// handheld counterpart and are dropped.
    pub fn decode(self, raw: u32) -> HandheldButtons {
        let (start_bit, select_bit) = match self {
            ControllerProfile::SonySixaxis => (button_bits::SELECT, button_bits::START),
            ControllerProfile::MotionInJoy => (button_bits::START, button_bits::SELECT),
        };

        let map = [
            (button_bits::TRIANGLE, HandheldButtons::TRIANGLE),
            (button_bits::CIRCLE, HandheldButtons::CIRCLE),
            (button_bits::CROSS, HandheldButtons::CROSS),
            (button_bits::SQUARE, HandheldButtons::SQUARE),
            (button_bits::L1, HandheldButtons::L),
            (button_bits::R1, HandheldButtons::R),
            (start_bit, HandheldButtons::START),
            (select_bit, HandheldButtons::SELECT),
            (button_bits::LEFT, HandheldButtons::LEFT),
            (button_bits::RIGHT, HandheldButtons::RIGHT),
            (button_bits::UP, HandheldButtons::UP),
            (button_bits::DOWN, HandheldButtons::DOWN),
        ];

        let mut out = HandheldButtons::empty();
        for (bit, button) in map {
            if raw & (1 << bit) != 0 {
                out.insert(button);
            }
        }
        out
    }
}

impl FromStr for ControllerProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sixaxis" | "sonysixaxis" => Ok(ControllerProfile::SonySixaxis),
            "motioninjoy" => Ok(ControllerProfile::MotionInJoy),
            other => Err(format!("unknown controller profile '{other}'")),
        }
    }
}

impl fmt::Display for ControllerProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControllerProfile::SonySixaxis => f.write_str("sixaxis"),
            ControllerProfile::MotionInJoy => f.write_str("motioninjoy"),
        }
    }
}

/// One open session with a pad server.
pub struct PadClient {
    stream: TcpStream,
    profile: ControllerProfile,
}

impl PadClient {
    pub fn connect(addr: impl ToSocketAddrs, profile: ControllerProfile) -> Result<Self, ClientError> {
        let stream = TcpStream::connect(addr).map_err(ClientError::Connect)?;
        stream.set_nodelay(true)?;
        Ok(Self { stream, profile })
    }

    /// Request and read one snapshot.
    pub fn poll(&mut self) -> Result<GamepadSnapshot, ClientError> {
        self.stream.write_all(&[CMD_POLL])?;

        let mut buf = [0u8; SNAPSHOT_LEN];
        self.stream.read_exact(&mut buf)?;

        let snap = GamepadSnapshot::from_bytes(&buf)?;
        debug!("received {:?}", snap);
        Ok(snap)
    }

    /// Poll and decode buttons with this client's profile.
    pub fn poll_buttons(&mut self) -> Result<(GamepadSnapshot, HandheldButtons), ClientError> {
        let snap = self.poll()?;
        Ok((snap, self.profile.decode(snap.buttons)))
    }

    /// End the session; the server keeps listening.
    pub fn stop(self) -> Result<(), ClientError> {
        self.close_with(CMD_STOP)
    }

    /// End the session and tell the server to exit.
    pub fn shutdown_server(self) -> Result<(), ClientError> {
        self.close_with(CMD_SHUTDOWN)
    }

    fn close_with(mut self, command: u8) -> Result<(), ClientError> {
        self.stream.write_all(&[command])?;
        self.stream.flush()?;
        // The server may already have closed its end.
        let _ = self.stream.shutdown(Shutdown::Both);
        Ok(())
    }
}
