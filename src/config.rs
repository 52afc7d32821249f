use crate::constants::{DEFAULT_DEADZONE, SERVER_PORT};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs, io,
    net::{IpAddr, SocketAddr},
    path::{Path, PathBuf},
};
use tracing::warn;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub bind_address: String,
    pub port: u16,
    /// Which connected gamepad to read, in discovery order.
    pub device_index: usize,
    pub deadzone: f32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".into(),
            port: SERVER_PORT,
            device_index: 0,
            deadzone: DEFAULT_DEADZONE, // 20%
        }
    }
}

pub fn config_path() -> io::Result<PathBuf> {
    ProjectDirs::from("com", "PadServer", "PadServer")
        .map(|d| d.config_dir().join("config.toml"))
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "Could not determine config dir"))
}

impl AppConfig {
    pub fn load() -> io::Result<Self> {
        Self::load_from(&config_path()?)
    }

    /// Defaults when the file does not exist.
    pub fn load_from(path: &Path) -> io::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let txt = fs::read_to_string(path)?;
        let cfg: Self = toml::from_str(&txt).map_err(|e| {
            io::Error::new(io::ErrorKind::InvalidData, format!("TOML parse error: {e}"))
        })?;
        Ok(cfg.validated())
    }

    /// Replace out-of-range values with defaults. The deadzone must lie in
    /// `0.0..1.0`; NaN is rejected.
    pub fn validated(mut self) -> Self {
        if !(0.0..1.0).contains(&self.deadzone) {
            warn!(
                "deadzone {} outside 0.0..1.0, using {}",
                self.deadzone, DEFAULT_DEADZONE
            );
            self.deadzone = DEFAULT_DEADZONE;
        }
        self
    }

    pub fn save_to(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let toml = toml::to_string_pretty(self).map_err(io::Error::other)?;
        fs::write(path, toml)
    }

    pub fn socket_addr(&self) -> io::Result<SocketAddr> {
        let ip: IpAddr = self.bind_address.parse().map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("bad bind_address '{}': {e}", self.bind_address),
            )
        })?;
        Ok(SocketAddr::new(ip, self.port))
    }
}
