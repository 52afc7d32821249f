use anyhow::Context;
use pad_server::{
    PadServer, Sampler,
    config::{AppConfig, config_path},
    device::GilrsJoystick,
};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cfg = load_config();
    info!("Starting server at port {}...", cfg.port);
    info!("Device index: {}", cfg.device_index);
    info!("Deadzone: {}", cfg.deadzone);

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        if r.swap(false, Ordering::SeqCst) {
            info!("Ctrl+C pressed. Server stops once the current wait ends; press again to exit now.");
        } else {
            warn!("Ctrl+C pressed again. Exiting.");
            std::process::exit(130);
        }
    })
    .context("failed to install Ctrl+C handler")?;

    let addr = cfg.socket_addr().context("invalid listen address")?;
    let server = PadServer::bind(addr, running).context("failed to start pad server")?;

    let mut sampler = Sampler::with_deadzone(GilrsJoystick::new(cfg.device_index), cfg.deadzone);
    server.run(&mut sampler);

    info!("Stopped pad server.");
    Ok(())
}

/// Load the config file, writing defaults on first run. A broken file is
/// reported and ignored.
fn load_config() -> AppConfig {
    let cfg = match AppConfig::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("Ignoring config file: {e}");
            return AppConfig::default();
        }
    };

    if let Ok(path) = config_path() {
        if !path.exists() {
            match cfg.save_to(&path) {
                Ok(()) => info!("Wrote default config to {}", path.display()),
                Err(e) => warn!("Could not write default config to {}: {e}", path.display()),
            }
        }
    }
    cfg
}
