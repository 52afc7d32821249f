//! Connect to a pad server, print a few snapshots, then stop the session.
//!
//! Usage: `pad-poll [addr] [count] [sixaxis|motioninjoy]`

use anyhow::{Context, anyhow};
use pad_server::{ControllerProfile, PadClient, constants::SERVER_PORT};
use std::{thread, time::Duration};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let addr = args
        .next()
        .unwrap_or_else(|| format!("127.0.0.1:{SERVER_PORT}"));
    let count: u32 = match args.next() {
        Some(n) => n.parse().with_context(|| format!("bad poll count '{n}'"))?,
        None => 10,
    };
    let profile: ControllerProfile = match args.next() {
        Some(p) => p.parse().map_err(|e: String| anyhow!(e))?,
        None => ControllerProfile::default(),
    };

    let mut client = PadClient::connect(addr.as_str(), profile)
        .with_context(|| format!("connecting to {addr}"))?;
    info!("Connected to {addr} ({profile})");

    for i in 0..count {
        let (snap, buttons) = client.poll_buttons()?;
        info!(
            "#{i}: L ({:+.3}, {:+.3}) R ({:+.3}, {:+.3}) raw {:08X} handheld {:03X}",
            snap.left.x,
            snap.left.y,
            snap.right.x,
            snap.right.y,
            snap.buttons,
            buttons.bits()
        );
        thread::sleep(Duration::from_millis(16));
    }

    client.stop()?;
    info!("Session stopped.");
    Ok(())
}
