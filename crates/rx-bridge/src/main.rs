//! Serial Receive Bridge - Main Entry Point

use anyhow::Context;
use rx_bridge::{init_logging, load_config, run};
use std::path::PathBuf;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = load_config(config_path.as_deref()).context("failed to load configuration")?;
    init_logging(&config.logging)?;

    info!("=== Serial RX Bridge v{} ===", env!("CARGO_PKG_VERSION"));
    info!(
        "Listening on {} at {} baud",
        config.uart.device, config.uart.baud_rate
    );

    let summary = run(config).await?;

    info!(
        received = summary.rx.received,
        dropped = summary.rx.dropped,
        frames = summary.pump.frames,
        "Receive bridge stopped"
    );
    Ok(())
}
