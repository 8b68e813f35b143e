//! lowlight-pull - LowLightCamera debug batch puller
//!
//! Watches a connected Android device for completed capture batches and
//! mirrors them into a local directory over adb.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lowlight_pull::bridge::AdbBridge;
use lowlight_pull::config::Config;
use lowlight_pull::sync::BatchSynchronizer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lowlight_pull=info".into()),
        )
        .init();

    tracing::info!("Starting lowlight-pull...");

    // Load configuration
    let config = Config::load()?;
    tracing::info!(
        "Watching app {} via {}, mirroring to {}",
        config.device_app_id,
        config.adb_path,
        config.local_mirror_dir.display()
    );

    let bridge = Arc::new(AdbBridge::new(&config));

    // A missing adb is not fatal; the loop reports disconnection until it appears
    match bridge.check_adb().await {
        Ok(version) => tracing::info!("Using {}", version),
        Err(e) => tracing::warn!("adb not usable yet ({}), will keep trying", e),
    }

    let synchronizer = BatchSynchronizer::new(&config, bridge).await?;

    // Graceful shutdown on Ctrl+C
    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("Shutdown requested"),
            Err(e) => tracing::error!("Failed to listen for shutdown signal: {}", e),
        }
        signal_token.cancel();
    });

    synchronizer.run(shutdown).await;

    Ok(())
}
