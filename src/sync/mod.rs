//! Batch synchronizer
//!
//! The polling loop at the heart of the tool. Each tick checks for a
//! connected device, lists ready markers in the remote debug directory and
//! pulls every batch not yet in the ledger. The camera app writes images
//! first and the marker last, so a visible marker means the batch is
//! complete on the device side.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::fs;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::bridge::DeviceBridge;
use crate::config::Config;
use crate::error::Result;
use crate::ledger::PulledLedger;

/// Marker files are named `<batch_id>_ready.txt`.
pub const READY_MARKER_SUFFIX: &str = "_ready.txt";

pub struct BatchSynchronizer {
    bridge: Arc<dyn DeviceBridge>,
    ledger: PulledLedger,
    remote_dir: String,
    local_dir: PathBuf,
    poll_interval: Duration,
    disconnected_wait: Duration,
    error_backoff: Duration,
}

/// What a single tick observed.
#[derive(Debug)]
pub enum TickOutcome {
    /// No authorized device attached; nothing was listed.
    Disconnected,
    /// Device polled; one report per batch that was attempted.
    Polled { batches: Vec<BatchReport> },
}

#[derive(Debug)]
pub struct BatchReport {
    pub batch_id: String,
    pub pulled: usize,
    pub failed: usize,
    /// True when the batch id was appended to the ledger.
    pub recorded: bool,
}

impl BatchSynchronizer {
    pub async fn new(config: &Config, bridge: Arc<dyn DeviceBridge>) -> Result<Self> {
        fs::create_dir_all(&config.local_mirror_dir).await?;
        let ledger = PulledLedger::in_dir(&config.local_mirror_dir);
        ledger.ensure_exists().await?;

        Ok(Self {
            bridge,
            ledger,
            remote_dir: config.remote_debug_dir(),
            local_dir: config.local_mirror_dir.clone(),
            poll_interval: Duration::from_secs(config.poll_interval_secs),
            disconnected_wait: Duration::from_secs(config.disconnected_wait_secs),
            error_backoff: Duration::from_secs(config.error_backoff_secs),
        })
    }

    /// Polls until `shutdown` is cancelled. Tick errors are logged and
    /// absorbed; the loop itself never gives up.
    pub async fn run(&self, shutdown: CancellationToken) {
        info!("Watching {} for new batches", self.remote_dir);
        let mut session_batches: usize = 0;

        loop {
            if shutdown.is_cancelled() {
                break;
            }

            let wait = match self.tick().await {
                Ok(TickOutcome::Disconnected) => self.disconnected_wait,
                Ok(TickOutcome::Polled { batches }) => {
                    session_batches += batches.iter().filter(|b| b.recorded).count();
                    self.poll_interval
                }
                Err(e) => {
                    error!("Polling tick failed: {}", e);
                    self.error_backoff
                }
            };

            tokio::select! {
                _ = tokio::time::sleep(wait) => {}
                _ = shutdown.cancelled() => break,
            }
        }

        info!("Stopped after syncing {} batches this session", session_batches);
    }

    /// One poll: device check, marker listing, pull of every unrecorded batch.
    pub async fn tick(&self) -> Result<TickOutcome> {
        if !self.bridge.is_connected().await {
            warn!("No device connected, waiting...");
            return Ok(TickOutcome::Disconnected);
        }

        let pattern = format!("{}/*{}", self.remote_dir, READY_MARKER_SUFFIX);
        let markers = self.bridge.list_remote(&pattern).await;
        if markers.is_empty() {
            return Ok(TickOutcome::Polled {
                batches: Vec::new(),
            });
        }

        let pulled = self.ledger.load().await?;
        let mut batches = Vec::new();

        for marker_path in markers {
            let batch_id = match batch_id_from_marker(&marker_path) {
                Some(id) => id,
                None => {
                    debug!("Ignoring unexpected marker name: {}", marker_path);
                    continue;
                }
            };
            if pulled.contains(&batch_id) {
                continue;
            }

            info!("New batch detected: {}", batch_id);
            batches.push(self.pull_batch(&batch_id, &marker_path).await?);
        }

        Ok(TickOutcome::Polled { batches })
    }

    /// Pulls all images of one batch, then the marker, then records the id.
    /// A batch with zero pulled images is left unrecorded so the next tick
    /// retries it.
    async fn pull_batch(&self, batch_id: &str, marker_path: &str) -> Result<BatchReport> {
        let pattern = format!("{}/{}_*.jpg", self.remote_dir, batch_id);
        let images = self.bridge.list_remote(&pattern).await;

        let mut pulled = 0usize;
        let mut failed = 0usize;

        for image_path in &images {
            if self.bridge.pull(image_path, &self.local_dir).await {
                pulled += 1;
                info!("Pulled {}", remote_file_name(image_path));
            } else {
                failed += 1;
                warn!("Failed to pull {}", remote_file_name(image_path));
            }
        }

        let mut recorded = false;
        if pulled > 0 {
            // The marker travels with the batch so the mirror is self
            // describing, but a failed marker pull does not block the record.
            if !self.bridge.pull(marker_path, &self.local_dir).await {
                warn!("Failed to pull marker {}", remote_file_name(marker_path));
            }
            self.ledger.record(batch_id).await?;
            recorded = true;
            info!(
                "Batch {} complete: {} pulled, {} failed",
                batch_id, pulled, failed
            );
        } else {
            warn!(
                "Batch {}: no images pulled ({} listed), leaving for retry",
                batch_id,
                images.len()
            );
        }

        Ok(BatchReport {
            batch_id: batch_id.to_string(),
            pulled,
            failed,
            recorded,
        })
    }
}

fn remote_file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Extracts the batch id from a marker path. Names without the marker
/// suffix, or with nothing before it, yield None.
fn batch_id_from_marker(remote_path: &str) -> Option<String> {
    let name = remote_file_name(remote_path);
    let id = name.strip_suffix(READY_MARKER_SUFFIX)?;
    if id.is_empty() {
        return None;
    }
    Some(id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_id_from_marker_path() {
        let path = "/sdcard/Android/data/com.lowlightcamera/files/LowLightDebug/20240101_120000_ready.txt";
        assert_eq!(
            batch_id_from_marker(path),
            Some("20240101_120000".to_string())
        );
    }

    #[test]
    fn test_batch_id_from_bare_name() {
        assert_eq!(
            batch_id_from_marker("20240101_120000_ready.txt"),
            Some("20240101_120000".to_string())
        );
    }

    #[test]
    fn test_batch_id_requires_marker_suffix() {
        assert_eq!(batch_id_from_marker("/a/20240101_120000.jpg"), None);
        assert_eq!(batch_id_from_marker("/a/notes.txt"), None);
    }

    #[test]
    fn test_batch_id_rejects_suffix_only_name() {
        assert_eq!(batch_id_from_marker("/a/_ready.txt"), None);
    }

    #[test]
    fn test_remote_file_name() {
        assert_eq!(remote_file_name("/a/b/c.jpg"), "c.jpg");
        assert_eq!(remote_file_name("c.jpg"), "c.jpg");
    }
}
