//! Device bridge abstraction
//!
//! The synchronizer talks to the phone through this trait so the polling
//! logic stays independent of the adb binary. The production implementation
//! shells out to adb; tests substitute a scripted bridge.

use std::path::Path;

use async_trait::async_trait;

mod adb;

pub use adb::AdbBridge;

#[async_trait]
pub trait DeviceBridge: Send + Sync {
    /// True when at least one device is attached and authorized.
    async fn is_connected(&self) -> bool;

    /// Expands a shell glob on the device and returns matching paths.
    /// Returns an empty list when nothing matches or the call fails.
    async fn list_remote(&self, pattern: &str) -> Vec<String>;

    /// Copies one remote file into `local_dir`. True on success.
    async fn pull(&self, remote_path: &str, local_dir: &Path) -> bool;
}
