//! Configuration module
//!
//! All knobs of the polling loop live here as one explicit structure. Every
//! field has a code-level default matching the constants the tool shipped
//! with, so the binary runs with no config file at all; an optional
//! `config/default.*` file may override individual fields. No CLI flags and
//! no environment variables are consumed.

use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Android application id; the watched directory on the device is
    /// derived from it.
    #[serde(default = "default_device_app_id")]
    pub device_app_id: String,

    /// Destination root for pulled images and markers.
    #[serde(default = "default_local_mirror_dir")]
    pub local_mirror_dir: PathBuf,

    /// Bridge tool executable.
    #[serde(default = "default_adb_path")]
    pub adb_path: String,

    /// Sleep between normal polling ticks.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Sleep while no device is connected.
    #[serde(default = "default_disconnected_wait_secs")]
    pub disconnected_wait_secs: u64,

    /// Sleep after an unexpected tick error.
    #[serde(default = "default_error_backoff_secs")]
    pub error_backoff_secs: u64,

    /// Bound on device-list and remote-listing calls.
    #[serde(default = "default_shell_timeout_secs")]
    pub shell_timeout_secs: u64,

    /// Bound on a single file pull.
    #[serde(default = "default_pull_timeout_secs")]
    pub pull_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            device_app_id: default_device_app_id(),
            local_mirror_dir: default_local_mirror_dir(),
            adb_path: default_adb_path(),
            poll_interval_secs: default_poll_interval_secs(),
            disconnected_wait_secs: default_disconnected_wait_secs(),
            error_backoff_secs: default_error_backoff_secs(),
            shell_timeout_secs: default_shell_timeout_secs(),
            pull_timeout_secs: default_pull_timeout_secs(),
        }
    }
}

fn default_device_app_id() -> String {
    "com.lowlightcamera".to_string()
}

fn default_local_mirror_dir() -> PathBuf {
    PathBuf::from("./debug_images")
}

fn default_adb_path() -> String {
    "adb".to_string()
}

fn default_poll_interval_secs() -> u64 {
    1
}

fn default_disconnected_wait_secs() -> u64 {
    3
}

fn default_error_backoff_secs() -> u64 {
    2
}

fn default_shell_timeout_secs() -> u64 {
    5
}

fn default_pull_timeout_secs() -> u64 {
    10
}

impl Config {
    pub fn load() -> crate::error::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .build()
            .map_err(|e| crate::error::Error::Config(e.to_string()))?;

        let config: Config = settings
            .try_deserialize()
            .unwrap_or_else(|_| Config::default());

        Ok(config)
    }

    /// Directory on the device where the app drops debug batches.
    pub fn remote_debug_dir(&self) -> String {
        format!(
            "/sdcard/Android/data/{}/files/LowLightDebug",
            self.device_app_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_shipped_constants() {
        let config = Config::default();
        assert_eq!(config.device_app_id, "com.lowlightcamera");
        assert_eq!(config.local_mirror_dir, PathBuf::from("./debug_images"));
        assert_eq!(config.adb_path, "adb");
        assert_eq!(config.poll_interval_secs, 1);
        assert_eq!(config.disconnected_wait_secs, 3);
        assert_eq!(config.error_backoff_secs, 2);
        assert_eq!(config.shell_timeout_secs, 5);
        assert_eq!(config.pull_timeout_secs, 10);
    }

    #[test]
    fn test_remote_debug_dir_derivation() {
        let config = Config {
            device_app_id: "com.example.app".to_string(),
            ..Config::default()
        };
        assert_eq!(
            config.remote_debug_dir(),
            "/sdcard/Android/data/com.example.app/files/LowLightDebug"
        );
    }
}
