//! adb-backed bridge
//!
//! Every device interaction is one short-lived adb invocation bounded by a
//! timeout. A hung adb (cable glitch, stuck daemon) is killed rather than
//! wedging the polling loop.

use std::path::Path;
use std::process::{Output, Stdio};
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::warn;

use crate::config::Config;
use crate::error::{Error, Result};

use super::DeviceBridge;

pub struct AdbBridge {
    adb_path: String,
    shell_timeout: Duration,
    pull_timeout: Duration,
}

impl AdbBridge {
    pub fn new(config: &Config) -> Self {
        Self {
            adb_path: config.adb_path.clone(),
            shell_timeout: Duration::from_secs(config.shell_timeout_secs),
            pull_timeout: Duration::from_secs(config.pull_timeout_secs),
        }
    }

    /// Reports the adb version line, or an error when the binary is missing.
    pub async fn check_adb(&self) -> Result<String> {
        let output = self.exec(&["version"], self.shell_timeout).await?;
        if !output.status.success() {
            return Err(Error::Bridge(format!(
                "{} version exited with {}",
                self.adb_path, output.status
            )));
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout.lines().next().unwrap_or("unknown").to_string())
    }

    async fn exec(&self, args: &[&str], limit: Duration) -> Result<Output> {
        let mut cmd = Command::new(&self.adb_path);
        cmd.args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd
            .spawn()
            .map_err(|e| Error::Bridge(format!("failed to run {}: {}", self.adb_path, e)))?;

        match timeout(limit, child.wait_with_output()).await {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(e)) => Err(Error::Bridge(format!(
                "{} {} did not finish: {}",
                self.adb_path,
                args.join(" "),
                e
            ))),
            Err(_) => Err(Error::Bridge(format!(
                "{} {} timed out after {}s",
                self.adb_path,
                args.join(" "),
                limit.as_secs()
            ))),
        }
    }
}

#[async_trait]
impl DeviceBridge for AdbBridge {
    async fn is_connected(&self) -> bool {
        match self.exec(&["devices"], self.shell_timeout).await {
            Ok(output) => has_online_device(&String::from_utf8_lossy(&output.stdout)),
            Err(e) => {
                warn!("Device check failed: {}", e);
                false
            }
        }
    }

    async fn list_remote(&self, pattern: &str) -> Vec<String> {
        let listing = format!("ls {} 2>/dev/null", pattern);
        match self.exec(&["shell", &listing], self.shell_timeout).await {
            Ok(output) if output.status.success() => {
                parse_listing(&String::from_utf8_lossy(&output.stdout))
            }
            Ok(_) => Vec::new(),
            Err(e) => {
                warn!("Remote listing failed for {}: {}", pattern, e);
                Vec::new()
            }
        }
    }

    async fn pull(&self, remote_path: &str, local_dir: &Path) -> bool {
        let local = local_dir.to_string_lossy();
        match self
            .exec(&["pull", remote_path, local.as_ref()], self.pull_timeout)
            .await
        {
            Ok(output) if output.status.success() => true,
            Ok(output) => {
                warn!(
                    "adb pull {} failed: {}",
                    remote_path,
                    String::from_utf8_lossy(&output.stderr).trim()
                );
                false
            }
            Err(e) => {
                warn!("adb pull {} failed: {}", remote_path, e);
                false
            }
        }
    }
}

/// Parses `adb devices` output. Only the `device` state counts as connected;
/// `offline` and `unauthorized` entries do not.
fn has_online_device(stdout: &str) -> bool {
    stdout.lines().skip(1).any(|line| {
        let mut fields = line.split('\t');
        let _serial = fields.next();
        matches!(fields.next().map(str::trim), Some("device"))
    })
}

/// Cleans an `adb shell ls` listing into remote paths. Blank lines and the
/// `No such file` noise some adb builds print on stdout are dropped.
fn parse_listing(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.contains("No such file"))
        .map(str::to_string)
        .collect()
}
