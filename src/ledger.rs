//! Pulled-batch ledger
//!
//! One hidden text file inside the mirror directory, one batch id per line,
//! append only. The file is the sole persistent state of the tool: deleting
//! it makes every batch still on the device eligible for a re-pull.

use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::Result;

pub struct PulledLedger {
    path: PathBuf,
}

impl PulledLedger {
    pub const FILE_NAME: &'static str = ".pulled_files.txt";

    pub fn in_dir(mirror_dir: &Path) -> Self {
        Self {
            path: mirror_dir.join(Self::FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates the ledger file if it is not there yet.
    pub async fn ensure_exists(&self) -> Result<()> {
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        Ok(())
    }

    /// Reads all recorded batch ids. A missing file is an empty ledger.
    pub async fn load(&self) -> Result<HashSet<String>> {
        match fs::read_to_string(&self.path).await {
            Ok(content) => Ok(content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(HashSet::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Appends one batch id. Existing lines are never rewritten.
    pub async fn record(&self, batch_id: &str) -> Result<()> {
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(format!("{}\n", batch_id).as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}
