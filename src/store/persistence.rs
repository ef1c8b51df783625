//! JSON state file for the sample store

use crate::error::{MonitorError, Result};
use crate::store::StoreSnapshot;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

/// Durable copy of the sample store, rewritten after every scan cycle.
#[derive(Debug, Clone)]
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn display(&self) -> String {
        self.path.display().to_string()
    }

    /// Read the snapshot. A missing file is an empty store, not an error.
    pub async fn load(&self) -> Result<StoreSnapshot> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.display(), "StateFile: no state file yet");
                return Ok(StoreSnapshot::new());
            }
            Err(e) => return Err(MonitorError::persistence(self.display(), e)),
        };

        serde_json::from_str(&raw).map_err(|e| MonitorError::persistence(self.display(), e))
    }

    /// Load the snapshot, falling back to a cold start on any failure.
    pub async fn load_or_default(&self) -> StoreSnapshot {
        match self.load().await {
            Ok(snapshot) => {
                info!(
                    path = %self.display(),
                    symbols = snapshot.len(),
                    "StateFile: restored {} symbols",
                    snapshot.len()
                );
                snapshot
            }
            Err(e) => {
                warn!(
                    path = %self.display(),
                    error = %e,
                    "StateFile: unreadable state, starting from an empty store"
                );
                StoreSnapshot::new()
            }
        }
    }

    /// Write the snapshot via a sibling `.tmp` file and a rename.
    pub async fn save(&self, snapshot: &StoreSnapshot) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| MonitorError::persistence(self.display(), e))?;
        }

        let json = serde_json::to_string_pretty(snapshot)
            .map_err(|e| MonitorError::persistence(self.display(), e))?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, json)
            .await
            .map_err(|e| MonitorError::persistence(self.display(), e))?;
        fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| MonitorError::persistence(self.display(), e))?;

        debug!(path = %self.display(), symbols = snapshot.len(), "StateFile: saved");
        Ok(())
    }
}
