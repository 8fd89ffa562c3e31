//! Upload Store
//!
//! Flat directory of uploaded files keyed by their original file name. A
//! second upload with the same name overwrites the first.

use crate::error::{AgentError, Result};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::{debug, info, warn};

/// Shortest interval between retention sweeps
const MIN_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    /// Open the store, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        info!("Upload directory: {}", dir.display());
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `bytes` under the final component of `file_name` and return the
    /// stored name.
    pub fn save(&self, file_name: &str, bytes: &[u8]) -> Result<String> {
        let name = sanitize_file_name(file_name)?;
        let path = self.dir.join(&name);
        std::fs::write(&path, bytes)?;
        info!("Stored upload {} ({} bytes)", name, bytes.len());
        Ok(name)
    }

    /// Path a stored name resolves to. Only the final component of `file_name`
    /// is used, so lookups never leave the directory.
    pub fn resolve(&self, file_name: &str) -> Result<PathBuf> {
        Ok(self.dir.join(sanitize_file_name(file_name)?))
    }

    /// Delete files last modified more than `ttl` ago. Returns how many were
    /// removed.
    pub fn sweep_expired(&self, ttl: Duration) -> Result<usize> {
        let now = SystemTime::now();
        let mut removed = 0;

        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            let metadata = entry.metadata()?;
            if !metadata.is_file() {
                continue;
            }
            let age = metadata
                .modified()
                .ok()
                .and_then(|m| now.duration_since(m).ok())
                .unwrap_or_default();
            if age > ttl {
                match std::fs::remove_file(entry.path()) {
                    Ok(()) => {
                        debug!("Removed expired upload {}", entry.path().display());
                        removed += 1;
                    }
                    Err(e) => warn!("Failed to remove {}: {}", entry.path().display(), e),
                }
            }
        }

        Ok(removed)
    }

    /// Run [`UploadStore::sweep_expired`] in the background every `ttl / 2`,
    /// but no more often than once a minute.
    pub fn spawn_sweeper(self, ttl: Duration) -> tokio::task::JoinHandle<()> {
        let interval = (ttl / 2).max(MIN_SWEEP_INTERVAL);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                match self.sweep_expired(ttl) {
                    Ok(0) => {}
                    Ok(n) => info!("Retention sweep removed {} uploads", n),
                    Err(e) => warn!("Retention sweep failed: {}", e),
                }
            }
        })
    }
}

fn sanitize_file_name(file_name: &str) -> Result<String> {
    let name = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    if name.is_empty() || name == "." || name == ".." {
        return Err(AgentError::Upload(format!("Invalid file name '{}'", file_name)));
    }
    Ok(name.to_string())
}
