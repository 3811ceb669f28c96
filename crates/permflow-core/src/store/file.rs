//! File-backed denial store

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, warn};

use crate::error::{PermError, PermResult};
use crate::set::PermissionSetId;

use super::DenialStore;

/// File-backed denial store
///
/// Persists counters as a single JSON object keyed by permission-set id.
/// The file and its parent directory are created lazily on first write, so
/// constructing the store never touches the filesystem.
pub struct FileDenialStore {
    path: PathBuf,
}

impl FileDenialStore {
    /// Create a store backed by the given file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Create a store at the default path (~/.config/permflow/denials.json)
    pub fn default_path() -> PermResult<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| PermError::store("could not determine home directory"))?;
        let path = home.join(".config").join("permflow").join("denials.json");
        Ok(Self::new(path))
    }

    /// The backing file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_counts(&self) -> PermResult<HashMap<String, u32>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }

        let json = fs::read_to_string(&self.path)
            .await
            .map_err(|e| PermError::store(format!("failed to read denial store: {}", e)))?;

        serde_json::from_str(&json)
            .map_err(|e| PermError::store(format!("failed to parse denial store: {}", e)))
    }

    async fn write_counts(&self, counts: &HashMap<String, u32>) -> PermResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).await.map_err(|e| {
                    PermError::store(format!("failed to create store directory: {}", e))
                })?;
            }
        }

        let json = serde_json::to_string_pretty(counts)
            .map_err(|e| PermError::store(format!("failed to serialize denial store: {}", e)))?;

        fs::write(&self.path, json)
            .await
            .map_err(|e| PermError::store(format!("failed to write denial store: {}", e)))?;

        debug!("Wrote {} denial counter(s) to {:?}", counts.len(), self.path);
        Ok(())
    }
}

#[async_trait]
impl DenialStore for FileDenialStore {
    async fn get(&self, id: &PermissionSetId) -> PermResult<u32> {
        let counts = self.read_counts().await?;
        Ok(counts.get(id.as_str()).copied().unwrap_or(0))
    }

    async fn set(&self, id: &PermissionSetId, count: u32) -> PermResult<()> {
        let mut counts = match self.read_counts().await {
            Ok(counts) => counts,
            Err(e) => {
                warn!("Resetting unreadable denial store: {}", e);
                HashMap::new()
            }
        };
        counts.insert(id.as_str().to_string(), count);
        self.write_counts(&counts).await
    }

    async fn remove(&self, id: &PermissionSetId) -> PermResult<()> {
        let mut counts = match self.read_counts().await {
            Ok(counts) => counts,
            Err(e) => {
                warn!("Skipping removal from unreadable denial store: {}", e);
                return Ok(());
            }
        };
        if counts.remove(id.as_str()).is_some() {
            self.write_counts(&counts).await?;
        }
        Ok(())
    }
}
