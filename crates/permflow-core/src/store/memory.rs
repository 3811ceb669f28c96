//! In-memory denial store

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::error::PermResult;
use crate::set::PermissionSetId;

use super::DenialStore;

/// In-memory denial store (for tests or ephemeral processes)
///
/// Counts do not survive process restart; use [`super::FileDenialStore`]
/// when durability matters.
#[derive(Debug, Default)]
pub struct MemoryDenialStore {
    counts: RwLock<HashMap<String, u32>>,
}

impl MemoryDenialStore {
    /// Create a new in-memory denial store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DenialStore for MemoryDenialStore {
    async fn get(&self, id: &PermissionSetId) -> PermResult<u32> {
        Ok(self.counts.read().get(id.as_str()).copied().unwrap_or(0))
    }

    async fn set(&self, id: &PermissionSetId, count: u32) -> PermResult<()> {
        self.counts.write().insert(id.as_str().to_string(), count);
        Ok(())
    }

    async fn remove(&self, id: &PermissionSetId) -> PermResult<()> {
        self.counts.write().remove(id.as_str());
        Ok(())
    }
}
