//! Denial count persistence
//!
//! Storage backends for the per-set denial counters, including file-based
//! and memory-based implementations. Counts survive process restart with
//! the file backend; last-writer-wins is the only concurrency guarantee
//! required, since all writes originate from a single orchestrated session.

mod file;
mod memory;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::PermResult;
use crate::set::PermissionSetId;

pub use file::FileDenialStore;
pub use memory::MemoryDenialStore;

/// Denial count storage trait
#[async_trait]
pub trait DenialStore: Send + Sync {
    /// Load the denial count for a set (0 when absent)
    async fn get(&self, id: &PermissionSetId) -> PermResult<u32>;

    /// Persist the denial count for a set
    async fn set(&self, id: &PermissionSetId, count: u32) -> PermResult<()>;

    /// Drop the counter for a set (equivalent to `set(id, 0)`)
    async fn remove(&self, id: &PermissionSetId) -> PermResult<()>;
}

/// Shared denial store type
pub type SharedDenialStore = Arc<dyn DenialStore>;
