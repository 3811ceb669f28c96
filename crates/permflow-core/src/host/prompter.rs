//! The native permission prompt

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::PermResult;
use crate::set::PermissionSet;

/// Response from the host's native permission prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptResponse {
    /// Per-item grant/deny outcome of the native prompt
    PerItem(HashMap<String, bool>),
    /// No native prompt exists for this set; a settings screen is the only
    /// path forward (elevated grants)
    NotApplicable,
}

impl PromptResponse {
    /// Whether the response granted every requested permission
    pub fn all_granted(&self) -> bool {
        match self {
            Self::PerItem(map) => !map.is_empty() && map.values().all(|granted| *granted),
            Self::NotApplicable => false,
        }
    }
}

/// Presents the host's native permission prompt
///
/// The request is inherently asynchronous: it resolves only once the OS
/// returns control after user interaction. The orchestrator keeps at most
/// one prompt in flight per session.
#[async_trait]
pub trait PromptRequester: Send + Sync {
    /// Show the native prompt for the set and wait for its result
    async fn request(&self, set: &PermissionSet) -> PermResult<PromptResponse>;
}
