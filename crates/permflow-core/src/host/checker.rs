//! Grant status queries

use crate::error::PermResult;
use crate::set::PermissionSet;

/// Reports the current grant status of permissions
///
/// Implement this over the host platform's permission query primitive.
/// The elevated predicate is distinct because elevated grants are not
/// visible through the per-item query.
pub trait GrantChecker: Send + Sync {
    /// Check whether every permission in the set is currently granted
    fn is_granted(&self, set: &PermissionSet) -> PermResult<bool>;

    /// Check the host's elevated grant (e.g. a manage-all-files style
    /// capability with no per-item prompt)
    fn is_elevated_granted(&self) -> PermResult<bool>;
}
