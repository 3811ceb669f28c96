//! Permission sets and their stable identities

use std::collections::BTreeSet;
use std::fmt;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{PermError, PermResult};

/// How grant status for a set is checked and requested
///
/// The policy applies to the whole set. A set governed by the elevated grant
/// never goes through the per-item prompt path; the two paths are exclusive
/// within a single request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckPolicy {
    /// Each permission is checked and prompted through the standard
    /// per-item primitives
    PerItem,
    /// The set is governed by the host's elevated grant, which has no
    /// native prompt and is granted through a settings screen only
    Elevated,
}

/// A non-empty group of permissions requested together
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSet {
    names: BTreeSet<String>,
    policy: CheckPolicy,
}

impl PermissionSet {
    /// Create a standard per-item permission set
    ///
    /// Names are deduplicated; an empty set is rejected.
    pub fn new<I, S>(names: I) -> PermResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_policy(names, CheckPolicy::PerItem)
    }

    /// Create a set governed by the host's elevated grant
    pub fn elevated<I, S>(names: I) -> PermResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_policy(names, CheckPolicy::Elevated)
    }

    /// Create a set with an explicit check policy
    pub fn with_policy<I, S>(names: I, policy: CheckPolicy) -> PermResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: BTreeSet<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(PermError::invalid_input("permission set must not be empty"));
        }
        Ok(Self { names, policy })
    }

    /// Iterate over the permission names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Number of permissions in the set
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// A permission set is never empty; kept for API symmetry
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// The check policy for this set
    pub fn policy(&self) -> CheckPolicy {
        self.policy
    }

    /// Whether this set is governed by the elevated grant
    pub fn is_elevated(&self) -> bool {
        self.policy == CheckPolicy::Elevated
    }

    /// Compute the stable identity of this set
    ///
    /// The id is a SHA-256 over the policy tag and the sorted names, so two
    /// requests for the same logical set hash identically regardless of
    /// enumeration order.
    pub fn id(&self) -> PermissionSetId {
        let mut hasher = Sha256::new();
        hasher.update(match self.policy {
            CheckPolicy::PerItem => b"per_item".as_slice(),
            CheckPolicy::Elevated => b"elevated".as_slice(),
        });
        for name in &self.names {
            hasher.update([0u8]);
            hasher.update(name.as_bytes());
        }

        let digest = hasher.finalize();
        let mut hex = String::with_capacity(digest.len() * 2);
        for byte in digest {
            let _ = write!(hex, "{:02x}", byte);
        }
        PermissionSetId(hex)
    }
}

impl fmt::Display for PermissionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for name in &self.names {
            if !first {
                write!(f, "+")?;
            }
            write!(f, "{}", name)?;
            first = false;
        }
        Ok(())
    }
}

/// Deterministic identity for a permission set, used as the persistence key
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PermissionSetId(String);

impl PermissionSetId {
    /// The id as a hex string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PermissionSetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
