//! Request outcomes

use std::collections::HashMap;
use std::fmt;

use crate::fault::{Fault, PermissionFault};

use super::session::EscalationStage;

/// Terminal verdict of a request cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    Granted,
    Denied,
}

impl Verdict {
    /// Whether the verdict grants the full set
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Granted => write!(f, "granted"),
            Self::Denied => write!(f, "denied"),
        }
    }
}

/// Outcome delivered to the caller
///
/// The verdict is the single "fully granted" signal; callers that need
/// granularity can inspect the per-item map when the native prompt produced
/// one.
#[derive(Debug, Clone)]
pub struct RequestOutcome {
    /// Terminal verdict
    pub verdict: Verdict,
    /// Escalation stage active when the outcome was delivered
    pub stage: EscalationStage,
    /// Denial count at delivery time
    pub denial_count: u32,
    /// Per-item grant map when the native prompt produced one
    pub per_item: Option<HashMap<String, bool>>,
}

impl RequestOutcome {
    pub(crate) fn granted() -> Self {
        Self {
            verdict: Verdict::Granted,
            stage: EscalationStage::None,
            denial_count: 0,
            per_item: None,
        }
    }

    pub(crate) fn denied(
        stage: EscalationStage,
        denial_count: u32,
        per_item: Option<HashMap<String, bool>>,
    ) -> Self {
        Self {
            verdict: Verdict::Denied,
            stage,
            denial_count,
            per_item,
        }
    }

    /// Whether the full set was granted
    pub fn is_granted(&self) -> bool {
        self.verdict.is_granted()
    }

    /// Fault classification for a denied outcome
    ///
    /// A denial that escalated to the settings stage maps to
    /// [`PermissionFault::PermanentlyDenied`]: only a settings change can
    /// grant it now.
    pub fn fault(&self) -> Option<Fault> {
        match (self.verdict, self.stage) {
            (Verdict::Granted, _) => None,
            (Verdict::Denied, EscalationStage::Settings) => {
                Some(Fault::Permission(PermissionFault::PermanentlyDenied))
            }
            (Verdict::Denied, _) => Some(Fault::Permission(PermissionFault::Denied)),
        }
    }
}
