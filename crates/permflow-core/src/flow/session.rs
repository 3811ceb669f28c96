//! Ephemeral request sessions

use std::fmt;

use uuid::Uuid;

use crate::set::{PermissionSet, PermissionSetId};

/// Escalation stage of a request flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EscalationStage {
    /// No escalation surfaced
    None,
    /// The caller should show the in-app rationale explanation
    Rationale,
    /// The caller should offer the settings redirect
    Settings,
}

impl fmt::Display for EscalationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Rationale => write!(f, "rationale"),
            Self::Settings => write!(f, "settings"),
        }
    }
}

/// State of one active permission request
///
/// Created when a request begins, dropped when the terminal outcome is
/// delivered or the caller starts a new request. `delivered` guards
/// at-most-once delivery per awaited cycle; `stage_consumed` allows each
/// rationale/settings acknowledgement only once per denial count.
#[derive(Debug, Clone)]
pub struct RequestSession {
    id: Uuid,
    set: PermissionSet,
    set_id: PermissionSetId,
    pub(crate) stage: EscalationStage,
    pub(crate) prompt_in_flight: bool,
    pub(crate) delivered: bool,
    pub(crate) stage_consumed: bool,
    pub(crate) denials: u32,
}

impl RequestSession {
    pub(crate) fn new(set: PermissionSet) -> Self {
        let set_id = set.id();
        Self {
            id: Uuid::new_v4(),
            set,
            set_id,
            stage: EscalationStage::None,
            prompt_in_flight: false,
            delivered: false,
            stage_consumed: false,
            denials: 0,
        }
    }

    /// Unique id of this session
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The permission set this session is requesting
    pub fn set(&self) -> &PermissionSet {
        &self.set
    }

    /// Identity of the requested set
    pub fn set_id(&self) -> &PermissionSetId {
        &self.set_id
    }

    /// Current escalation stage
    pub fn stage(&self) -> EscalationStage {
        self.stage
    }

    /// Denial count as seen by this session
    pub fn denial_count(&self) -> u32 {
        self.denials
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_idle() {
        let set = PermissionSet::new(["camera"]).unwrap();
        let session = RequestSession::new(set.clone());

        assert_eq!(session.stage(), EscalationStage::None);
        assert_eq!(session.denial_count(), 0);
        assert_eq!(session.set_id(), &set.id());
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(EscalationStage::None.to_string(), "none");
        assert_eq!(EscalationStage::Rationale.to_string(), "rationale");
        assert_eq!(EscalationStage::Settings.to_string(), "settings");
    }
}
