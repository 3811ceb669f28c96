//! Flow events
//!
//! Broadcast-based notifications of orchestrator activity. UI layers that
//! render dialogs around the flow can subscribe without coupling to the
//! state machine; publishing is lossy when nobody listens.

use tokio::sync::broadcast;

use crate::flow::{EscalationStage, Verdict};
use crate::set::PermissionSetId;

/// Events published by the orchestrator
#[derive(Debug, Clone)]
pub enum FlowEvent {
    /// A request session was opened
    SessionStarted { set_id: PermissionSetId },

    /// The escalation stage of the active session changed
    StageChanged {
        set_id: PermissionSetId,
        stage: EscalationStage,
    },

    /// An outcome was delivered to the caller
    OutcomeDelivered {
        set_id: PermissionSetId,
        verdict: Verdict,
        denial_count: u32,
    },

    /// A grant arrived out-of-band and was detected on resume
    ExternalGrant { set_id: PermissionSetId },
}

/// Lossy broadcast publisher for flow events
#[derive(Debug, Clone)]
pub struct FlowEvents {
    sender: broadcast::Sender<FlowEvent>,
}

impl FlowEvents {
    /// Create a publisher with the given channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to future events
    pub fn subscribe(&self) -> broadcast::Receiver<FlowEvent> {
        self.sender.subscribe()
    }

    /// Publish an event; dropped when no subscriber is listening
    pub fn publish(&self, event: FlowEvent) {
        let _ = self.sender.send(event);
    }
}

impl Default for FlowEvents {
    fn default() -> Self {
        Self::new(32)
    }
}
