//! Permflow Core Library
//!
//! This crate provides the core functionality for the permflow permission
//! orchestrator: the request/denial/escalation state machine, the host
//! capability seams, persistent denial counting, and the fault taxonomy
//! surfaced to UI layers.

pub mod config;
pub mod error;
pub mod events;
pub mod fault;
pub mod flow;
pub mod host;
pub mod set;
pub mod store;
pub mod text;

// Re-export commonly used types
pub use config::{DEFAULT_ESCALATION_THRESHOLD, FlowConfig};
pub use error::{PermError, PermResult};
pub use events::{FlowEvent, FlowEvents};
pub use fault::{
    AuthFault, DeviceFault, Fault, GeneralFault, LocalFault, NetworkFault, PermissionFault,
    RenderFault,
};
pub use flow::{EscalationStage, Orchestrator, RequestOutcome, RequestSession, Verdict};
pub use host::{GrantChecker, PromptRequester, PromptResponse, SettingsNavigator};
pub use set::{CheckPolicy, PermissionSet, PermissionSetId};
pub use store::{DenialStore, FileDenialStore, MemoryDenialStore, SharedDenialStore};
pub use text::{MessageCatalog, UiMessage};
