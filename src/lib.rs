//! permflow
//!
//! Permission-request orchestration: drives a set of required access grants
//! through request, denial tracking, rationale and settings escalation,
//! persisting denial counts across process restarts so repeated denials are
//! never lost.
//!
//! Most users want the [`PermissionFlow`] facade; the full state machine,
//! capability seams and storage backends live in [`permflow_core`].

pub use permflow_core;
pub use permflow_sdk;

pub use permflow_sdk::{
    API_VERSION, CheckPolicy, DenialStore, EscalationStage, Fault, FileDenialStore, FlowConfig,
    FlowEvent, GrantChecker, MIN_SUPPORTED_VERSION, MemoryDenialStore, PermError, PermResult,
    PermissionFault, PermissionFlow, PermissionFlowBuilder, PermissionSet, PermissionSetId,
    PromptRequester, PromptResponse, RequestOutcome, SettingsNavigator, SharedDenialStore,
    UiMessage, Verdict,
};
