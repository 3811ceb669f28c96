//! Permflow SDK
//!
//! High-level entry point for embedding the permission flow: construct a
//! [`PermissionFlow`] with the three host capabilities and drive it from
//! your request sites and lifecycle hooks.
//!
//! # Example
//!
//! ```ignore
//! use permflow_sdk::{PermissionFlow, PermissionSet};
//!
//! let flow = PermissionFlow::builder()
//!     .with_checker(MyChecker)
//!     .with_prompter(MyPrompter)
//!     .with_navigator(MyNavigator)
//!     .build()?;
//!
//! let set = PermissionSet::new(["camera"])?;
//! let outcome = flow.request_access(&set).await;
//! if !outcome.is_granted() {
//!     // surface outcome.stage (rationale or settings redirect)
//! }
//! ```

pub mod client;
pub mod version;

pub use client::{PermissionFlow, PermissionFlowBuilder};

// Re-export commonly used types from core
pub use permflow_core::{
    CheckPolicy, DenialStore, EscalationStage, Fault, FileDenialStore, FlowConfig, FlowEvent,
    GrantChecker, MemoryDenialStore, PermError, PermResult, PermissionFault, PermissionSet,
    PermissionSetId, PromptRequester, PromptResponse, RequestOutcome, SettingsNavigator,
    SharedDenialStore, UiMessage, Verdict,
};

// Re-export version constants for convenience
pub use version::{API_VERSION, MIN_SUPPORTED_VERSION};
