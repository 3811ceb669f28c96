//! High-level permission flow client

use std::sync::Arc;

use tracing::debug;

use permflow_core::{
    EscalationStage, FlowConfig, GrantChecker, Orchestrator, PermError, PermResult, PermissionSet,
    PromptRequester, RequestOutcome, SettingsNavigator,
    store::{FileDenialStore, SharedDenialStore},
};

/// Builder for [`PermissionFlow`]
///
/// The three host capabilities are required; the store defaults to a
/// [`FileDenialStore`] at the default path so denial counts survive process
/// restarts without any further wiring.
#[derive(Default)]
pub struct PermissionFlowBuilder {
    checker: Option<Arc<dyn GrantChecker>>,
    prompter: Option<Arc<dyn PromptRequester>>,
    navigator: Option<Arc<dyn SettingsNavigator>>,
    store: Option<SharedDenialStore>,
    config: FlowConfig,
}

impl PermissionFlowBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the grant checker capability
    pub fn with_checker(mut self, checker: impl GrantChecker + 'static) -> Self {
        self.checker = Some(Arc::new(checker));
        self
    }

    /// Set the prompt requester capability
    pub fn with_prompter(mut self, prompter: impl PromptRequester + 'static) -> Self {
        self.prompter = Some(Arc::new(prompter));
        self
    }

    /// Set the settings navigator capability
    pub fn with_navigator(mut self, navigator: impl SettingsNavigator + 'static) -> Self {
        self.navigator = Some(Arc::new(navigator));
        self
    }

    /// Replace the default file-backed denial store
    pub fn with_store(mut self, store: SharedDenialStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Replace the default flow configuration
    pub fn with_config(mut self, config: FlowConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the flow
    pub fn build(self) -> PermResult<PermissionFlow> {
        let checker = self
            .checker
            .ok_or_else(|| PermError::invalid_input("grant checker is required"))?;
        let prompter = self
            .prompter
            .ok_or_else(|| PermError::invalid_input("prompt requester is required"))?;
        let navigator = self
            .navigator
            .ok_or_else(|| PermError::invalid_input("settings navigator is required"))?;
        let store: SharedDenialStore = match self.store {
            Some(store) => store,
            None => Arc::new(FileDenialStore::default_path()?),
        };

        debug!("Building permission flow");
        let orchestrator =
            Orchestrator::new(checker, prompter, navigator, store).with_config(self.config);
        Ok(PermissionFlow { orchestrator })
    }
}

/// High-level facade over the [`Orchestrator`]
///
/// Wire it once with the host capabilities, then call
/// [`request_access`](Self::request_access) wherever a feature needs a
/// grant, and [`on_resume`](Self::on_resume) from the host's
/// foreground/visibility hook.
pub struct PermissionFlow {
    orchestrator: Orchestrator,
}

impl PermissionFlow {
    /// Start building a flow
    pub fn builder() -> PermissionFlowBuilder {
        PermissionFlowBuilder::new()
    }

    /// Ensure the permission set is granted, driving the request flow
    pub async fn request_access(&self, set: &PermissionSet) -> RequestOutcome {
        debug!("Requesting access to {}", set);
        self.orchestrator.ensure(set).await
    }

    /// Re-check grant status after the app returns to the foreground
    pub async fn on_resume(&self) -> Option<RequestOutcome> {
        self.orchestrator.on_resume().await
    }

    /// Acknowledge the rationale explanation
    pub async fn acknowledge_rationale(&self, accept: bool) -> Option<RequestOutcome> {
        self.orchestrator.acknowledge_rationale(accept).await
    }

    /// Acknowledge the settings redirect
    pub async fn acknowledge_settings(&self, navigate: bool) -> Option<RequestOutcome> {
        self.orchestrator.acknowledge_settings(navigate).await
    }

    /// Escalation stage of the active session (`None` when idle)
    pub async fn current_stage(&self) -> EscalationStage {
        self.orchestrator.current_stage().await
    }

    /// Access the underlying orchestrator (event subscription, counts)
    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }
}
