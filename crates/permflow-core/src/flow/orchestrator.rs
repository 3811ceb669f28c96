//! The permission request orchestrator

use std::sync::Arc;

use tokio::sync::{Mutex, broadcast};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::FlowConfig;
use crate::error::PermResult;
use crate::events::{FlowEvent, FlowEvents};
use crate::host::{GrantChecker, PromptRequester, PromptResponse, SettingsNavigator};
use crate::set::{PermissionSet, PermissionSetId};
use crate::store::SharedDenialStore;

use super::outcome::{RequestOutcome, Verdict};
use super::session::{EscalationStage, RequestSession};

/// Drives a permission set through request, denial tracking, rationale and
/// settings escalation
///
/// One logical session is active at a time; a new [`ensure`](Self::ensure)
/// call abandons any previous session. Capability and store failures are
/// absorbed into a `Denied` outcome instead of surfacing as errors, so none
/// of the flow operations return `Result`.
///
/// The session lock is never held across the prompt await, which lets
/// [`on_resume`](Self::on_resume) race an in-flight prompt; the session's
/// `delivered` flag arbitrates so the outcome is delivered at most once per
/// awaited cycle.
pub struct Orchestrator {
    checker: Arc<dyn GrantChecker>,
    prompter: Arc<dyn PromptRequester>,
    navigator: Arc<dyn SettingsNavigator>,
    store: SharedDenialStore,
    config: FlowConfig,
    events: FlowEvents,
    session: Mutex<Option<RequestSession>>,
}

impl Orchestrator {
    /// Create an orchestrator over the host capabilities and a denial store
    pub fn new(
        checker: Arc<dyn GrantChecker>,
        prompter: Arc<dyn PromptRequester>,
        navigator: Arc<dyn SettingsNavigator>,
        store: SharedDenialStore,
    ) -> Self {
        Self {
            checker,
            prompter,
            navigator,
            store,
            config: FlowConfig::default(),
            events: FlowEvents::default(),
            session: Mutex::new(None),
        }
    }

    /// Replace the default configuration
    pub fn with_config(mut self, config: FlowConfig) -> Self {
        self.config = config;
        self
    }

    /// Subscribe to flow events
    pub fn subscribe(&self) -> broadcast::Receiver<FlowEvent> {
        self.events.subscribe()
    }

    /// Escalation stage of the active session (`None` when idle)
    pub async fn current_stage(&self) -> EscalationStage {
        self.session
            .lock()
            .await
            .as_ref()
            .map(|session| session.stage)
            .unwrap_or(EscalationStage::None)
    }

    /// Whether a request session is active
    pub async fn has_active_session(&self) -> bool {
        self.session.lock().await.is_some()
    }

    /// Persisted denial count for a set (0 on store failure)
    pub async fn denial_count(&self, set: &PermissionSet) -> u32 {
        self.load_count(&set.id()).await
    }

    /// Ensure the permission set is granted, driving the request flow
    ///
    /// Checks current grant status first; when ungranted, shows the native
    /// prompt and updates the persisted denial count from its result. A
    /// denied outcome carries the escalation stage the caller should surface
    /// next (rationale below the threshold, settings at or above it).
    pub async fn ensure(&self, set: &PermissionSet) -> RequestOutcome {
        let set_id = set.id();

        {
            let mut guard = self.session.lock().await;
            if let Some(old) = guard.take() {
                warn!("Abandoning active session {} for {}", old.id(), old.set_id());
            }
        }

        let denials = self.load_count(&set_id).await;

        match self.query_granted(set) {
            Ok(true) => {
                self.reset_count(&set_id).await;
                debug!("Permission set {} already granted", set_id);
                self.events.publish(FlowEvent::OutcomeDelivered {
                    set_id,
                    verdict: Verdict::Granted,
                    denial_count: 0,
                });
                return RequestOutcome::granted();
            }
            Ok(false) => {}
            Err(e) => {
                warn!("Grant check failed for {}: {}", set_id, e);
                self.events.publish(FlowEvent::OutcomeDelivered {
                    set_id,
                    verdict: Verdict::Denied,
                    denial_count: denials,
                });
                return RequestOutcome::denied(EscalationStage::None, denials, None);
            }
        }

        let session_id = {
            let mut guard = self.session.lock().await;
            let mut session = RequestSession::new(set.clone());
            session.denials = denials;
            session.prompt_in_flight = true;
            let session_id = session.id();
            self.events.publish(FlowEvent::SessionStarted {
                set_id: set_id.clone(),
            });
            *guard = Some(session);
            session_id
        };

        debug!("Requesting prompt for {} (prior denials: {})", set_id, denials);
        self.run_prompt_cycle(set, session_id).await
    }

    /// Re-check grant status after the app returns to the foreground
    ///
    /// Detects grants that arrived out-of-band (through the OS settings UI)
    /// while the session was awaiting. Unchanged status is a no-op with no
    /// store write; a delivered cycle is never re-fired.
    pub async fn on_resume(&self) -> Option<RequestOutcome> {
        let mut guard = self.session.lock().await;
        let session = guard.as_mut()?;

        if session.prompt_in_flight && session.delivered {
            return None;
        }

        let set = session.set().clone();
        let set_id = session.set_id().clone();

        let granted = match self.query_granted(&set) {
            Ok(granted) => granted,
            Err(e) => {
                warn!("Resume grant re-check failed for {}: {}", set_id, e);
                return None;
            }
        };
        if !granted {
            debug!("Resume re-check for {}: status unchanged", set_id);
            return None;
        }

        let in_flight = session.prompt_in_flight;
        if in_flight {
            // the prompt result, when it lands, is discarded
            session.delivered = true;
        }
        if !in_flight {
            *guard = None;
        }
        drop(guard);

        self.reset_count(&set_id).await;
        self.events.publish(FlowEvent::ExternalGrant {
            set_id: set_id.clone(),
        });
        self.events.publish(FlowEvent::OutcomeDelivered {
            set_id: set_id.clone(),
            verdict: Verdict::Granted,
            denial_count: 0,
        });
        debug!("Grant for {} detected on resume", set_id);
        Some(RequestOutcome::granted())
    }

    /// Acknowledge the rationale explanation
    ///
    /// Accepting re-runs the prompt cycle; declining delivers `Denied` and
    /// consumes the rationale stage. A later `ensure` starts a fresh session
    /// that reuses the persisted denial count.
    pub async fn acknowledge_rationale(&self, accept: bool) -> Option<RequestOutcome> {
        let (set, session_id) = {
            let mut guard = self.session.lock().await;
            let Some(session) = guard.as_mut() else {
                debug!("acknowledge_rationale called with no active session");
                return None;
            };
            if session.stage != EscalationStage::Rationale {
                warn!("acknowledge_rationale called in {} stage", session.stage);
                return None;
            }
            if session.stage_consumed {
                debug!("Rationale already acknowledged for this denial count");
                return None;
            }
            session.stage_consumed = true;

            if !accept {
                let denials = session.denials;
                let set_id = session.set_id().clone();
                debug!("Rationale declined for {}", set_id);
                self.events.publish(FlowEvent::OutcomeDelivered {
                    set_id,
                    verdict: Verdict::Denied,
                    denial_count: denials,
                });
                return Some(RequestOutcome::denied(
                    EscalationStage::Rationale,
                    denials,
                    None,
                ));
            }

            session.prompt_in_flight = true;
            session.delivered = false;
            (session.set().clone(), session.id())
        };

        Some(self.run_prompt_cycle(&set, session_id).await)
    }

    /// Acknowledge the settings redirect
    ///
    /// Navigating opens the settings surface for the set (the elevated-grant
    /// screen for elevated sets) and leaves the session awaiting
    /// [`on_resume`](Self::on_resume); a failed primary target falls back to
    /// the general settings screen, and a failed fallback delivers `Denied`
    /// with no further escalation. Declining delivers `Denied`.
    pub async fn acknowledge_settings(&self, navigate: bool) -> Option<RequestOutcome> {
        let (set_id, denials, elevated) = {
            let mut guard = self.session.lock().await;
            let Some(session) = guard.as_mut() else {
                debug!("acknowledge_settings called with no active session");
                return None;
            };
            if session.stage != EscalationStage::Settings {
                warn!("acknowledge_settings called in {} stage", session.stage);
                return None;
            }
            if session.stage_consumed {
                debug!("Settings redirect already acknowledged for this denial count");
                return None;
            }
            session.stage_consumed = true;

            if !navigate {
                let denials = session.denials;
                let set_id = session.set_id().clone();
                debug!("Settings redirect declined for {}", set_id);
                self.events.publish(FlowEvent::OutcomeDelivered {
                    set_id,
                    verdict: Verdict::Denied,
                    denial_count: denials,
                });
                return Some(RequestOutcome::denied(
                    EscalationStage::Settings,
                    denials,
                    None,
                ));
            }

            // a grant, if it comes, arrives through on_resume
            session.delivered = false;
            (
                session.set_id().clone(),
                session.denials,
                session.set().is_elevated(),
            )
        };

        let primary = if elevated {
            self.navigator.open_elevated_grant_settings()
        } else {
            self.navigator.open_app_settings()
        };

        if let Err(e) = primary {
            warn!("Settings navigation failed for {}: {}", set_id, e);
            if let Err(e) = self.navigator.open_general_settings() {
                warn!("Fallback settings navigation failed for {}: {}", set_id, e);
                let mut guard = self.session.lock().await;
                if let Some(session) = guard.as_mut() {
                    session.delivered = true;
                }
                self.events.publish(FlowEvent::OutcomeDelivered {
                    set_id,
                    verdict: Verdict::Denied,
                    denial_count: denials,
                });
                return Some(RequestOutcome::denied(
                    EscalationStage::Settings,
                    denials,
                    None,
                ));
            }
        }

        debug!("Awaiting resume after settings navigation for {}", set_id);
        None
    }

    /// Run one prompt cycle: show the native prompt, then fold its result
    /// into the session unless a racing resume already delivered.
    async fn run_prompt_cycle(&self, set: &PermissionSet, session_id: Uuid) -> RequestOutcome {
        let response = self.prompter.request(set).await;

        let mut guard = self.session.lock().await;
        let mut session = match guard.take() {
            Some(session) if session.id() == session_id => session,
            other => {
                *guard = other;
                debug!("Prompt result for {} discarded: session superseded", set.id());
                return RequestOutcome::denied(EscalationStage::None, 0, None);
            }
        };

        if session.delivered {
            debug!(
                "Prompt result for {} discarded: outcome already delivered",
                session.set_id()
            );
            return RequestOutcome::granted();
        }

        session.prompt_in_flight = false;
        let set_id = session.set_id().clone();

        let response = match response {
            Ok(response) => response,
            Err(e) => {
                warn!("Prompt request failed for {}: {}", set_id, e);
                let denials = session.denials;
                self.events.publish(FlowEvent::OutcomeDelivered {
                    set_id,
                    verdict: Verdict::Denied,
                    denial_count: denials,
                });
                return RequestOutcome::denied(EscalationStage::None, denials, None);
            }
        };

        // elevated sets have no batch prompt; a per-item result for one is a
        // host contract violation
        let response = match response {
            PromptResponse::PerItem(_) if session.set().is_elevated() => {
                warn!("Ignoring per-item prompt result for elevated set {}", set_id);
                PromptResponse::NotApplicable
            }
            response => response,
        };

        let all_granted = response.all_granted();
        match response {
            PromptResponse::PerItem(_) if all_granted => {
                self.reset_count(&set_id).await;
                debug!("Prompt granted {}", set_id);
                self.events.publish(FlowEvent::OutcomeDelivered {
                    set_id,
                    verdict: Verdict::Granted,
                    denial_count: 0,
                });
                RequestOutcome::granted()
            }
            PromptResponse::PerItem(map) => {
                session.denials += 1;
                let denials = session.denials;
                self.save_count(&set_id, denials).await;

                let stage = if denials >= self.config.escalation_threshold {
                    EscalationStage::Settings
                } else {
                    EscalationStage::Rationale
                };
                session.stage = stage;
                session.stage_consumed = false;
                session.delivered = true;

                debug!("Prompt denied {} (denials: {}, stage: {})", set_id, denials, stage);
                self.events.publish(FlowEvent::StageChanged {
                    set_id: set_id.clone(),
                    stage,
                });
                self.events.publish(FlowEvent::OutcomeDelivered {
                    set_id,
                    verdict: Verdict::Denied,
                    denial_count: denials,
                });

                let per_item = self.config.report_per_item.then_some(map);
                *guard = Some(session);
                RequestOutcome::denied(stage, denials, per_item)
            }
            PromptResponse::NotApplicable => {
                // no user denial was observed, so the counter stays put;
                // settings is the only forward path
                let denials = session.denials;
                session.stage = EscalationStage::Settings;
                session.stage_consumed = false;
                session.delivered = true;

                debug!("No native prompt for {}; entering settings stage", set_id);
                self.events.publish(FlowEvent::StageChanged {
                    set_id: set_id.clone(),
                    stage: EscalationStage::Settings,
                });
                self.events.publish(FlowEvent::OutcomeDelivered {
                    set_id,
                    verdict: Verdict::Denied,
                    denial_count: denials,
                });

                *guard = Some(session);
                RequestOutcome::denied(EscalationStage::Settings, denials, None)
            }
        }
    }

    fn query_granted(&self, set: &PermissionSet) -> PermResult<bool> {
        if set.is_elevated() {
            self.checker.is_elevated_granted()
        } else {
            self.checker.is_granted(set)
        }
    }

    async fn load_count(&self, id: &PermissionSetId) -> u32 {
        match self.store.get(id).await {
            Ok(count) => count,
            Err(e) => {
                warn!("Failed to load denial count for {}: {}", id, e);
                0
            }
        }
    }

    async fn save_count(&self, id: &PermissionSetId, count: u32) {
        if let Err(e) = self.store.set(id, count).await {
            warn!("Failed to persist denial count for {}: {}", id, e);
        }
    }

    async fn reset_count(&self, id: &PermissionSetId) {
        if let Err(e) = self.store.remove(id).await {
            warn!("Failed to reset denial count for {}: {}", id, e);
        }
    }
}
