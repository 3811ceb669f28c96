//! Orchestrator state machine tests

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::config::FlowConfig;
use crate::error::{PermError, PermResult};
use crate::events::FlowEvent;
use crate::fault::{Fault, PermissionFault};
use crate::host::{GrantChecker, PromptRequester, PromptResponse, SettingsNavigator};
use crate::set::{PermissionSet, PermissionSetId};
use crate::store::{DenialStore, MemoryDenialStore};

use super::orchestrator::Orchestrator;
use super::session::EscalationStage;

#[derive(Default)]
struct FakeChecker {
    granted: AtomicBool,
    elevated_granted: AtomicBool,
    fail: AtomicBool,
    granted_calls: AtomicU32,
    elevated_calls: AtomicU32,
}

impl FakeChecker {
    fn set_granted(&self, value: bool) {
        self.granted.store(value, Ordering::SeqCst);
    }

    fn set_elevated_granted(&self, value: bool) {
        self.elevated_granted.store(value, Ordering::SeqCst);
    }

    fn set_fail(&self, value: bool) {
        self.fail.store(value, Ordering::SeqCst);
    }

    fn granted_calls(&self) -> u32 {
        self.granted_calls.load(Ordering::SeqCst)
    }

    fn elevated_calls(&self) -> u32 {
        self.elevated_calls.load(Ordering::SeqCst)
    }
}

impl GrantChecker for FakeChecker {
    fn is_granted(&self, _set: &PermissionSet) -> PermResult<bool> {
        self.granted_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(PermError::capability("checker", "unavailable"));
        }
        Ok(self.granted.load(Ordering::SeqCst))
    }

    fn is_elevated_granted(&self) -> PermResult<bool> {
        self.elevated_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(PermError::capability("checker", "unavailable"));
        }
        Ok(self.elevated_granted.load(Ordering::SeqCst))
    }
}

#[derive(Default)]
struct ScriptedPrompter {
    responses: Mutex<VecDeque<PermResult<PromptResponse>>>,
    calls: AtomicU32,
}

impl ScriptedPrompter {
    fn push_response(&self, response: PermResult<PromptResponse>) {
        self.responses.lock().push_back(response);
    }

    fn push_deny(&self, set: &PermissionSet) {
        let map = set.names().map(|name| (name.to_string(), false)).collect();
        self.push_response(Ok(PromptResponse::PerItem(map)));
    }

    fn push_grant(&self, set: &PermissionSet) {
        let map = set.names().map(|name| (name.to_string(), true)).collect();
        self.push_response(Ok(PromptResponse::PerItem(map)));
    }

    fn push_not_applicable(&self) {
        self.push_response(Ok(PromptResponse::NotApplicable));
    }

    fn push_err(&self) {
        self.push_response(Err(PermError::capability("prompter", "activity gone")));
    }

    fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PromptRequester for ScriptedPrompter {
    async fn request(&self, _set: &PermissionSet) -> PermResult<PromptResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(PermError::capability("prompter", "no scripted response")))
    }
}

/// Prompter that parks until the test releases it, for racing a resume
/// against an in-flight prompt.
struct GatedPrompter {
    gate: Notify,
    in_flight: AtomicBool,
    response: Mutex<Option<PromptResponse>>,
}

impl GatedPrompter {
    fn new() -> Self {
        Self {
            gate: Notify::new(),
            in_flight: AtomicBool::new(false),
            response: Mutex::new(None),
        }
    }

    async fn wait_until_in_flight(&self) {
        while !self.in_flight.load(Ordering::SeqCst) {
            tokio::task::yield_now().await;
        }
    }

    fn release_with(&self, response: PromptResponse) {
        *self.response.lock() = Some(response);
        self.gate.notify_one();
    }
}

#[async_trait]
impl PromptRequester for GatedPrompter {
    async fn request(&self, _set: &PermissionSet) -> PermResult<PromptResponse> {
        self.in_flight.store(true, Ordering::SeqCst);
        self.gate.notified().await;
        Ok(self.response.lock().take().expect("response set before release"))
    }
}

#[derive(Default)]
struct FakeNavigator {
    app_calls: AtomicU32,
    elevated_calls: AtomicU32,
    general_calls: AtomicU32,
}

impl FakeNavigator {
    fn app_calls(&self) -> u32 {
        self.app_calls.load(Ordering::SeqCst)
    }

    fn elevated_calls(&self) -> u32 {
        self.elevated_calls.load(Ordering::SeqCst)
    }
}

impl SettingsNavigator for FakeNavigator {
    fn open_app_settings(&self) -> PermResult<()> {
        self.app_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn open_elevated_grant_settings(&self) -> PermResult<()> {
        self.elevated_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn open_general_settings(&self) -> PermResult<()> {
        self.general_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

mockall::mock! {
    Navigator {}

    impl SettingsNavigator for Navigator {
        fn open_app_settings(&self) -> PermResult<()>;
        fn open_elevated_grant_settings(&self) -> PermResult<()>;
        fn open_general_settings(&self) -> PermResult<()>;
    }
}

/// Store wrapper that counts writes, for idempotence assertions
struct CountingStore {
    inner: MemoryDenialStore,
    writes: AtomicU32,
}

impl CountingStore {
    fn new() -> Self {
        Self {
            inner: MemoryDenialStore::new(),
            writes: AtomicU32::new(0),
        }
    }

    fn writes(&self) -> u32 {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DenialStore for CountingStore {
    async fn get(&self, id: &PermissionSetId) -> PermResult<u32> {
        self.inner.get(id).await
    }

    async fn set(&self, id: &PermissionSetId, count: u32) -> PermResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.set(id, count).await
    }

    async fn remove(&self, id: &PermissionSetId) -> PermResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.remove(id).await
    }
}

struct FailingStore;

#[async_trait]
impl DenialStore for FailingStore {
    async fn get(&self, _id: &PermissionSetId) -> PermResult<u32> {
        Err(PermError::store("unavailable"))
    }

    async fn set(&self, _id: &PermissionSetId, _count: u32) -> PermResult<()> {
        Err(PermError::store("unavailable"))
    }

    async fn remove(&self, _id: &PermissionSetId) -> PermResult<()> {
        Err(PermError::store("unavailable"))
    }
}

struct Harness {
    checker: Arc<FakeChecker>,
    prompter: Arc<ScriptedPrompter>,
    navigator: Arc<FakeNavigator>,
    store: Arc<CountingStore>,
    orchestrator: Arc<Orchestrator>,
}

fn harness() -> Harness {
    harness_with_config(FlowConfig::default())
}

fn harness_with_config(config: FlowConfig) -> Harness {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let checker = Arc::new(FakeChecker::default());
    let prompter = Arc::new(ScriptedPrompter::default());
    let navigator = Arc::new(FakeNavigator::default());
    let store = Arc::new(CountingStore::new());
    let orchestrator = Arc::new(
        Orchestrator::new(
            checker.clone(),
            prompter.clone(),
            navigator.clone(),
            store.clone(),
        )
        .with_config(config),
    );
    Harness {
        checker,
        prompter,
        navigator,
        store,
        orchestrator,
    }
}

fn camera() -> PermissionSet {
    PermissionSet::new(["camera"]).unwrap()
}

#[tokio::test]
async fn test_already_granted_resolves_without_prompt() {
    let h = harness();
    let set = camera();
    h.store.set(&set.id(), 3).await.unwrap();
    h.checker.set_granted(true);

    let outcome = h.orchestrator.ensure(&set).await;

    assert!(outcome.is_granted());
    assert_eq!(h.prompter.calls(), 0);
    assert_eq!(h.store.get(&set.id()).await.unwrap(), 0);
    assert!(!h.orchestrator.has_active_session().await);
}

#[tokio::test]
async fn test_first_denial_enters_rationale() {
    let h = harness();
    let set = camera();
    h.prompter.push_deny(&set);

    let outcome = h.orchestrator.ensure(&set).await;

    assert!(!outcome.is_granted());
    assert_eq!(outcome.stage, EscalationStage::Rationale);
    assert_eq!(outcome.denial_count, 1);
    assert_eq!(h.store.get(&set.id()).await.unwrap(), 1);
    assert_eq!(h.orchestrator.current_stage().await, EscalationStage::Rationale);
    assert_eq!(h.navigator.app_calls(), 0);
}

#[tokio::test]
async fn test_second_denial_escalates_to_settings() {
    let h = harness();
    let set = camera();
    h.prompter.push_deny(&set);
    h.prompter.push_deny(&set);

    let first = h.orchestrator.ensure(&set).await;
    assert_eq!(first.stage, EscalationStage::Rationale);

    let second = h.orchestrator.ensure(&set).await;
    assert!(!second.is_granted());
    assert_eq!(second.stage, EscalationStage::Settings);
    assert_eq!(second.denial_count, 2);
    assert_eq!(h.store.get(&set.id()).await.unwrap(), 2);

    // navigation happens on acknowledgement, not at the transition
    assert_eq!(h.navigator.app_calls(), 0);
    let nav = h.orchestrator.acknowledge_settings(true).await;
    assert!(nav.is_none());
    assert_eq!(h.navigator.app_calls(), 1);
}

#[tokio::test]
async fn test_denial_counts_accumulate() {
    let h = harness_with_config(FlowConfig::new().with_escalation_threshold(10));
    let set = camera();

    for expected in 1u32..=4 {
        h.prompter.push_deny(&set);
        let outcome = h.orchestrator.ensure(&set).await;
        assert_eq!(outcome.denial_count, expected);
        assert_eq!(outcome.stage, EscalationStage::Rationale);
        assert_eq!(h.store.get(&set.id()).await.unwrap(), expected);
    }
}

#[tokio::test]
async fn test_partial_grant_counts_as_denial() {
    let h = harness();
    let set = PermissionSet::new(["audio", "camera"]).unwrap();
    let map = [("audio".to_string(), true), ("camera".to_string(), false)]
        .into_iter()
        .collect();
    h.prompter.push_response(Ok(PromptResponse::PerItem(map)));

    let outcome = h.orchestrator.ensure(&set).await;

    assert!(!outcome.is_granted());
    assert_eq!(outcome.denial_count, 1);
    let per_item = outcome.per_item.expect("per-item map reported by default");
    assert_eq!(per_item.get("audio"), Some(&true));
    assert_eq!(per_item.get("camera"), Some(&false));
}

#[tokio::test]
async fn test_per_item_reporting_can_be_disabled() {
    let h = harness_with_config(FlowConfig::new().with_per_item_reporting(false));
    let set = camera();
    h.prompter.push_deny(&set);

    let outcome = h.orchestrator.ensure(&set).await;
    assert!(outcome.per_item.is_none());
}

#[tokio::test]
async fn test_rationale_accept_reprompts() {
    let h = harness();
    let set = camera();
    h.prompter.push_deny(&set);
    h.prompter.push_grant(&set);

    let first = h.orchestrator.ensure(&set).await;
    assert_eq!(first.stage, EscalationStage::Rationale);

    let second = h
        .orchestrator
        .acknowledge_rationale(true)
        .await
        .expect("accepting the rationale re-runs the prompt");
    assert!(second.is_granted());
    assert_eq!(h.store.get(&set.id()).await.unwrap(), 0);
    assert!(!h.orchestrator.has_active_session().await);
    assert_eq!(h.prompter.calls(), 2);
}

#[tokio::test]
async fn test_rationale_accept_then_deny_escalates() {
    let h = harness();
    let set = camera();
    h.prompter.push_deny(&set);
    h.prompter.push_deny(&set);

    h.orchestrator.ensure(&set).await;
    let outcome = h
        .orchestrator
        .acknowledge_rationale(true)
        .await
        .expect("accepting the rationale re-runs the prompt");

    assert_eq!(outcome.denial_count, 2);
    assert_eq!(outcome.stage, EscalationStage::Settings);
}

#[tokio::test]
async fn test_rationale_decline_is_consumed() {
    let h = harness();
    let set = camera();
    h.prompter.push_deny(&set);

    h.orchestrator.ensure(&set).await;
    let declined = h
        .orchestrator
        .acknowledge_rationale(false)
        .await
        .expect("declining delivers a denied outcome");
    assert!(!declined.is_granted());
    assert_eq!(declined.stage, EscalationStage::Rationale);

    // consumed for this denial count
    assert!(h.orchestrator.acknowledge_rationale(false).await.is_none());
    // the persisted count survives for the next request
    assert_eq!(h.store.get(&set.id()).await.unwrap(), 1);
}

#[tokio::test]
async fn test_settings_decline_delivers_denied() {
    let h = harness();
    let set = camera();
    h.prompter.push_deny(&set);
    h.prompter.push_deny(&set);
    h.orchestrator.ensure(&set).await;
    h.orchestrator.ensure(&set).await;

    let declined = h
        .orchestrator
        .acknowledge_settings(false)
        .await
        .expect("declining delivers a denied outcome");
    assert!(!declined.is_granted());
    assert_eq!(h.navigator.app_calls(), 0);

    assert!(h.orchestrator.acknowledge_settings(false).await.is_none());
}

#[tokio::test]
async fn test_settings_navigation_falls_back_to_general() {
    let mut navigator = MockNavigator::new();
    navigator
        .expect_open_app_settings()
        .times(1)
        .returning(|| Err(PermError::navigation("no app settings intent")));
    navigator
        .expect_open_general_settings()
        .times(1)
        .returning(|| Ok(()));

    let prompter = Arc::new(ScriptedPrompter::default());
    let orchestrator = Orchestrator::new(
        Arc::new(FakeChecker::default()),
        prompter.clone(),
        Arc::new(navigator),
        Arc::new(MemoryDenialStore::new()),
    );

    let set = camera();
    prompter.push_deny(&set);
    prompter.push_deny(&set);
    orchestrator.ensure(&set).await;
    orchestrator.ensure(&set).await;

    // fallback succeeded, so the session keeps awaiting resume
    assert!(orchestrator.acknowledge_settings(true).await.is_none());
}

#[tokio::test]
async fn test_settings_navigation_double_failure_denies() {
    let mut navigator = MockNavigator::new();
    navigator
        .expect_open_app_settings()
        .times(1)
        .returning(|| Err(PermError::navigation("no app settings intent")));
    navigator
        .expect_open_general_settings()
        .times(1)
        .returning(|| Err(PermError::navigation("no general settings intent")));

    let prompter = Arc::new(ScriptedPrompter::default());
    let orchestrator = Orchestrator::new(
        Arc::new(FakeChecker::default()),
        prompter.clone(),
        Arc::new(navigator),
        Arc::new(MemoryDenialStore::new()),
    );

    let set = camera();
    prompter.push_deny(&set);
    prompter.push_deny(&set);
    orchestrator.ensure(&set).await;
    orchestrator.ensure(&set).await;

    let outcome = orchestrator
        .acknowledge_settings(true)
        .await
        .expect("a denied outcome is delivered when no settings screen opens");
    assert!(!outcome.is_granted());
    assert_eq!(outcome.stage, EscalationStage::Settings);
}

#[tokio::test]
async fn test_resume_after_external_grant() {
    let h = harness();
    let set = camera();
    h.prompter.push_deny(&set);
    h.prompter.push_deny(&set);
    h.orchestrator.ensure(&set).await;
    h.orchestrator.ensure(&set).await;
    assert!(h.orchestrator.acknowledge_settings(true).await.is_none());

    // the user flips the grant in the OS settings UI
    h.checker.set_granted(true);

    let outcome = h
        .orchestrator
        .on_resume()
        .await
        .expect("resume detects the external grant");
    assert!(outcome.is_granted());
    assert_eq!(h.store.get(&set.id()).await.unwrap(), 0);
    assert!(!h.orchestrator.has_active_session().await);

    // delivered exactly once
    assert!(h.orchestrator.on_resume().await.is_none());
}

#[tokio::test]
async fn test_resume_with_unchanged_status_is_noop() {
    let h = harness();
    let set = camera();
    h.prompter.push_deny(&set);
    h.orchestrator.ensure(&set).await;

    let writes_before = h.store.writes();
    assert!(h.orchestrator.on_resume().await.is_none());
    assert_eq!(h.store.writes(), writes_before);
    assert_eq!(h.orchestrator.current_stage().await, EscalationStage::Rationale);
}

#[tokio::test]
async fn test_resume_without_session_is_noop() {
    let h = harness();
    assert!(h.orchestrator.on_resume().await.is_none());
    assert_eq!(h.checker.granted_calls(), 0);
}

#[tokio::test]
async fn test_prompt_and_resume_race_delivers_once() {
    let checker = Arc::new(FakeChecker::default());
    let prompter = Arc::new(GatedPrompter::new());
    let orchestrator = Arc::new(Orchestrator::new(
        checker.clone(),
        prompter.clone(),
        Arc::new(FakeNavigator::default()),
        Arc::new(MemoryDenialStore::new()),
    ));
    let mut events = orchestrator.subscribe();

    let set = camera();
    let task = tokio::spawn({
        let orchestrator = orchestrator.clone();
        let set = set.clone();
        async move { orchestrator.ensure(&set).await }
    });

    prompter.wait_until_in_flight().await;
    checker.set_granted(true);

    let resumed = orchestrator
        .on_resume()
        .await
        .expect("resume delivers the grant first");
    assert!(resumed.is_granted());

    // the denial lands after delivery and is discarded
    let map = [("camera".to_string(), false)].into_iter().collect();
    prompter.release_with(PromptResponse::PerItem(map));
    let ensured = task.await.unwrap();
    assert!(ensured.is_granted());

    let mut delivered = 0;
    while let Ok(event) = events.try_recv() {
        if matches!(event, FlowEvent::OutcomeDelivered { .. }) {
            delivered += 1;
        }
    }
    assert_eq!(delivered, 1);
    assert!(orchestrator.on_resume().await.is_none());
}

#[tokio::test]
async fn test_elevated_set_skips_per_item_path() {
    let h = harness();
    let set = PermissionSet::elevated(["all_files"]).unwrap();
    h.prompter.push_not_applicable();

    let outcome = h.orchestrator.ensure(&set).await;

    assert!(!outcome.is_granted());
    assert_eq!(outcome.stage, EscalationStage::Settings);
    assert_eq!(outcome.denial_count, 0);
    assert_eq!(h.checker.granted_calls(), 0);
    assert!(h.checker.elevated_calls() >= 1);
    assert_eq!(h.store.get(&set.id()).await.unwrap(), 0);

    let nav = h.orchestrator.acknowledge_settings(true).await;
    assert!(nav.is_none());
    assert_eq!(h.navigator.elevated_calls(), 1);
    assert_eq!(h.navigator.app_calls(), 0);
}

#[tokio::test]
async fn test_elevated_resume_uses_elevated_predicate() {
    let h = harness();
    let set = PermissionSet::elevated(["all_files"]).unwrap();
    h.prompter.push_not_applicable();
    h.orchestrator.ensure(&set).await;
    assert!(h.orchestrator.acknowledge_settings(true).await.is_none());

    h.checker.set_elevated_granted(true);
    let outcome = h
        .orchestrator
        .on_resume()
        .await
        .expect("resume detects the elevated grant");
    assert!(outcome.is_granted());
    assert_eq!(h.checker.granted_calls(), 0);
}

#[tokio::test]
async fn test_checker_failure_delivers_denied() {
    let h = harness();
    let set = camera();
    h.checker.set_fail(true);

    let outcome = h.orchestrator.ensure(&set).await;

    assert!(!outcome.is_granted());
    assert_eq!(outcome.stage, EscalationStage::None);
    assert_eq!(h.prompter.calls(), 0);
    assert!(!h.orchestrator.has_active_session().await);
}

#[tokio::test]
async fn test_prompter_failure_delivers_denied() {
    let h = harness();
    let set = camera();
    h.prompter.push_err();

    let outcome = h.orchestrator.ensure(&set).await;

    assert!(!outcome.is_granted());
    assert_eq!(outcome.stage, EscalationStage::None);
    assert!(!h.orchestrator.has_active_session().await);
    assert!(h.orchestrator.on_resume().await.is_none());
}

#[tokio::test]
async fn test_store_failure_never_fails_the_flow() {
    let checker = Arc::new(FakeChecker::default());
    let prompter = Arc::new(ScriptedPrompter::default());
    let orchestrator = Orchestrator::new(
        checker.clone(),
        prompter.clone(),
        Arc::new(FakeNavigator::default()),
        Arc::new(FailingStore),
    );

    let set = camera();
    prompter.push_deny(&set);
    let outcome = orchestrator.ensure(&set).await;
    assert!(!outcome.is_granted());
    assert_eq!(outcome.denial_count, 1);
    assert_eq!(outcome.stage, EscalationStage::Rationale);

    checker.set_granted(true);
    let outcome = orchestrator.ensure(&set).await;
    assert!(outcome.is_granted());
}

#[tokio::test]
async fn test_denied_outcome_maps_to_permission_fault() {
    let h = harness();
    let set = camera();
    h.prompter.push_deny(&set);
    h.prompter.push_deny(&set);

    let first = h.orchestrator.ensure(&set).await;
    assert_eq!(
        first.fault(),
        Some(Fault::Permission(PermissionFault::Denied))
    );

    let second = h.orchestrator.ensure(&set).await;
    assert_eq!(
        second.fault(),
        Some(Fault::Permission(PermissionFault::PermanentlyDenied))
    );
}

#[tokio::test]
async fn test_events_follow_the_denial_flow() {
    let h = harness();
    let mut events = h.orchestrator.subscribe();
    let set = camera();
    h.prompter.push_deny(&set);

    h.orchestrator.ensure(&set).await;

    let mut received = Vec::new();
    while let Ok(event) = events.try_recv() {
        received.push(event);
    }
    assert!(matches!(received[0], FlowEvent::SessionStarted { .. }));
    assert!(matches!(
        received[1],
        FlowEvent::StageChanged {
            stage: EscalationStage::Rationale,
            ..
        }
    ));
    assert!(matches!(
        received[2],
        FlowEvent::OutcomeDelivered {
            denial_count: 1,
            ..
        }
    ));
}
