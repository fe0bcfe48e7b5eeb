//! Integration tests for the full recommendation cycle.
//!
//! Each test wires the real preference store, prompt builder, client and
//! history over an in-memory libSQL database, with a stub LLM in place of
//! Gemini.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use decimate::config::{HistoryLimit, RecommendationConfig};
use decimate::decision::{
    CycleOutcome, CycleState, DecisionMode, DecisionService, HistoryManager,
    RecommendationClient, RequestContext, Role, TimeBucket,
};
use decimate::error::{DecisionError, LlmError};
use decimate::llm::{CompletionRequest, CompletionResponse, FinishReason, LlmProvider};
use decimate::preferences::{PersonalityMode, PreferenceStore, keys};
use decimate::store::{KeyValueStore, LibSqlBackend};

/// Stub LLM that records every prompt and replies with fixed text.
struct StubLlm {
    reply: Result<String, String>,
    prompts: Mutex<Vec<String>>,
}

impl StubLlm {
    fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(text.to_string()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn failing(reason: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(reason.to_string()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmProvider for StubLlm {
    fn model_name(&self) -> &str {
        "stub"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.prompts.lock().unwrap().push(request.prompt);

        match &self.reply {
            Ok(content) => Ok(CompletionResponse {
                content: content.clone(),
                input_tokens: 10,
                output_tokens: 5,
                finish_reason: FinishReason::Stop,
            }),
            Err(reason) => Err(LlmError::RequestFailed {
                provider: "stub".to_string(),
                reason: reason.clone(),
            }),
        }
    }
}

struct Harness {
    backend: Arc<LibSqlBackend>,
    prefs: PreferenceStore,
    service: DecisionService,
}

async fn harness(llm: Arc<StubLlm>) -> Harness {
    let backend = Arc::new(LibSqlBackend::new_memory().await.unwrap());
    let prefs = PreferenceStore::new(backend.clone());
    let history = Arc::new(HistoryManager::load(prefs.clone(), HistoryLimit::Unbounded).await);
    let client = RecommendationClient::new(llm, RecommendationConfig::default());
    let service = DecisionService::new(prefs.clone(), client, history);
    Harness {
        backend,
        prefs,
        service,
    }
}

fn gym_and_sleep_evening() -> RequestContext {
    RequestContext::new(Role::Student, TimeBucket::Evening)
        .with_activity("Gym")
        .with_activity("Sleep")
}

#[tokio::test]
async fn zen_evening_decision_is_recorded() {
    let llm = StubLlm::replying(
        r#"{"decision":"Sleep","reason":"Rest restores you.","icon":"moon-outline"}"#,
    );
    let h = harness(llm.clone()).await;
    h.prefs.set_personality(PersonalityMode::Zen).await;

    let outcome = h.service.run(&gym_and_sleep_evening()).await.unwrap();

    let prompts = llm.prompts();
    assert_eq!(prompts.len(), 1);
    let prompt = &prompts[0];
    assert!(prompt.contains("Zen"));
    assert!(prompt.contains("Evening"));
    assert!(prompt.contains("Gym"));
    assert!(prompt.contains("Sleep"));

    match outcome {
        CycleOutcome::Decided { record, saved } => {
            assert!(saved);
            assert_eq!(record.decision, "Sleep");
            assert_eq!(record.icon, "moon-outline");
            assert!(!record.is_timetable);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }

    let history = h.service.history().list().await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].decision, "Sleep");
    assert!(!history[0].is_timetable);

    // Persisted copy matches
    let stored = h.backend.get(keys::DECISION_HISTORY).await.unwrap().unwrap();
    assert!(stored.contains("\"isTimetable\":false"));
    assert!(stored.contains("\"decision\":\"Sleep\""));
}

#[tokio::test]
async fn malformed_reply_yields_sentinel_and_keeps_history() {
    let llm = StubLlm::replying("I think you should go to sleep.");
    let h = harness(llm).await;

    let outcome = h.service.run(&gym_and_sleep_evening()).await.unwrap();
    match outcome {
        CycleOutcome::Failed { fallback, .. } => {
            assert_eq!(fallback.decision, "Error");
            assert_eq!(fallback.icon, "alert-circle-outline");
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert!(h.service.history().is_empty().await);
    assert_eq!(h.service.state().await, CycleState::Idle);
}

#[tokio::test]
async fn network_error_yields_connection_error() {
    let h = harness(StubLlm::failing("connection reset")).await;

    let outcome = h.service.run(&gym_and_sleep_evening()).await.unwrap();
    match outcome {
        CycleOutcome::Failed { fallback, error } => {
            assert_eq!(fallback.decision, "Connection Error");
            assert!(error.contains("connection reset"));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert!(h.service.history().is_empty().await);
    assert!(!h.service.is_busy().await);
}

#[tokio::test]
async fn empty_selection_sends_nothing() {
    let llm = StubLlm::replying("{}");
    let h = harness(llm.clone()).await;

    let empty = RequestContext::new(Role::Professional, TimeBucket::Morning);
    let err = h.service.run(&empty).await.unwrap_err();
    assert!(matches!(err, DecisionError::InputRequired));
    assert!(llm.prompts().is_empty());
}

#[tokio::test]
async fn repeated_decisions_list_newest_first() {
    let llm = StubLlm::replying(r#"{"decision":"Gym","reason":"Move.","icon":"barbell"}"#);
    let h = harness(llm).await;

    let mut ids = Vec::new();
    for _ in 0..3 {
        match h.service.run(&gym_and_sleep_evening()).await.unwrap() {
            CycleOutcome::Decided { record, .. } => ids.push(record.id),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
    ids.reverse();

    let listed: Vec<_> = h
        .service
        .history()
        .list()
        .await
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(listed, ids);

    assert!(h.service.history().clear().await);
    assert!(h.service.history().is_empty().await);
    assert!(h.backend.get(keys::DECISION_HISTORY).await.unwrap().is_none());
}

#[tokio::test]
async fn timetable_run_is_saved_as_timetable() {
    let llm = StubLlm::replying(
        r#"{"decision":"Evening Plan","reason":"18:00-19:00 Gym\n19:00-19:15 Break\n19:15-22:00 Sleep prep","icon":"calendar-outline"}"#,
    );
    let h = harness(llm.clone()).await;

    let ctx = gym_and_sleep_evening().with_mode(DecisionMode::Timetable);
    let outcome = h.service.run(&ctx).await.unwrap();

    assert!(llm.prompts()[0].contains("timetable"));
    match outcome {
        CycleOutcome::Decided { record, saved } => {
            assert!(saved);
            assert!(record.is_timetable);
            assert_eq!(record.reason.lines().count(), 3);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }

    let history = h.service.history().list().await;
    assert_eq!(history.len(), 1);
    assert!(history[0].is_timetable);

    let stored = h.backend.get(keys::DECISION_HISTORY).await.unwrap().unwrap();
    assert!(stored.contains("\"isTimetable\":true"));
}
