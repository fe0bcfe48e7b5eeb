//! DecisionService: runs one recommendation cycle end to end.

use std::sync::Arc;

use chrono::Local;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::DecisionError;
use crate::preferences::PreferenceStore;

use super::client::RecommendationClient;
use super::history::HistoryManager;
use super::model::{DecisionRecord, DecisionReply, RequestContext};
use super::prompts::DecisionRequestBuilder;

/// Phases of a recommendation cycle.
///
/// `Idle → Requesting → Succeeded → Appended → Idle`, or
/// `Requesting → Failed → Idle`. `Succeeded → Idle` is taken when history
/// saving is switched off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CycleState {
    #[default]
    Idle,
    Requesting,
    Succeeded,
    Appended,
    Failed,
}

impl CycleState {
    pub fn can_transition_to(&self, target: CycleState) -> bool {
        use CycleState::*;
        matches!(
            (self, target),
            (Idle, Requesting)
                | (Requesting, Succeeded)
                | (Requesting, Failed)
                | (Succeeded, Appended)
                | (Succeeded, Idle)
                | (Appended, Idle)
                | (Failed, Idle)
        )
    }

    /// Whether a request is in flight (drives the loading indicator).
    pub fn is_busy(&self) -> bool {
        !matches!(self, Self::Idle)
    }
}

impl std::fmt::Display for CycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Requesting => "requesting",
            Self::Succeeded => "succeeded",
            Self::Appended => "appended",
            Self::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

/// Result of a cycle that got past input validation.
#[derive(Debug, Clone)]
pub enum CycleOutcome {
    /// The model answered. `saved` is false when history saving is off
    /// or the write failed.
    Decided { record: DecisionRecord, saved: bool },
    /// The call or the parse failed; `fallback` is the record to display.
    Failed {
        fallback: DecisionReply,
        error: String,
    },
}

/// Wires the prompt builder, the recommendation client and the history.
pub struct DecisionService {
    prefs: PreferenceStore,
    builder: DecisionRequestBuilder,
    client: RecommendationClient,
    history: Arc<HistoryManager>,
    state: RwLock<CycleState>,
}

impl DecisionService {
    pub fn new(
        prefs: PreferenceStore,
        client: RecommendationClient,
        history: Arc<HistoryManager>,
    ) -> Self {
        Self {
            builder: DecisionRequestBuilder::new(prefs.clone()),
            prefs,
            client,
            history,
            state: RwLock::new(CycleState::Idle),
        }
    }

    pub fn history(&self) -> &Arc<HistoryManager> {
        &self.history
    }

    pub async fn state(&self) -> CycleState {
        *self.state.read().await
    }

    /// Advisory loading flag. Concurrent runs are not rejected.
    pub async fn is_busy(&self) -> bool {
        self.state().await.is_busy()
    }

    async fn transition(&self, target: CycleState) {
        let mut state = self.state.write().await;
        let from = *state;
        if !from.can_transition_to(target) {
            // Overlapping cycles share one flag; last write wins.
            debug!(from = %from, to = %target, "Out-of-order cycle transition");
        }
        *state = target;
    }

    /// Run one cycle. `InputRequired` is returned before anything is sent.
    pub async fn run(&self, ctx: &RequestContext) -> Result<CycleOutcome, DecisionError> {
        let prompt = self.builder.build(ctx).await?;

        self.transition(CycleState::Requesting).await;
        info!(mode = ?ctx.mode, bucket = %ctx.time_bucket, "Requesting recommendation");

        let reply = match self.client.recommend(&prompt).await {
            Ok(reply) => reply,
            Err(e) => {
                self.transition(CycleState::Failed).await;
                warn!(error = %e, "Recommendation cycle failed");
                let outcome = CycleOutcome::Failed {
                    fallback: e.fallback_reply(),
                    error: e.to_string(),
                };
                self.transition(CycleState::Idle).await;
                return Ok(outcome);
            }
        };

        self.transition(CycleState::Succeeded).await;
        let record = DecisionRecord::from_reply(reply, ctx.mode, &Local::now());

        let saved = if self.prefs.save_history_enabled().await {
            let saved = self.history.append(record.clone()).await;
            self.transition(CycleState::Appended).await;
            saved
        } else {
            debug!("History saving disabled, not appending");
            false
        };

        self.transition(CycleState::Idle).await;
        info!(decision = %record.decision, saved = saved, "Recommendation cycle complete");
        Ok(CycleOutcome::Decided { record, saved })
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::config::{HistoryLimit, RecommendationConfig};
    use crate::decision::model::{Role, TimeBucket};
    use crate::error::LlmError;
    use crate::llm::{CompletionRequest, CompletionResponse, FinishReason, LlmProvider};
    use crate::store::LibSqlBackend;

    struct FixedLlm(&'static str);

    #[async_trait]
    impl LlmProvider for FixedLlm {
        fn model_name(&self) -> &str {
            "fixed"
        }
        async fn complete(
            &self,
            _request: CompletionRequest,
        ) -> Result<CompletionResponse, LlmError> {
            Ok(CompletionResponse {
                content: self.0.to_string(),
                input_tokens: 0,
                output_tokens: 0,
                finish_reason: FinishReason::Stop,
            })
        }
    }

    async fn service(reply: &'static str) -> DecisionService {
        let backend = Arc::new(LibSqlBackend::new_memory().await.unwrap());
        let prefs = PreferenceStore::new(backend);
        let history = Arc::new(HistoryManager::load(prefs.clone(), HistoryLimit::Unbounded).await);
        let client =
            RecommendationClient::new(Arc::new(FixedLlm(reply)), RecommendationConfig::default());
        DecisionService::new(prefs, client, history)
    }

    fn ctx() -> RequestContext {
        RequestContext::new(Role::Student, TimeBucket::Afternoon).with_activity("Study")
    }

    #[test]
    fn transitions_follow_the_cycle() {
        use CycleState::*;
        assert!(Idle.can_transition_to(Requesting));
        assert!(Requesting.can_transition_to(Failed));
        assert!(Appended.can_transition_to(Idle));
        assert!(!Idle.can_transition_to(Appended));
        assert!(!Failed.can_transition_to(Appended));
        assert!(!Idle.is_busy());
        assert!(Requesting.is_busy());
    }

    #[tokio::test]
    async fn success_appends_and_returns_to_idle() {
        let svc = service(r#"{"decision":"Study","reason":"Focus peak.","icon":"book-outline"}"#).await;
        let outcome = svc.run(&ctx()).await.unwrap();
        match outcome {
            CycleOutcome::Decided { record, saved } => {
                assert!(saved);
                assert_eq!(record.decision, "Study");
                assert!(!record.is_timetable);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(svc.history().len().await, 1);
        assert_eq!(svc.state().await, CycleState::Idle);
    }

    #[tokio::test]
    async fn disabled_history_is_not_appended() {
        let svc = service(r#"{"decision":"Study","reason":"r","icon":"i"}"#).await;
        svc.prefs.set_save_history_enabled(false).await;

        let outcome = svc.run(&ctx()).await.unwrap();
        assert!(matches!(outcome, CycleOutcome::Decided { saved: false, .. }));
        assert!(svc.history().is_empty().await);
        assert!(!svc.is_busy().await);
    }

    #[tokio::test]
    async fn failure_leaves_history_untouched() {
        let svc = service("no idea, sorry").await;
        let outcome = svc.run(&ctx()).await.unwrap();
        match outcome {
            CycleOutcome::Failed { fallback, .. } => assert_eq!(fallback.decision, "Error"),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(svc.history().is_empty().await);
        assert_eq!(svc.state().await, CycleState::Idle);
    }

    #[tokio::test]
    async fn empty_input_never_leaves_idle() {
        let svc = service("{}").await;
        let empty = RequestContext::new(Role::Student, TimeBucket::Morning);
        let err = svc.run(&empty).await.unwrap_err();
        assert!(matches!(err, DecisionError::InputRequired));
        assert_eq!(svc.state().await, CycleState::Idle);
    }
}
