//! Recommendation client: sends one prompt and decodes the JSON reply.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{info, warn};

use crate::config::RecommendationConfig;
use crate::error::RecommendationError;
use crate::llm::{CompletionRequest, LlmProvider};

use super::model::{ALERT_ICON, DEFAULT_ICON, DecisionReply};

/// Sends a prompt to the model and decodes the `{decision, reason, icon}` reply.
///
/// Exactly one attempt per call; failures come back as
/// [`RecommendationError`] for the caller to turn into the sentinel record.
pub struct RecommendationClient {
    llm: Arc<dyn LlmProvider>,
    config: RecommendationConfig,
}

impl RecommendationClient {
    pub fn new(llm: Arc<dyn LlmProvider>, config: RecommendationConfig) -> Self {
        Self { llm, config }
    }

    pub async fn recommend(&self, prompt: &str) -> Result<DecisionReply, RecommendationError> {
        let request = CompletionRequest::new(prompt)
            .with_temperature(self.config.temperature)
            .with_max_tokens(self.config.max_tokens);

        let response = self.llm.complete(request).await.map_err(|e| {
            warn!(model = self.llm.model_name(), error = %e, "Recommendation request failed");
            RecommendationError::Api(e)
        })?;

        if response.finish_reason.is_truncated() {
            warn!(
                finish_reason = %response.finish_reason,
                output_tokens = response.output_tokens,
                "Recommendation reply ended early"
            );
        }

        let reply = parse_reply(&response.content)?;
        info!(
            decision = %reply.decision,
            input_tokens = response.input_tokens,
            output_tokens = response.output_tokens,
            "Recommendation received"
        );
        Ok(reply)
    }
}

impl RecommendationError {
    /// The error-shaped record shown in place of a recommendation.
    pub fn fallback_reply(&self) -> DecisionReply {
        match self {
            Self::Api(_) => DecisionReply {
                decision: "Connection Error".to_string(),
                reason: "DeciMate couldn't reach its brain. Check your internet connection and \
                         try again."
                    .to_string(),
                icon: ALERT_ICON.to_string(),
            },
            Self::Parse { .. } => DecisionReply {
                decision: "Error".to_string(),
                reason: "DeciMate got a confusing answer back. Please try again.".to_string(),
                icon: ALERT_ICON.to_string(),
            },
        }
    }
}

/// Shape accepted from the model. `icon` may be absent.
#[derive(Debug, Deserialize)]
struct RawReply {
    decision: String,
    reason: String,
    #[serde(default)]
    icon: Option<String>,
}

/// Remove every markdown code-fence marker and trim.
pub fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "")
        .replace("```JSON", "")
        .replace("```", "")
        .trim()
        .to_string()
}

/// Decode the model's reply text into a [`DecisionReply`].
pub fn parse_reply(text: &str) -> Result<DecisionReply, RecommendationError> {
    let cleaned = strip_code_fences(text);

    let raw: RawReply = match serde_json::from_str(&cleaned) {
        Ok(raw) => raw,
        Err(first_err) => match extract_json_object(&cleaned) {
            Some(inner) if inner.len() != cleaned.len() => serde_json::from_str(inner)
                .map_err(|e| parse_error(e.to_string(), text))?,
            _ => return Err(parse_error(first_err.to_string(), text)),
        },
    };

    let decision = raw.decision.trim().to_string();
    if decision.is_empty() {
        return Err(parse_error("empty \"decision\" field".to_string(), text));
    }

    let icon = raw
        .icon
        .map(|i| i.trim().to_string())
        .filter(|i| !i.is_empty())
        .unwrap_or_else(|| DEFAULT_ICON.to_string());

    Ok(DecisionReply {
        decision,
        reason: raw.reason.trim().to_string(),
        icon,
    })
}

fn parse_error(reason: String, raw: &str) -> RecommendationError {
    warn!(error = %reason, response = raw, "Failed to parse recommendation");
    RecommendationError::Parse {
        reason,
        raw: raw.to_string(),
    }
}

/// Slice from the first `{` to the last `}`, for replies with chatter around the JSON.
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}
