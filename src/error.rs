//! Error types for DeciMate.

use std::time::Duration;

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Key-value store errors.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Migration failed: {0}")]
    Migration(String),
}

/// LLM provider errors.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Provider {provider} rate limited, retry after {retry_after:?}")]
    RateLimited {
        provider: String,
        retry_after: Option<Duration>,
    },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("Authentication failed for provider {provider}")]
    AuthFailed { provider: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure of a single recommendation call.
///
/// Both variants are expected outcomes: the caller shows the sentinel
/// record from [`RecommendationError::fallback_reply`] and returns to idle.
#[derive(Debug, thiserror::Error)]
pub enum RecommendationError {
    #[error("Recommendation request failed: {0}")]
    Api(#[from] LlmError),

    #[error("Could not parse recommendation: {reason}")]
    Parse { reason: String, raw: String },
}

/// Errors raised before a recommendation request is sent.
#[derive(Debug, thiserror::Error)]
pub enum DecisionError {
    #[error("Input required: select at least one activity or upload a file")]
    InputRequired,
}
