//! LLM integration for DeciMate.
//!
//! Supports Google Gemini via its `generateContent` REST endpoint, called
//! directly with reqwest.

pub mod gemini;
pub mod provider;

pub use gemini::GeminiProvider;
pub use provider::*;

use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::LlmError;

/// Configuration for creating an LLM provider.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: secrecy::SecretString,
    pub model: String,
    pub api_base: String,
}

impl LlmConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            api_base: config.api_base.clone(),
        }
    }
}

/// Create an LLM provider from configuration.
pub fn create_provider(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>, LlmError> {
    let provider = GeminiProvider::new(config.api_key.clone(), &config.model, &config.api_base)?;
    tracing::info!("Using Gemini (model: {})", config.model);
    Ok(Arc::new(provider))
}
