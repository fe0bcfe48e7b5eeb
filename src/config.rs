//! Configuration types.

use std::path::PathBuf;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Default Gemini model.
pub const DEFAULT_MODEL: &str = "gemini-2.5-pro";

/// Default Gemini REST endpoint.
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Default on-disk location of the preference/history database.
pub const DEFAULT_DB_PATH: &str = "./data/decimate.db";

/// How many decision records the history keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryLimit {
    /// Keep every record.
    #[default]
    Unbounded,
    /// Keep only the `n` most recent records.
    Capped(usize),
}

impl HistoryLimit {
    /// Parse `unbounded` or a positive integer.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let raw = raw.trim();
        if raw.is_empty() || raw.eq_ignore_ascii_case("unbounded") {
            return Ok(Self::Unbounded);
        }
        match raw.parse::<usize>() {
            Ok(0) | Err(_) => Err(ConfigError::InvalidValue {
                key: "DECIMATE_HISTORY_LIMIT".to_string(),
                message: format!("expected 'unbounded' or a positive integer, got '{raw}'"),
            }),
            Ok(n) => Ok(Self::Capped(n)),
        }
    }

    /// Truncate `len` to the limit.
    pub fn clamp(&self, len: usize) -> usize {
        match self {
            Self::Unbounded => len,
            Self::Capped(n) => len.min(*n),
        }
    }
}

/// Sampling settings for recommendation requests.
#[derive(Debug, Clone)]
pub struct RecommendationConfig {
    /// LLM temperature.
    pub temperature: f32,
    /// Max tokens for the LLM response.
    pub max_tokens: u32,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 1024,
        }
    }
}

/// Application configuration, read from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_key: SecretString,
    pub model: String,
    pub api_base: String,
    pub db_path: PathBuf,
    pub history_limit: HistoryLimit,
    pub recommendation: RecommendationConfig,
}

impl AppConfig {
    /// Build the configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|k| !k.trim().is_empty());
        let api_key = non_empty("GEMINI_API_KEY")
            .or_else(|| non_empty("EXPO_PUBLIC_GEMINI_API_KEY"))
            .ok_or_else(|| ConfigError::MissingEnvVar("GEMINI_API_KEY".to_string()))?;

        let model = lookup("DECIMATE_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let api_base = lookup("DECIMATE_API_BASE")
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
            .trim_end_matches('/')
            .to_string();
        let db_path = lookup("DECIMATE_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH));

        let history_limit = match lookup("DECIMATE_HISTORY_LIMIT") {
            Some(raw) => HistoryLimit::parse(&raw)?,
            None => HistoryLimit::default(),
        };

        let mut recommendation = RecommendationConfig::default();
        if let Some(raw) = lookup("DECIMATE_TEMPERATURE") {
            recommendation.temperature =
                raw.trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue {
                        key: "DECIMATE_TEMPERATURE".to_string(),
                        message: format!("expected a number, got '{raw}'"),
                    })?;
        }
        if let Some(raw) = lookup("DECIMATE_MAX_TOKENS") {
            recommendation.max_tokens =
                raw.trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue {
                        key: "DECIMATE_MAX_TOKENS".to_string(),
                        message: format!("expected a positive integer, got '{raw}'"),
                    })?;
        }

        Ok(Self {
            api_key: SecretString::from(api_key),
            model,
            api_base,
            db_path,
            history_limit,
            recommendation,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_key_is_set() {
        let config = AppConfig::from_lookup(lookup(&[("GEMINI_API_KEY", "abc")])).unwrap();
        assert_eq!(config.api_key.expose_secret(), "abc");
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.db_path, PathBuf::from(DEFAULT_DB_PATH));
        assert_eq!(config.history_limit, HistoryLimit::Unbounded);
        assert_eq!(config.recommendation.max_tokens, 1024);
    }

    #[test]
    fn missing_key_is_an_error() {
        let err = AppConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(_)));
    }

    #[test]
    fn legacy_key_name_is_accepted() {
        let config =
            AppConfig::from_lookup(lookup(&[("EXPO_PUBLIC_GEMINI_API_KEY", "legacy")])).unwrap();
        assert_eq!(config.api_key.expose_secret(), "legacy");
    }

    #[test]
    fn blank_primary_key_falls_back_to_legacy_name() {
        let config = AppConfig::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "  "),
            ("EXPO_PUBLIC_GEMINI_API_KEY", "legacy"),
        ]))
        .unwrap();
        assert_eq!(config.api_key.expose_secret(), "legacy");

        let err = AppConfig::from_lookup(lookup(&[("GEMINI_API_KEY", "")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(_)));
    }

    #[test]
    fn history_limit_parsing() {
        assert_eq!(HistoryLimit::parse("3").unwrap(), HistoryLimit::Capped(3));
        assert_eq!(
            HistoryLimit::parse("Unbounded").unwrap(),
            HistoryLimit::Unbounded
        );
        assert!(HistoryLimit::parse("0").is_err());
        assert!(HistoryLimit::parse("lots").is_err());
        assert_eq!(HistoryLimit::Capped(3).clamp(10), 3);
        assert_eq!(HistoryLimit::Unbounded.clamp(10), 10);
    }

    #[test]
    fn invalid_temperature_is_rejected() {
        let err = AppConfig::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "abc"),
            ("DECIMATE_TEMPERATURE", "warm"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn api_base_trailing_slash_is_trimmed() {
        let config = AppConfig::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "abc"),
            ("DECIMATE_API_BASE", "http://localhost:9000/"),
        ]))
        .unwrap();
        assert_eq!(config.api_base, "http://localhost:9000");
    }
}
