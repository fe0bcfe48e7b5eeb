//! `PreferenceStore`: typed, failure-tolerant access to the key-value store.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::DatabaseError;
use crate::store::KeyValueStore;

use super::model::{PersonalityMode, Preferences, keys};

/// Wraps a [`KeyValueStore`] with text encoding and defaulting.
///
/// Strings are stored as-is; everything else is JSON-encoded. Backend
/// errors and undecodable values are logged and read back as "absent".
#[derive(Clone)]
pub struct PreferenceStore {
    store: Arc<dyn KeyValueStore>,
}

impl PreferenceStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Raw string value, or `None` when absent or unreadable.
    pub async fn get(&self, key: &str) -> Option<String> {
        match self.store.get(key).await {
            Ok(value) => value,
            Err(e) => {
                warn!(key = key, error = %e, "Failed to read preference");
                None
            }
        }
    }

    /// JSON-decoded value, or `None` when absent, unreadable or malformed.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get(key).await?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key = key, error = %e, "Discarding undecodable preference value");
                None
            }
        }
    }

    /// Like [`get_json`](Self::get_json) but keeps backend failures apart
    /// from "nothing stored". Malformed values still read as `Ok(None)`.
    pub async fn try_get_json<T: DeserializeOwned>(
        &self,
        key: &str,
    ) -> Result<Option<T>, DatabaseError> {
        let Some(raw) = self.store.get(key).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!(key = key, error = %e, "Discarding undecodable preference value");
                Ok(None)
            }
        }
    }

    /// Store a plain string. Returns whether the write succeeded.
    pub async fn set(&self, key: &str, value: &str) -> bool {
        match self.store.set(key, value).await {
            Ok(()) => {
                debug!(key = key, "Preference saved");
                true
            }
            Err(e) => {
                warn!(key = key, error = %e, "Failed to save preference");
                false
            }
        }
    }

    /// Store a JSON-encoded value. Returns whether the write succeeded.
    pub async fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
        match serde_json::to_string(value) {
            Ok(encoded) => self.set(key, &encoded).await,
            Err(e) => {
                warn!(key = key, error = %e, "Failed to encode preference");
                false
            }
        }
    }

    /// Delete a key. Returns whether the backend accepted the delete.
    pub async fn remove(&self, key: &str) -> bool {
        match self.store.remove(key).await {
            Ok(_) => true,
            Err(e) => {
                warn!(key = key, error = %e, "Failed to remove preference");
                false
            }
        }
    }

    // ── Typed accessors ─────────────────────────────────────────────

    pub async fn personality(&self) -> PersonalityMode {
        match self.get(keys::PERSONALITY).await {
            Some(raw) => raw.parse::<PersonalityMode>().unwrap_or_else(|e| {
                warn!(value = %raw, error = %e, "Unknown personality mode, using default");
                PersonalityMode::default()
            }),
            None => PersonalityMode::default(),
        }
    }

    pub async fn set_personality(&self, mode: PersonalityMode) -> bool {
        self.set(keys::PERSONALITY, mode.as_str()).await
    }

    pub async fn custom_instructions(&self) -> String {
        self.get(keys::CUSTOM_INSTRUCTIONS).await.unwrap_or_default()
    }

    pub async fn set_custom_instructions(&self, text: &str) -> bool {
        self.set(keys::CUSTOM_INSTRUCTIONS, text).await
    }

    pub async fn notifications_enabled(&self) -> bool {
        self.get_json(keys::NOTIFICATIONS).await.unwrap_or(true)
    }

    pub async fn set_notifications_enabled(&self, enabled: bool) -> bool {
        self.set_json(keys::NOTIFICATIONS, &enabled).await
    }

    pub async fn save_history_enabled(&self) -> bool {
        self.get_json(keys::SAVE_HISTORY).await.unwrap_or(true)
    }

    pub async fn set_save_history_enabled(&self, enabled: bool) -> bool {
        self.set_json(keys::SAVE_HISTORY, &enabled).await
    }

    pub async fn nickname(&self) -> Option<String> {
        self.get(keys::NICKNAME)
            .await
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
    }

    /// Record the nickname on first run. An existing nickname is kept.
    ///
    /// Returns `true` if the nickname was written.
    pub async fn set_nickname_once(&self, nickname: &str) -> bool {
        let nickname = nickname.trim();
        if nickname.is_empty() || self.nickname().await.is_some() {
            return false;
        }
        self.set(keys::NICKNAME, nickname).await
    }

    /// Read every preference at once.
    pub async fn snapshot(&self) -> Preferences {
        Preferences {
            personality_mode: self.personality().await,
            custom_instructions: self.custom_instructions().await,
            notifications_enabled: self.notifications_enabled().await,
            save_history_enabled: self.save_history_enabled().await,
            nickname: self.nickname().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::store::LibSqlBackend;

    /// Backend whose every call fails, as when device storage is unavailable.
    struct UnavailableStore;

    #[async_trait]
    impl KeyValueStore for UnavailableStore {
        async fn get(&self, _key: &str) -> Result<Option<String>, DatabaseError> {
            Err(DatabaseError::Pool("storage unavailable".into()))
        }
        async fn set(&self, _key: &str, _value: &str) -> Result<(), DatabaseError> {
            Err(DatabaseError::Pool("storage unavailable".into()))
        }
        async fn remove(&self, _key: &str) -> Result<bool, DatabaseError> {
            Err(DatabaseError::Pool("storage unavailable".into()))
        }
    }

    async fn test_prefs() -> (PreferenceStore, Arc<LibSqlBackend>) {
        let backend = Arc::new(LibSqlBackend::new_memory().await.unwrap());
        (PreferenceStore::new(backend.clone()), backend)
    }

    #[tokio::test]
    async fn unwritten_keys_read_as_defaults() {
        let (prefs, _) = test_prefs().await;
        assert_eq!(prefs.snapshot().await, Preferences::default());
    }

    #[tokio::test]
    async fn typed_roundtrip_uses_mobile_encoding() {
        let (prefs, backend) = test_prefs().await;

        assert!(prefs.set_personality(PersonalityMode::Zen).await);
        assert!(prefs.set_notifications_enabled(false).await);
        assert!(prefs.set_custom_instructions("I hate running").await);

        // Strings pass through, booleans are JSON
        assert_eq!(
            backend.get(keys::PERSONALITY).await.unwrap().as_deref(),
            Some("Zen")
        );
        assert_eq!(
            backend.get(keys::NOTIFICATIONS).await.unwrap().as_deref(),
            Some("false")
        );

        let snapshot = prefs.snapshot().await;
        assert_eq!(snapshot.personality_mode, PersonalityMode::Zen);
        assert!(!snapshot.notifications_enabled);
        assert!(snapshot.save_history_enabled);
        assert_eq!(snapshot.custom_instructions, "I hate running");
    }

    #[tokio::test]
    async fn undecodable_values_fall_back_to_defaults() {
        let (prefs, backend) = test_prefs().await;
        backend.set(keys::PERSONALITY, "Chaotic").await.unwrap();
        backend.set(keys::SAVE_HISTORY, "not-json").await.unwrap();

        assert_eq!(prefs.personality().await, PersonalityMode::Balanced);
        assert!(prefs.save_history_enabled().await);
    }

    #[tokio::test]
    async fn nickname_is_set_only_once() {
        let (prefs, _) = test_prefs().await;
        assert!(prefs.nickname().await.is_none());
        assert!(!prefs.set_nickname_once("   ").await);

        assert!(prefs.set_nickname_once("Sam").await);
        assert!(!prefs.set_nickname_once("Alex").await);
        assert_eq!(prefs.nickname().await.as_deref(), Some("Sam"));
    }

    #[tokio::test]
    async fn unavailable_storage_is_never_fatal() {
        let prefs = PreferenceStore::new(Arc::new(UnavailableStore));

        assert_eq!(prefs.snapshot().await, Preferences::default());
        assert!(!prefs.set_personality(PersonalityMode::Strict).await);
        assert!(!prefs.remove(keys::DECISION_HISTORY).await);
        assert!(prefs.get_json::<Vec<String>>(keys::DECISION_HISTORY).await.is_none());
        assert!(prefs.try_get_json::<Vec<String>>(keys::DECISION_HISTORY).await.is_err());
    }

    #[tokio::test]
    async fn try_get_json_separates_absent_from_malformed() {
        let (prefs, backend) = test_prefs().await;
        assert!(prefs.try_get_json::<bool>(keys::NOTIFICATIONS).await.unwrap().is_none());

        backend.set(keys::NOTIFICATIONS, "maybe").await.unwrap();
        assert!(prefs.try_get_json::<bool>(keys::NOTIFICATIONS).await.unwrap().is_none());

        backend.set(keys::NOTIFICATIONS, "false").await.unwrap();
        assert_eq!(prefs.try_get_json::<bool>(keys::NOTIFICATIONS).await.unwrap(), Some(false));
    }
}
