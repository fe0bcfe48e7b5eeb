//! Decision history: newest-first list persisted under `decision_history`.

use std::collections::HashSet;

use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::HistoryLimit;
use crate::preferences::{PreferenceStore, keys};

use super::model::DecisionRecord;

/// Minutes a decision is estimated to save the user.
pub const MINUTES_SAVED_PER_DECISION: usize = 2;

/// Usage numbers derived from the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryStats {
    pub total_decisions: usize,
    pub minutes_saved: usize,
}

/// Entries plus whether they reflect what storage holds.
struct HistoryState {
    entries: Vec<DecisionRecord>,
    /// False after a failed read. Storage is then re-read before any write
    /// so an unread list is never overwritten.
    synced: bool,
}

/// In-memory history mirrored to the key-value store.
///
/// Every mutation writes the whole list back. If that write fails the
/// in-memory list stays ahead of storage until the next successful write.
pub struct HistoryManager {
    prefs: PreferenceStore,
    limit: HistoryLimit,
    state: RwLock<HistoryState>,
}

impl HistoryManager {
    /// Load the persisted history. Missing or corrupt data loads as empty.
    ///
    /// A failed read also loads as empty, but the list is marked unsynced
    /// and storage is read again before the next write.
    pub async fn load(prefs: PreferenceStore, limit: HistoryLimit) -> Self {
        let (mut entries, synced) = match prefs
            .try_get_json::<Vec<DecisionRecord>>(keys::DECISION_HISTORY)
            .await
        {
            Ok(stored) => (stored.unwrap_or_default(), true),
            Err(e) => {
                warn!(error = %e, "Failed to read decision history, will retry before writing");
                (Vec::new(), false)
            }
        };
        entries.truncate(limit.clamp(entries.len()));
        info!(count = entries.len(), synced = synced, "Decision history loaded");
        Self {
            prefs,
            limit,
            state: RwLock::new(HistoryState { entries, synced }),
        }
    }

    /// Merge the stored list under any entries added while unsynced.
    async fn resync(&self, state: &mut HistoryState) {
        match self
            .prefs
            .try_get_json::<Vec<DecisionRecord>>(keys::DECISION_HISTORY)
            .await
        {
            Ok(stored) => {
                let stored = stored.unwrap_or_default();
                info!(stored = stored.len(), pending = state.entries.len(), "Decision history resynced");
                let pending: HashSet<Uuid> = state.entries.iter().map(|r| r.id).collect();
                state
                    .entries
                    .extend(stored.into_iter().filter(|r| !pending.contains(&r.id)));
                state.synced = true;
            }
            Err(e) => warn!(error = %e, "Decision history still unreadable"),
        }
    }

    /// Prepend `record` and persist. Returns whether the write succeeded.
    ///
    /// While storage cannot be read the record is kept in memory only.
    pub async fn append(&self, record: DecisionRecord) -> bool {
        let mut state = self.state.write().await;
        if !state.synced {
            self.resync(&mut state).await;
        }

        state.entries.insert(0, record);
        let keep = self.limit.clamp(state.entries.len());
        state.entries.truncate(keep);

        if !state.synced {
            warn!(
                count = state.entries.len(),
                "Not overwriting unread decision history"
            );
            return false;
        }

        let saved = self
            .prefs
            .set_json(keys::DECISION_HISTORY, &state.entries)
            .await;
        if !saved {
            warn!(
                count = state.entries.len(),
                "History persisted copy is behind the in-memory list"
            );
        }
        saved
    }

    /// Newest-first copy of the history.
    pub async fn list(&self) -> Vec<DecisionRecord> {
        self.state.read().await.entries.clone()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.entries.is_empty()
    }

    /// Entry by position in the newest-first listing.
    pub async fn get(&self, index: usize) -> Option<DecisionRecord> {
        self.state.read().await.entries.get(index).cloned()
    }

    /// Entry by id, for the detail view.
    pub async fn detail(&self, id: Uuid) -> Option<DecisionRecord> {
        self.state
            .read()
            .await
            .entries
            .iter()
            .find(|r| r.id == id)
            .cloned()
    }

    /// Drop every entry, in memory and in storage.
    ///
    /// Callers confirm with the user first.
    pub async fn clear(&self) -> bool {
        let mut state = self.state.write().await;
        state.entries.clear();
        let removed = self.prefs.remove(keys::DECISION_HISTORY).await;
        // Storage now matches the empty list.
        state.synced |= removed;
        if removed {
            info!("Decision history cleared");
        } else {
            warn!("Decision history cleared in memory but not in storage");
        }
        removed
    }

    pub async fn stats(&self) -> HistoryStats {
        let total_decisions = self.len().await;
        HistoryStats {
            total_decisions,
            minutes_saved: total_decisions * MINUTES_SAVED_PER_DECISION,
        }
    }
}
