//! Session cache store.
//!
//! Persists one [`SessionSnapshot`] per subject in a [`StorageMedium`] and
//! tracks the global last-active subject pointer. Every operation is
//! synchronous and never returns an error: failures are logged and reported
//! as `false` / `None` so the caller can continue with in-memory state.

use crate::config::CacheConfig;
use retouch_core::snapshot::{SessionSnapshot, SnapshotPatch};
use retouch_core::state::ActivePointer;
use retouch_core::storage::StorageMedium;
use retouch_core::subject::SubjectId;
use std::sync::Arc;

/// Key-value persistence of per-subject session snapshots.
///
/// # Example
///
/// ```ignore
/// use retouch_infrastructure::{MemoryStorage, SessionCacheStore};
///
/// let store = SessionCacheStore::with_defaults(Arc::new(MemoryStorage::new()));
/// store.save(SubjectId::new(42), SnapshotPatch::new().with_draft_prompt("sepia"));
/// let snapshot = store.load(SubjectId::new(42));
/// ```
#[derive(Clone)]
pub struct SessionCacheStore {
    medium: Arc<dyn StorageMedium>,
    key_prefix: String,
    last_active_key: String,
}

impl SessionCacheStore {
    pub fn new(medium: Arc<dyn StorageMedium>, config: &CacheConfig) -> Self {
        Self {
            medium,
            key_prefix: config.key_prefix.clone(),
            last_active_key: config.last_active_key.clone(),
        }
    }

    pub fn with_defaults(medium: Arc<dyn StorageMedium>) -> Self {
        Self::new(medium, &CacheConfig::default())
    }

    /// Storage key for a subject's snapshot.
    pub fn key_for(&self, subject_id: SubjectId) -> String {
        format!("{}{}", self.key_prefix, subject_id)
    }

    /// Lays `patch` over a default snapshot, stamps the current time, and writes it.
    ///
    /// Returns `false` if serialization or the write fails.
    pub fn save(&self, subject_id: SubjectId, patch: SnapshotPatch) -> bool {
        let now_ms = chrono::Utc::now().timestamp_millis();
        let snapshot = SessionSnapshot::from_patch(subject_id, patch, now_ms);
        let key = self.key_for(subject_id);

        let json = match serde_json::to_string(&snapshot) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!("[SessionCacheStore] Failed to serialize {}: {}", key, e);
                return false;
            }
        };

        match self.medium.set(&key, &json) {
            Ok(()) => {
                tracing::debug!(
                    "[SessionCacheStore] State saved: {} (edits={})",
                    key,
                    snapshot.edits.len()
                );
                true
            }
            Err(e) => {
                tracing::warn!("[SessionCacheStore] Failed to save {}: {}", key, e);
                false
            }
        }
    }

    /// Reads the snapshot for `subject_id`.
    ///
    /// Absent, unreadable, and corrupt entries all yield `None`.
    pub fn load(&self, subject_id: SubjectId) -> Option<SessionSnapshot> {
        let key = self.key_for(subject_id);

        let raw = match self.medium.get(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::debug!("[SessionCacheStore] No cached state found for: {}", subject_id);
                return None;
            }
            Err(e) => {
                tracing::warn!("[SessionCacheStore] Failed to read {}: {}", key, e);
                return None;
            }
        };

        let snapshot: SessionSnapshot = match serde_json::from_str(&raw) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!("[SessionCacheStore] Ignoring corrupt entry {}: {}", key, e);
                return None;
            }
        };

        if snapshot.subject_id != subject_id {
            tracing::warn!(
                "[SessionCacheStore] Ignoring entry {} recorded for subject {}",
                key,
                snapshot.subject_id
            );
            return None;
        }

        tracing::debug!("[SessionCacheStore] State loaded: {}", key);
        Some(snapshot)
    }

    /// Deletes the snapshot for `subject_id`. Deleting an absent entry succeeds.
    pub fn clear(&self, subject_id: SubjectId) -> bool {
        let key = self.key_for(subject_id);
        match self.medium.remove(&key) {
            Ok(()) => {
                tracing::debug!("[SessionCacheStore] State cleared: {}", key);
                true
            }
            Err(e) => {
                tracing::warn!("[SessionCacheStore] Failed to clear {}: {}", key, e);
                false
            }
        }
    }

    /// Deletes every snapshot under the key prefix. Other keys, including the
    /// last-active pointer, are left alone.
    pub fn clear_all(&self) -> bool {
        let keys = match self.medium.keys() {
            Ok(keys) => keys,
            Err(e) => {
                tracing::warn!("[SessionCacheStore] Failed to list keys: {}", e);
                return false;
            }
        };

        let mut cleared = 0usize;
        let mut ok = true;
        for key in keys.iter().filter(|key| key.starts_with(&self.key_prefix)) {
            match self.medium.remove(key) {
                Ok(()) => cleared += 1,
                Err(e) => {
                    tracing::warn!("[SessionCacheStore] Failed to clear {}: {}", key, e);
                    ok = false;
                }
            }
        }

        tracing::debug!("[SessionCacheStore] All caches cleared: {}", cleared);
        ok
    }

    /// Reads the last-active pointer, distinguishing "never set" from "cleared".
    pub fn last_active_pointer(&self) -> ActivePointer {
        match self.medium.get(&self.last_active_key) {
            Ok(raw) => ActivePointer::parse(raw.as_deref()),
            Err(e) => {
                tracing::warn!("[SessionCacheStore] Failed to read last active pointer: {}", e);
                ActivePointer::Unset
            }
        }
    }

    /// The subject to auto-restore, if any.
    pub fn last_active_subject_id(&self) -> Option<SubjectId> {
        self.last_active_pointer().subject_id()
    }

    /// Records `subject_id` as the session to restore on next load.
    ///
    /// Passing [`SubjectId::NONE`] is equivalent to [`Self::clear_last_active_subject_id`].
    pub fn set_last_active_subject_id(&self, subject_id: SubjectId) -> bool {
        match self
            .medium
            .set(&self.last_active_key, &subject_id.get().to_string())
        {
            Ok(()) => {
                tracing::debug!("[SessionCacheStore] Last active subject: {}", subject_id);
                true
            }
            Err(e) => {
                tracing::warn!("[SessionCacheStore] Failed to set last active pointer: {}", e);
                false
            }
        }
    }

    /// Writes the "no active subject" sentinel.
    pub fn clear_last_active_subject_id(&self) -> bool {
        self.set_last_active_subject_id(SubjectId::NONE)
    }
}
