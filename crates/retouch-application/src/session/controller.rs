use retouch_core::edit::{CachedEditRecord, EditId};
use retouch_core::error::{Result, RetouchError};
use retouch_core::notification::{Notification, Notifier};
use retouch_core::storage::StorageMedium;
use retouch_core::subject::{SubjectId, SubjectSource};
use retouch_infrastructure::{CacheConfig, SessionCacheStore};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use super::model::EditSession;
use super::restore::{RestoreOutcome, RestorePhase, RestoreToken};
use crate::debounce::Debouncer;

/// Owns the in-memory edit session and decides when it reaches the cache.
///
/// `SessionController` is responsible for:
/// - Activating a freshly uploaded subject
/// - Restoring the last active session after a reload
/// - Persisting structural changes immediately and draft text debounced
/// - Discarding the session on reset
///
/// Concurrency safety rests on a generation counter alone: activation and
/// reset bump it, and an in-flight restore re-checks its captured token
/// before every mutation, dropping its results on mismatch.
///
/// Cloning is cheap; clones share the same session.
#[derive(Clone)]
pub struct SessionController {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    store: SessionCacheStore,
    source: Arc<dyn SubjectSource>,
    notifier: Arc<dyn Notifier>,
    state: Mutex<ControllerState>,
    generation: AtomicU64,
    restore_attempted: AtomicBool,
    draft_writer: Debouncer,
}

#[derive(Default)]
struct ControllerState {
    session: Option<EditSession>,
    restore_phase: RestorePhase,
    /// Subject of the restore currently in flight.
    restoring: Option<SubjectId>,
}

impl SessionController {
    /// Creates a controller over `store`, debouncing draft writes by `debounce_delay`.
    pub fn new(
        store: SessionCacheStore,
        source: Arc<dyn SubjectSource>,
        notifier: Arc<dyn Notifier>,
        debounce_delay: Duration,
    ) -> Self {
        let inner = Arc::new_cyclic(|weak: &Weak<ControllerInner>| {
            let weak = weak.clone();
            let draft_writer = Debouncer::new(debounce_delay, move || {
                if let Some(inner) = weak.upgrade() {
                    let state = inner.lock_state();
                    inner.persist(&state, "debounced");
                }
            });

            ControllerInner {
                store,
                source,
                notifier,
                state: Mutex::new(ControllerState::default()),
                generation: AtomicU64::new(0),
                restore_attempted: AtomicBool::new(false),
                draft_writer,
            }
        });

        Self { inner }
    }

    /// Creates a controller whose cache store and debounce delay follow `config`.
    pub fn from_config(
        config: &CacheConfig,
        medium: Arc<dyn StorageMedium>,
        source: Arc<dyn SubjectSource>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self::new(
            SessionCacheStore::new(medium, config),
            source,
            notifier,
            config.debounce_delay(),
        )
    }

    pub fn store(&self) -> &SessionCacheStore {
        &self.inner.store
    }

    /// Returns a copy of the active session.
    pub fn session(&self) -> Option<EditSession> {
        self.inner.lock_state().session.clone()
    }

    pub fn active_subject_id(&self) -> Option<SubjectId> {
        self.inner
            .lock_state()
            .session
            .as_ref()
            .map(|session| session.subject_id)
    }

    pub fn restore_phase(&self) -> RestorePhase {
        self.inner.lock_state().restore_phase
    }

    /// The edit the next generation derives from; `None` means the original subject.
    pub fn current_base_edit(&self) -> Option<CachedEditRecord> {
        self.inner
            .lock_state()
            .session
            .as_ref()
            .and_then(|session| session.current_base_edit().cloned())
    }

    /// Makes a freshly uploaded subject the active session.
    ///
    /// Supersedes any in-flight restore, records `subject_id` as last active,
    /// and adopts a cached snapshot if one survives from an earlier visit.
    /// A draft write still pending for the previous subject is flushed first.
    /// The sentinel id [`SubjectId::NONE`] is ignored.
    pub fn activate_new_subject(&self, subject_id: SubjectId) {
        if subject_id.is_sentinel() {
            tracing::warn!("[SessionController] Ignoring activation of sentinel subject id");
            return;
        }

        self.inner.supersede();
        let had_pending_draft = self.inner.draft_writer.cancel();

        let mut state = self.inner.lock_state();
        if had_pending_draft {
            self.inner.persist(&state, "flush before activation");
        }

        self.inner.store.set_last_active_subject_id(subject_id);

        let session = match self.inner.store.load(subject_id) {
            Some(snapshot) => {
                tracing::info!(
                    "[SessionController] Resuming cached session for subject {} ({} edits)",
                    subject_id,
                    snapshot.edits.len()
                );
                EditSession::from_snapshot(snapshot)
            }
            None => EditSession::new(subject_id),
        };

        if state.restore_phase.is_in_flight() {
            state.restore_phase = RestorePhase::Cancelled;
        }
        state.restoring = None;
        state.session = Some(session);
        tracing::info!("[SessionController] Activated subject {}", subject_id);
    }

    /// Restores the session named by the last-active pointer.
    ///
    /// Only the first call does anything; later calls return
    /// [`RestoreOutcome::AlreadyAttempted`]. A failed attempt re-arms the
    /// guard so the caller may offer a manual retry.
    pub async fn restore_last_session(&self) -> RestoreOutcome {
        if self.inner.restore_attempted.swap(true, Ordering::SeqCst) {
            return RestoreOutcome::AlreadyAttempted;
        }

        let (token, subject_id) = {
            let mut state = self.inner.lock_state();
            if state.session.is_some() {
                return RestoreOutcome::SubjectActive;
            }
            let Some(subject_id) = self.inner.store.last_active_subject_id() else {
                tracing::debug!("[SessionController] No last active subject to restore");
                return RestoreOutcome::NothingToRestore;
            };
            let token = self.inner.supersede();
            state.restore_phase = RestorePhase::FetchingSubject;
            state.restoring = Some(subject_id);
            (token, subject_id)
        };
        tracing::info!(
            "[SessionController] Restoring subject {} (token {:?})",
            subject_id,
            token
        );

        let subject = match self.inner.source.fetch_subject(subject_id).await {
            Ok(Some(subject)) => subject,
            Ok(None) => {
                return self.fail_restore(token, RetouchError::not_found("Subject", subject_id));
            }
            Err(e) => return self.fail_restore(token, e.into()),
        };
        if !self.inner.advance(token, RestorePhase::FetchingHistory) {
            return self.cancelled(token, subject_id);
        }

        let history = match self.inner.source.fetch_edit_history(subject_id).await {
            Ok(history) => history,
            Err(e) => return self.fail_restore(token, e.into()),
        };

        let mut state = self.inner.lock_state();
        if !self.inner.is_current(token) {
            drop(state);
            return self.cancelled(token, subject_id);
        }

        state.restoring = None;
        let cached = self.inner.store.load(subject_id);
        state.session = Some(EditSession::merged(subject_id, subject, history, cached));
        state.restore_phase = RestorePhase::Merged;

        self.inner.store.set_last_active_subject_id(subject_id);
        state.restore_phase = RestorePhase::Active;
        tracing::info!("[SessionController] Restored subject {}", subject_id);

        RestoreOutcome::Restored(subject_id)
    }

    /// Prepends a newly generated edit and writes immediately.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` without an active session, or `Internal` if the
    /// edit belongs to another subject.
    pub fn record_new_edit(&self, record: CachedEditRecord) -> Result<()> {
        self.update("record edit", |session| {
            if record.subject_id != session.subject_id {
                return Err(RetouchError::internal(format!(
                    "Edit {} belongs to subject {}, active subject is {}",
                    record.id, record.subject_id, session.subject_id
                )));
            }
            session.edits.insert(0, record);
            Ok(())
        })
    }

    /// Selects the base for the next edit (`None` = original) and writes immediately.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if there is no active session or `edit_id` is not
    /// in its history.
    pub fn set_base(&self, edit_id: Option<EditId>) -> Result<()> {
        self.update("set base", |session| {
            if let Some(id) = edit_id {
                if !session.contains_edit(id) {
                    return Err(RetouchError::not_found("Edit", id));
                }
            }
            session.current_base_edit_id = edit_id;
            Ok(())
        })
    }

    /// Sets the "overwrite last save" preference and writes immediately.
    pub fn set_overwrite_preference(&self, overwrite: bool) -> Result<()> {
        self.update("set overwrite preference", |session| {
            session.overwrite_last_save = overwrite;
            Ok(())
        })
    }

    /// Records that `edit_id` was saved to the gallery as `saved_subject_id`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown edit and `AlreadySaved` if the edit
    /// was saved before.
    pub fn mark_edit_saved(&self, edit_id: EditId, saved_subject_id: SubjectId) -> Result<()> {
        self.update("mark edit saved", |session| {
            let edit = session
                .edits
                .iter_mut()
                .find(|edit| edit.id == edit_id)
                .ok_or_else(|| RetouchError::not_found("Edit", edit_id))?;
            edit.mark_saved(saved_subject_id)
        })
    }

    /// Updates the draft prompt; the write is debounced.
    pub fn set_draft_prompt(&self, text: impl Into<String>) -> Result<()> {
        {
            let mut state = self.inner.lock_state();
            let session = state
                .session
                .as_mut()
                .ok_or_else(|| RetouchError::not_found("Session", "active"))?;
            session.draft_prompt = text.into();
        }
        self.inner.draft_writer.call();
        Ok(())
    }

    /// Cancels any pending debounced write and writes the current state now.
    ///
    /// Call before the session becomes unreachable (navigation, shutdown).
    /// Returns `false` only if a write was attempted and failed.
    pub fn flush_pending_writes(&self) -> bool {
        self.inner.draft_writer.cancel();
        let state = self.inner.lock_state();
        self.inner.persist(&state, "flush")
    }

    /// Discards the active session.
    ///
    /// Cancels any in-flight restore, deletes the cache entry of the active
    /// or restoring subject, clears the last-active pointer, and leaves no
    /// active subject. The restore phase returns to `Idle`.
    pub fn reset(&self) {
        self.inner.supersede();
        self.inner.draft_writer.cancel();

        let mut state = self.inner.lock_state();
        if let Some(session) = state.session.take() {
            self.inner.store.clear(session.subject_id);
            tracing::info!("[SessionController] Reset session for subject {}", session.subject_id);
        }
        if let Some(subject_id) = state.restoring.take() {
            self.inner.store.clear(subject_id);
            tracing::info!("[SessionController] Reset abandoned restore of subject {}", subject_id);
        }
        self.inner.store.clear_last_active_subject_id();
        state.restore_phase = RestorePhase::Idle;
    }

    /// Applies `mutate` to the active session, then writes immediately.
    ///
    /// An accepted change cancels any pending debounced write; the immediate
    /// write carries the latest draft text along with it. A rejected change
    /// writes nothing and leaves the pending write scheduled.
    fn update<F>(&self, action: &str, mutate: F) -> Result<()>
    where
        F: FnOnce(&mut EditSession) -> Result<()>,
    {
        tracing::debug!("[SessionController] {}", action);

        let mut state = self.inner.lock_state();
        let session = state
            .session
            .as_mut()
            .ok_or_else(|| RetouchError::not_found("Session", "active"))?;
        mutate(session)?;

        self.inner.draft_writer.cancel();
        self.inner.persist(&state, action);
        Ok(())
    }

    fn fail_restore(&self, token: RestoreToken, error: RetouchError) -> RestoreOutcome {
        let mut state = self.inner.lock_state();
        if !self.inner.is_current(token) {
            tracing::debug!(
                "[SessionController] Superseded restore failed quietly: {}",
                error
            );
            return RestoreOutcome::Cancelled;
        }

        tracing::error!("[SessionController] Restore failed: {}", error);
        state.session = None;
        state.restoring = None;
        state.restore_phase = RestorePhase::Failed;

        if error.is_not_found() {
            self.inner.store.clear_last_active_subject_id();
        }
        self.inner.restore_attempted.store(false, Ordering::SeqCst);
        drop(state);

        self.inner.notifier.notify(Notification::error(
            "Couldn't restore your session",
            error.to_string(),
        ));
        RestoreOutcome::Failed(error)
    }

    fn cancelled(&self, token: RestoreToken, subject_id: SubjectId) -> RestoreOutcome {
        tracing::debug!(
            "[SessionController] Restore of subject {} superseded (token {:?})",
            subject_id,
            token
        );
        RestoreOutcome::Cancelled
    }
}

impl ControllerInner {
    fn lock_state(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Invalidates every outstanding token and returns a fresh one.
    fn supersede(&self) -> RestoreToken {
        RestoreToken(self.generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn is_current(&self, token: RestoreToken) -> bool {
        self.generation.load(Ordering::SeqCst) == token.0
    }

    /// Moves the published phase forward if `token` is still current.
    fn advance(&self, token: RestoreToken, next: RestorePhase) -> bool {
        let mut state = self.lock_state();
        if !self.is_current(token) {
            return false;
        }
        debug_assert!(state.restore_phase.can_transition_to(next));
        state.restore_phase = next;
        true
    }

    /// Writes the active session, if any. Storage failures are logged only.
    fn persist(&self, state: &ControllerState, reason: &str) -> bool {
        let Some(session) = state.session.as_ref() else {
            return true;
        };
        let saved = self.store.save(session.subject_id, session.to_patch());
        if !saved {
            tracing::warn!(
                "[SessionController] Cache write ({}) failed for subject {}; continuing in memory",
                reason,
                session.subject_id
            );
        }
        saved
    }
}
