#![allow(dead_code)]

use async_trait::async_trait;
use retouch_application::SessionController;
use retouch_core::edit::{CachedEditRecord, EditId, EditRecord};
use retouch_core::notification::{Notification, Notifier};
use retouch_core::storage::StorageMedium;
use retouch_core::subject::{Subject, SubjectId, SubjectSource};
use retouch_infrastructure::{MemoryStorage, SessionCacheStore};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

pub const DEBOUNCE: Duration = Duration::from_millis(500);

// Mock SubjectSource with optional gates that hold a fetch in flight
pub struct MockSubjectSource {
    subjects: Mutex<HashMap<SubjectId, Subject>>,
    histories: Mutex<HashMap<SubjectId, Vec<EditRecord>>>,
    failure: Mutex<Option<String>>,
    history_failure: Mutex<Option<String>>,
    subject_gate: Mutex<Option<Arc<Notify>>>,
    history_gate: Mutex<Option<Arc<Notify>>>,
    subject_calls: AtomicUsize,
    history_calls: AtomicUsize,
}

impl MockSubjectSource {
    pub fn new() -> Self {
        Self {
            subjects: Mutex::new(HashMap::new()),
            histories: Mutex::new(HashMap::new()),
            failure: Mutex::new(None),
            history_failure: Mutex::new(None),
            subject_gate: Mutex::new(None),
            history_gate: Mutex::new(None),
            subject_calls: AtomicUsize::new(0),
            history_calls: AtomicUsize::new(0),
        }
    }

    pub fn insert(&self, subject: Subject, history: Vec<EditRecord>) {
        self.histories.lock().unwrap().insert(subject.id, history);
        self.subjects.lock().unwrap().insert(subject.id, subject);
    }

    /// Fails both fetches with `message`; `None` restores normal behaviour.
    pub fn fail_with(&self, message: Option<&str>) {
        *self.failure.lock().unwrap() = message.map(str::to_string);
    }

    /// Fails only the edit-history fetch; the subject fetch still succeeds.
    pub fn fail_history_with(&self, message: Option<&str>) {
        *self.history_failure.lock().unwrap() = message.map(str::to_string);
    }

    /// Makes the next subject fetches wait until the returned gate is notified.
    pub fn hold_subject_fetch(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.subject_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    /// Makes the next history fetches wait until the returned gate is notified.
    pub fn hold_history_fetch(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.history_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn subject_calls(&self) -> usize {
        self.subject_calls.load(Ordering::SeqCst)
    }

    pub fn history_calls(&self) -> usize {
        self.history_calls.load(Ordering::SeqCst)
    }

    fn check_failure(&self, failure: &Mutex<Option<String>>) -> anyhow::Result<()> {
        match failure.lock().unwrap().as_ref() {
            Some(message) => Err(anyhow::anyhow!("{}", message)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl SubjectSource for MockSubjectSource {
    async fn fetch_subject(&self, subject_id: SubjectId) -> anyhow::Result<Option<Subject>> {
        self.subject_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.subject_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.check_failure(&self.failure)?;
        Ok(self.subjects.lock().unwrap().get(&subject_id).cloned())
    }

    async fn fetch_edit_history(&self, subject_id: SubjectId) -> anyhow::Result<Vec<EditRecord>> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.history_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.check_failure(&self.failure)?;
        self.check_failure(&self.history_failure)?;
        Ok(self
            .histories
            .lock()
            .unwrap()
            .get(&subject_id)
            .cloned()
            .unwrap_or_default())
    }
}

// Mock Notifier that records everything it is asked to show
pub struct RecordingNotifier {
    notifications: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self {
            notifications: Mutex::new(Vec::new()),
        }
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.notifications.lock().unwrap().push(notification);
    }
}

pub struct Harness {
    pub controller: SessionController,
    pub store: SessionCacheStore,
    pub source: Arc<MockSubjectSource>,
    pub notifier: Arc<RecordingNotifier>,
}

pub fn harness() -> Harness {
    harness_with_medium(Arc::new(MemoryStorage::new()))
}

pub fn harness_with_medium(medium: Arc<dyn StorageMedium>) -> Harness {
    let store = SessionCacheStore::with_defaults(medium);
    let source = Arc::new(MockSubjectSource::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let controller =
        SessionController::new(store.clone(), source.clone(), notifier.clone(), DEBOUNCE);

    Harness {
        controller,
        store,
        source,
        notifier,
    }
}

pub fn sid(id: i64) -> SubjectId {
    SubjectId::new(id)
}

pub fn subject(id: i64) -> Subject {
    Subject {
        id: sid(id),
        user_id: "user-1".to_string(),
        original_url: format!("/objects/uploads/{id}.png"),
        current_url: format!("/objects/uploads/{id}.png"),
        created_at: chrono::DateTime::from_timestamp(1_700_000_000, 0),
    }
}

pub fn remote_edit(id: EditId, subject_id: i64) -> EditRecord {
    EditRecord {
        id,
        subject_id: sid(subject_id),
        user_id: "user-1".to_string(),
        prompt: format!("prompt {id}"),
        result_url: format!("/objects/edits/{id}.png"),
        saved_subject_id: None,
        created_at: chrono::DateTime::from_timestamp(1_700_000_000 + id, 0),
    }
}

pub fn cached_edit(id: EditId, subject_id: i64) -> CachedEditRecord {
    CachedEditRecord::from(remote_edit(id, subject_id))
}

/// Lets spawned tasks run until `condition` holds.
pub async fn wait_until(condition: impl Fn() -> bool) {
    while !condition() {
        tokio::task::yield_now().await;
    }
}
