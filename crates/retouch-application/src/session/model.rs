//! In-memory edit session.

use retouch_core::edit::{CachedEditRecord, EditId, EditRecord};
use retouch_core::snapshot::{SessionSnapshot, SnapshotPatch};
use retouch_core::subject::{Subject, SubjectId};

/// The active session as held by the controller and shown to the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    pub subject_id: SubjectId,
    /// Remote subject data; only known after a restore.
    pub subject: Option<Subject>,
    /// Newest first.
    pub edits: Vec<CachedEditRecord>,
    pub current_base_edit_id: Option<EditId>,
    pub draft_prompt: String,
    pub overwrite_last_save: bool,
}

impl EditSession {
    pub fn new(subject_id: SubjectId) -> Self {
        Self {
            subject_id,
            subject: None,
            edits: Vec::new(),
            current_base_edit_id: None,
            draft_prompt: String::new(),
            overwrite_last_save: false,
        }
    }

    /// Builds a session from a cached snapshot alone.
    pub fn from_snapshot(snapshot: SessionSnapshot) -> Self {
        let current_base_edit_id = snapshot.resolved_base_edit_id();
        Self {
            subject_id: snapshot.subject_id,
            subject: None,
            edits: snapshot.edits,
            current_base_edit_id,
            draft_prompt: snapshot.draft_prompt,
            overwrite_last_save: snapshot.overwrite_last_save,
        }
    }

    /// Fuses remote data with the cached UI-only fields.
    ///
    /// The remote history is authoritative for the edit sequence; the cache
    /// only contributes the draft prompt, base selection, and overwrite
    /// preference. A cached base that no longer exists remotely falls back to
    /// the original subject.
    pub fn merged(
        subject_id: SubjectId,
        subject: Subject,
        history: Vec<EditRecord>,
        cached: Option<SessionSnapshot>,
    ) -> Self {
        let mut session = Self::new(subject_id);
        session.subject = Some(subject);
        session.edits = history.into_iter().map(CachedEditRecord::from).collect();

        if let Some(cached) = cached {
            session.draft_prompt = cached.draft_prompt;
            session.overwrite_last_save = cached.overwrite_last_save;
            session.current_base_edit_id = cached
                .current_base_edit_id
                .filter(|id| session.contains_edit(*id));

            if let (Some(dangling), None) =
                (cached.current_base_edit_id, session.current_base_edit_id)
            {
                tracing::warn!(
                    "[EditSession] Base edit {} no longer exists for subject {}, using original",
                    dangling,
                    subject_id
                );
            }
        }

        session
    }

    pub fn contains_edit(&self, edit_id: EditId) -> bool {
        self.edits.iter().any(|edit| edit.id == edit_id)
    }

    /// The edit the next generation derives from; `None` means the original.
    pub fn current_base_edit(&self) -> Option<&CachedEditRecord> {
        let id = self.current_base_edit_id?;
        self.edits.iter().find(|edit| edit.id == id)
    }

    /// Locator of the image the next edit should be derived from, when known.
    pub fn base_url(&self) -> Option<&str> {
        match self.current_base_edit() {
            Some(edit) => Some(&edit.result_url),
            None => self.subject.as_ref().map(|subject| subject.current_url.as_str()),
        }
    }

    pub fn to_patch(&self) -> SnapshotPatch {
        SnapshotPatch::new()
            .with_edits(self.edits.clone())
            .with_base(self.current_base_edit_id)
            .with_draft_prompt(self.draft_prompt.clone())
            .with_overwrite_last_save(self.overwrite_last_save)
    }
}
