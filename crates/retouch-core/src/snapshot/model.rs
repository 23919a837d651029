use serde::{Deserialize, Serialize};

use crate::edit::{CachedEditRecord, EditId};
use crate::subject::SubjectId;

/// Full persisted state of one subject's in-progress session.
///
/// `edits` is ordered newest first. `current_base_edit_id == None` means the
/// next edit derives from the original subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub subject_id: SubjectId,
    #[serde(default)]
    pub edits: Vec<CachedEditRecord>,
    #[serde(default)]
    pub current_base_edit_id: Option<EditId>,
    #[serde(default)]
    pub draft_prompt: String,
    #[serde(default)]
    pub overwrite_last_save: bool,
    /// Unix timestamp in milliseconds of the write that produced this snapshot.
    #[serde(default)]
    pub last_updated: i64,
}

impl SessionSnapshot {
    /// Creates an empty snapshot for `subject_id`.
    pub fn empty(subject_id: SubjectId) -> Self {
        Self {
            subject_id,
            edits: Vec::new(),
            current_base_edit_id: None,
            draft_prompt: String::new(),
            overwrite_last_save: false,
            last_updated: 0,
        }
    }

    /// Builds a snapshot by laying `patch` over the defaults and stamping `now_ms`.
    ///
    /// Fields absent from the patch take their default value, not any value
    /// previously stored for the subject.
    pub fn from_patch(subject_id: SubjectId, patch: SnapshotPatch, now_ms: i64) -> Self {
        let mut snapshot = Self::empty(subject_id);
        if let Some(edits) = patch.edits {
            snapshot.edits = edits;
        }
        if let Some(base) = patch.current_base_edit_id {
            snapshot.current_base_edit_id = base;
        }
        if let Some(draft) = patch.draft_prompt {
            snapshot.draft_prompt = draft;
        }
        if let Some(overwrite) = patch.overwrite_last_save {
            snapshot.overwrite_last_save = overwrite;
        }
        snapshot.last_updated = now_ms;
        snapshot
    }

    /// Returns the base edit id only if it still names an edit in `edits`.
    pub fn resolved_base_edit_id(&self) -> Option<EditId> {
        self.current_base_edit_id
            .filter(|id| self.edits.iter().any(|edit| edit.id == *id))
    }

    pub fn find_edit(&self, edit_id: EditId) -> Option<&CachedEditRecord> {
        self.edits.iter().find(|edit| edit.id == edit_id)
    }
}

/// A partial snapshot; `None` fields fall back to the snapshot defaults.
///
/// `current_base_edit_id` is doubly optional: `Some(None)` explicitly selects
/// the original subject.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotPatch {
    pub edits: Option<Vec<CachedEditRecord>>,
    pub current_base_edit_id: Option<Option<EditId>>,
    pub draft_prompt: Option<String>,
    pub overwrite_last_save: Option<bool>,
}

impl SnapshotPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_edits(mut self, edits: Vec<CachedEditRecord>) -> Self {
        self.edits = Some(edits);
        self
    }

    pub fn with_base(mut self, base: Option<EditId>) -> Self {
        self.current_base_edit_id = Some(base);
        self
    }

    pub fn with_draft_prompt(mut self, draft: impl Into<String>) -> Self {
        self.draft_prompt = Some(draft.into());
        self
    }

    pub fn with_overwrite_last_save(mut self, overwrite: bool) -> Self {
        self.overwrite_last_save = Some(overwrite);
        self
    }
}

/// Every field of a snapshot, as a patch. Used to persist in-memory state.
impl From<SessionSnapshot> for SnapshotPatch {
    fn from(snapshot: SessionSnapshot) -> Self {
        Self {
            edits: Some(snapshot.edits),
            current_base_edit_id: Some(snapshot.current_base_edit_id),
            draft_prompt: Some(snapshot.draft_prompt),
            overwrite_last_save: Some(snapshot.overwrite_last_save),
        }
    }
}
