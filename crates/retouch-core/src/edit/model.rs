use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, RetouchError};
use crate::subject::SubjectId;

/// Numeric identifier of an edit.
pub type EditId = i64;

/// A committed edit returned by the remote edit-history fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditRecord {
    pub id: EditId,
    pub subject_id: SubjectId,
    pub user_id: String,
    pub prompt: String,
    pub result_url: String,
    /// Link to the gallery subject this edit was saved as, if any.
    #[serde(default)]
    pub saved_subject_id: Option<SubjectId>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl EditRecord {
    /// A saved-counterpart link implies the edit is saved.
    pub fn is_saved(&self) -> bool {
        self.saved_subject_id.is_some()
    }
}

/// An edit as persisted inside a session snapshot.
///
/// Immutable once created, except for `is_saved` and `saved_subject_id`,
/// which move from unset to set exactly once through [`CachedEditRecord::mark_saved`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedEditRecord {
    pub id: EditId,
    pub result_url: String,
    pub prompt: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_saved: bool,
    pub user_id: String,
    pub subject_id: SubjectId,
    #[serde(default)]
    pub saved_subject_id: Option<SubjectId>,
}

impl CachedEditRecord {
    /// Records that this edit was persisted to the gallery as `saved_subject_id`.
    ///
    /// # Errors
    ///
    /// Returns `RetouchError::AlreadySaved` if the edit was saved before; the
    /// existing link is left untouched.
    pub fn mark_saved(&mut self, saved_subject_id: SubjectId) -> Result<()> {
        if let Some(existing) = self.saved_subject_id {
            return Err(RetouchError::AlreadySaved {
                edit_id: self.id,
                saved_subject_id: existing.get(),
            });
        }
        self.is_saved = true;
        self.saved_subject_id = Some(saved_subject_id);
        Ok(())
    }
}

impl From<EditRecord> for CachedEditRecord {
    fn from(record: EditRecord) -> Self {
        Self {
            is_saved: record.is_saved(),
            id: record.id,
            result_url: record.result_url,
            prompt: record.prompt,
            created_at: record.created_at,
            user_id: record.user_id,
            subject_id: record.subject_id,
            saved_subject_id: record.saved_subject_id,
        }
    }
}
