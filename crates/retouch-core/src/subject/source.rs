//! Remote subject source trait.

use super::model::{Subject, SubjectId};
use crate::edit::EditRecord;
use anyhow::Result;
use async_trait::async_trait;

/// Remote source of truth for subjects and their committed edits.
///
/// This trait decouples the session layer from the server API. Both calls
/// are suspension points; callers must assume arbitrary latency and must not
/// hold in-memory state across them.
#[async_trait]
pub trait SubjectSource: Send + Sync {
    /// Fetches a subject by its ID.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Subject))`: Subject found
    /// - `Ok(None)`: Subject does not exist (or is not visible to the user)
    /// - `Err(_)`: Transport or server failure
    async fn fetch_subject(&self, subject_id: SubjectId) -> Result<Option<Subject>>;

    /// Fetches the committed edit history for a subject, newest first.
    async fn fetch_edit_history(&self, subject_id: SubjectId) -> Result<Vec<EditRecord>>;
}
