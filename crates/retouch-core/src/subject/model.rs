use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier of the base image a session belongs to.
///
/// The value `0` is reserved: the last-active pointer stores it to record an
/// explicit reset, so it never names a real subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectId(i64);

impl SubjectId {
    /// The "no active subject" sentinel.
    pub const NONE: SubjectId = SubjectId(0);

    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    pub const fn get(self) -> i64 {
        self.0
    }

    /// Returns `true` for the reserved sentinel value.
    pub const fn is_sentinel(self) -> bool {
        self.0 == 0
    }
}

impl From<i64> for SubjectId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Authoritative subject data returned by the remote collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: SubjectId,
    pub user_id: String,
    /// Locator of the image as it was uploaded.
    pub original_url: String,
    /// Locator of the image as it currently stands.
    pub current_url: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}
