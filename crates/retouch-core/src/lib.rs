//! Domain layer for Retouch.
//!
//! Models for subjects, edits, and per-subject session snapshots, the shared
//! error type, and the collaborator traits the session layer depends on.

pub mod edit;
pub mod error;
pub mod notification;
pub mod snapshot;
pub mod state;
pub mod storage;
pub mod subject;

// Re-export common types
pub use edit::{CachedEditRecord, EditId, EditRecord};
pub use error::{Result, RetouchError};
pub use notification::{Notification, NotificationLevel, Notifier};
pub use snapshot::{SessionSnapshot, SnapshotPatch};
pub use state::ActivePointer;
pub use storage::StorageMedium;
pub use subject::{Subject, SubjectId, SubjectSource};
