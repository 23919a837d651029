//! Session snapshot domain module.
//!
//! A snapshot is the unit persisted per subject: the edit sequence plus the
//! UI-only fields (base selection, draft prompt, overwrite preference).

mod model;

pub use model::{SessionSnapshot, SnapshotPatch};
