//! Edit records.
//!
//! - `EditRecord`: committed edit as returned by the remote history fetch
//! - `CachedEditRecord`: the same edit as held in a session snapshot

mod model;

pub use model::{CachedEditRecord, EditId, EditRecord};
