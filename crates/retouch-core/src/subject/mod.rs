//! Subject domain module.
//!
//! A subject is the base image a session is built around. This module holds
//! the identifier and remote model, plus the collaborator trait used to fetch
//! authoritative subject and edit-history data.

mod model;
mod source;

pub use model::{Subject, SubjectId};
pub use source::SubjectSource;
