//! Edit-session lifecycle.
//!
//! This module holds the session controller, the in-memory session model it
//! owns, and the restore state machine used after a reload.

mod controller;
mod model;
mod restore;

pub use controller::SessionController;
pub use model::EditSession;
pub use restore::{RestoreOutcome, RestorePhase, RestoreToken};
