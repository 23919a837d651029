//! Application layer for Retouch.
//!
//! This crate coordinates the edit session: it decides when the in-memory
//! session is written to the cache, debounces draft writes, and restores the
//! last active session after a reload.

pub mod debounce;
pub mod logging;
pub mod session;

pub use debounce::Debouncer;
pub use logging::init_tracing;
pub use session::{EditSession, RestoreOutcome, RestorePhase, RestoreToken, SessionController};
