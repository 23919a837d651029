//! Restore sequence state machine.

use retouch_core::error::RetouchError;
use retouch_core::subject::SubjectId;

/// Phase of the restore sequence that rebuilds a session after a reload.
///
/// ```text
/// Idle → FetchingSubject → FetchingHistory → Merged → Active
///            │                  │
///            └──► Failed ◄──────┘
/// any non-terminal phase ──► Cancelled
/// ```
///
/// A reset returns the controller to `Idle` from any phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RestorePhase {
    #[default]
    Idle,
    FetchingSubject,
    FetchingHistory,
    Merged,
    Active,
    Cancelled,
    Failed,
}

impl RestorePhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Active | Self::Cancelled | Self::Failed)
    }

    /// Whether a sequence is between its first fetch and activation.
    pub fn is_in_flight(self) -> bool {
        matches!(
            self,
            Self::FetchingSubject | Self::FetchingHistory | Self::Merged
        )
    }

    pub fn can_transition_to(self, next: RestorePhase) -> bool {
        use RestorePhase::*;
        match (self, next) {
            (Idle, FetchingSubject)
            | (FetchingSubject, FetchingHistory)
            | (FetchingHistory, Merged)
            | (Merged, Active)
            | (FetchingSubject | FetchingHistory, Failed) => true,
            (current, Cancelled) => !current.is_terminal(),
            _ => false,
        }
    }
}

/// Generation value captured by one restore sequence.
///
/// A sequence may only touch shared state while its token equals the
/// controller's current generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RestoreToken(pub(crate) u64);

/// Result of a call to `SessionController::restore_last_session`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// A previous call already restored or is restoring.
    AlreadyAttempted,
    /// A subject is already active; nothing to restore.
    SubjectActive,
    /// No last-active pointer is set.
    NothingToRestore,
    /// The session for this subject is now active.
    Restored(SubjectId),
    /// A newer activation or reset superseded this sequence.
    Cancelled,
    /// A remote fetch failed; the user has been notified.
    Failed(RetouchError),
}
