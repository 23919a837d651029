use crate::subject::SubjectId;

/// The global "last active subject" pointer as read from storage.
///
/// An explicit reset stores the sentinel, so `Cleared` and `Unset` stay
/// distinguishable even though neither names a subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivePointer {
    /// Never written, or the stored value could not be parsed.
    Unset,
    /// Explicitly cleared by a reset.
    Cleared,
    /// Subject to restore on next load.
    Active(SubjectId),
}

impl ActivePointer {
    /// Interprets a raw stored value.
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::Unset;
        };
        match raw.trim().parse::<i64>() {
            Ok(0) => Self::Cleared,
            Ok(id) => Self::Active(SubjectId::new(id)),
            Err(_) => Self::Unset,
        }
    }

    pub fn subject_id(self) -> Option<SubjectId> {
        match self {
            Self::Active(id) => Some(id),
            Self::Unset | Self::Cleared => None,
        }
    }
}
