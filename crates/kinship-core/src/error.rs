use crate::{RelType, RelationshipId};
use thiserror::Error;

/// Violations of the `to_person` invariant on a relationship row.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RelationshipError {
    #[error("relationship {id} of type {kind:?} has no target person")]
    MissingTarget { id: RelationshipId, kind: RelType },
    #[error("relationship {id} is an EARLIEST_ANCESTOR marker but names a target person")]
    UnexpectedTarget { id: RelationshipId },
}

impl RelationshipError {
    /// Unexpected targets on root markers are tolerated everywhere; only a
    /// missing target makes the row unusable.
    pub fn is_fatal(&self) -> bool {
        matches!(self, RelationshipError::MissingTarget { .. })
    }
}
