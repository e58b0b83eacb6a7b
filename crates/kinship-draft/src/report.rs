use crate::ops::DraftKind;
use kinship_core::{PersonId, RelationshipError, RelationshipId};
use thiserror::Error;

/// Why a draft operation was not applied. None of these fail the merge.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    #[error("person {0} does not exist in the working copy")]
    UnknownPerson(PersonId),
    #[error("person {0} already exists")]
    PersonExists(PersonId),
    #[error("relationship {0} does not exist in the working copy")]
    UnknownRelationship(RelationshipId),
    #[error("relationship {0} already exists")]
    RelationshipExists(RelationshipId),
    #[error("cannot merge person {0} into itself")]
    SelfMerge(PersonId),
    #[error(transparent)]
    InvalidRelationship(#[from] RelationshipError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftOutcome {
    /// Position of the operation in the draft list.
    pub index: usize,
    pub kind: DraftKind,
    pub status: Result<(), SkipReason>,
}

impl DraftOutcome {
    pub fn applied(&self) -> bool {
        self.status.is_ok()
    }
}

/// Per-operation audit of a single merge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub outcomes: Vec<DraftOutcome>,
}

impl MergeReport {
    pub fn applied_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.applied()).count()
    }

    pub fn skipped_count(&self) -> usize {
        self.outcomes.len() - self.applied_count()
    }

    pub fn skipped(&self) -> impl Iterator<Item = (&DraftOutcome, &SkipReason)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.status.as_ref().err().map(|reason| (o, reason)))
    }

    pub fn is_clean(&self) -> bool {
        self.skipped_count() == 0
    }
}
