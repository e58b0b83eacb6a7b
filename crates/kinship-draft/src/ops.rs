use kinship_core::{Person, PersonFields, PersonId, Relationship, RelationshipId};
use serde::{Deserialize, Serialize};

/// One pending edit against a published snapshot.
///
/// Drafts are an ordered patch list. They are applied front to back against
/// a working copy of the snapshot; later operations see the effect of earlier
/// ones (a person deleted by draft 2 is unknown to draft 5).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DraftOp {
    CreatePerson {
        person: Person,
    },
    /// Replaces every field of an existing person.
    EditPerson {
        person_id: PersonId,
        fields: PersonFields,
    },
    /// Removes the person and every relationship touching them.
    DeletePerson {
        person_id: PersonId,
    },
    CreateRelationship {
        relationship: Relationship,
    },
    /// Drops all relationships with the same `from_person_id` and type, then
    /// adds this one. Used to move someone to a different parent or spouse.
    ReplaceRelationship {
        relationship: Relationship,
    },
    DeleteRelationship {
        relationship_id: RelationshipId,
    },
    /// Folds `remove` into `keep`: empty fields on `keep` are filled from
    /// `remove`, relationships are re-pointed, and `remove` is deleted.
    MergePerson {
        keep: PersonId,
        remove: PersonId,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftKind {
    CreatePerson,
    EditPerson,
    DeletePerson,
    CreateRelationship,
    ReplaceRelationship,
    DeleteRelationship,
    MergePerson,
}

impl DraftOp {
    pub fn kind(&self) -> DraftKind {
        match self {
            DraftOp::CreatePerson { .. } => DraftKind::CreatePerson,
            DraftOp::EditPerson { .. } => DraftKind::EditPerson,
            DraftOp::DeletePerson { .. } => DraftKind::DeletePerson,
            DraftOp::CreateRelationship { .. } => DraftKind::CreateRelationship,
            DraftOp::ReplaceRelationship { .. } => DraftKind::ReplaceRelationship,
            DraftOp::DeleteRelationship { .. } => DraftKind::DeleteRelationship,
            DraftOp::MergePerson { .. } => DraftKind::MergePerson,
        }
    }
}
