use kinship_core::{Person, PersonId, Relationship, RelationshipId, Snapshot};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftPerson {
    #[serde(flatten)]
    pub person: Person,
    pub is_draft: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftRelationship {
    #[serde(flatten)]
    pub relationship: Relationship,
    pub is_draft: bool,
}

/// A snapshot with drafts applied. This is the only input the layout
/// pipeline consumes; it owns its records and shares nothing with the
/// snapshot it was built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct MergedGraph {
    pub people: Vec<DraftPerson>,
    pub relationships: Vec<DraftRelationship>,
}

impl MergedGraph {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self {
            people: snapshot
                .people
                .iter()
                .map(|person| DraftPerson {
                    person: person.clone(),
                    is_draft: false,
                })
                .collect(),
            relationships: snapshot
                .relationships
                .iter()
                .map(|relationship| DraftRelationship {
                    relationship: relationship.clone(),
                    is_draft: false,
                })
                .collect(),
        }
    }

    pub fn people(&self) -> impl Iterator<Item = &Person> {
        self.people.iter().map(|p| &p.person)
    }

    pub fn relationships(&self) -> impl Iterator<Item = &Relationship> {
        self.relationships.iter().map(|r| &r.relationship)
    }

    pub fn person_index(&self, id: &PersonId) -> Option<usize> {
        self.people.iter().position(|p| &p.person.id == id)
    }

    pub fn relationship_index(&self, id: &RelationshipId) -> Option<usize> {
        self.relationships
            .iter()
            .position(|r| &r.relationship.id == id)
    }

    pub fn contains_person(&self, id: &PersonId) -> bool {
        self.person_index(id).is_some()
    }

    pub fn is_draft_person(&self, id: &PersonId) -> bool {
        self.people
            .iter()
            .any(|p| &p.person.id == id && p.is_draft)
    }

    pub fn is_draft_relationship(&self, id: &RelationshipId) -> bool {
        self.relationships
            .iter()
            .any(|r| &r.relationship.id == id && r.is_draft)
    }

    pub fn has_drafts(&self) -> bool {
        self.people.iter().any(|p| p.is_draft) || self.relationships.iter().any(|r| r.is_draft)
    }

    /// Materialize the merged state as the next published version.
    pub fn publish(&self, tree_id: Option<String>, version: u32) -> Snapshot {
        Snapshot {
            tree_id,
            version,
            people: self.people().cloned().collect(),
            relationships: self.relationships().cloned().collect(),
        }
    }
}
