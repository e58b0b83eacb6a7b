use crate::{Person, PersonId, Relationship};
use serde::{Deserialize, Serialize};

/// An immutable, versioned copy of every person and relationship in a tree.
///
/// Nothing in this workspace mutates a snapshot in place. Draft merging works
/// on a by-value copy and a new version is produced by publishing the merged
/// result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Snapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tree_id: Option<String>,
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub people: Vec<Person>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

impl Snapshot {
    pub fn new(people: Vec<Person>, relationships: Vec<Relationship>) -> Self {
        Self {
            tree_id: None,
            version: 0,
            people,
            relationships,
        }
    }

    pub fn with_tree(mut self, tree_id: impl Into<String>, version: u32) -> Self {
        self.tree_id = Some(tree_id.into());
        self.version = version;
        self
    }

    pub fn person(&self, id: &PersonId) -> Option<&Person> {
        self.people.iter().find(|p| &p.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }
}
