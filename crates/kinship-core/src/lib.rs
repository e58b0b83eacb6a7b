use serde::{Deserialize, Serialize};
use std::fmt;

pub mod error;
pub mod sex;
pub mod snapshot;

pub use error::RelationshipError;
pub use sex::Sex;
pub use snapshot::Snapshot;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonId(pub String);

impl PersonId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PersonId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for PersonId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelationshipId(pub String);

impl fmt::Display for RelationshipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RelationshipId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for RelationshipId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
pub enum RelType {
    // from = child, to = parent
    CHILD_OF,
    // symmetric; one persisted direction is enough
    SPOUSE_OF,
    // root marker, no target
    EARLIEST_ANCESTOR,
}

impl RelType {
    pub fn requires_target(&self) -> bool {
        !matches!(self, RelType::EARLIEST_ANCESTOR)
    }
}

/// Every editable attribute of a person, without the identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PersonFields {
    pub display_name: String,
    #[serde(default)]
    pub sex: Sex,
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub death_date: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub is_deceased: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub display_name: String,
    #[serde(default)]
    pub sex: Sex,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub death_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Explicit flag; when absent a recorded death date implies deceased.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_deceased: Option<bool>,
}

impl Person {
    pub fn new(id: impl Into<PersonId>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            sex: Sex::U,
            birth_date: None,
            death_date: None,
            notes: None,
            is_deceased: None,
        }
    }

    pub fn with_sex(mut self, sex: Sex) -> Self {
        self.sex = sex;
        self
    }

    pub fn with_birth_date(mut self, date: impl Into<String>) -> Self {
        self.birth_date = Some(date.into());
        self
    }

    pub fn with_death_date(mut self, date: impl Into<String>) -> Self {
        self.death_date = Some(date.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn deceased(&self) -> bool {
        self.is_deceased.unwrap_or_else(|| {
            self.death_date
                .as_deref()
                .is_some_and(|d| !d.trim().is_empty())
        })
    }

    pub fn fields(&self) -> PersonFields {
        PersonFields {
            display_name: self.display_name.clone(),
            sex: self.sex,
            birth_date: self.birth_date.clone(),
            death_date: self.death_date.clone(),
            notes: self.notes.clone(),
            is_deceased: self.is_deceased,
        }
    }

    pub fn set_fields(&mut self, fields: PersonFields) {
        self.display_name = fields.display_name;
        self.sex = fields.sex;
        self.birth_date = fields.birth_date;
        self.death_date = fields.death_date;
        self.notes = fields.notes;
        self.is_deceased = fields.is_deceased;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub id: RelationshipId,
    pub from_person_id: PersonId,
    #[serde(default)]
    pub to_person_id: Option<PersonId>,
    #[serde(rename = "type")]
    pub kind: RelType,
}

impl Relationship {
    pub fn child_of(
        id: impl Into<RelationshipId>,
        child: impl Into<PersonId>,
        parent: impl Into<PersonId>,
    ) -> Self {
        Self {
            id: id.into(),
            from_person_id: child.into(),
            to_person_id: Some(parent.into()),
            kind: RelType::CHILD_OF,
        }
    }

    pub fn spouse_of(
        id: impl Into<RelationshipId>,
        person: impl Into<PersonId>,
        spouse: impl Into<PersonId>,
    ) -> Self {
        Self {
            id: id.into(),
            from_person_id: person.into(),
            to_person_id: Some(spouse.into()),
            kind: RelType::SPOUSE_OF,
        }
    }

    pub fn earliest_ancestor(id: impl Into<RelationshipId>, person: impl Into<PersonId>) -> Self {
        Self {
            id: id.into(),
            from_person_id: person.into(),
            to_person_id: None,
            kind: RelType::EARLIEST_ANCESTOR,
        }
    }

    pub fn validate(&self) -> Result<(), RelationshipError> {
        match (self.kind.requires_target(), &self.to_person_id) {
            (true, None) => Err(RelationshipError::MissingTarget {
                id: self.id.clone(),
                kind: self.kind,
            }),
            (false, Some(_)) => Err(RelationshipError::UnexpectedTarget {
                id: self.id.clone(),
            }),
            _ => Ok(()),
        }
    }

    /// Target of an edge-producing relationship. Root markers never have
    /// one, even when a stray `to_person_id` was persisted.
    pub fn target(&self) -> Option<&PersonId> {
        if self.kind.requires_target() {
            self.to_person_id.as_ref()
        } else {
            None
        }
    }

    pub fn references(&self, person: &PersonId) -> bool {
        &self.from_person_id == person || self.to_person_id.as_ref() == Some(person)
    }
}
