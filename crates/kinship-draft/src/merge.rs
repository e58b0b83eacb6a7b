use crate::merged::{DraftPerson, DraftRelationship, MergedGraph};
use crate::ops::DraftOp;
use crate::report::{DraftOutcome, MergeReport, SkipReason};
use kinship_core::{Person, PersonFields, PersonId, RelType, Relationship, RelationshipId, Sex, Snapshot};

pub struct MergeResult {
    pub graph: MergedGraph,
    pub report: MergeReport,
}

/// Applies an ordered draft list to a copy of a published snapshot.
pub struct DraftMerger;

impl DraftMerger {
    pub fn new() -> Self {
        Self
    }

    pub fn merge(&self, snapshot: &Snapshot, drafts: &[DraftOp]) -> MergeResult {
        let mut graph = MergedGraph::from_snapshot(snapshot);
        let mut report = MergeReport::default();

        for (index, op) in drafts.iter().enumerate() {
            let status = Self::apply(&mut graph, op);
            if let Err(reason) = &status {
                tracing::debug!(
                    "Skipping draft #{} ({:?}): {}",
                    index,
                    op.kind(),
                    reason
                );
            }
            report.outcomes.push(DraftOutcome {
                index,
                kind: op.kind(),
                status,
            });
        }

        if !drafts.is_empty() {
            tracing::info!(
                applied = report.applied_count(),
                skipped = report.skipped_count(),
                people = graph.people.len(),
                relationships = graph.relationships.len(),
                "merged drafts onto snapshot"
            );
        }

        MergeResult { graph, report }
    }

    fn apply(graph: &mut MergedGraph, op: &DraftOp) -> Result<(), SkipReason> {
        match op {
            DraftOp::CreatePerson { person } => Self::create_person(graph, person),
            DraftOp::EditPerson { person_id, fields } => {
                Self::edit_person(graph, person_id, fields)
            }
            DraftOp::DeletePerson { person_id } => Self::delete_person(graph, person_id),
            DraftOp::CreateRelationship { relationship } => {
                Self::create_relationship(graph, relationship)
            }
            DraftOp::ReplaceRelationship { relationship } => {
                Self::replace_relationship(graph, relationship)
            }
            DraftOp::DeleteRelationship { relationship_id } => {
                Self::delete_relationship(graph, relationship_id)
            }
            DraftOp::MergePerson { keep, remove } => Self::merge_person(graph, keep, remove),
        }
    }

    fn require_person(graph: &MergedGraph, id: &PersonId) -> Result<usize, SkipReason> {
        graph
            .person_index(id)
            .ok_or_else(|| SkipReason::UnknownPerson(id.clone()))
    }

    fn create_person(graph: &mut MergedGraph, person: &Person) -> Result<(), SkipReason> {
        if graph.contains_person(&person.id) {
            return Err(SkipReason::PersonExists(person.id.clone()));
        }
        graph.people.push(DraftPerson {
            person: person.clone(),
            is_draft: true,
        });
        Ok(())
    }

    fn edit_person(
        graph: &mut MergedGraph,
        id: &PersonId,
        fields: &PersonFields,
    ) -> Result<(), SkipReason> {
        let idx = Self::require_person(graph, id)?;
        let entry = &mut graph.people[idx];
        entry.person.set_fields(fields.clone());
        entry.is_draft = true;
        Ok(())
    }

    fn delete_person(graph: &mut MergedGraph, id: &PersonId) -> Result<(), SkipReason> {
        let idx = Self::require_person(graph, id)?;
        graph.people.remove(idx);
        graph
            .relationships
            .retain(|r| !r.relationship.references(id));
        Ok(())
    }

    /// Checks a relationship about to enter the working copy. Stray targets on
    /// root markers are tolerated, matching the builder.
    fn check_relationship(
        graph: &MergedGraph,
        relationship: &Relationship,
    ) -> Result<(), SkipReason> {
        if let Err(err) = relationship.validate() {
            if err.is_fatal() {
                return Err(err.into());
            }
            tracing::warn!("Accepting draft relationship with anomaly: {}", err);
        }
        Self::require_person(graph, &relationship.from_person_id)?;
        if let Some(target) = relationship.target() {
            Self::require_person(graph, target)?;
        }
        Ok(())
    }

    fn create_relationship(
        graph: &mut MergedGraph,
        relationship: &Relationship,
    ) -> Result<(), SkipReason> {
        if graph.relationship_index(&relationship.id).is_some() {
            return Err(SkipReason::RelationshipExists(relationship.id.clone()));
        }
        Self::check_relationship(graph, relationship)?;
        graph.relationships.push(DraftRelationship {
            relationship: relationship.clone(),
            is_draft: true,
        });
        Ok(())
    }

    fn replace_relationship(
        graph: &mut MergedGraph,
        relationship: &Relationship,
    ) -> Result<(), SkipReason> {
        Self::check_relationship(graph, relationship)?;
        graph.relationships.retain(|r| {
            let existing = &r.relationship;
            let same_slot = existing.from_person_id == relationship.from_person_id
                && existing.kind == relationship.kind;
            !same_slot && existing.id != relationship.id
        });
        graph.relationships.push(DraftRelationship {
            relationship: relationship.clone(),
            is_draft: true,
        });
        Ok(())
    }

    fn delete_relationship(
        graph: &mut MergedGraph,
        id: &RelationshipId,
    ) -> Result<(), SkipReason> {
        let idx = graph
            .relationship_index(id)
            .ok_or_else(|| SkipReason::UnknownRelationship(id.clone()))?;
        graph.relationships.remove(idx);
        Ok(())
    }

    fn merge_person(
        graph: &mut MergedGraph,
        keep: &PersonId,
        remove: &PersonId,
    ) -> Result<(), SkipReason> {
        if keep == remove {
            return Err(SkipReason::SelfMerge(keep.clone()));
        }
        let keep_idx = Self::require_person(graph, keep)?;
        let remove_idx = Self::require_person(graph, remove)?;

        let donor = graph.people[remove_idx].person.clone();
        let kept = &mut graph.people[keep_idx];
        Self::fill_missing_fields(&mut kept.person, &donor);
        kept.is_draft = true;

        let mut moved: Vec<DraftRelationship> = Vec::new();
        let mut untouched: Vec<DraftRelationship> = Vec::new();
        for entry in graph.relationships.drain(..) {
            if entry.relationship.references(remove) {
                moved.push(entry);
            } else {
                untouched.push(entry);
            }
        }
        graph.relationships = untouched;

        for mut entry in moved {
            let rel = &mut entry.relationship;
            if &rel.from_person_id == remove {
                rel.from_person_id = keep.clone();
            }
            if rel.to_person_id.as_ref() == Some(remove) {
                rel.to_person_id = Some(keep.clone());
            }
            if rel.target() == Some(&rel.from_person_id) {
                continue;
            }
            let duplicate = graph
                .relationships
                .iter()
                .any(|existing| Self::same_link(&existing.relationship, rel));
            if duplicate {
                continue;
            }
            entry.is_draft = true;
            graph.relationships.push(entry);
        }

        graph.people.remove(remove_idx);
        Ok(())
    }

    fn fill_missing_fields(target: &mut Person, donor: &Person) {
        if target.sex == Sex::U {
            target.sex = donor.sex;
        }
        for (slot, value) in [
            (&mut target.birth_date, &donor.birth_date),
            (&mut target.death_date, &donor.death_date),
            (&mut target.notes, &donor.notes),
        ] {
            let empty = slot.as_deref().is_none_or(|s| s.trim().is_empty());
            if empty && value.as_deref().is_some_and(|s| !s.trim().is_empty()) {
                *slot = value.clone();
            }
        }
        if !target.deceased() && donor.deceased() {
            target.is_deceased = Some(true);
        }
    }

    fn same_link(a: &Relationship, b: &Relationship) -> bool {
        if a.kind != b.kind {
            return false;
        }
        let forward = a.from_person_id == b.from_person_id && a.target() == b.target();
        match a.kind {
            RelType::SPOUSE_OF => {
                let reverse = Some(&a.from_person_id) == b.target()
                    && a.target() == Some(&b.from_person_id);
                forward || reverse
            }
            _ => forward,
        }
    }
}

impl Default for DraftMerger {
    fn default() -> Self {
        Self::new()
    }
}
