use kinship_core::{Person, PersonId, RelType, Relationship, RelationshipId};
use kinship_draft::MergedGraph;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::ops::Index;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PersonIndex(pub usize);

impl fmt::Display for PersonIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct PersonNode {
    pub person: Person,
    pub is_draft: bool,
    /// Named by an EARLIEST_ANCESTOR marker.
    pub marked_root: bool,
}

/// A resolved, edge-producing relationship. `from` and `to` keep the
/// persisted direction (`CHILD_OF`: child to parent).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FamilyLink {
    pub id: RelationshipId,
    pub kind: RelType,
    pub from: PersonIndex,
    pub to: PersonIndex,
    pub is_draft: bool,
}

/// A relationship endpoint that named a person who is not in the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DroppedReference {
    pub relationship_id: RelationshipId,
    pub missing: PersonId,
}

/// Adjacency view over one merged people/relationship set.
///
/// People live in an arena indexed by `PersonIndex` in input order; every
/// adjacency list preserves relationship order. Building never fails:
/// references to unknown people are dropped and recorded.
#[derive(Debug, Default)]
pub struct FamilyGraph {
    nodes: Vec<PersonNode>,
    node_map: HashMap<PersonId, PersonIndex>,
    children_of: Vec<Vec<PersonIndex>>,
    parents_of: Vec<Vec<PersonIndex>>,
    spouses_of: Vec<Vec<PersonIndex>>,
    roots: Vec<PersonIndex>,
    roots_inferred: bool,
    links: Vec<FamilyLink>,
    dropped: Vec<DroppedReference>,
}

impl FamilyGraph {
    /// Builds from published records; nothing is flagged as a draft.
    pub fn build(people: &[Person], relationships: &[Relationship]) -> Self {
        Self::from_records(
            people.iter().map(|p| (p, false)),
            relationships.iter().map(|r| (r, false)),
        )
    }

    pub fn from_merged(merged: &MergedGraph) -> Self {
        Self::from_records(
            merged.people.iter().map(|p| (&p.person, p.is_draft)),
            merged.relationships.iter().map(|r| (&r.relationship, r.is_draft)),
        )
    }

    pub fn from_records<'a>(
        people: impl IntoIterator<Item = (&'a Person, bool)>,
        relationships: impl IntoIterator<Item = (&'a Relationship, bool)>,
    ) -> Self {
        let mut graph = Self::default();
        for (person, is_draft) in people {
            graph.add_person(person, is_draft);
        }

        let mut seen_links: HashSet<(RelType, PersonIndex, PersonIndex)> = HashSet::new();
        let mut marked: Vec<PersonIndex> = Vec::new();
        for (relationship, is_draft) in relationships {
            graph.add_relationship(relationship, is_draft, &mut seen_links, &mut marked);
        }

        if marked.is_empty() {
            graph.roots = graph
                .node_indices()
                .filter(|idx| graph.parents_of[idx.0].is_empty())
                .collect();
            graph.roots_inferred = true;
        } else {
            for idx in &marked {
                graph.nodes[idx.0].marked_root = true;
            }
            graph.roots = marked;
        }

        if !graph.dropped.is_empty() {
            tracing::debug!(
                "Dropped {} relationship endpoints naming unknown people",
                graph.dropped.len()
            );
        }
        graph
    }

    fn add_person(&mut self, person: &Person, is_draft: bool) {
        if self.node_map.contains_key(&person.id) {
            tracing::warn!("Ignoring duplicate person record {}", person.id);
            return;
        }
        let idx = PersonIndex(self.nodes.len());
        self.nodes.push(PersonNode {
            person: person.clone(),
            is_draft,
            marked_root: false,
        });
        self.node_map.insert(person.id.clone(), idx);
        self.children_of.push(Vec::new());
        self.parents_of.push(Vec::new());
        self.spouses_of.push(Vec::new());
    }

    fn resolve(&mut self, relationship: &Relationship, id: &PersonId) -> Option<PersonIndex> {
        let found = self.node_map.get(id).copied();
        if found.is_none() {
            tracing::debug!(
                "Dropping relationship {} endpoint: person {} is missing from the graph",
                relationship.id,
                id
            );
            self.dropped.push(DroppedReference {
                relationship_id: relationship.id.clone(),
                missing: id.clone(),
            });
        }
        found
    }

    fn add_relationship(
        &mut self,
        relationship: &Relationship,
        is_draft: bool,
        seen_links: &mut HashSet<(RelType, PersonIndex, PersonIndex)>,
        marked: &mut Vec<PersonIndex>,
    ) {
        if relationship.kind == RelType::EARLIEST_ANCESTOR {
            if let Some(idx) = self.resolve(relationship, &relationship.from_person_id)
                && !marked.contains(&idx)
            {
                marked.push(idx);
            }
            return;
        }

        let Some(target_id) = relationship.target() else {
            tracing::debug!(
                "Relationship {} of type {:?} has no target; ignoring",
                relationship.id,
                relationship.kind
            );
            return;
        };
        let from = self.resolve(relationship, &relationship.from_person_id);
        let to = self.resolve(relationship, target_id);
        let (Some(from), Some(to)) = (from, to) else {
            return;
        };
        if from == to {
            tracing::debug!("Ignoring self-referencing relationship {}", relationship.id);
            return;
        }

        let key = match relationship.kind {
            RelType::SPOUSE_OF => (RelType::SPOUSE_OF, from.min(to), from.max(to)),
            kind => (kind, from, to),
        };
        if !seen_links.insert(key) {
            return;
        }

        match relationship.kind {
            RelType::CHILD_OF => {
                self.children_of[to.0].push(from);
                self.parents_of[from.0].push(to);
            }
            RelType::SPOUSE_OF => {
                self.spouses_of[from.0].push(to);
                self.spouses_of[to.0].push(from);
            }
            RelType::EARLIEST_ANCESTOR => {}
        }
        self.links.push(FamilyLink {
            id: relationship.id.clone(),
            kind: relationship.kind,
            from,
            to,
            is_draft,
        });
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node_indices(&self) -> impl Iterator<Item = PersonIndex> + use<> {
        (0..self.nodes.len()).map(PersonIndex)
    }

    pub fn nodes(&self) -> &[PersonNode] {
        &self.nodes
    }

    pub fn index_of(&self, id: &PersonId) -> Option<PersonIndex> {
        self.node_map.get(id).copied()
    }

    pub fn get(&self, id: &PersonId) -> Option<&PersonNode> {
        self.index_of(id).map(|idx| &self.nodes[idx.0])
    }

    pub fn children_of(&self, idx: PersonIndex) -> &[PersonIndex] {
        &self.children_of[idx.0]
    }

    pub fn parents_of(&self, idx: PersonIndex) -> &[PersonIndex] {
        &self.parents_of[idx.0]
    }

    pub fn spouses_of(&self, idx: PersonIndex) -> &[PersonIndex] {
        &self.spouses_of[idx.0]
    }

    /// Layout roots: marked ancestors in first-seen order, or every
    /// parentless person when no marker exists.
    pub fn roots(&self) -> &[PersonIndex] {
        &self.roots
    }

    pub fn roots_inferred(&self) -> bool {
        self.roots_inferred
    }

    pub fn links(&self) -> &[FamilyLink] {
        &self.links
    }

    pub fn dropped_references(&self) -> &[DroppedReference] {
        &self.dropped
    }
}

impl Index<PersonIndex> for FamilyGraph {
    type Output = PersonNode;
    fn index(&self, index: PersonIndex) -> &Self::Output {
        &self.nodes[index.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(graph: &FamilyGraph, list: &[PersonIndex]) -> Vec<String> {
        list.iter()
            .map(|idx| graph[*idx].person.id.to_string())
            .collect()
    }

    fn idx(graph: &FamilyGraph, id: &str) -> PersonIndex {
        graph.index_of(&PersonId::from(id)).unwrap()
    }

    #[test]
    fn test_adjacency_and_marked_roots() {
        let people = vec![
            Person::new("a", "A"),
            Person::new("b", "B"),
            Person::new("c", "C"),
        ];
        let rels = vec![
            Relationship::earliest_ancestor("r0", "a"),
            Relationship::child_of("r1", "b", "a"),
            Relationship::spouse_of("r2", "c", "b"),
            Relationship::earliest_ancestor("r3", "a"),
        ];
        let graph = FamilyGraph::build(&people, &rels);

        let (a, b, c) = (idx(&graph, "a"), idx(&graph, "b"), idx(&graph, "c"));
        assert_eq!(graph.children_of(a), &[b]);
        assert_eq!(graph.parents_of(b), &[a]);
        assert_eq!(graph.spouses_of(b), &[c]);
        assert_eq!(graph.spouses_of(c), &[b]);
        assert_eq!(graph.roots(), &[a]);
        assert!(!graph.roots_inferred());
        assert!(graph[a].marked_root);
        assert_eq!(graph.links().len(), 2);
    }

    #[test]
    fn test_roots_inferred_without_marker() {
        let people = vec![
            Person::new("c", "C"),
            Person::new("a", "A"),
            Person::new("b", "B"),
        ];
        let rels = vec![Relationship::child_of("r1", "b", "a")];
        let graph = FamilyGraph::build(&people, &rels);

        assert!(graph.roots_inferred());
        assert_eq!(ids(&graph, graph.roots()), vec!["c", "a"]);
        assert!(graph.nodes().iter().all(|n| !n.marked_root));
    }

    #[test]
    fn test_duplicates_collapse() {
        let people = vec![
            Person::new("a", "A"),
            Person::new("b", "B"),
            Person::new("a", "Shadow"),
        ];
        let rels = vec![
            Relationship::spouse_of("r1", "a", "b"),
            Relationship::spouse_of("r2", "b", "a"),
            Relationship::child_of("r3", "b", "a"),
            Relationship::child_of("r4", "b", "a"),
            Relationship::spouse_of("r5", "a", "a"),
        ];
        let graph = FamilyGraph::build(&people, &rels);

        assert_eq!(graph.len(), 2);
        assert_eq!(graph[idx(&graph, "a")].person.display_name, "A");
        let (a, b) = (idx(&graph, "a"), idx(&graph, "b"));
        assert_eq!(graph.spouses_of(a), &[b]);
        assert_eq!(graph.children_of(a), &[b]);
        let link_ids: Vec<_> = graph.links().iter().map(|l| l.id.0.as_str()).collect();
        assert_eq!(link_ids, vec!["r1", "r3"]);
    }

    #[test]
    fn test_unknown_references_are_dropped() {
        let people = vec![Person::new("a", "A")];
        let rels = vec![
            Relationship::child_of("r1", "ghost", "a"),
            Relationship::earliest_ancestor("r2", "nobody"),
        ];
        let graph = FamilyGraph::build(&people, &rels);

        assert!(graph.links().is_empty());
        assert_eq!(graph.dropped_references().len(), 2);
        assert_eq!(graph.dropped_references()[0].missing, PersonId::from("ghost"));
        // the only marker was dropped, so roots fall back to parentless people
        assert!(graph.roots_inferred());
        assert_eq!(ids(&graph, graph.roots()), vec!["a"]);
    }

    #[test]
    fn test_root_marker_target_is_ignored() {
        let people = vec![Person::new("a", "A"), Person::new("b", "B")];
        let mut marker = Relationship::earliest_ancestor("r1", "a");
        marker.to_person_id = Some(PersonId::from("b"));
        let graph = FamilyGraph::build(&people, &[marker]);

        assert!(graph.links().is_empty());
        assert!(graph.children_of(idx(&graph, "b")).is_empty());
        assert_eq!(ids(&graph, graph.roots()), vec!["a"]);
    }
}
