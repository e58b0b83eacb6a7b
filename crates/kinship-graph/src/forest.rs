//! Layout forest: the spanning structure every layouter positions.
//!
//! People are grouped into family units (an anchor plus the spouses attached
//! to it). Units form a forest by descent; each tree is a root cluster. The
//! forest fixes generations and horizontal slots once, so the hierarchical
//! and radial projections share the same cycle, orphan and spouse policy.

use crate::graph::{FamilyGraph, PersonIndex};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnitIndex(pub usize);

#[derive(Debug, Clone)]
pub struct FamilyUnit {
    pub anchor: PersonIndex,
    /// Spouses placed beside the anchor, in attachment order.
    pub partners: Vec<PersonIndex>,
    pub parent: Option<UnitIndex>,
    pub children: Vec<UnitIndex>,
    pub generation: u32,
    /// Slots reserved for this unit and all of its descendants.
    pub width: usize,
    /// First slot of the reserved range.
    pub left: usize,
    live: bool,
}

impl FamilyUnit {
    pub fn member_count(&self) -> usize {
        1 + self.partners.len()
    }

    pub fn members(&self) -> impl Iterator<Item = PersonIndex> + '_ {
        std::iter::once(self.anchor).chain(self.partners.iter().copied())
    }
}

/// A parent-to-child relationship the walk refused to follow because the
/// child was already placed (a cycle, or a second line of descent).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkippedLink {
    pub parent: PersonIndex,
    pub child: PersonIndex,
}

#[derive(Debug, Clone)]
pub struct LayoutForest {
    units: Vec<FamilyUnit>,
    clusters: Vec<UnitIndex>,
    unit_of: Vec<Option<UnitIndex>>,
    generation: Vec<u32>,
    slot: Vec<f32>,
    visit_order: Vec<PersonIndex>,
    skipped: Vec<SkippedLink>,
    implicit_roots: Vec<PersonIndex>,
    total_width: usize,
}

impl LayoutForest {
    /// Walks `graph` and assigns generations and slots. `cluster_gap` empty
    /// slots separate neighbouring root clusters.
    pub fn build(graph: &FamilyGraph, cluster_gap: usize) -> Self {
        let mut walker = ForestWalker::new(graph);

        // inferred roots include married-in spouses; they wait for their partner
        for &root in graph.roots() {
            let deferred = graph.roots_inferred() && married_in(graph, root);
            if !walker.visited[root.0] && !deferred {
                walker.plant(root);
            }
        }
        walker.attach_spouses();

        for pass in [Pass::SkipMarriedIn, Pass::Everyone] {
            for idx in graph.node_indices() {
                let wait = pass == Pass::SkipMarriedIn && married_in(graph, idx);
                if walker.visited[idx.0] || wait {
                    continue;
                }
                tracing::debug!(
                    "Person {} unreachable from any root; walking as implicit root",
                    graph[idx].person.id
                );
                walker.implicit_roots.push(idx);
                walker.plant(idx);
                walker.attach_spouses();
            }
        }

        if !walker.skipped.is_empty() {
            tracing::debug!(
                "Skipped {} parent-child links to already placed people",
                walker.skipped.len()
            );
        }

        walker.finish(cluster_gap)
    }

    pub fn units(&self) -> &[FamilyUnit] {
        &self.units
    }

    pub fn unit(&self, idx: UnitIndex) -> &FamilyUnit {
        &self.units[idx.0]
    }

    /// Root units in placement order.
    pub fn clusters(&self) -> &[UnitIndex] {
        &self.clusters
    }

    pub fn unit_of(&self, person: PersonIndex) -> Option<UnitIndex> {
        self.unit_of.get(person.0).copied().flatten()
    }

    pub fn generation(&self, person: PersonIndex) -> u32 {
        self.generation[person.0]
    }

    /// Horizontal position in slot units.
    pub fn slot(&self, person: PersonIndex) -> f32 {
        self.slot[person.0]
    }

    /// Every person exactly once, in the order the walk placed them.
    pub fn visit_order(&self) -> &[PersonIndex] {
        &self.visit_order
    }

    pub fn skipped(&self) -> &[SkippedLink] {
        &self.skipped
    }

    pub fn implicit_roots(&self) -> &[PersonIndex] {
        &self.implicit_roots
    }

    pub fn person_count(&self) -> usize {
        self.generation.len()
    }

    pub fn total_width(&self) -> usize {
        self.total_width
    }

    /// Number of people in the unit and all of its descendants, indexed by
    /// unit. Folded units report zero.
    pub fn subtree_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.units.len()];
        for (i, unit) in self.units.iter().enumerate().rev() {
            if !unit.live {
                continue;
            }
            let below: usize = unit.children.iter().map(|c| sizes[c.0]).sum();
            sizes[i] = unit.member_count() + below;
        }
        sizes
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Pass {
    SkipMarriedIn,
    Everyone,
}

/// Parentless person married to someone with recorded parents.
fn married_in(graph: &FamilyGraph, person: PersonIndex) -> bool {
    graph.parents_of(person).is_empty()
        && graph
            .spouses_of(person)
            .iter()
            .any(|spouse| !graph.parents_of(*spouse).is_empty())
}

struct ForestWalker<'g> {
    graph: &'g FamilyGraph,
    units: Vec<FamilyUnit>,
    clusters: Vec<UnitIndex>,
    unit_of: Vec<Option<UnitIndex>>,
    visited: Vec<bool>,
    visit_order: Vec<PersonIndex>,
    skipped: Vec<SkippedLink>,
    implicit_roots: Vec<PersonIndex>,
    // next position in visit_order whose spouses have not been examined
    cursor: usize,
}

impl<'g> ForestWalker<'g> {
    fn new(graph: &'g FamilyGraph) -> Self {
        Self {
            graph,
            units: Vec::new(),
            clusters: Vec::new(),
            unit_of: vec![None; graph.len()],
            visited: vec![false; graph.len()],
            visit_order: Vec::with_capacity(graph.len()),
            skipped: Vec::new(),
            implicit_roots: Vec::new(),
            cursor: 0,
        }
    }

    fn plant(&mut self, root: PersonIndex) {
        let unit = self.open_unit(root, None, 0);
        self.clusters.push(unit);
        self.descend(unit, root);
    }

    fn open_unit(
        &mut self,
        anchor: PersonIndex,
        parent: Option<UnitIndex>,
        generation: u32,
    ) -> UnitIndex {
        let idx = UnitIndex(self.units.len());
        self.units.push(FamilyUnit {
            anchor,
            partners: Vec::new(),
            parent,
            children: Vec::new(),
            generation,
            width: 0,
            left: 0,
            live: true,
        });
        if let Some(parent) = parent {
            self.units[parent.0].children.push(idx);
        }
        self.visited[anchor.0] = true;
        self.unit_of[anchor.0] = Some(idx);
        self.visit_order.push(anchor);
        idx
    }

    /// Depth-first walk of `member`'s descendants, hanging each newly placed
    /// child under `unit`. Uses an explicit stack so long lines of descent
    /// cannot exhaust the call stack.
    fn descend(&mut self, unit: UnitIndex, member: PersonIndex) {
        let graph = self.graph;
        let mut stack: Vec<(UnitIndex, PersonIndex, usize)> = vec![(unit, member, 0)];

        while let Some(frame) = stack.last_mut() {
            let (owner, person, next) = *frame;
            let children = graph.children_of(person);
            let Some(&child) = children.get(next) else {
                stack.pop();
                continue;
            };
            frame.2 += 1;

            if self.visited[child.0] {
                // a child shared with a partner is already in this unit's family
                let shared = self
                    .unit_of[child.0]
                    .is_some_and(|u| self.units[u.0].parent == Some(owner));
                if !shared {
                    self.skipped.push(SkippedLink {
                        parent: person,
                        child,
                    });
                }
                continue;
            }

            let generation = self.units[owner.0].generation + 1;
            let child_unit = self.open_unit(child, Some(owner), generation);
            stack.push((child_unit, child, 0));
        }
    }

    /// Places spouses next to their partners for every person visited so far,
    /// including people this pass places itself.
    fn attach_spouses(&mut self) {
        let graph = self.graph;
        while self.cursor < self.visit_order.len() {
            let person = self.visit_order[self.cursor];
            self.cursor += 1;

            for &spouse in graph.spouses_of(person) {
                let Some(unit) = self.unit_of[person.0] else {
                    continue;
                };
                if !self.visited[spouse.0] {
                    self.join(unit, spouse);
                    self.descend(unit, spouse);
                } else if let Some(leaf) = self.movable_unit(spouse)
                    && leaf != unit
                {
                    self.detach(leaf);
                    self.join(unit, spouse);
                }
            }
        }
    }

    fn join(&mut self, unit: UnitIndex, spouse: PersonIndex) {
        if !self.visited[spouse.0] {
            self.visited[spouse.0] = true;
            self.visit_order.push(spouse);
        }
        self.unit_of[spouse.0] = Some(unit);
        self.units[unit.0].partners.push(spouse);
    }

    /// The unit `person` anchors when nobody else is in it and nothing hangs
    /// below it. Such a person can move next to a partner without
    /// detaching anyone.
    fn movable_unit(&self, person: PersonIndex) -> Option<UnitIndex> {
        let idx = self.unit_of[person.0]?;
        let unit = &self.units[idx.0];
        let movable = unit.live
            && unit.anchor == person
            && unit.children.is_empty()
            && unit.partners.is_empty();
        movable.then_some(idx)
    }

    fn detach(&mut self, idx: UnitIndex) {
        self.units[idx.0].live = false;
        match self.units[idx.0].parent {
            Some(parent) => self.units[parent.0].children.retain(|c| *c != idx),
            None => {
                let anchor = self.units[idx.0].anchor;
                self.clusters.retain(|c| *c != idx);
                self.implicit_roots.retain(|p| *p != anchor);
            }
        }
    }

    fn finish(mut self, cluster_gap: usize) -> LayoutForest {
        let count = self.units.len();

        // post-order: parents always precede their children in the arena
        for i in (0..count).rev() {
            if !self.units[i].live {
                continue;
            }
            let below: usize = self.units[i]
                .children
                .iter()
                .map(|c| self.units[c.0].width)
                .sum();
            self.units[i].width = self.units[i].member_count().max(below);
        }

        let mut cursor = 0;
        for (n, root) in self.clusters.iter().enumerate() {
            if n > 0 {
                cursor += cluster_gap;
            }
            self.units[root.0].left = cursor;
            cursor += self.units[root.0].width;
        }
        let total_width = cursor;

        // pre-order: center each children block inside its parent's range
        for i in 0..count {
            if !self.units[i].live || self.units[i].children.is_empty() {
                continue;
            }
            let children = self.units[i].children.clone();
            let block: usize = children.iter().map(|c| self.units[c.0].width).sum();
            let mut left = self.units[i].left + (self.units[i].width - block) / 2;
            for child in children {
                self.units[child.0].left = left;
                left += self.units[child.0].width;
            }
        }

        let mut anchor_slot = vec![0.0f32; count];
        for i in (0..count).rev() {
            let unit = &self.units[i];
            if !unit.live {
                continue;
            }
            let span = unit.member_count() as f32;
            let lo = unit.left as f32;
            let hi = (unit.left + unit.width - unit.member_count()) as f32;
            anchor_slot[i] = if unit.children.is_empty() {
                lo
            } else {
                let centers: f32 = unit
                    .children
                    .iter()
                    .map(|c| anchor_slot[c.0] + (self.units[c.0].member_count() as f32 - 1.0) / 2.0)
                    .sum();
                let centroid = centers / unit.children.len() as f32;
                (centroid - (span - 1.0) / 2.0).clamp(lo, hi)
            };
        }

        let people = self.graph.len();
        let mut generation = vec![0u32; people];
        let mut slot = vec![0.0f32; people];
        for (i, unit) in self.units.iter().enumerate() {
            if !unit.live {
                continue;
            }
            for (k, member) in unit.members().enumerate() {
                generation[member.0] = unit.generation;
                slot[member.0] = anchor_slot[i] + k as f32;
            }
        }

        LayoutForest {
            units: self.units,
            clusters: self.clusters,
            unit_of: self.unit_of,
            generation,
            slot,
            visit_order: self.visit_order,
            skipped: self.skipped,
            implicit_roots: self.implicit_roots,
            total_width,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kinship_core::{Person, PersonId, Relationship};

    fn build(people: &[&str], rels: Vec<Relationship>) -> (FamilyGraph, LayoutForest) {
        let people: Vec<Person> = people.iter().map(|id| Person::new(*id, *id)).collect();
        let graph = FamilyGraph::build(&people, &rels);
        let forest = LayoutForest::build(&graph, 1);
        (graph, forest)
    }

    fn at(graph: &FamilyGraph, id: &str) -> PersonIndex {
        graph.index_of(&PersonId::from(id)).unwrap()
    }

    #[test]
    fn test_spouse_sits_right_of_partner() {
        let (graph, forest) = build(
            &["a", "b", "c"],
            vec![
                Relationship::earliest_ancestor("r0", "a"),
                Relationship::child_of("r1", "b", "a"),
                Relationship::spouse_of("r2", "c", "b"),
            ],
        );
        let (a, b, c) = (at(&graph, "a"), at(&graph, "b"), at(&graph, "c"));

        assert_eq!(forest.generation(a), 0);
        assert_eq!(forest.generation(b), 1);
        assert_eq!(forest.generation(c), 1);
        assert_eq!(forest.slot(c), forest.slot(b) + 1.0);
        assert_eq!(forest.unit_of(b), forest.unit_of(c));
        assert!(forest.skipped().is_empty());
    }

    #[test]
    fn test_married_in_root_is_folded() {
        // no marker: both c and a are parentless roots
        let (graph, forest) = build(
            &["c", "a", "b"],
            vec![
                Relationship::child_of("r1", "b", "a"),
                Relationship::spouse_of("r2", "c", "b"),
            ],
        );
        let (b, c) = (at(&graph, "b"), at(&graph, "c"));

        assert_eq!(forest.clusters().len(), 1);
        assert_eq!(forest.generation(c), 1);
        assert_eq!(forest.slot(c), forest.slot(b) + 1.0);
    }

    #[test]
    fn test_married_in_parent_joins_partner_in_any_order() {
        let rels = vec![
            Relationship::child_of("r1", "b", "a"),
            Relationship::spouse_of("r2", "c", "b"),
            Relationship::child_of("r3", "d", "b"),
            Relationship::child_of("r4", "d", "c"),
        ];
        let orders: [[&str; 4]; 5] = [
            ["c", "a", "b", "d"],
            ["a", "b", "c", "d"],
            ["d", "c", "b", "a"],
            ["c", "d", "a", "b"],
            ["b", "d", "c", "a"],
        ];
        for order in orders {
            let (graph, forest) = build(&order, rels.clone());
            let (a, b, c, d) = (at(&graph, "a"), at(&graph, "b"), at(&graph, "c"), at(&graph, "d"));

            assert_eq!(forest.clusters().len(), 1, "order {order:?}");
            assert_eq!(forest.generation(a), 0, "order {order:?}");
            assert_eq!(forest.generation(b), 1, "order {order:?}");
            assert_eq!(forest.generation(c), 1, "order {order:?}");
            assert_eq!(forest.generation(d), 2, "order {order:?}");
            assert_eq!(forest.slot(c), forest.slot(b) + 1.0, "order {order:?}");
            assert!(forest.implicit_roots().is_empty(), "order {order:?}");
            assert!(forest.skipped().is_empty(), "order {order:?}");
        }
    }

    #[test]
    fn test_leaf_spouse_moves_across_families() {
        let (graph, forest) = build(
            &["a", "b", "x", "y"],
            vec![
                Relationship::earliest_ancestor("r0", "a"),
                Relationship::earliest_ancestor("r1", "x"),
                Relationship::child_of("r2", "b", "a"),
                Relationship::child_of("r3", "y", "x"),
                Relationship::spouse_of("r4", "b", "y"),
            ],
        );
        let (b, x, y) = (at(&graph, "b"), at(&graph, "x"), at(&graph, "y"));

        assert_eq!(forest.clusters().len(), 2);
        assert_eq!(forest.unit_of(y), forest.unit_of(b));
        assert_eq!(forest.generation(y), 1);
        assert_eq!(forest.slot(y), forest.slot(b) + 1.0);
        let x_unit = forest.unit(forest.unit_of(x).unwrap());
        assert!(x_unit.children.is_empty());
        assert_eq!(x_unit.width, 1);
        assert_eq!(forest.slot(x), 3.0);
    }

    #[test]
    fn test_spouse_with_own_subtree_stays() {
        let (graph, forest) = build(
            &["a", "b", "x", "y"],
            vec![
                Relationship::earliest_ancestor("r0", "a"),
                Relationship::earliest_ancestor("r1", "x"),
                Relationship::child_of("r2", "b", "a"),
                Relationship::child_of("r3", "y", "x"),
                Relationship::spouse_of("r4", "a", "x"),
            ],
        );
        let (x, y) = (at(&graph, "x"), at(&graph, "y"));

        assert_eq!(forest.clusters().len(), 2);
        assert_eq!(forest.generation(x), 0);
        assert_eq!(forest.generation(y), 1);
        assert_eq!(forest.unit(forest.unit_of(x).unwrap()).anchor, x);
    }

    #[test]
    fn test_shared_children_are_not_reported() {
        let (graph, forest) = build(
            &["m", "f", "k1", "k2"],
            vec![
                Relationship::earliest_ancestor("r0", "m"),
                Relationship::spouse_of("r1", "m", "f"),
                Relationship::child_of("r2", "k1", "m"),
                Relationship::child_of("r3", "k1", "f"),
                Relationship::child_of("r4", "k2", "f"),
            ],
        );
        let (m, f, k1, k2) = (at(&graph, "m"), at(&graph, "f"), at(&graph, "k1"), at(&graph, "k2"));

        assert!(forest.skipped().is_empty());
        assert_eq!(forest.generation(k2), 1);
        // couple is centered over the children block
        assert_eq!(forest.slot(m), 0.0);
        assert_eq!(forest.slot(f), 1.0);
        assert_eq!(forest.slot(k1), 0.0);
        assert_eq!(forest.slot(k2), 1.0);
    }

    #[test]
    fn test_cycle_terminates_with_skipped_link() {
        let (graph, forest) = build(
            &["a", "b", "c"],
            vec![
                Relationship::child_of("r1", "a", "b"),
                Relationship::child_of("r2", "b", "c"),
                Relationship::child_of("r3", "c", "a"),
            ],
        );

        assert_eq!(forest.visit_order().len(), 3);
        assert_eq!(forest.implicit_roots(), &[at(&graph, "a")]);
        assert_eq!(forest.skipped().len(), 1);
        let gens: Vec<u32> = graph.node_indices().map(|p| forest.generation(p)).collect();
        assert_eq!(gens, vec![0, 2, 1]);
    }

    #[test]
    fn test_first_walk_wins_for_cross_links() {
        // d descends from both roots; the first root claims it
        let (graph, forest) = build(
            &["a", "b", "d"],
            vec![
                Relationship::earliest_ancestor("r0", "a"),
                Relationship::earliest_ancestor("r1", "b"),
                Relationship::child_of("r2", "d", "a"),
                Relationship::child_of("r3", "d", "b"),
            ],
        );
        let (a, d) = (at(&graph, "a"), at(&graph, "d"));

        let owner = forest.unit(forest.unit_of(d).unwrap()).parent.unwrap();
        assert_eq!(forest.unit(owner).anchor, a);
        assert_eq!(forest.skipped().len(), 1);
    }

    #[test]
    fn test_widths_reserve_space_for_descendants() {
        let (graph, forest) = build(
            &["a", "b", "c", "b1", "b2", "b3"],
            vec![
                Relationship::earliest_ancestor("r0", "a"),
                Relationship::child_of("r1", "b", "a"),
                Relationship::child_of("r2", "c", "a"),
                Relationship::child_of("r3", "b1", "b"),
                Relationship::child_of("r4", "b2", "b"),
                Relationship::child_of("r5", "b3", "b"),
            ],
        );
        let root = forest.clusters()[0];
        assert_eq!(forest.unit(root).width, 4);
        assert_eq!(forest.slot(at(&graph, "b")), 1.0);
        assert_eq!(forest.slot(at(&graph, "c")), 3.0);
        assert_eq!(forest.slot(at(&graph, "a")), 2.0);
        assert_eq!(forest.subtree_sizes()[root.0], 6);
    }

    #[test]
    fn test_deep_chain_does_not_recurse() {
        let ids: Vec<String> = (0..20_000).map(|i| format!("p{i}")).collect();
        let people: Vec<Person> = ids.iter().map(|id| Person::new(id.as_str(), id.as_str())).collect();
        let rels: Vec<Relationship> = (1..ids.len())
            .map(|i| Relationship::child_of(format!("r{i}"), ids[i].as_str(), ids[i - 1].as_str()))
            .collect();
        let graph = FamilyGraph::build(&people, &rels);
        let forest = LayoutForest::build(&graph, 1);

        assert_eq!(forest.generation(PersonIndex(19_999)), 19_999);
    }
}
