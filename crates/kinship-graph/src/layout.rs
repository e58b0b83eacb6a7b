use crate::forest::{LayoutForest, UnitIndex};
use crate::graph::PersonIndex;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Projects a layout forest to coordinates, one entry per person index.
pub trait Layouter {
    fn execute(&self, forest: &LayoutForest) -> Vec<Vec2>;
}

/// Generations stacked top to bottom, slots left to right.
pub struct HierarchicalLayouter {
    pub unit_width: f32,
    pub layer_gap: f32,
}

impl HierarchicalLayouter {
    pub const DEFAULT_UNIT_WIDTH: f32 = 120.0;
    pub const DEFAULT_LAYER_GAP: f32 = 150.0;
}

impl Default for HierarchicalLayouter {
    fn default() -> Self {
        Self {
            unit_width: Self::DEFAULT_UNIT_WIDTH,
            layer_gap: Self::DEFAULT_LAYER_GAP,
        }
    }
}

impl Layouter for HierarchicalLayouter {
    fn execute(&self, forest: &LayoutForest) -> Vec<Vec2> {
        (0..forest.person_count())
            .map(|i| {
                let person = PersonIndex(i);
                Vec2::new(
                    forest.slot(person) * self.unit_width,
                    forest.generation(person) as f32 * self.layer_gap,
                )
            })
            .collect()
    }
}

/// Balanced radial layout.
///
/// Each family unit receives an angular sector proportional to the number of
/// people below it, with depth-aware padding between siblings. Radius grows
/// faster than linearly with depth so outer rings keep room for wide
/// generations. Several clusters (or a root couple) hang off a virtual
/// centre so nobody sits at the origin on top of someone else.
pub struct RadialLayouter {
    pub layer_gap: f32,
    pub radial_scale: f32,
    pub child_padding: f32,
    pub depth_padding_scale: f32,
}

impl RadialLayouter {
    pub const DEFAULT_RADIAL_SCALE: f32 = 0.18;
    pub const DEFAULT_CHILD_PADDING: f32 = 0.03;
    pub const DEFAULT_DEPTH_PADDING_SCALE: f32 = 0.5;
    /// Floor on the share of a sector left for children after padding.
    const MIN_USABLE_FRACTION: f32 = 0.3;

    pub fn effective_radius(&self, depth: u32) -> f32 {
        if depth == 0 {
            return 0.0;
        }
        let depth = depth as f32;
        depth * self.layer_gap * (1.0 + self.radial_scale * (depth - 1.0).max(0.0))
    }

    fn padding_at(&self, depth: u32) -> f32 {
        let extra = depth.saturating_sub(1) as f32;
        self.child_padding * (1.0 + self.depth_padding_scale * extra)
    }

    fn split(
        &self,
        children: &[UnitIndex],
        sizes: &[usize],
        depth: u32,
        a0: f32,
        a1: f32,
        out: &mut Vec<(UnitIndex, u32, f32, f32)>,
    ) {
        let total: usize = children.iter().map(|c| sizes[c.0]).sum();
        if total == 0 {
            return;
        }
        let pad = self.padding_at(depth);
        let total_pad = pad * children.len().saturating_sub(1) as f32;
        let span = a1 - a0;
        let usable = (span - total_pad).max(span * Self::MIN_USABLE_FRACTION);

        let mut cur = a0;
        for child in children {
            let share = sizes[child.0] as f32 / total as f32;
            let kspan = usable * share;
            out.push((*child, depth + 1, cur, cur + kspan));
            cur += kspan + pad;
        }
    }
}

impl Default for RadialLayouter {
    fn default() -> Self {
        Self {
            layer_gap: HierarchicalLayouter::DEFAULT_LAYER_GAP,
            radial_scale: Self::DEFAULT_RADIAL_SCALE,
            child_padding: Self::DEFAULT_CHILD_PADDING,
            depth_padding_scale: Self::DEFAULT_DEPTH_PADDING_SCALE,
        }
    }
}

impl Layouter for RadialLayouter {
    fn execute(&self, forest: &LayoutForest) -> Vec<Vec2> {
        let mut positions = vec![Vec2::default(); forest.person_count()];
        let clusters = forest.clusters();
        if clusters.is_empty() {
            return positions;
        }

        let sizes = forest.subtree_sizes();
        let virtual_centre = clusters.len() > 1 || forest.unit(clusters[0]).member_count() > 1;

        let mut pending: Vec<(UnitIndex, u32, f32, f32)> = Vec::new();
        if virtual_centre {
            self.split(clusters, &sizes, 0, 0.0, TAU, &mut pending);
        } else {
            pending.push((clusters[0], 0, 0.0, TAU));
        }
        // process in sibling order
        pending.reverse();

        while let Some((idx, depth, a0, a1)) = pending.pop() {
            let unit = forest.unit(idx);
            let radius = self.effective_radius(depth);
            let mid = 0.5 * (a0 + a1);

            // members share one person's worth of sector each, centred on mid
            let step = (a1 - a0) / sizes[idx.0].max(1) as f32;
            let offset = (unit.member_count() as f32 - 1.0) / 2.0;
            for (k, member) in unit.members().enumerate() {
                let angle = mid + (k as f32 - offset) * step;
                positions[member.0] = Vec2::new(radius * angle.cos(), radius * angle.sin());
            }

            let mut next = Vec::new();
            self.split(&unit.children, &sizes, depth, a0, a1, &mut next);
            pending.extend(next.into_iter().rev());
        }

        positions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::FamilyGraph;
    use kinship_core::{Person, PersonId, Relationship};

    fn forest(people: &[&str], rels: Vec<Relationship>) -> (FamilyGraph, LayoutForest) {
        let people: Vec<Person> = people.iter().map(|id| Person::new(*id, *id)).collect();
        let graph = FamilyGraph::build(&people, &rels);
        let forest = LayoutForest::build(&graph, 1);
        (graph, forest)
    }

    fn pos(graph: &FamilyGraph, positions: &[Vec2], id: &str) -> Vec2 {
        positions[graph.index_of(&PersonId::from(id)).unwrap().0]
    }

    fn distance(a: Vec2, b: Vec2) -> f32 {
        ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
    }

    #[test]
    fn test_hierarchical_scales_slots_and_generations() {
        let (graph, forest) = forest(
            &["a", "b", "c"],
            vec![
                Relationship::earliest_ancestor("r0", "a"),
                Relationship::child_of("r1", "b", "a"),
                Relationship::child_of("r2", "c", "a"),
            ],
        );
        let layouter = HierarchicalLayouter {
            unit_width: 10.0,
            layer_gap: 100.0,
        };
        let positions = layouter.execute(&forest);

        assert_eq!(pos(&graph, &positions, "b"), Vec2::new(0.0, 100.0));
        assert_eq!(pos(&graph, &positions, "c"), Vec2::new(10.0, 100.0));
        assert_eq!(pos(&graph, &positions, "a"), Vec2::new(5.0, 0.0));
    }

    #[test]
    fn test_radial_single_root_at_origin() {
        let (graph, forest) = forest(
            &["a", "b", "c"],
            vec![
                Relationship::child_of("r1", "b", "a"),
                Relationship::child_of("r2", "c", "a"),
            ],
        );
        let layouter = RadialLayouter::default();
        let positions = layouter.execute(&forest);

        let origin = Vec2::default();
        assert_eq!(pos(&graph, &positions, "a"), origin);
        let ring = layouter.effective_radius(1);
        for id in ["b", "c"] {
            assert!((distance(pos(&graph, &positions, id), origin) - ring).abs() < 1e-3);
        }
        assert!(distance(pos(&graph, &positions, "b"), pos(&graph, &positions, "c")) > 1.0);
    }

    #[test]
    fn test_radial_multiple_roots_use_first_ring() {
        let (graph, forest) = forest(
            &["a", "x", "b"],
            vec![
                Relationship::earliest_ancestor("r0", "a"),
                Relationship::earliest_ancestor("r1", "x"),
                Relationship::child_of("r2", "b", "a"),
            ],
        );
        let layouter = RadialLayouter::default();
        let positions = layouter.execute(&forest);
        let origin = Vec2::default();

        let first = layouter.effective_radius(1);
        let second = layouter.effective_radius(2);
        assert!((distance(pos(&graph, &positions, "a"), origin) - first).abs() < 1e-3);
        assert!((distance(pos(&graph, &positions, "x"), origin) - first).abs() < 1e-3);
        assert!((distance(pos(&graph, &positions, "b"), origin) - second).abs() < 1e-3);
    }

    #[test]
    fn test_effective_radius_grows_super_linearly() {
        let layouter = RadialLayouter {
            layer_gap: 4.0,
            ..RadialLayouter::default()
        };
        assert_eq!(layouter.effective_radius(0), 0.0);
        assert_eq!(layouter.effective_radius(1), 4.0);
        assert!((layouter.effective_radius(3) - 3.0 * 4.0 * 1.36).abs() < 1e-4);
    }
}
