use crate::forest::LayoutForest;
use crate::graph::{FamilyGraph, PersonIndex, PersonNode};
use crate::label::node_label;
use crate::layout::Vec2;
use crate::scene::{Diagnostics, NodeMetadata, Scene, SceneEdge, SceneNode, SkippedEdge};
use crate::style::{NodeShape, Palette, SiblingColoring, get_edge_style, get_node_style};

/// Projects a positioned family graph into a scene payload.
pub struct SceneConverter {
    palette: Palette,
}

impl SceneConverter {
    pub fn new() -> Self {
        Self {
            palette: Palette::default(),
        }
    }

    pub fn with_palette(palette: Palette) -> Self {
        Self { palette }
    }

    fn metadata(node: &PersonNode, hover: String) -> NodeMetadata {
        let person = &node.person;
        NodeMetadata {
            hover,
            display_name: person.display_name.clone(),
            sex: person.sex,
            birth_date: person.birth_date.clone(),
            death_date: person.death_date.clone(),
            notes: person.notes.clone(),
            is_deceased: person.deceased(),
        }
    }

    pub fn convert(&self, graph: &FamilyGraph, forest: &LayoutForest, positions: &[Vec2]) -> Scene {
        let coloring = SiblingColoring::assign(graph, forest, self.palette.len());
        let position = |idx: PersonIndex| positions.get(idx.0).copied().unwrap_or_default();

        let nodes = graph
            .node_indices()
            .map(|idx| {
                let node = &graph[idx];
                let label = node_label(&node.person);
                let color = self.palette.color(coloring.slot(idx));
                let at = position(idx);
                SceneNode {
                    id: node.person.id.clone(),
                    label: label.display,
                    generation: forest.generation(idx),
                    x: at.x,
                    y: at.y,
                    color,
                    shape: NodeShape::for_sex(node.person.sex),
                    style: get_node_style(color, node.is_draft, node.marked_root),
                    is_draft: node.is_draft,
                    is_root: node.marked_root,
                    metadata: Self::metadata(node, label.hover),
                }
            })
            .collect();

        let edges = graph
            .links()
            .iter()
            .map(|link| SceneEdge {
                id: link.id.clone(),
                from_id: graph[link.from].person.id.clone(),
                to_id: graph[link.to].person.id.clone(),
                kind: link.kind,
                style: get_edge_style(link.kind, link.is_draft),
                from_pos: position(link.from),
                to_pos: position(link.to),
                is_draft: link.is_draft,
            })
            .collect();

        let diagnostics = Diagnostics {
            skipped_edges: forest
                .skipped()
                .iter()
                .map(|s| SkippedEdge {
                    parent: graph[s.parent].person.id.clone(),
                    child: graph[s.child].person.id.clone(),
                })
                .collect(),
            dropped_references: graph.dropped_references().to_vec(),
            implicit_roots: forest
                .implicit_roots()
                .iter()
                .map(|idx| graph[*idx].person.id.clone())
                .collect(),
        };

        Scene {
            nodes,
            edges,
            diagnostics,
        }
    }
}

impl Default for SceneConverter {
    fn default() -> Self {
        Self::new()
    }
}
