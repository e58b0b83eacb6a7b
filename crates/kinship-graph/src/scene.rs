use crate::graph::DroppedReference;
use crate::layout::Vec2;
use crate::style::{Color, EdgeStyle, NodeShape, NodeStyle};
use kinship_core::{PersonId, RelType, RelationshipId, Sex};
use serde::{Deserialize, Serialize};

/// Raw attributes carried alongside a node for hover cards and editors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeMetadata {
    pub hover: String,
    pub display_name: String,
    pub sex: Sex,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub death_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub is_deceased: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneNode {
    pub id: PersonId,
    pub label: String,
    pub generation: u32,
    pub x: f32,
    pub y: f32,
    pub color: Color,
    pub shape: NodeShape,
    pub style: NodeStyle,
    pub is_draft: bool,
    pub is_root: bool,
    pub metadata: NodeMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneEdge {
    pub id: RelationshipId,
    pub from_id: PersonId,
    pub to_id: PersonId,
    #[serde(rename = "type")]
    pub kind: RelType,
    pub style: EdgeStyle,
    pub from_pos: Vec2,
    pub to_pos: Vec2,
    pub is_draft: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedEdge {
    pub parent: PersonId,
    pub child: PersonId,
}

/// Structural anomalies the layout recovered from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub skipped_edges: Vec<SkippedEdge>,
    pub dropped_references: Vec<DroppedReference>,
    pub implicit_roots: Vec<PersonId>,
}

impl Diagnostics {
    pub fn is_empty(&self) -> bool {
        self.skipped_edges.is_empty()
            && self.dropped_references.is_empty()
            && self.implicit_roots.is_empty()
    }
}

/// Renderable payload: nodes in person input order, edges in relationship
/// order.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub nodes: Vec<SceneNode>,
    pub edges: Vec<SceneEdge>,
    pub diagnostics: Diagnostics,
}

impl Scene {
    pub fn node(&self, id: &PersonId) -> Option<&SceneNode> {
        self.nodes.iter().find(|n| &n.id == id)
    }

    pub fn edge(&self, id: &RelationshipId) -> Option<&SceneEdge> {
        self.edges.iter().find(|e| &e.id == id)
    }
}
