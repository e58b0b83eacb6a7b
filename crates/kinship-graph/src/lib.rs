pub mod config;
pub mod converter;
pub mod forest;
pub mod graph;
pub mod label;
pub mod layout;
pub mod pipeline;
pub mod scene;
pub mod style;

pub use config::{LayoutConfig, LayoutMode, SceneConfig};
pub use converter::SceneConverter;
pub use forest::LayoutForest;
pub use graph::{FamilyGraph, PersonIndex};
pub use layout::{HierarchicalLayouter, Layouter, RadialLayouter, Vec2};
pub use pipeline::{RenderOutput, RenderRequest, render_many, render_scene, render_snapshot};
pub use scene::{Diagnostics, Scene, SceneEdge, SceneNode};
pub use style::{
    Color, EdgeStyle, NodeShape, NodeStyle, Palette, SiblingColoring, get_edge_style,
    get_node_style,
};
