//! End-to-end rendering: drafts → graph → forest → positions → scene.

use crate::config::SceneConfig;
use crate::converter::SceneConverter;
use crate::forest::LayoutForest;
use crate::graph::FamilyGraph;
use crate::scene::Scene;
use kinship_core::Snapshot;
use kinship_draft::{DraftMerger, DraftOp, MergeReport, MergedGraph};
use kinship_events::{Command, CommandSpan};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// One tree version plus the drafts to overlay on it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RenderRequest {
    pub snapshot: Snapshot,
    #[serde(default)]
    pub drafts: Vec<DraftOp>,
}

#[derive(Debug, Clone)]
pub struct RenderOutput {
    pub scene: Scene,
    pub report: MergeReport,
}

/// Lays out and serializes an already merged graph.
pub fn render_scene(merged: &MergedGraph, config: &SceneConfig) -> Scene {
    let span = CommandSpan::begin(Command::RenderScene);

    let graph = FamilyGraph::from_merged(merged);
    let forest = LayoutForest::build(&graph, config.layout.cluster_gap);
    let positions = config.layout.layouter().execute(&forest);
    let scene = SceneConverter::with_palette(config.palette()).convert(&graph, &forest, &positions);

    span.note(&format!(
        "nodes={} edges={} clusters={} skipped_edges={}",
        scene.nodes.len(),
        scene.edges.len(),
        forest.clusters().len(),
        scene.diagnostics.skipped_edges.len()
    ));
    span.finish();
    scene
}

/// Merges drafts onto a snapshot and renders the result.
pub fn render_snapshot(snapshot: &Snapshot, drafts: &[DraftOp], config: &SceneConfig) -> RenderOutput {
    let span = CommandSpan::begin(Command::MergeDrafts);
    let merged = DraftMerger::new().merge(snapshot, drafts);
    span.finish();

    RenderOutput {
        scene: render_scene(&merged.graph, config),
        report: merged.report,
    }
}

/// Renders independent requests in parallel. Results keep request order.
pub fn render_many(requests: &[RenderRequest], config: &SceneConfig) -> Vec<RenderOutput> {
    requests
        .par_iter()
        .map(|request| render_snapshot(&request.snapshot, &request.drafts, config))
        .collect()
}
