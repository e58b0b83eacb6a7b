use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use kinship_core::Snapshot;
use kinship_draft::{DraftMerger, DraftOp, MergeReport};
use kinship_events::{Command as EventCommand, CommandSpan};
use kinship_graph::{SceneConfig, render_snapshot};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Overlay drafts on a snapshot and write the positioned scene
    Render {
        /// Published snapshot (JSON)
        #[arg(short, long)]
        snapshot: PathBuf,

        /// Ordered draft operations (JSON array)
        #[arg(short, long)]
        drafts: Option<PathBuf>,

        /// Scene settings (JSON); defaults apply when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output file; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Apply drafts and write the result as the next snapshot version
    Publish {
        #[arg(short, long)]
        snapshot: PathBuf,

        #[arg(short, long)]
        drafts: PathBuf,

        /// Version number for the new snapshot
        #[arg(long = "next-version")]
        next_version: u32,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
}

fn write_json<T: Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
    let content = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            fs::write(path, content).with_context(|| format!("writing {}", path.display()))?;
            info!("wrote {}", path.display());
        }
        None => println!("{content}"),
    }
    Ok(())
}

fn print_report(report: &MergeReport) {
    for (outcome, reason) in report.skipped() {
        eprintln!("draft #{} ({:?}) skipped: {}", outcome.index, outcome.kind, reason);
    }
    eprintln!(
        "{} drafts applied, {} skipped",
        report.applied_count(),
        report.skipped_count()
    );
}

fn run_render(
    snapshot: &Path,
    drafts: Option<&Path>,
    config: Option<&Path>,
    output: Option<&Path>,
) -> Result<()> {
    let snapshot: Snapshot = read_json(snapshot)?;
    let drafts: Vec<DraftOp> = match drafts {
        Some(path) => read_json(path)?,
        None => Vec::new(),
    };
    let config = match config {
        Some(path) => SceneConfig::load(path)?,
        None => SceneConfig::default(),
    };

    let rendered = render_snapshot(&snapshot, &drafts, &config);
    if !drafts.is_empty() {
        print_report(&rendered.report);
    }
    write_json(&rendered.scene, output)
}

fn run_publish(snapshot: &Path, drafts: &Path, version: u32, output: Option<&Path>) -> Result<()> {
    let snapshot: Snapshot = read_json(snapshot)?;
    let drafts: Vec<DraftOp> = read_json(drafts)?;
    if version <= snapshot.version {
        anyhow::bail!(
            "version {} must be greater than the snapshot's version {}",
            version,
            snapshot.version
        );
    }

    let merged = DraftMerger::new().merge(&snapshot, &drafts);
    print_report(&merged.report);
    let next = merged.graph.publish(snapshot.tree_id.clone(), version);
    write_json(&next, output)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    match args.command {
        Command::Render {
            snapshot,
            drafts,
            config,
            output,
        } => run_render(
            &snapshot,
            drafts.as_deref(),
            config.as_deref(),
            output.as_deref(),
        ),
        Command::Publish {
            snapshot,
            drafts,
            next_version,
            output,
        } => {
            let span = CommandSpan::begin(EventCommand::PublishSnapshot);
            let result = run_publish(&snapshot, &drafts, next_version, output.as_deref());
            match &result {
                Ok(()) => {
                    span.finish();
                }
                Err(err) => {
                    span.fail(&format!("{err:#}"));
                }
            }
            result
        }
    }
}
