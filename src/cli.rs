use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use note_graph::graph::{
    DEFAULT_MAIN_THRESHOLD, EdgeKind, IndexOptions, NoteGraph, index_graph_with, shortest_path,
};
use note_graph::layout::settle;
use note_graph::notes::{LinkResolver, Note, load_notes};
use note_graph::sim::{SimParams, SimParamsPatch};

use crate::app::{self, ViewerConfig};

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// Log filter used when `RUST_LOG` is unset.
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the indexed graph as JSON.
    Index {
        #[command(flatten)]
        source: NoteSource,
    },
    /// List notes linking to a note.
    Backlinks {
        #[command(flatten)]
        source: NoteSource,
        /// Note id or title.
        #[arg(long)]
        note: String,
    },
    /// Shortest chain of links between two notes.
    Path {
        #[command(flatten)]
        source: NoteSource,
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        /// Only follow links in the direction they were written.
        #[arg(long)]
        directed: bool,
    },
    /// Fuzzy search over note titles.
    Search {
        #[command(flatten)]
        source: NoteSource,
        query: String,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Run the layout headlessly and print final positions.
    Layout {
        #[command(flatten)]
        source: NoteSource,
        #[command(flatten)]
        simulation: SimulationArgs,
        #[arg(long, default_value_t = 300)]
        ticks: usize,
    },
    /// Open the interactive graph viewer.
    View {
        #[command(flatten)]
        source: NoteSource,
        #[command(flatten)]
        simulation: SimulationArgs,
    },
}

#[derive(Debug, Args)]
pub struct NoteSource {
    /// Directory of Markdown files or a JSON export of notes.
    #[arg(long)]
    pub notes: PathBuf,

    /// Minimum degree for a note to count as a hub.
    #[arg(long, default_value_t = DEFAULT_MAIN_THRESHOLD)]
    pub main_threshold: usize,
}

impl NoteSource {
    pub fn index_options(&self) -> IndexOptions {
        IndexOptions {
            main_threshold: self.main_threshold,
        }
    }

    fn load(&self) -> Result<(Vec<Note>, NoteGraph)> {
        let notes = load_notes(&self.notes)?;
        let graph = index_graph_with(&notes, &self.index_options());
        info!(
            notes = notes.len(),
            edges = graph.edges.len(),
            path = %self.notes.display(),
            "indexed notes"
        );
        Ok((notes, graph))
    }
}

#[derive(Debug, Args)]
pub struct SimulationArgs {
    /// JSON file with simulation parameters; missing fields keep defaults.
    #[arg(long)]
    pub params: Option<PathBuf>,

    /// Seed for the initial placement.
    #[arg(long)]
    pub seed: Option<u64>,
}

impl SimulationArgs {
    pub fn params(&self) -> Result<SimParams> {
        match &self.params {
            Some(path) => load_params(path),
            None => Ok(SimParams::default()),
        }
    }
}

pub fn load_params(path: &Path) -> Result<SimParams> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read parameters from {}", path.display()))?;
    let patch = serde_json::from_str::<SimParamsPatch>(&raw)
        .with_context(|| format!("invalid parameters in {}", path.display()))?;

    let mut params = SimParams::default();
    params.merge(&patch);
    Ok(params)
}

#[derive(Serialize)]
struct NoteRef<'a> {
    id: &'a str,
    title: &'a str,
}

pub fn run(command: &Command, pretty: bool) -> Result<()> {
    match command {
        Command::Index { source } => {
            let (_, graph) = source.load()?;
            print_json(&graph, pretty)
        }
        Command::Backlinks { source, note } => {
            let (notes, graph) = source.load()?;
            let id = resolve_note(&notes, note)?;
            let backlinks = graph.backlinks(&id);
            let refs = backlinks
                .iter()
                .filter_map(|id| graph.node(id))
                .map(|node| NoteRef {
                    id: &node.id,
                    title: &node.title,
                })
                .collect::<Vec<_>>();
            print_json(&refs, pretty)
        }
        Command::Path {
            source,
            from,
            to,
            directed,
        } => {
            let (notes, graph) = source.load()?;
            let from = resolve_note(&notes, from)?;
            let to = resolve_note(&notes, to)?;
            let path = if *directed {
                let forward = graph
                    .links
                    .iter()
                    .filter(|edge| edge.kind != EdgeKind::Backlink)
                    .cloned()
                    .collect::<Vec<_>>();
                shortest_path(&from, &to, &forward)
            } else {
                graph.path_between(&from, &to)
            };
            let path = path.ok_or_else(|| anyhow!("no path from `{from}` to `{to}`"))?;
            print_json(&path, pretty)
        }
        Command::Search {
            source,
            query,
            limit,
        } => {
            let (_, graph) = source.load()?;
            print_json(&graph.search(query, *limit), pretty)
        }
        Command::Layout {
            source,
            simulation,
            ticks,
        } => {
            let params = simulation.params()?;
            let (_, graph) = source.load()?;
            print_json(&settle(&graph, params, *ticks, simulation.seed), pretty)
        }
        Command::View { source, simulation } => app::launch(viewer_config(source, simulation)?),
    }
}

fn viewer_config(source: &NoteSource, simulation: &SimulationArgs) -> Result<ViewerConfig> {
    Ok(ViewerConfig {
        notes_path: source.notes.clone(),
        index_options: source.index_options(),
        params: simulation.params()?,
        seed: simulation.seed,
    })
}

fn resolve_note(notes: &[Note], reference: &str) -> Result<String> {
    LinkResolver::new(notes)
        .resolve(reference)
        .map(str::to_owned)
        .ok_or_else(|| anyhow!("no note matches `{reference}`"))
}

fn print_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<()> {
    let output = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .context("failed to serialize output")?;
    println!("{output}");
    Ok(())
}
