use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};
use std::thread;

use anyhow::{Result, anyhow};
use eframe::egui::{self, Color32, Context, Vec2};
use tracing::{error, info};

use note_graph::graph::{IndexOptions, NoteGraph, index_graph_with};
use note_graph::notes::load_notes;
use note_graph::sim::{
    Inbound, NodePosition, SimParams, SimParamsPatch, SimulationWorker, WorkerOptions,
};

mod panels;
mod render_utils;
mod view;

#[derive(Clone, Debug)]
pub struct ViewerConfig {
    pub notes_path: PathBuf,
    pub index_options: IndexOptions,
    pub params: SimParams,
    pub seed: Option<u64>,
}

pub struct NoteGraphApp {
    config: ViewerConfig,
    state: AppState,
}

/// Opens the viewer window and blocks until it is closed.
pub fn launch(config: ViewerConfig) -> Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "note-graph",
        options,
        Box::new(move |cc| Ok(Box::new(NoteGraphApp::new(cc, config)))),
    )
    .map_err(|error| anyhow!("viewer failed: {error}"))
}

enum AppState {
    Loading { rx: Receiver<Result<NoteGraph, String>> },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    graph: NoteGraph,
    worker: Option<SimulationWorker>,
    worker_error: Option<String>,
    params: SimParams,
    seed: Option<u64>,
    running: bool,
    nodes: Vec<RenderNode>,
    edges: Vec<(usize, usize)>,
    index_by_id: HashMap<String, usize>,
    updates_received: u64,
    search: String,
    selected: Option<String>,
    path_anchor: Option<String>,
    pan: Vec2,
    zoom: f32,
}

struct RenderNode {
    id: String,
    label: String,
    world_pos: Vec2,
    base_radius: f32,
    color: Color32,
    degree: usize,
}

impl NoteGraphApp {
    fn new(_cc: &eframe::CreationContext<'_>, config: ViewerConfig) -> Self {
        let state = Self::start_load(&config);
        Self { config, state }
    }

    fn start_load(config: &ViewerConfig) -> AppState {
        let (tx, rx) = mpsc::channel();
        let path = config.notes_path.clone();
        let options = config.index_options;

        thread::spawn(move || {
            let result = load_notes(&path)
                .map(|notes| index_graph_with(&notes, &options))
                .map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        AppState::Loading { rx }
    }
}

impl eframe::App for NoteGraphApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                if let Ok(result) = rx.try_recv() {
                    transition = Some(match result {
                        Ok(graph) => AppState::Ready(Box::new(ViewModel::new(graph, &self.config))),
                        Err(error) => {
                            error!(%error, "failed to load notes");
                            AppState::Error(error)
                        }
                    });
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Indexing notes...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
                ctx.request_repaint();
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load notes");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(Self::start_load(&self.config));
                    }
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                model.show(ctx, &self.config, &mut reload_requested);
                if reload_requested {
                    transition = Some(Self::start_load(&self.config));
                }
            }
        }

        if let Some(next_state) = transition {
            self.state = next_state;
        }
    }
}

impl ViewModel {
    fn new(graph: NoteGraph, config: &ViewerConfig) -> Self {
        let index_by_id = graph
            .nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (node.id.clone(), index))
            .collect::<HashMap<_, _>>();
        let nodes = graph
            .nodes
            .iter()
            .map(|node| RenderNode {
                id: node.id.clone(),
                label: if node.title.is_empty() {
                    node.id.clone()
                } else {
                    node.title.clone()
                },
                world_pos: Vec2::ZERO,
                base_radius: render_utils::node_radius(node.size),
                color: render_utils::band_color(node.color),
                degree: node.degree,
            })
            .collect();
        let edges = graph
            .edges
            .iter()
            .filter_map(|edge| Some((*index_by_id.get(&edge.from)?, *index_by_id.get(&edge.to)?)))
            .collect();

        let mut model = Self {
            graph,
            worker: None,
            worker_error: None,
            params: config.params,
            seed: config.seed,
            running: false,
            nodes,
            edges,
            index_by_id,
            updates_received: 0,
            search: String::new(),
            selected: None,
            path_anchor: None,
            pan: Vec2::ZERO,
            zoom: 1.0,
        };

        match model.spawn_worker() {
            Ok(()) => model.reseed(),
            Err(error) => {
                let message = format!("{error:#}");
                error!(%message, "simulation unavailable");
                model.worker_error = Some(message);
            }
        }

        model
    }

    fn spawn_worker(&mut self) -> Result<()> {
        let worker = SimulationWorker::spawn(WorkerOptions {
            seed: self.seed,
            ..WorkerOptions::default()
        })?;
        self.worker = Some(worker);
        Ok(())
    }

    fn post(&mut self, message: Inbound) {
        let kind = message.kind();
        let delivered = self.worker.as_ref().is_some_and(|worker| worker.post(message));
        if !delivered && self.worker_error.is_none() {
            error!(kind, "simulation worker is gone");
            self.worker_error = Some("simulation worker stopped unexpectedly".to_owned());
        }
    }

    /// Restarts the layout from a fresh random placement.
    fn reseed(&mut self) {
        info!(nodes = self.nodes.len(), "seeding layout");
        self.post(Inbound::from_graph(&self.graph, self.params));
        self.running = true;
    }

    fn set_running(&mut self, running: bool) {
        self.running = running;
        self.post(if running { Inbound::Start } else { Inbound::Stop });
    }

    fn push_params(&mut self) {
        self.post(Inbound::UpdateParams {
            params: SimParamsPatch::from(self.params),
        });
    }

    fn poll_positions(&mut self) {
        let Some(positions) = self.worker.as_ref().and_then(SimulationWorker::latest_positions) else {
            return;
        };
        self.apply_positions(&positions);
    }

    fn apply_positions(&mut self, positions: &[NodePosition]) {
        for position in positions {
            if let Some(&index) = self.index_by_id.get(&position.id) {
                self.nodes[index].world_pos = Vec2::new(position.x, position.y);
            }
        }
        self.updates_received += 1;
    }

    fn set_selected(&mut self, selected: Option<String>) {
        if self.selected != selected {
            self.selected = selected;
        }
    }
}
