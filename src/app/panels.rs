use eframe::egui::{self, Align, Context, Layout, RichText, Ui};

use note_graph::sim::SimParams;

use super::{ViewModel, ViewerConfig};

impl ViewModel {
    pub(super) fn show(&mut self, ctx: &Context, config: &ViewerConfig, reload_requested: &mut bool) {
        self.poll_positions();
        if self.running {
            ctx.request_repaint();
        }

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("note-graph");
                    ui.separator();
                    ui.label(format!("notes: {}", config.notes_path.display()));
                    ui.label(format!("nodes: {}", self.graph.nodes.len()));
                    ui.label(format!("edges: {}", self.graph.edges.len()));
                    if ui.button("Reload notes").clicked() {
                        *reload_requested = true;
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label(format!("updates: {}", self.updates_received));
                        if let Some(error) = &self.worker_error {
                            ui.colored_label(egui::Color32::from_rgb(236, 112, 84), error.as_str());
                        }
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default().show(ctx, |ui| self.draw_graph(ui));
    }

    fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Search");
        ui.add(egui::TextEdit::singleline(&mut self.search).hint_text("fuzzy title search"));
        let query = self.search.trim().to_owned();
        if !query.is_empty() {
            let hits = self.graph.search(&query, 12);
            if hits.is_empty() {
                ui.label("No matching notes.");
            }
            let mut picked = None;
            for hit in &hits {
                let label = if hit.title.is_empty() { &hit.id } else { &hit.title };
                if ui.link(label.as_str()).clicked() {
                    picked = Some(hit.id.clone());
                }
            }
            if picked.is_some() {
                self.set_selected(picked);
            }
        }

        ui.separator();
        ui.heading("Simulation");

        let mut running = self.running;
        if ui.checkbox(&mut running, "Running").changed() {
            self.set_running(running);
        }
        ui.horizontal(|ui| {
            if ui.button("Re-seed layout").clicked() {
                self.reseed();
            }
            if ui.button("Reset view").clicked() {
                self.pan = egui::Vec2::ZERO;
                self.zoom = 1.0;
            }
        });

        ui.add_space(6.0);
        let mut changed = false;
        changed |= ui
            .add(egui::Slider::new(&mut self.params.attraction, 0.0..=0.1).text("attraction"))
            .changed();
        changed |= ui
            .add(egui::Slider::new(&mut self.params.repulsion, 0.0..=2000.0).text("repulsion"))
            .changed();
        changed |= ui
            .add(egui::Slider::new(&mut self.params.damping, 0.0..=1.0).text("damping"))
            .changed();
        changed |= ui
            .add(egui::Slider::new(&mut self.params.max_speed, 0.0..=50.0).text("max speed"))
            .changed();
        changed |= ui
            .add(egui::Slider::new(&mut self.params.center_force, 0.0..=0.1).text("center force"))
            .changed();
        changed |= ui
            .add(egui::Slider::new(&mut self.params.link_distance, 0.0..=300.0).text("link distance"))
            .changed();
        if ui.button("Default parameters").clicked() {
            self.params = SimParams::default();
            changed = true;
        }
        if changed {
            self.push_params();
        }
    }

    fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Selection Details");
        ui.add_space(6.0);

        let Some(selected_id) = self.selected.clone() else {
            ui.label("Select a note in the graph or from search.");
            return;
        };

        let Some(node) = self.graph.node(&selected_id) else {
            ui.label("Selected note is no longer in the graph.");
            return;
        };

        ui.label(RichText::new(node.title.as_str()).strong());
        ui.small(node.id.as_str());
        ui.add_space(6.0);
        ui.label(format!("Degree: {}", node.degree));
        ui.label(format!("Classification: {}", node.classification.label()));
        let drawn = self
            .graph
            .edges
            .iter()
            .filter(|edge| edge.touches(&selected_id))
            .count();
        ui.label(format!("Connected notes: {drawn}"));
        if !node.tags.is_empty() {
            let tags = node
                .tags
                .iter()
                .map(|tag| format!("#{tag}"))
                .collect::<Vec<_>>()
                .join(" ");
            ui.label(format!("Tags: {tags}"));
        }

        let mut next_selection = None;

        ui.separator();
        ui.label(RichText::new("Backlinks").strong());
        let backlinks = self.graph.backlinks(&selected_id);
        if backlinks.is_empty() {
            ui.label("No notes link here.");
        }
        for id in &backlinks {
            let label = self.graph.node(id).map_or(id.as_str(), |node| node.title.as_str());
            if ui.link(label).on_hover_text(id.as_str()).clicked() {
                next_selection = Some(id.clone());
            }
        }

        ui.separator();
        ui.label(RichText::new("Path").strong());
        match self.path_anchor.clone() {
            Some(anchor) if anchor != selected_id => {
                match self.graph.path_between(&anchor, &selected_id) {
                    Some(path) => {
                        let titles = path
                            .iter()
                            .map(|id| self.graph.node(id).map_or(id.as_str(), |node| node.title.as_str()))
                            .collect::<Vec<_>>();
                        ui.label(format!("{} hops", path.len().saturating_sub(1)));
                        ui.label(titles.join(" → "));
                    }
                    None => {
                        ui.label("No path from the anchor to this note.");
                    }
                }
            }
            Some(_) => {
                ui.label("This note is the path anchor.");
            }
            None => {
                ui.label("Set an anchor to trace a path to other notes.");
            }
        }
        ui.horizontal(|ui| {
            if ui.button("Use as path anchor").clicked() {
                self.path_anchor = Some(selected_id.clone());
            }
            if self.path_anchor.is_some() && ui.button("Clear anchor").clicked() {
                self.path_anchor = None;
            }
        });

        if next_selection.is_some() {
            self.set_selected(next_selection);
        }
    }
}
