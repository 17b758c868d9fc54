use std::collections::HashSet;

use eframe::egui::{self, Align2, Color32, FontId, Pos2, Rect, Sense, Stroke, Ui, vec2};
use fuzzy_matcher::skim::SkimMatcherV2;

use note_graph::graph::fuzzy_match_score;

use super::ViewModel;
use super::render_utils::{
    blend_color, circle_visible, dim_color, draw_background, screen_to_world, world_to_screen,
};

struct Highlight {
    related_nodes: HashSet<usize>,
    path_nodes: HashSet<usize>,
    path_edges: HashSet<(usize, usize)>,
}

impl ViewModel {
    fn handle_graph_zoom(&mut self, ui: &Ui, rect: Rect, response: &egui::Response) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let world_before = screen_to_world(rect, self.pan, self.zoom, pointer);

        let zoom_factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.zoom = (self.zoom * zoom_factor).clamp(0.05, 6.0);
        self.pan = pointer - rect.center() - (world_before * self.zoom);
    }

    fn handle_graph_pan(&mut self, response: &egui::Response) {
        if response.dragged_by(egui::PointerButton::Primary)
            || response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            self.pan += response.drag_delta();
        }
    }

    fn search_matches(&self) -> Option<HashSet<usize>> {
        let query = self.search.trim();
        if query.is_empty() {
            return None;
        }

        let matcher = SkimMatcherV2::default();
        Some(
            self.nodes
                .iter()
                .enumerate()
                .filter(|(_, node)| fuzzy_match_score(&matcher, &node.label, query).is_some())
                .map(|(index, _)| index)
                .collect(),
        )
    }

    fn highlight(&self) -> Option<Highlight> {
        let selected = self.selected.as_deref()?;
        let related_nodes = self
            .graph
            .neighbors(selected)
            .into_iter()
            .filter_map(|id| self.index_by_id.get(id).copied())
            .collect();

        let path = self
            .path_anchor
            .as_deref()
            .and_then(|anchor| self.graph.path_between(anchor, selected))
            .unwrap_or_default()
            .iter()
            .filter_map(|id| self.index_by_id.get(id).copied())
            .collect::<Vec<_>>();
        let path_edges = path
            .windows(2)
            .flat_map(|pair| [(pair[0], pair[1]), (pair[1], pair[0])])
            .collect();

        Some(Highlight {
            related_nodes,
            path_nodes: path.into_iter().collect(),
            path_edges,
        })
    }

    pub(super) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        draw_background(&painter, rect, self.pan, self.zoom);
        self.handle_graph_zoom(ui, rect, &response);
        self.handle_graph_pan(&response);

        if self.nodes.is_empty() {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "No notes to show.",
                FontId::proportional(15.0),
                Color32::from_gray(200),
            );
            return;
        }

        let screen_positions = self
            .nodes
            .iter()
            .map(|node| world_to_screen(rect, self.pan, self.zoom, node.world_pos))
            .collect::<Vec<Pos2>>();
        let screen_radii = self
            .nodes
            .iter()
            .map(|node| (node.base_radius * self.zoom.powf(0.40)).clamp(2.5, 46.0))
            .collect::<Vec<f32>>();

        let pointer = ui.input(|input| input.pointer.hover_pos());
        let hovered = pointer.and_then(|pointer| {
            (0..self.nodes.len())
                .filter(|&index| circle_visible(rect, screen_positions[index], screen_radii[index]))
                .map(|index| (index, screen_positions[index].distance(pointer)))
                .filter(|&(index, distance)| distance <= screen_radii[index])
                .min_by(|a, b| a.1.total_cmp(&b.1))
                .map(|(index, _)| index)
        });
        if hovered.is_some() {
            ui.output_mut(|output| output.cursor_icon = egui::CursorIcon::PointingHand);
        }

        let highlight = self.highlight();
        let matches = self.search_matches();
        let search_active = matches.as_ref().is_some_and(|matches| !matches.is_empty());
        let zoom_sqrt = self.zoom.sqrt();
        let selected_index = self
            .selected
            .as_deref()
            .and_then(|id| self.index_by_id.get(id).copied());

        for &(from, to) in &self.edges {
            let start = screen_positions[from];
            let end = screen_positions[to];
            let on_path = highlight
                .as_ref()
                .is_some_and(|state| state.path_edges.contains(&(from, to)));
            let touches_selection = selected_index.is_some_and(|index| index == from || index == to);

            let (width, color) = if on_path {
                ((3.2 * zoom_sqrt).clamp(1.6, 5.6), Color32::from_rgb(246, 206, 104))
            } else if touches_selection {
                ((2.4 * zoom_sqrt).clamp(1.2, 4.2), Color32::from_rgb(241, 146, 94))
            } else if highlight.is_some() {
                ((0.8 * zoom_sqrt).clamp(0.4, 2.0), Color32::from_rgba_unmultiplied(80, 90, 104, 120))
            } else {
                ((1.2 * zoom_sqrt).clamp(0.6, 3.4), Color32::from_rgba_unmultiplied(96, 100, 110, 180))
            };
            painter.line_segment([start, end], Stroke::new(width, color));
        }

        let selected_color = Color32::from_rgb(245, 206, 93);
        for (index, node) in self.nodes.iter().enumerate() {
            let position = screen_positions[index];
            let radius = screen_radii[index];
            if !circle_visible(rect, position, radius) {
                continue;
            }

            let is_selected = self.selected.as_deref() == Some(node.id.as_str());
            let is_hovered = hovered == Some(index);
            let on_path = highlight
                .as_ref()
                .is_some_and(|state| state.path_nodes.contains(&index));
            let is_related = highlight
                .as_ref()
                .is_some_and(|state| state.related_nodes.contains(&index));
            let is_match = matches.as_ref().is_some_and(|matches| matches.contains(&index));

            let color = if is_selected {
                selected_color
            } else if is_hovered {
                Color32::from_rgb(255, 164, 101)
            } else if on_path {
                blend_color(node.color, Color32::from_rgb(247, 194, 111), 0.72)
            } else if is_related {
                blend_color(node.color, Color32::from_rgb(246, 137, 92), 0.60)
            } else if is_match {
                blend_color(node.color, Color32::from_rgb(103, 196, 255), 0.68)
            } else if highlight.is_some() {
                dim_color(node.color, 0.52)
            } else if search_active {
                dim_color(node.color, 0.38)
            } else {
                node.color
            };

            painter.circle_filled(position, radius, color);
            painter.circle_stroke(
                position,
                radius,
                Stroke::new(
                    if is_selected || on_path { 2.0 } else { 1.0 },
                    Color32::from_rgba_unmultiplied(15, 15, 15, 190),
                ),
            );

            let draw_label = is_selected
                || is_hovered
                || on_path
                || is_related
                || (is_match && self.zoom > 0.35)
                || radius > 14.0
                || self.zoom > 1.35;
            if draw_label {
                painter.text(
                    position + vec2(radius + 5.0, 0.0),
                    Align2::LEFT_CENTER,
                    node.label.as_str(),
                    FontId::proportional(12.0),
                    Color32::from_gray(238),
                );
            }
        }

        if let Some(index) = hovered {
            let node = &self.nodes[index];
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                format!("{}  |  degree {}", node.label, node.degree),
                FontId::proportional(13.0),
                Color32::from_gray(240),
            );
        }

        if response.clicked_by(egui::PointerButton::Primary) {
            let selected = hovered.map(|index| self.nodes[index].id.clone());
            self.set_selected(selected);
        }
    }
}
