use std::collections::HashSet;
use std::sync::Arc;

use eframe::egui::{self, Sense, Ui};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use super::super::render_utils::{draw_background, screen_radius};
use super::super::scene::{SceneParams, build_scene, paint_scene};
use super::super::{DragState, SearchMatchCache, ViewModel};

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

impl ViewModel {
    /// Fuzzy label matches for the current search query, cached until the
    /// query changes. None while the search box is empty.
    fn cached_search_matches(&mut self) -> Option<Arc<HashSet<usize>>> {
        let query = self.search.trim();
        if query.is_empty() {
            return None;
        }

        if let Some(cached) = &self.search_match_cache
            && cached.query == query
        {
            return Some(Arc::clone(&cached.matches));
        }

        let matcher = SkimMatcherV2::default();
        let matches = self
            .model
            .nodes()
            .iter()
            .enumerate()
            .filter_map(|(index, node)| {
                fuzzy_match_score(&matcher, &node.label, query).map(|_| index)
            })
            .collect::<HashSet<_>>();
        let matches = Arc::new(matches);

        self.search_match_cache = Some(SearchMatchCache {
            query: query.to_owned(),
            matches: Arc::clone(&matches),
        });

        Some(matches)
    }

    pub(in crate::app) fn update_screen_space(&mut self, rect: egui::Rect) {
        self.view_scratch.canvas_rect = rect;

        self.view_scratch.world_positions.clear();
        self.view_scratch.world_positions.extend(self.layout.iter_positions());

        self.view_scratch.screen_positions.clear();
        self.view_scratch.screen_radii.clear();
        for (index, world) in self.view_scratch.world_positions.iter().enumerate() {
            self.view_scratch
                .screen_positions
                .push(self.viewport.project(rect, *world));
            let size = self
                .model
                .node(index)
                .map(|node| node.size)
                .unwrap_or_default();
            self.view_scratch
                .screen_radii
                .push(screen_radius(size, self.viewport.zoom));
        }
    }

    /// One frame of the central canvas: step the simulation while hot,
    /// project through the viewport, rebuild the scene, paint, and keep
    /// the repaint loop alive only while something is actually moving.
    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        draw_background(&painter, rect, self.viewport.pan, self.viewport.zoom);

        if self.model.is_empty() {
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                "No graph data. Load a dataset or retry the fetch.",
                egui::FontId::proportional(15.0),
                egui::Color32::from_gray(180),
            );
            return;
        }

        self.handle_scroll_zoom(ui, rect, &response);
        self.handle_auxiliary_pan(&response);

        let dt = ui
            .ctx()
            .input(|input| input.stable_dt)
            .clamp(1.0 / 240.0, 1.0 / 20.0);
        if !self.layout.is_settled() {
            self.layout.step(dt, self.tuning);
        }

        self.update_screen_space(rect);

        let pointer = ui.input(|input| input.pointer.hover_pos());
        let hovered = pointer.and_then(|pointer| self.pick_node(pointer)).map(|(index, _)| index);

        if hovered.is_some() {
            ui.output_mut(|output| {
                output.cursor_icon = egui::CursorIcon::PointingHand;
            });
        }

        if response.drag_started_by(egui::PointerButton::Primary)
            && let Some(pointer) = response.interact_pointer_pos()
        {
            self.drag_started_at(pointer);
        }
        if response.dragged_by(egui::PointerButton::Primary) {
            if let Some(pointer) = response.interact_pointer_pos() {
                self.drag_moved_to(pointer, response.drag_delta());
            }
        }
        if response.drag_stopped_by(egui::PointerButton::Primary) {
            self.drag_ended();
        }

        if response.clicked_by(egui::PointerButton::Primary)
            && let Some(pointer) = response.interact_pointer_pos()
        {
            self.click_at(pointer);
        }

        let search_matches = self.cached_search_matches();
        let selected_index = self
            .selected
            .as_deref()
            .and_then(|id| self.model.index_of(id));

        let scene = build_scene(&SceneParams {
            rect,
            model: &self.model,
            world_positions: &self.view_scratch.world_positions,
            viewport: self.viewport,
            active_kinds: &self.active_kinds,
            search_matches: search_matches.as_deref(),
            selected: selected_index,
            hovered,
        });
        paint_scene(&painter, &scene);

        let dragging = !matches!(self.drag, DragState::Idle);
        if !self.layout.is_settled() || dragging {
            ui.ctx().request_repaint();
        }
    }
}
