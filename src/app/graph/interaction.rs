use eframe::egui::{self, Pos2, Rect, Ui, Vec2};

use super::super::layout::DRAG_ALPHA_TARGET;
use super::super::render_utils::circle_visible;
use super::super::{DragState, ViewModel};

impl ViewModel {
    pub(in crate::app) fn handle_scroll_zoom(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
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
        let factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.viewport.zoom_by(factor, pointer, rect);
    }

    pub(in crate::app) fn handle_auxiliary_pan(&mut self, response: &egui::Response) {
        if response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            self.viewport.pan_by(response.drag_delta());
        }
    }

    /// Nearest node circle under the pointer, if any, using the current
    /// frame's projected positions.
    pub(in crate::app) fn pick_node(&self, pointer: Pos2) -> Option<(usize, f32)> {
        let rect = self.view_scratch.canvas_rect;
        self.view_scratch
            .screen_positions
            .iter()
            .zip(self.view_scratch.screen_radii.iter())
            .enumerate()
            .filter(|(_, (position, radius))| circle_visible(rect, **position, **radius))
            .filter_map(|(index, (position, radius))| {
                let distance = position.distance(pointer);
                (distance <= *radius).then_some((index, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }

    /// Primary-button press: a node under the pointer becomes a pinned
    /// drag subject and reheats the layout; empty canvas starts a pan.
    pub(in crate::app) fn drag_started_at(&mut self, pointer: Pos2) {
        match self.pick_node(pointer) {
            Some((index, _)) => {
                let world = self
                    .viewport
                    .unproject(self.view_scratch.canvas_rect, pointer);
                self.layout.pin(index, world);
                self.layout.reheat(DRAG_ALPHA_TARGET);
                self.drag = DragState::Node(index);
            }
            None => {
                self.drag = DragState::Pan;
            }
        }
    }

    pub(in crate::app) fn drag_moved_to(&mut self, pointer: Pos2, delta: Vec2) {
        match self.drag {
            DragState::Node(index) => {
                let world = self
                    .viewport
                    .unproject(self.view_scratch.canvas_rect, pointer);
                self.layout.pin(index, world);
            }
            DragState::Pan => self.viewport.pan_by(delta),
            DragState::Idle => {}
        }
    }

    /// Release: the dragged node is unpinned and the layout resumes its
    /// natural cooling instead of freezing where it was dropped.
    pub(in crate::app) fn drag_ended(&mut self) {
        if let DragState::Node(index) = self.drag {
            self.layout.unpin(index);
            self.layout.cool();
        }
        self.drag = DragState::Idle;
    }

    /// Click without drag: select the node under the pointer, or clear
    /// the selection on empty canvas.
    pub(in crate::app) fn click_at(&mut self, pointer: Pos2) {
        let clicked = self
            .pick_node(pointer)
            .and_then(|(index, _)| self.model.node(index))
            .map(|node| node.id.clone());
        self.set_selected(clicked);
    }

    pub(in crate::app) fn set_selected(&mut self, selected: Option<String>) {
        self.selected = selected;
    }

    /// Records a "query this node" request for the external consumer; the
    /// view session only emits it.
    pub(in crate::app) fn request_node_query(&mut self, id: &str) {
        log::info!("query request emitted for node {id}");
        self.last_query_request = Some(id.to_owned());
    }
}
