use eframe::egui::{self, RichText, Ui};

use crate::data::EntityKind;

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Explore");
        ui.add_space(6.0);

        ui.label("Search entities");
        let search_response = ui.text_edit_singleline(&mut self.search);
        if search_response.changed() {
            self.search_match_cache = None;
        }
        if !self.search.trim().is_empty() && ui.small_button("Clear search").clicked() {
            self.search.clear();
            self.search_match_cache = None;
        }

        ui.add_space(10.0);
        ui.separator();
        ui.label(RichText::new("Entity types").strong());
        ui.label("No active toggles shows every type.");
        for kind in EntityKind::ALL {
            let mut active = self.active_kinds.contains(&kind);
            if ui.checkbox(&mut active, kind.label()).changed() {
                if active {
                    self.active_kinds.insert(kind);
                } else {
                    self.active_kinds.remove(&kind);
                }
            }
        }
        if !self.active_kinds.is_empty() && ui.small_button("Show all types").clicked() {
            self.active_kinds.clear();
        }

        ui.add_space(10.0);
        ui.separator();
        ui.label(RichText::new("Forces").strong());
        ui.add(
            egui::Slider::new(&mut self.tuning.link_distance, 40.0..=220.0)
                .text("ideal link distance"),
        );
        ui.add(egui::Slider::new(&mut self.tuning.repulsion, 0.1..=3.0).text("repulsion"));
        ui.add(egui::Slider::new(&mut self.tuning.collision, 0.0..=2.5).text("collision"));
        if ui.button("Re-layout").clicked() {
            self.layout.relayout();
        }

        ui.add_space(10.0);
        ui.separator();
        ui.label(RichText::new("View").strong());
        ui.horizontal(|ui| {
            let rect = self.view_scratch.canvas_rect;
            if ui.button("Zoom in").clicked() {
                self.viewport.zoom_step(true, rect);
            }
            if ui.button("Zoom out").clicked() {
                self.viewport.zoom_step(false, rect);
            }
            if ui.button("Reset view").clicked() {
                self.viewport.reset();
            }
        });
        ui.label(format!("zoom {:.2}", self.viewport.zoom));
    }
}
