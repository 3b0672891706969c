use std::collections::HashSet;

use eframe::egui::{self, Align, Context, Layout};

use crate::data::GraphModel;

use super::super::layout::{ForceTuning, LayoutEngine};
use super::super::viewport::Viewport;
use super::super::{DragState, SCATTER_EXTENT, ViewModel, ViewScratch};

impl ViewModel {
    pub(in crate::app) fn new(model: GraphModel, source_label: String) -> Self {
        if model.dropped_links() > 0 || model.dropped_nodes() > 0 {
            log::warn!(
                "dataset sanitized: dropped {} dangling link(s), {} duplicate node(s)",
                model.dropped_links(),
                model.dropped_nodes()
            );
        }

        let layout = LayoutEngine::new(&model, SCATTER_EXTENT);

        Self {
            model,
            source_label,
            layout,
            tuning: ForceTuning::default(),
            viewport: Viewport::default(),
            selected: None,
            search: String::new(),
            active_kinds: HashSet::new(),
            drag: DragState::Idle,
            search_match_cache: None,
            last_query_request: None,
            view_scratch: ViewScratch::default(),
        }
    }

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        reload_requested: &mut bool,
        is_loading: bool,
    ) {
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("entity-atlas");
                    ui.separator();
                    ui.label(format!("source: {}", self.source_label));
                    ui.label(format!("entities: {}", self.model.node_count()));
                    ui.label(format!("relations: {}", self.model.link_count()));
                    if self.model.dropped_links() > 0 {
                        ui.colored_label(
                            egui::Color32::from_rgb(240, 180, 90),
                            format!("{} dangling link(s) dropped", self.model.dropped_links()),
                        );
                    }

                    let reload_button =
                        ui.add_enabled(!is_loading, egui::Button::new("Reload dataset"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }
                    if ui.button("Re-layout").clicked() {
                        self.layout.relayout();
                    }

                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if self.layout.is_settled() {
                            ui.label("layout settled");
                        } else {
                            ui.label(format!("layout cooling (alpha {:.3})", self.layout.alpha()));
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
            .default_width(340.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            if is_loading {
                ui.vertical_centered(|ui| {
                    ui.add_space(120.0);
                    ui.heading("Loading graph topology...");
                    ui.add_space(8.0);
                    ui.spinner();
                });
            } else {
                self.draw_graph(ui);
            }
        });
    }
}
