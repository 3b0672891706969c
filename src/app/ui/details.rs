use eframe::egui::{self, RichText, Ui};

use super::super::render_utils::kind_color;
use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Selection");
        ui.add_space(6.0);

        let Some(selected_id) = self.selected.clone() else {
            ui.label("Select an entity in the graph to inspect it.");
            return;
        };

        let Some(index) = self.model.index_of(&selected_id) else {
            // The dataset was reloaded under the selection.
            ui.label("The selected entity no longer exists in the current dataset.");
            if ui.button("Clear selection").clicked() {
                self.set_selected(None);
            }
            return;
        };

        let Some(node) = self.model.node(index) else {
            return;
        };
        let label = node.label.clone();
        let kind = node.kind;
        let size = node.size;
        let degree = self.model.degree(index);

        ui.colored_label(kind_color(kind), RichText::new(kind.label()).strong());
        ui.label(RichText::new(label).heading());
        ui.small(format!("id: {selected_id}"));
        ui.add_space(6.0);

        ui.label(format!("Size metric: {size:.1}"));
        ui.label(format!("Degree: {degree}"));
        ui.label(format!(
            "Pinned: {}",
            if self.layout.is_pinned(index) { "yes" } else { "no" }
        ));

        ui.separator();
        ui.label(RichText::new("Related entities").strong());

        let mut neighbors = self.model.neighbors(index).to_vec();
        neighbors.sort_by(|a, b| {
            let size_a = self.model.node(a.index).map(|n| n.size).unwrap_or_default();
            let size_b = self.model.node(b.index).map(|n| n.size).unwrap_or_default();
            size_b.total_cmp(&size_a).then(a.index.cmp(&b.index))
        });

        let mut pending_selection = None;
        if neighbors.is_empty() {
            ui.label("No relations recorded for this entity.");
        } else {
            egui::ScrollArea::vertical()
                .id_salt("related_entities_scroll")
                .max_height(320.0)
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    for neighbor in &neighbors {
                        let Some(other) = self.model.node(neighbor.index) else {
                            continue;
                        };

                        let row = if neighbor.outgoing {
                            format!("{} \u{2192} {}", neighbor.relation, other.label)
                        } else {
                            format!("{} \u{2190} {}", neighbor.relation, other.label)
                        };

                        if ui.link(row).on_hover_text(other.id.as_str()).clicked() {
                            pending_selection = Some(other.id.clone());
                        }
                    }
                });
        }
        if pending_selection.is_some() {
            self.set_selected(pending_selection);
        }

        ui.separator();
        if ui.button("Query this node").clicked() {
            self.request_node_query(&selected_id);
        }
        if let Some(last) = &self.last_query_request {
            ui.small(format!("last query request: {last}"));
        }
        if ui.button("Clear selection").clicked() {
            self.set_selected(None);
        }
    }
}
