use std::collections::HashSet;

use eframe::egui::{Align2, Color32, FontId, Painter, Pos2, Rect, Stroke, Vec2, vec2};

use crate::data::{EntityKind, GraphModel};

use super::render_utils::{blend_color, dim_color, kind_color, screen_radius};
use super::viewport::Viewport;

/// Labels appear only on nodes whose size metric clears this, keeping
/// large graphs readable; selection, hover, and search matches override it.
const LABEL_SIZE_THRESHOLD: f32 = 2.0;

const LINK_COLOR: Color32 = Color32::from_rgba_premultiplied(51, 65, 85, 153);
const LINK_HIGHLIGHT_COLOR: Color32 = Color32::from_rgb(148, 163, 184);
const LABEL_COLOR: Color32 = Color32::from_rgb(148, 163, 184);
const RING_COLOR: Color32 = Color32::from_rgb(30, 41, 59);
const SELECTED_RING: Color32 = Color32::from_rgb(248, 250, 252);
const HOVERED_RING: Color32 = Color32::from_rgb(226, 232, 240);
const MATCH_RING: Color32 = Color32::from_rgb(103, 196, 255);

/// One drawable element. The painter walks these in order, so the list
/// itself encodes layering: lines, then circles, then labels and legend.
#[derive(Clone, Debug, PartialEq)]
pub(in crate::app) enum Primitive {
    Line {
        from: Pos2,
        to: Pos2,
        width: f32,
        color: Color32,
    },
    Circle {
        center: Pos2,
        radius: f32,
        fill: Color32,
        ring: Color32,
        ring_width: f32,
    },
    Label {
        anchor: Pos2,
        text: String,
        color: Color32,
    },
}

#[derive(Clone, Debug, Default, PartialEq)]
pub(in crate::app) struct Scene {
    pub primitives: Vec<Primitive>,
}

/// Everything a frame's scene depends on. Rebuilt from scratch per tick;
/// there is deliberately no incremental patching, so a node or link that
/// vanished with a dataset reload simply stops appearing.
pub(in crate::app) struct SceneParams<'a> {
    pub rect: Rect,
    pub model: &'a GraphModel,
    pub world_positions: &'a [Vec2],
    pub viewport: Viewport,
    pub active_kinds: &'a HashSet<EntityKind>,
    pub search_matches: Option<&'a HashSet<usize>>,
    pub selected: Option<usize>,
    pub hovered: Option<usize>,
}

impl SceneParams<'_> {
    fn kind_visible(&self, kind: EntityKind) -> bool {
        self.active_kinds.is_empty() || self.active_kinds.contains(&kind)
    }

    fn node_visible(&self, index: usize) -> bool {
        index < self.world_positions.len()
            && self
                .model
                .node(index)
                .is_some_and(|node| self.kind_visible(node.kind))
    }
}

pub(in crate::app) fn build_scene(params: &SceneParams<'_>) -> Scene {
    let mut primitives = Vec::new();
    let zoom = params.viewport.zoom;
    let search_active = params
        .search_matches
        .is_some_and(|matches| !matches.is_empty());

    let mut relation_labels = Vec::new();
    for link in params.model.links() {
        if !params.node_visible(link.source) || !params.node_visible(link.target) {
            continue;
        }

        let from = params
            .viewport
            .project(params.rect, params.world_positions[link.source]);
        let to = params
            .viewport
            .project(params.rect, params.world_positions[link.target]);

        let touches_selection = params.selected == Some(link.source)
            || params.selected == Some(link.target);
        let (width, color) = if touches_selection {
            // The relation type becomes readable once its link is focused.
            relation_labels.push(Primitive::Label {
                anchor: from + (to - from) * 0.5,
                text: link.relation.clone(),
                color: LINK_HIGHLIGHT_COLOR,
            });
            ((1.8 * zoom.sqrt()).clamp(1.0, 3.5), LINK_HIGHLIGHT_COLOR)
        } else {
            ((1.0 * zoom.sqrt()).clamp(0.5, 2.5), LINK_COLOR)
        };

        primitives.push(Primitive::Line {
            from,
            to,
            width,
            color,
        });
    }

    // Larger entities paint later so they stay on top; index breaks ties
    // to keep the ordering stable between identical frames.
    let mut draw_order = (0..params.model.node_count())
        .filter(|&index| params.node_visible(index))
        .collect::<Vec<_>>();
    draw_order.sort_by(|&a, &b| {
        let size_a = params.model.node(a).map(|n| n.size).unwrap_or_default();
        let size_b = params.model.node(b).map(|n| n.size).unwrap_or_default();
        size_a.total_cmp(&size_b).then(a.cmp(&b))
    });

    let mut labels = Vec::new();
    for index in draw_order {
        let Some(node) = params.model.node(index) else {
            continue;
        };

        let center = params
            .viewport
            .project(params.rect, params.world_positions[index]);
        let radius = screen_radius(node.size, zoom);

        let is_selected = params.selected == Some(index);
        let is_hovered = params.hovered == Some(index);
        let is_match = params
            .search_matches
            .is_some_and(|matches| matches.contains(&index));

        let base = kind_color(node.kind);
        let fill = if search_active && !is_match && !is_selected {
            dim_color(base, 0.38)
        } else if is_hovered {
            blend_color(base, Color32::WHITE, 0.18)
        } else {
            base
        };

        let (ring, ring_width) = if is_selected {
            (SELECTED_RING, 2.5)
        } else if is_hovered {
            (HOVERED_RING, 2.0)
        } else if is_match {
            (MATCH_RING, 2.0)
        } else {
            (RING_COLOR, 1.5)
        };

        primitives.push(Primitive::Circle {
            center,
            radius,
            fill,
            ring,
            ring_width,
        });

        let labeled = node.size > LABEL_SIZE_THRESHOLD || is_selected || is_hovered || is_match;
        if labeled {
            labels.push(Primitive::Label {
                anchor: center + vec2(radius + 5.0, 0.0),
                text: node.label.clone(),
                color: if is_selected || is_hovered {
                    Color32::from_gray(240)
                } else {
                    LABEL_COLOR
                },
            });
        }
    }
    primitives.extend(labels);
    primitives.extend(relation_labels);

    push_legend(&mut primitives, params);

    Scene { primitives }
}

fn push_legend(primitives: &mut Vec<Primitive>, params: &SceneParams<'_>) {
    let anchor = params.rect.left_bottom() + vec2(18.0, -16.0);
    for (row, kind) in EntityKind::ALL.iter().rev().enumerate() {
        let swatch = anchor - vec2(0.0, row as f32 * 20.0);
        let color = if params.kind_visible(*kind) {
            kind_color(*kind)
        } else {
            dim_color(kind_color(*kind), 0.3)
        };

        primitives.push(Primitive::Circle {
            center: swatch,
            radius: 5.0,
            fill: color,
            ring: RING_COLOR,
            ring_width: 1.0,
        });
        primitives.push(Primitive::Label {
            anchor: swatch + vec2(10.0, 0.0),
            text: kind.label().to_owned(),
            color: if params.kind_visible(*kind) {
                LABEL_COLOR
            } else {
                dim_color(LABEL_COLOR, 0.4)
            },
        });
    }
}

pub(in crate::app) fn paint_scene(painter: &Painter, scene: &Scene) {
    for primitive in &scene.primitives {
        match primitive {
            Primitive::Line {
                from,
                to,
                width,
                color,
            } => {
                painter.line_segment([*from, *to], Stroke::new(*width, *color));
            }
            Primitive::Circle {
                center,
                radius,
                fill,
                ring,
                ring_width,
            } => {
                painter.circle_filled(*center, *radius, *fill);
                painter.circle_stroke(*center, *radius, Stroke::new(*ring_width, *ring));
            }
            Primitive::Label {
                anchor,
                text,
                color,
            } => {
                painter.text(
                    *anchor,
                    Align2::LEFT_CENTER,
                    text,
                    FontId::proportional(12.0),
                    *color,
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{GraphDataset, GraphLink, GraphNode};
    use eframe::egui::pos2;

    fn test_model() -> GraphModel {
        let nodes = vec![
            GraphNode {
                id: "a".into(),
                label: "Sarah Connor".into(),
                kind: EntityKind::Person,
                size: 3.0,
            },
            GraphNode {
                id: "b".into(),
                label: "Cyberdyne Systems".into(),
                kind: EntityKind::Organisation,
                size: 5.0,
            },
            GraphNode {
                id: "c".into(),
                label: "Minor Note".into(),
                kind: EntityKind::Document,
                size: 1.0,
            },
        ];
        let links = vec![
            GraphLink {
                source: "a".into(),
                target: "b".into(),
                relation: "WORKS_FOR".into(),
            },
            GraphLink {
                source: "a".into(),
                target: "missing".into(),
                relation: "KNOWS".into(),
            },
        ];
        GraphModel::from_dataset(GraphDataset { nodes, links })
    }

    fn world_positions(count: usize) -> Vec<Vec2> {
        (0..count).map(|i| vec2(i as f32 * 50.0, 0.0)).collect()
    }

    fn base_params<'a>(
        model: &'a GraphModel,
        positions: &'a [Vec2],
        active: &'a HashSet<EntityKind>,
    ) -> SceneParams<'a> {
        SceneParams {
            rect: Rect::from_min_size(pos2(0.0, 0.0), vec2(800.0, 600.0)),
            model,
            world_positions: positions,
            viewport: Viewport::default(),
            active_kinds: active,
            search_matches: None,
            selected: None,
            hovered: None,
        }
    }

    fn count_lines(scene: &Scene) -> usize {
        scene
            .primitives
            .iter()
            .filter(|p| matches!(p, Primitive::Line { .. }))
            .count()
    }

    fn node_circle_count(scene: &Scene) -> usize {
        // Legend swatches are circles too; node circles have zoom-scaled radii
        // well above the 5.0 swatch radius at default zoom.
        scene
            .primitives
            .iter()
            .filter(|p| matches!(p, Primitive::Circle { radius, .. } if *radius > 5.0))
            .count()
    }

    #[test]
    fn identical_state_renders_identical_scenes() {
        let model = test_model();
        let positions = world_positions(model.node_count());
        let active = HashSet::new();
        let params = base_params(&model, &positions, &active);

        assert_eq!(build_scene(&params), build_scene(&params));
    }

    #[test]
    fn every_line_references_live_nodes_only() {
        let model = test_model();
        // The dangling link was dropped during sanitization; the scene holds
        // exactly one line, between the two resolved endpoints.
        let positions = world_positions(model.node_count());
        let active = HashSet::new();
        let params = base_params(&model, &positions, &active);

        let scene = build_scene(&params);
        assert_eq!(count_lines(&scene), 1);
        assert_eq!(model.dropped_links(), 1);
    }

    #[test]
    fn type_filter_narrows_nodes_and_their_links() {
        let model = test_model();
        let positions = world_positions(model.node_count());

        let mut active = HashSet::new();
        active.insert(EntityKind::Person);
        let params = base_params(&model, &positions, &active);

        let scene = build_scene(&params);
        // Only the Person node survives; its link to the filtered-out
        // Organisation disappears with it.
        assert_eq!(node_circle_count(&scene), 1);
        assert_eq!(count_lines(&scene), 0);
    }

    #[test]
    fn empty_filter_set_shows_everything() {
        let model = test_model();
        let positions = world_positions(model.node_count());
        let active = HashSet::new();
        let params = base_params(&model, &positions, &active);

        let scene = build_scene(&params);
        assert_eq!(node_circle_count(&scene), model.node_count());
    }

    #[test]
    fn labels_respect_the_size_threshold() {
        let model = test_model();
        let positions = world_positions(model.node_count());
        let active = HashSet::new();
        let params = base_params(&model, &positions, &active);

        let scene = build_scene(&params);
        let labels = scene
            .primitives
            .iter()
            .filter_map(|p| match p {
                Primitive::Label { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>();

        assert!(labels.contains(&"Sarah Connor"));
        assert!(labels.contains(&"Cyberdyne Systems"));
        assert!(!labels.contains(&"Minor Note"));
    }

    #[test]
    fn selection_overrides_the_label_threshold() {
        let model = test_model();
        let positions = world_positions(model.node_count());
        let active = HashSet::new();
        let mut params = base_params(&model, &positions, &active);
        params.selected = model.index_of("c");

        let scene = build_scene(&params);
        let has_label = scene.primitives.iter().any(
            |p| matches!(p, Primitive::Label { text, .. } if text == "Minor Note"),
        );
        assert!(has_label);
    }

    #[test]
    fn selected_links_carry_their_relation_label() {
        let model = test_model();
        let positions = world_positions(model.node_count());
        let active = HashSet::new();
        let mut params = base_params(&model, &positions, &active);
        params.selected = model.index_of("a");

        let scene = build_scene(&params);
        let has_relation = scene.primitives.iter().any(
            |p| matches!(p, Primitive::Label { text, .. } if text == "WORKS_FOR"),
        );
        assert!(has_relation);

        params.selected = None;
        let scene = build_scene(&params);
        let has_relation = scene.primitives.iter().any(
            |p| matches!(p, Primitive::Label { text, .. } if text == "WORKS_FOR"),
        );
        assert!(!has_relation, "relation labels only appear for the selection");
    }

    #[test]
    fn search_dims_non_matching_nodes() {
        let model = test_model();
        let positions = world_positions(model.node_count());
        let active = HashSet::new();

        let matches = HashSet::from([model.index_of("a").unwrap()]);
        let mut params = base_params(&model, &positions, &active);
        params.search_matches = Some(&matches);

        let scene = build_scene(&params);
        let expected = dim_color(kind_color(EntityKind::Organisation), 0.38);
        let dimmed = scene.primitives.iter().any(
            |p| matches!(p, Primitive::Circle { fill, .. } if *fill == expected),
        );
        assert!(dimmed, "non-matching organisation node should dim");
        let full_match = scene.primitives.iter().any(
            |p| matches!(p, Primitive::Circle { fill, .. } if *fill == kind_color(EntityKind::Person)),
        );
        assert!(full_match, "matching person node keeps its full color");
    }

    #[test]
    fn legend_always_lists_every_kind() {
        let model = GraphModel::from_dataset(GraphDataset::default());
        let positions = Vec::new();
        let active = HashSet::new();
        let params = base_params(&model, &positions, &active);

        let scene = build_scene(&params);
        for kind in EntityKind::ALL {
            assert!(
                scene.primitives.iter().any(
                    |p| matches!(p, Primitive::Label { text, .. } if text == kind.label()),
                ),
                "legend is missing {}",
                kind.label()
            );
        }
    }
}
