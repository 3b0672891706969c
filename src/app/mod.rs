use std::collections::HashSet;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context, Pos2, Rect, Vec2, pos2, vec2};

use crate::data::{DatasetSource, EntityKind, GraphDataset, GraphModel, load_dataset};

mod graph;
mod layout;
mod render_utils;
mod scene;
mod ui;
mod viewport;

use layout::{ForceTuning, LayoutEngine};
use viewport::Viewport;

/// Radius of the initial scatter in world units.
const SCATTER_EXTENT: f32 = 300.0;

pub struct AtlasApp {
    source: DatasetSource,
    state: AppState,
    reload_rx: Option<Receiver<Result<GraphDataset, String>>>,
}

enum AppState {
    Loading {
        rx: Receiver<Result<GraphDataset, String>>,
    },
    Ready(Box<ViewModel>),
    Error(String),
}

/// All session state for one loaded graph: the immutable model, the layout
/// engine that owns node motion, the viewport transform, and the UI-side
/// selection/filter/search state.
struct ViewModel {
    model: GraphModel,
    source_label: String,
    layout: LayoutEngine,
    tuning: ForceTuning,
    viewport: Viewport,
    selected: Option<String>,
    search: String,
    active_kinds: HashSet<EntityKind>,
    drag: DragState,
    search_match_cache: Option<SearchMatchCache>,
    last_query_request: Option<String>,
    view_scratch: ViewScratch,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DragState {
    Idle,
    Node(usize),
    Pan,
}

struct SearchMatchCache {
    query: String,
    matches: Arc<HashSet<usize>>,
}

/// Per-frame projection scratch, reused to avoid reallocating.
struct ViewScratch {
    canvas_rect: Rect,
    world_positions: Vec<Vec2>,
    screen_positions: Vec<Pos2>,
    screen_radii: Vec<f32>,
}

impl Default for ViewScratch {
    fn default() -> Self {
        Self {
            canvas_rect: Rect::from_min_size(pos2(0.0, 0.0), vec2(1.0, 1.0)),
            world_positions: Vec::new(),
            screen_positions: Vec::new(),
            screen_radii: Vec::new(),
        }
    }
}

impl AtlasApp {
    pub fn new(source: DatasetSource) -> Self {
        let state = Self::start_load(source.clone());
        Self {
            source,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(source: DatasetSource) -> Receiver<Result<GraphDataset, String>> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            log::info!("loading graph dataset from {}", source.label());
            let result = load_dataset(&source).map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(source: DatasetSource) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(source),
        }
    }

    fn make_ready(source_label: String, dataset: GraphDataset) -> AppState {
        let model = GraphModel::from_dataset(dataset);
        log::info!(
            "graph ready: {} nodes, {} links",
            model.node_count(),
            model.link_count()
        );
        AppState::Ready(Box::new(ViewModel::new(model, source_label)))
    }
}

impl eframe::App for AtlasApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                if let Ok(result) = rx.try_recv() {
                    transition = Some(match result {
                        Ok(dataset) => Self::make_ready(self.source.label(), dataset),
                        Err(error) => AppState::Error(error),
                    });
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading graph topology...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
                ctx.request_repaint();
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("No graph data");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(Self::start_load(self.source.clone()));
                    }
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(ctx, &mut reload_requested, is_reloading);

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = Some(Self::spawn_load(self.source.clone()));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(result) => {
                            transition = Some(match result {
                                Ok(dataset) => Self::make_ready(self.source.label(), dataset),
                                Err(error) => AppState::Error(error),
                            });
                        }
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                            ctx.request_repaint();
                        }
                        Err(TryRecvError::Disconnected) => {
                            transition =
                                Some(AppState::Error("Background load worker disconnected".to_owned()));
                        }
                    }
                }
            }
        }

        if let Some(next_state) = transition {
            self.reload_rx = None;
            self.state = next_state;
        }
    }
}
