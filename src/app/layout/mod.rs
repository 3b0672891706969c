mod forces;
mod quadtree;

use eframe::egui::{Vec2, vec2};

use crate::data::GraphModel;
use crate::util::stable_pair;

use forces::{
    CollisionParams, MIN_SEPARATION, RepulsionParams, accumulate_collisions, accumulate_repulsion,
};
use quadtree::QuadNode;

/// Alpha below which the simulation counts as converged and the tick loop
/// may stop stepping.
pub(in crate::app) const ALPHA_SETTLED: f32 = 0.001;

/// Alpha target while a node is being dragged, so neighbors keep reacting.
pub(in crate::app) const DRAG_ALPHA_TARGET: f32 = 0.3;

// Geometric approach rate toward alpha_target. A full cool-down from 1.0
// crosses ALPHA_SETTLED in ~273 ticks.
const ALPHA_DECAY: f32 = 0.025;

const BARNES_HUT_THETA: f32 = 0.7;
const REPULSION_STRENGTH: f32 = 30_000.0;
const REPULSION_SOFTENING: f32 = 400.0;
const SPRING_STRENGTH: f32 = 0.06;
const CENTER_PULL: f32 = 0.012;
const COLLISION_STRENGTH: f32 = 1.1;
const COLLIDE_RADIUS_BASE: f32 = 10.0;
const COLLIDE_RADIUS_SCALE: f32 = 4.0;
const VELOCITY_DAMPING: f32 = 0.85;
const ACCELERATION: f32 = 0.055;
const MAX_FORCE: f32 = 200.0;
const MAX_SPEED: f32 = 30.0;
const SLEEP_SPEED_SQ: f32 = 0.02 * 0.02;
const SLEEP_FORCE_SQ: f32 = 0.08 * 0.08;

/// User-tunable force scales, fed in per step from the controls panel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(in crate::app) struct ForceTuning {
    pub link_distance: f32,
    pub repulsion: f32,
    pub collision: f32,
}

impl Default for ForceTuning {
    fn default() -> Self {
        Self {
            link_distance: 100.0,
            repulsion: 1.0,
            collision: 1.0,
        }
    }
}

struct Body {
    id: String,
    position: Vec2,
    velocity: Vec2,
    pinned: Option<Vec2>,
    collide_radius: f32,
}

#[derive(Default)]
struct ForceScratch {
    forces: Vec<Vec2>,
    positions: Vec<Vec2>,
    radii: Vec<f32>,
}

/// Owner of all per-node motion state. Bodies are indexed exactly like the
/// model's nodes; everything else in the app reads positions through here
/// and only ever mutates them via pin/unpin and step.
pub(in crate::app) struct LayoutEngine {
    bodies: Vec<Body>,
    springs: Vec<(usize, usize)>,
    alpha: f32,
    alpha_target: f32,
    generation: u64,
    scatter_extent: f32,
    scratch: ForceScratch,
}

impl LayoutEngine {
    /// Builds bodies and springs for the model. Positions are scattered
    /// over the start extent by a stable per-id hash, velocity starts at
    /// zero, and the cooling schedule starts hot (alpha = 1).
    pub fn new(model: &GraphModel, scatter_extent: f32) -> Self {
        let scatter_extent = scatter_extent.max(1.0);
        let generation = 0;

        let bodies = model
            .nodes()
            .iter()
            .map(|node| Body {
                position: scatter_position(&node.id, generation, scatter_extent),
                velocity: Vec2::ZERO,
                pinned: None,
                collide_radius: COLLIDE_RADIUS_BASE + node.size * COLLIDE_RADIUS_SCALE,
                id: node.id.clone(),
            })
            .collect::<Vec<_>>();

        // Self-links carry no spring; duplicates each pull on their own.
        let springs = model
            .links()
            .iter()
            .filter(|link| link.source != link.target)
            .map(|link| (link.source, link.target))
            .collect();

        Self {
            bodies,
            springs,
            alpha: 1.0,
            alpha_target: 0.0,
            generation,
            scatter_extent,
            scratch: ForceScratch::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn spring_count(&self) -> usize {
        self.springs.len()
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn position(&self, index: usize) -> Option<Vec2> {
        self.bodies.get(index).map(|body| body.position)
    }

    pub fn velocity(&self, index: usize) -> Option<Vec2> {
        self.bodies.get(index).map(|body| body.velocity)
    }

    pub fn iter_positions(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.bodies.iter().map(|body| body.position)
    }

    pub fn is_pinned(&self, index: usize) -> bool {
        self.bodies
            .get(index)
            .is_some_and(|body| body.pinned.is_some())
    }

    /// Fixes a body at a world position; applied on the next step and held
    /// until unpin. The body keeps exerting forces on its neighbors.
    pub fn pin(&mut self, index: usize, world: Vec2) {
        if let Some(body) = self.bodies.get_mut(index) {
            body.pinned = Some(world);
        }
    }

    /// Releases a pinned body where it stands; forces take over again on
    /// the next step.
    pub fn unpin(&mut self, index: usize) {
        if let Some(body) = self.bodies.get_mut(index) {
            body.pinned = None;
        }
    }

    /// Raises the cooling floor (drag start). Alpha is also bumped up to
    /// the target so the reaction is visible immediately.
    pub fn reheat(&mut self, target: f32) {
        self.alpha_target = target.clamp(0.0, 1.0);
        self.alpha = self.alpha.max(self.alpha_target);
    }

    /// Restores natural cooling (drag end); no hard stop.
    pub fn cool(&mut self) {
        self.alpha_target = 0.0;
    }

    /// Restarts the simulation from scratch: alpha back to 1 and every
    /// unpinned body re-scattered under a fresh generation salt.
    pub fn relayout(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.alpha = 1.0;
        self.alpha_target = 0.0;

        for body in &mut self.bodies {
            if body.pinned.is_none() {
                body.position = scatter_position(&body.id, self.generation, self.scatter_extent);
                body.velocity = Vec2::ZERO;
            }
        }
    }

    pub fn is_settled(&self) -> bool {
        self.alpha < ALPHA_SETTLED && self.alpha_target < ALPHA_SETTLED
    }

    /// One simulation tick: cool alpha, accumulate spring / repulsion /
    /// centering / collision forces, then integrate with damping. Pinned
    /// bodies are held in place but still push and pull on others.
    pub fn step(&mut self, dt: f32, tuning: ForceTuning) {
        self.alpha += (self.alpha_target - self.alpha) * ALPHA_DECAY;

        let node_count = self.bodies.len();
        if node_count == 0 {
            return;
        }

        let scratch = &mut self.scratch;
        scratch.forces.resize(node_count, Vec2::ZERO);
        scratch.forces.fill(Vec2::ZERO);
        scratch.positions.clear();
        scratch.radii.clear();
        let mut max_radius = 0.0_f32;
        for body in &self.bodies {
            scratch.positions.push(body.position);
            scratch.radii.push(body.collide_radius);
            max_radius = max_radius.max(body.collide_radius);
        }

        let alpha = self.alpha;
        let repulsion = RepulsionParams {
            strength: REPULSION_STRENGTH * tuning.repulsion.clamp(0.0, 4.0) * alpha,
            softening: REPULSION_SOFTENING,
            theta: BARNES_HUT_THETA,
        };

        if let Some(tree) = QuadNode::build(&scratch.positions) {
            if repulsion.strength > 0.0 {
                for (index, force) in scratch.forces.iter_mut().enumerate() {
                    accumulate_repulsion(&tree, index, &scratch.positions, repulsion, force);
                }
            }

            let max_reach = max_radius * 2.0;
            let collision = CollisionParams {
                strength: COLLISION_STRENGTH * tuning.collision.clamp(0.0, 3.0),
                max_reach_sq: max_reach * max_reach,
            };
            if collision.strength > 0.0 {
                accumulate_collisions(
                    &tree,
                    &tree,
                    true,
                    &scratch.positions,
                    &scratch.radii,
                    collision,
                    &mut scratch.forces,
                );
            }
        }

        let spring_k = SPRING_STRENGTH * alpha;
        if spring_k > 0.0 {
            for &(a, b) in &self.springs {
                if a >= node_count || b >= node_count {
                    continue;
                }

                let delta = scratch.positions[a] - scratch.positions[b];
                let distance_sq = delta.length_sq();
                if distance_sq <= MIN_SEPARATION * MIN_SEPARATION {
                    continue;
                }
                let distance = distance_sq.sqrt();

                let rest = tuning.link_distance.max(1.0)
                    + (scratch.radii[a] + scratch.radii[b]) * 0.5;
                let correction = (delta / distance) * ((distance - rest) * spring_k);
                scratch.forces[a] -= correction;
                scratch.forces[b] += correction;
            }
        }

        let center_pull = CENTER_PULL * alpha;
        for (index, force) in scratch.forces.iter_mut().enumerate() {
            *force -= scratch.positions[index] * center_pull;
        }

        let dt_scale = (dt * 60.0).clamp(0.25, 3.0);
        let damping = VELOCITY_DAMPING.powf(dt_scale);
        for (index, body) in self.bodies.iter_mut().enumerate() {
            if let Some(pin) = body.pinned {
                body.position = pin;
                body.velocity = Vec2::ZERO;
                continue;
            }

            let mut force = scratch.forces[index];
            let force_sq = force.length_sq();
            if force_sq > MAX_FORCE * MAX_FORCE {
                force *= MAX_FORCE / force_sq.sqrt();
            }

            let mut velocity = (body.velocity + force * (ACCELERATION * dt_scale)) * damping;
            let speed_sq = velocity.length_sq();
            if speed_sq > MAX_SPEED * MAX_SPEED {
                velocity *= MAX_SPEED / speed_sq.sqrt();
            } else if speed_sq < SLEEP_SPEED_SQ && force_sq < SLEEP_FORCE_SQ {
                velocity = Vec2::ZERO;
            }

            body.velocity = velocity;
            body.position += velocity * dt_scale;
        }
    }
}

fn scatter_position(id: &str, generation: u64, extent: f32) -> Vec2 {
    let (x, y) = stable_pair(id, generation);
    vec2(x * extent, y * extent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{EntityKind, GraphDataset, GraphLink, GraphNode};

    const DT: f32 = 1.0 / 60.0;

    fn model(node_count: usize, links: &[(usize, usize)]) -> GraphModel {
        let nodes = (0..node_count)
            .map(|index| GraphNode {
                id: format!("n{index}"),
                label: format!("Node {index}"),
                kind: EntityKind::ALL[index % EntityKind::ALL.len()],
                size: 1.0 + (index % 5) as f32,
            })
            .collect();
        let links = links
            .iter()
            .map(|&(source, target)| GraphLink {
                source: format!("n{source}"),
                target: format!("n{target}"),
                relation: "RELATES_TO".to_owned(),
            })
            .collect();

        GraphModel::from_dataset(GraphDataset { nodes, links })
    }

    fn ring_links(node_count: usize) -> Vec<(usize, usize)> {
        (0..node_count).map(|i| (i, (i + 1) % node_count)).collect()
    }

    fn settle(engine: &mut LayoutEngine, max_ticks: usize) -> usize {
        for tick in 0..max_ticks {
            if engine.is_settled() {
                return tick;
            }
            engine.step(DT, ForceTuning::default());
        }
        max_ticks
    }

    #[test]
    fn connected_graph_settles_within_three_hundred_ticks() {
        let model = model(500, &ring_links(500));
        let mut engine = LayoutEngine::new(&model, 400.0);

        let ticks = settle(&mut engine, 300);
        assert!(engine.is_settled(), "still hot after {ticks} ticks");
    }

    #[test]
    fn disconnected_graph_settles_within_three_hundred_ticks() {
        let model = model(200, &[]);
        let mut engine = LayoutEngine::new(&model, 400.0);

        settle(&mut engine, 300);
        assert!(engine.is_settled());
        for index in 0..engine.len() {
            let position = engine.position(index).unwrap();
            assert!(position.x.is_finite() && position.y.is_finite());
        }
    }

    #[test]
    fn raised_alpha_target_prevents_settling() {
        let model = model(10, &ring_links(10));
        let mut engine = LayoutEngine::new(&model, 200.0);
        engine.reheat(DRAG_ALPHA_TARGET);

        for _ in 0..500 {
            engine.step(DT, ForceTuning::default());
        }

        assert!(!engine.is_settled());
        assert!(engine.alpha() > DRAG_ALPHA_TARGET * 0.9);
    }

    #[test]
    fn pinned_body_never_moves_until_unpinned() {
        let model = model(12, &ring_links(12));
        let mut engine = LayoutEngine::new(&model, 200.0);

        let pin_at = vec2(37.0, -81.0);
        engine.pin(3, pin_at);
        engine.reheat(DRAG_ALPHA_TARGET);

        for _ in 0..80 {
            engine.step(DT, ForceTuning::default());
            assert_eq!(engine.position(3).unwrap(), pin_at);
        }

        engine.unpin(3);
        engine.cool();
        for _ in 0..10 {
            engine.step(DT, ForceTuning::default());
        }
        assert_ne!(
            engine.position(3).unwrap(),
            pin_at,
            "released body should rejoin the simulation"
        );
    }

    #[test]
    fn released_drag_leaves_body_moving_not_frozen() {
        let model = model(6, &ring_links(6));
        let mut engine = LayoutEngine::new(&model, 150.0);

        // Drag gesture: reheat, pin far away from the neighbors, hold.
        engine.reheat(DRAG_ALPHA_TARGET);
        engine.pin(0, vec2(900.0, 0.0));
        for _ in 0..30 {
            engine.step(DT, ForceTuning::default());
        }

        // Release: unpin and let the layout cool naturally.
        engine.unpin(0);
        engine.cool();

        let mut saw_motion = false;
        for _ in 0..5 {
            engine.step(DT, ForceTuning::default());
            if engine.velocity(0).unwrap().length() > 0.0 {
                saw_motion = true;
            }
        }
        assert!(saw_motion, "springs should pull the released body back");
        assert!(!engine.is_pinned(0));
    }

    #[test]
    fn relayout_resets_alpha_and_rescatters_unpinned_bodies() {
        let model = model(20, &ring_links(20));
        let mut engine = LayoutEngine::new(&model, 200.0);

        let pin_at = vec2(5.0, 5.0);
        engine.pin(0, pin_at);
        settle(&mut engine, 300);

        let before = (0..engine.len())
            .map(|index| engine.position(index).unwrap())
            .collect::<Vec<_>>();

        engine.relayout();
        assert_eq!(engine.alpha(), 1.0);
        assert!(!engine.is_settled());

        let moved = (1..engine.len())
            .filter(|&index| engine.position(index).unwrap() != before[index])
            .count();
        assert!(moved > engine.len() / 2, "re-scatter should move most bodies");

        // The pin survives a relayout and still holds its body in place.
        engine.step(DT, ForceTuning::default());
        assert_eq!(engine.position(0).unwrap(), pin_at);
    }

    #[test]
    fn coincident_bodies_separate_without_nans() {
        let model = model(4, &ring_links(4));
        let mut engine = LayoutEngine::new(&model, 100.0);

        let stack_at = vec2(10.0, 10.0);
        for index in 0..engine.len() {
            engine.pin(index, stack_at);
        }
        engine.step(DT, ForceTuning::default());
        for index in 0..engine.len() {
            engine.unpin(index);
        }
        engine.reheat(1.0);

        for _ in 0..40 {
            engine.step(DT, ForceTuning::default());
        }

        for index in 0..engine.len() {
            let position = engine.position(index).unwrap();
            assert!(position.x.is_finite() && position.y.is_finite());
        }
        let spread = engine.position(0).unwrap() - engine.position(1).unwrap();
        assert!(spread.length() > 1.0, "stacked bodies should push apart");
    }

    #[test]
    fn springs_only_cover_resolved_links() {
        let dataset = GraphDataset {
            nodes: vec![
                GraphNode {
                    id: "a".into(),
                    label: "A".into(),
                    kind: EntityKind::Person,
                    size: 1.0,
                },
                GraphNode {
                    id: "b".into(),
                    label: "B".into(),
                    kind: EntityKind::Concept,
                    size: 1.0,
                },
            ],
            links: vec![
                GraphLink {
                    source: "a".into(),
                    target: "b".into(),
                    relation: "KNOWS".into(),
                },
                GraphLink {
                    source: "a".into(),
                    target: "missing".into(),
                    relation: "KNOWS".into(),
                },
                GraphLink {
                    source: "a".into(),
                    target: "a".into(),
                    relation: "SELF".into(),
                },
            ],
        };
        let model = GraphModel::from_dataset(dataset);
        let engine = LayoutEngine::new(&model, 100.0);

        assert_eq!(engine.spring_count(), 1);
        assert_eq!(model.dropped_links(), 1);
    }

    #[test]
    fn empty_model_settles_and_stays_inert() {
        let model = GraphModel::from_dataset(GraphDataset::default());
        let mut engine = LayoutEngine::new(&model, 100.0);

        settle(&mut engine, 300);
        assert!(engine.is_settled());
        assert_eq!(engine.len(), 0);
    }
}
