use eframe::egui::{Vec2, vec2};

use super::quadtree::QuadNode;

pub(super) const MIN_SEPARATION: f32 = 1e-4;

#[derive(Clone, Copy)]
pub(super) struct RepulsionParams {
    pub(super) strength: f32,
    pub(super) softening: f32,
    pub(super) theta: f32,
}

#[derive(Clone, Copy)]
pub(super) struct CollisionParams {
    pub(super) strength: f32,
    pub(super) max_reach_sq: f32,
}

/// Unit direction between two bodies. Coincident bodies get a deterministic
/// golden-angle direction derived from their indices, so overlapping
/// initial placements separate instead of producing NaN.
fn separation_direction(delta: Vec2, distance: f32, a: usize, b: usize) -> Vec2 {
    if distance > MIN_SEPARATION {
        delta / distance
    } else {
        let angle = ((a as f32) * 0.618_034 + (b as f32) * 0.414_214) * std::f32::consts::TAU;
        vec2(angle.cos(), angle.sin())
    }
}

fn repulsion_between(point: Vec2, other: Vec2, index: usize, other_index: usize, params: RepulsionParams) -> Vec2 {
    let delta = point - other;
    let distance_sq = delta.length_sq();
    let direction = separation_direction(delta, distance_sq.sqrt(), index, other_index);
    direction * (params.strength / (distance_sq + params.softening))
}

/// Barnes-Hut repulsion for one body: distant subtrees collapse to their
/// center of mass when they subtend less than theta, leaves are exact.
pub(super) fn accumulate_repulsion(
    tree: &QuadNode,
    index: usize,
    positions: &[Vec2],
    params: RepulsionParams,
    force: &mut Vec2,
) {
    if tree.mass <= 0.0 {
        return;
    }

    let point = positions[index];

    if tree.is_leaf() {
        for &other in &tree.indices {
            if other != index {
                *force += repulsion_between(point, positions[other], index, other, params);
            }
        }
        return;
    }

    let delta = point - tree.center_of_mass;
    let distance_sq = delta.length_sq().max(MIN_SEPARATION);
    let distance = distance_sq.sqrt();
    let far_enough = !tree.bounds.contains(point)
        && (tree.bounds.extent() / distance) < params.theta
        && tree.mass > 1.0;

    if far_enough {
        let scaled = (params.strength * tree.mass) / (distance_sq + params.softening);
        *force += (delta / distance) * scaled;
        return;
    }

    for child in tree.children.iter().flatten() {
        accumulate_repulsion(child, index, positions, params, force);
    }
}

fn resolve_overlap(
    a: usize,
    b: usize,
    positions: &[Vec2],
    radii: &[f32],
    params: CollisionParams,
    forces: &mut [Vec2],
) {
    let delta = positions[a] - positions[b];
    let distance = delta.length();
    let min_distance = radii[a] + radii[b];
    if distance >= min_distance {
        return;
    }

    let direction = separation_direction(delta, distance, a, b);
    let push = (min_distance - distance) * params.strength;
    forces[a] += direction * push;
    forces[b] -= direction * push;
}

/// Dual-tree collision sweep: subtree pairs further apart than the largest
/// possible overlap are pruned wholesale, leaf pairs resolve body by body.
pub(super) fn accumulate_collisions(
    tree_a: &QuadNode,
    tree_b: &QuadNode,
    same_tree: bool,
    positions: &[Vec2],
    radii: &[f32],
    params: CollisionParams,
    forces: &mut [Vec2],
) {
    if tree_a.bounds.squared_gap_to(tree_b.bounds) > params.max_reach_sq {
        return;
    }

    if tree_a.is_leaf() && tree_b.is_leaf() {
        if same_tree {
            for (slot, &a) in tree_a.indices.iter().enumerate() {
                for &b in tree_a.indices.iter().skip(slot + 1) {
                    resolve_overlap(a, b, positions, radii, params, forces);
                }
            }
        } else {
            for &a in &tree_a.indices {
                for &b in &tree_b.indices {
                    resolve_overlap(a, b, positions, radii, params, forces);
                }
            }
        }
        return;
    }

    if same_tree {
        for first in 0..4 {
            let Some(child_a) = tree_a.children[first].as_ref() else {
                continue;
            };

            accumulate_collisions(child_a, child_a, true, positions, radii, params, forces);

            for second in (first + 1)..4 {
                if let Some(child_b) = tree_a.children[second].as_ref() {
                    accumulate_collisions(child_a, child_b, false, positions, radii, params, forces);
                }
            }
        }
        return;
    }

    // Descend into the larger side first so pruning stays effective.
    let split_a = if tree_a.is_leaf() {
        false
    } else if tree_b.is_leaf() {
        true
    } else {
        tree_a.bounds.half_extent >= tree_b.bounds.half_extent
    };

    if split_a {
        for child in tree_a.children.iter().flatten() {
            accumulate_collisions(child, tree_b, false, positions, radii, params, forces);
        }
    } else {
        for child in tree_b.children.iter().flatten() {
            accumulate_collisions(tree_a, child, false, positions, radii, params, forces);
        }
    }
}
