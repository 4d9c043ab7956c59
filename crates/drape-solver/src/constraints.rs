//! Distance constraints solved with XPBD.
//!
//! Two sets share one solver: structural constraints along every mesh
//! edge, and bending constraints between vertices two hops apart. Each
//! carries a rest length measured once from the initial positions.
//!
//! Per constraint, with `d = |pa - pb|` and `α = compliance / dt²`:
//!
//! ```text
//! λ  = -(d - rest) / (wA + wB + α)
//! pa += λ · wA · n
//! pb -= λ · wB · n          n = (pa - pb) / d
//! ```

use drape_mesh::{BoundaryRing, Topology};
use drape_types::constants::EPSILON;

use crate::state::PhysicsState;

/// A distance constraint between two particles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceConstraint {
    pub a: u32,
    pub b: u32,
    pub rest_length: f32,
}

impl DistanceConstraint {
    /// Constraint at the pair's current distance.
    pub fn at_rest(state: &PhysicsState, a: u32, b: u32) -> Self {
        let rest_length = (state.position(a as usize) - state.position(b as usize)).length();
        Self { a, b, rest_length }
    }
}

/// Structural and bending constraints of one cloth mesh.
///
/// Immutable after [`ConstraintSet::build`].
#[derive(Debug, Clone, Default)]
pub struct ConstraintSet {
    pub structural: Vec<DistanceConstraint>,
    pub bending: Vec<DistanceConstraint>,
    /// Per structural constraint: true if both ends lie on the collar.
    collar_edge: Vec<bool>,
}

impl ConstraintSet {
    /// Builds both constraint sets with rest lengths from `state`.
    pub fn build(topology: &Topology, state: &PhysicsState, collar: &BoundaryRing) -> Self {
        let structural: Vec<DistanceConstraint> = topology
            .edges
            .iter()
            .map(|&[a, b]| DistanceConstraint::at_rest(state, a, b))
            .collect();
        let collar_edge = structural
            .iter()
            .map(|c| collar.contains(c.a) && collar.contains(c.b))
            .collect();
        let bending = topology
            .bending_edges()
            .into_iter()
            .map(|[a, b]| DistanceConstraint::at_rest(state, a, b))
            .collect();

        Self {
            structural,
            bending,
            collar_edge,
        }
    }

    /// Number of structural edges that lie along the collar.
    pub fn collar_edge_count(&self) -> usize {
        self.collar_edge.iter().filter(|&&c| c).count()
    }

    /// One XPBD pass over the structural constraints.
    pub fn solve_structural(&self, state: &mut PhysicsState, compliance: f32, dt: f32) {
        solve_distance(&self.structural, state, compliance, dt);
    }

    /// One XPBD pass over the bending constraints.
    pub fn solve_bending(&self, state: &mut PhysicsState, compliance: f32, dt: f32) {
        solve_distance(&self.bending, state, compliance, dt);
    }

    /// Clamps every over-stretched structural edge back to its limit.
    ///
    /// No compliance: an edge longer than `limit · rest` ends this pass at
    /// exactly `limit · rest` (when it shares no particle with another
    /// over-stretched edge). Collar edges use `collar_limit`.
    pub fn enforce_stretch_limits(&self, state: &mut PhysicsState, limit: f32, collar_limit: f32) {
        for (c, &on_collar) in self.structural.iter().zip(&self.collar_edge) {
            let max_len = c.rest_length * if on_collar { collar_limit } else { limit };
            let (a, b) = (c.a as usize, c.b as usize);
            let (wa, wb) = (state.inv_mass[a], state.inv_mass[b]);
            let w_sum = wa + wb;
            if w_sum <= 0.0 {
                continue;
            }

            let delta = state.position(a) - state.position(b);
            let d = delta.length();
            if d <= max_len || d < EPSILON {
                continue;
            }

            let n = delta / d;
            let excess = d - max_len;
            state.set_position(a, state.position(a) - n * (excess * wa / w_sum));
            state.set_position(b, state.position(b) + n * (excess * wb / w_sum));
        }
    }
}

/// One Gauss-Seidel XPBD pass over `constraints`.
///
/// Pairs closer than epsilon or with both ends pinned are skipped.
pub fn solve_distance(
    constraints: &[DistanceConstraint],
    state: &mut PhysicsState,
    compliance: f32,
    dt: f32,
) {
    let alpha = compliance / (dt * dt);
    for c in constraints {
        let (a, b) = (c.a as usize, c.b as usize);
        let (wa, wb) = (state.inv_mass[a], state.inv_mass[b]);
        let w_sum = wa + wb;
        if w_sum <= 0.0 {
            continue;
        }

        let pa = state.position(a);
        let pb = state.position(b);
        let delta = pa - pb;
        let d = delta.length();
        if d < EPSILON {
            continue;
        }

        let lambda = -(d - c.rest_length) / (w_sum + alpha);
        let n = delta / d;
        state.set_position(a, pa + n * (lambda * wa));
        state.set_position(b, pb - n * (lambda * wb));
    }
}
