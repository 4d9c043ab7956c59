//! Cloth self-collision.
//!
//! Particles closer than the thickness are pushed apart along their
//! separation, split by inverse mass. Pairs joined by a structural edge
//! are excluded: their spacing belongs to the distance constraints.

use std::collections::HashSet;

use drape_mesh::{canonical_key, Topology};
use drape_solver::PhysicsState;
use drape_types::constants::EPSILON;

use crate::report::ContactReport;
use crate::spatial_hash::SpatialHash;

/// Self-collision resolver: hash → candidates → mass-weighted push.
#[derive(Debug, Clone)]
pub struct SelfCollisionSystem {
    hash: SpatialHash,
    excluded: HashSet<u64>,
    vertex_count: usize,
    thickness: f32,
    stiffness: f32,
    scratch: Vec<u32>,
}

impl SelfCollisionSystem {
    /// # Arguments
    /// - `topology`: cloth topology; its edges are excluded
    /// - `thickness`: minimum separation, also the hash cell size
    /// - `stiffness`: fraction of the overlap corrected per pass (0, 1]
    pub fn new(topology: &Topology, thickness: f32, stiffness: f32) -> Self {
        let n = topology.vertex_count();
        let excluded = topology
            .edges
            .iter()
            .map(|&[a, b]| canonical_key(a, b, n))
            .collect();
        Self {
            hash: SpatialHash::new(n, thickness),
            excluded,
            vertex_count: n,
            thickness,
            stiffness,
            scratch: Vec::new(),
        }
    }

    pub fn thickness(&self) -> f32 {
        self.thickness
    }

    #[inline]
    fn is_excluded(&self, i: u32, j: u32) -> bool {
        self.excluded.contains(&canonical_key(i, j, self.vertex_count))
    }

    /// One pass; every unordered pair is visited once.
    pub fn solve(&mut self, state: &mut PhysicsState) -> ContactReport {
        let mut report = ContactReport::default();
        self.hash.rebuild(state);
        let mut candidates = std::mem::take(&mut self.scratch);

        for i in 0..state.vertex_count {
            self.hash.query(state.position(i), self.thickness, &mut candidates);
            for &j in candidates.iter().filter(|&&j| j as usize > i) {
                let ju = j as usize;
                if self.is_excluded(i as u32, j) {
                    continue;
                }
                let (wi, wj) = (state.inv_mass[i], state.inv_mass[ju]);
                let w_sum = wi + wj;
                if w_sum <= 0.0 {
                    continue;
                }

                let pi = state.position(i);
                let pj = state.position(ju);
                let delta = pi - pj;
                let d = delta.length();
                if d >= self.thickness || d < EPSILON {
                    continue;
                }

                let n = delta / d;
                let correction = (self.thickness - d) * self.stiffness;
                state.set_position(i, pi + n * (correction * wi / w_sum));
                state.set_position(ju, pj - n * (correction * wj / w_sum));

                report.resolved += 1;
                report.max_correction = report.max_correction.max(correction);
            }
        }

        self.scratch = candidates;
        report
    }
}
