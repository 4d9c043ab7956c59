//! Floor plane.
//!
//! Keeps particles above `y = height`. A particle caught below the floor
//! is lifted onto it, loses its vertical velocity and half its
//! horizontal velocity.

use drape_solver::PhysicsState;

use crate::report::ContactReport;

/// Horizontal floor at a fixed Y height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloorPlane {
    pub height: f32,
}

impl FloorPlane {
    pub fn new(height: f32) -> Self {
        Self { height }
    }

    /// Projects every free particle below the floor back onto it.
    pub fn resolve(&self, state: &mut PhysicsState) -> ContactReport {
        let mut report = ContactReport::default();
        for i in 0..state.vertex_count {
            if state.is_pinned(i) {
                continue;
            }
            let depth = self.height - state.pos_y[i];
            if depth <= 0.0 {
                continue;
            }

            state.pos_y[i] = self.height;
            state.prev_y[i] = self.height;
            state.prev_x[i] = state.pos_x[i] - (state.pos_x[i] - state.prev_x[i]) * 0.5;
            state.prev_z[i] = state.pos_z[i] - (state.pos_z[i] - state.prev_z[i]) * 0.5;

            report.resolved += 1;
            report.max_correction = report.max_correction.max(depth);
        }
        report
    }
}
