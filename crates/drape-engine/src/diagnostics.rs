//! Penetration diagnostics.

use drape_contact::BodyCollider;
use drape_solver::PhysicsState;
use drape_types::constants::PENETRATION_REPORT_THRESHOLD;
use serde::{Deserialize, Serialize};

/// How far the cloth currently sits inside the body's skin.
///
/// Depth is the distance a particle would have to move to reach its safe
/// position one skin offset outside the surface. Only free particles are
/// measured, and only depths above 1 mm count as penetrating.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub penetrating_vertex_count: u32,
    /// Free particles measured.
    pub total_vertices: u32,
    /// Mean depth over penetrating particles (meters), 0 if none.
    pub avg_penetration_depth: f32,
    pub max_penetration_depth: f32,
}

impl Diagnostics {
    /// True if no particle penetrates beyond the report threshold.
    pub fn is_clean(&self) -> bool {
        self.penetrating_vertex_count == 0
    }
}

/// Measures `state` against `body` without mutating either.
pub fn measure(state: &PhysicsState, body: &BodyCollider) -> Diagnostics {
    let mut d = Diagnostics::default();
    let mut total_depth = 0.0f64;

    for i in (0..state.vertex_count).filter(|&i| !state.is_pinned(i)) {
        d.total_vertices += 1;
        let p = state.position(i);
        let depth = (body.resolve_point(p) - p).length();
        if depth > PENETRATION_REPORT_THRESHOLD {
            d.penetrating_vertex_count += 1;
            total_depth += depth as f64;
            d.max_penetration_depth = d.max_penetration_depth.max(depth);
        }
    }

    if d.penetrating_vertex_count > 0 {
        d.avg_penetration_depth = (total_depth / d.penetrating_vertex_count as f64) as f32;
    }
    d
}
