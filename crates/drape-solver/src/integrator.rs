//! Verlet substep integration and the explosion guard.

use drape_math::Vec3;
use drape_types::ParticleId;

use crate::state::PhysicsState;

/// Advances every free particle by one substep.
///
/// ```text
/// v    = (pos - prev) · drag + accel · dt²
/// v    = v clamped to max_speed · dt
/// prev = pos
/// pos  = pos + v
/// ```
///
/// `accel` is gravity plus any directional wind.
pub fn integrate(state: &mut PhysicsState, dt: f32, accel: Vec3, drag: f32, max_speed: f32) {
    let step_accel = accel * (dt * dt);
    let max_step = max_speed * dt;
    for i in 0..state.vertex_count {
        if state.is_pinned(i) {
            continue;
        }
        let pos = state.position(i);
        let mut v = state.velocity(i) * drag + step_accel;
        if max_speed > 0.0 {
            v = v.clamp_length_max(max_step);
        }
        state.set_prev_position(i, pos);
        state.set_position(i, pos + v);
    }
}

/// Resets every particle that left the plausible region.
///
/// A particle with a non-finite coordinate, or one whose coordinate
/// magnitude exceeds `bound`, returns to its rest position with zero
/// velocity. Returns the particles that were reset.
pub fn guard_state(state: &mut PhysicsState, bound: f32) -> Vec<ParticleId> {
    let mut reset = Vec::new();
    for i in 0..state.vertex_count {
        let p = state.position(i);
        let prev = state.prev_position(i);
        let bad = !p.is_finite() || !prev.is_finite() || p.abs().max_element() > bound;
        if bad {
            state.reset_particle(i);
            reset.push(ParticleId(i as u32));
        }
    }
    reset
}
