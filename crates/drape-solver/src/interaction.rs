//! Grab, drag and release.
//!
//! The user grabs one particle; every free particle within the grab
//! radius joins it and keeps its offset from the grabbed particle. Each
//! substep the members are pulled toward `target + offset` through a
//! compliant spring. Releasing hands the cloth a throw velocity.
//!
//! ```text
//! Idle ──begin──▶ Grabbing ──end──▶ Idle
//!                  │    ▲
//!                  └────┘ update_target / begin (replaces)
//! ```

use std::collections::VecDeque;

use drape_math::Vec3;
use drape_types::constants::EPSILON;
use drape_types::ParticleId;
use serde::{Deserialize, Serialize};

use crate::state::PhysicsState;

/// Target samples older than this do not feed the throw estimate (seconds).
const THROW_WINDOW: f32 = 0.1;

const MAX_SAMPLES: usize = 32;

/// A particle held by the current grab.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrabMember {
    pub particle: ParticleId,
    /// Offset from the grabbed particle at grab time.
    pub offset: Vec3,
}

#[derive(Debug, Clone)]
struct Grab {
    anchor: ParticleId,
    members: Vec<GrabMember>,
    target: Vec3,
    /// Recent `(target, time)` samples.
    history: VecDeque<(Vec3, f32)>,
}

/// Plain snapshot of the interaction, as published to the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub active: bool,
    pub particle: u32,
    pub target: [f32; 3],
}

/// Grab/drag/release state machine.
#[derive(Debug, Clone, Default)]
pub struct InteractionConstraint {
    grab: Option<Grab>,
    clock: f32,
}

impl InteractionConstraint {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.grab.is_some()
    }

    /// The grabbed particle, if any.
    pub fn anchor(&self) -> Option<ParticleId> {
        self.grab.as_ref().map(|g| g.anchor)
    }

    pub fn target(&self) -> Option<Vec3> {
        self.grab.as_ref().map(|g| g.target)
    }

    pub fn members(&self) -> &[GrabMember] {
        self.grab.as_ref().map_or(&[], |g| g.members.as_slice())
    }

    pub fn record(&self) -> InteractionRecord {
        match &self.grab {
            Some(g) => InteractionRecord {
                active: true,
                particle: g.anchor.0,
                target: g.target.to_array(),
            },
            None => InteractionRecord::default(),
        }
    }

    /// Starts a grab of `particle`, replacing any grab in progress.
    ///
    /// Returns false, and leaves the state untouched, if the particle is
    /// out of range or pinned.
    pub fn begin(
        &mut self,
        state: &PhysicsState,
        particle: ParticleId,
        target: Vec3,
        radius: f32,
    ) -> bool {
        let i = particle.index();
        if i >= state.vertex_count || state.is_pinned(i) {
            return false;
        }

        let center = state.position(i);
        let mut members = vec![GrabMember {
            particle,
            offset: Vec3::ZERO,
        }];
        if radius > 0.0 {
            let r2 = radius * radius;
            for j in (0..state.vertex_count).filter(|&j| j != i && !state.is_pinned(j)) {
                let offset = state.position(j) - center;
                if offset.length_squared() <= r2 {
                    members.push(GrabMember {
                        particle: ParticleId(j as u32),
                        offset,
                    });
                }
            }
        }

        let mut history = VecDeque::new();
        history.push_back((target, self.clock));
        tracing::debug!(%particle, members = members.len(), "grab started");
        self.grab = Some(Grab {
            anchor: particle,
            members,
            target,
            history,
        });
        true
    }

    /// Moves the target. No-op while idle.
    pub fn update_target(&mut self, target: Vec3) {
        let now = self.clock;
        if let Some(grab) = &mut self.grab {
            grab.target = target;
            grab.history.push_back((target, now));
            prune_history(&mut grab.history, now);
        }
    }

    /// Advances the interaction clock by one frame.
    pub fn advance(&mut self, dt: f32) {
        self.clock += dt;
        let now = self.clock;
        if let Some(grab) = &mut self.grab {
            prune_history(&mut grab.history, now);
        }
    }

    /// Target velocity over the last [`THROW_WINDOW`] seconds (m/s).
    ///
    /// Zero once the target has not moved for a full window.
    pub fn estimated_velocity(&self) -> Vec3 {
        let Some(grab) = &self.grab else {
            return Vec3::ZERO;
        };
        let now = self.clock;
        let Some(&(p1, t1)) = grab.history.back() else {
            return Vec3::ZERO;
        };
        if now - t1 > THROW_WINDOW {
            return Vec3::ZERO;
        }
        // Oldest fresh sample. With a single fresh sample, the one just
        // before the window is the baseline.
        let last = grab.history.len() - 1;
        let first_fresh = grab
            .history
            .iter()
            .position(|&(_, t)| now - t <= THROW_WINDOW)
            .unwrap_or(last);
        let base = if first_fresh == last {
            first_fresh.saturating_sub(1)
        } else {
            first_fresh
        };
        let (p0, t0) = grab.history[base];
        if t1 - t0 > EPSILON {
            (p1 - p0) / (t1 - t0)
        } else {
            Vec3::ZERO
        }
    }

    /// Pulls every member toward its goal; `factor = w / (w + α)`.
    pub fn solve(&self, state: &mut PhysicsState, compliance: f32, dt: f32) {
        let Some(grab) = &self.grab else {
            return;
        };
        let alpha = compliance / (dt * dt);
        for m in &grab.members {
            let i = m.particle.index();
            let w = state.inv_mass[i];
            if w <= 0.0 {
                continue;
            }
            let factor = w / (w + alpha);
            let p = state.position(i);
            state.set_position(i, p + (grab.target + m.offset - p) * factor);
        }
    }

    /// Releases the grab and returns to idle.
    ///
    /// Members leave with `hint` (or the estimated target velocity),
    /// clamped to `max_speed`, written as a previous-position offset for a
    /// substep of length `dt`. Returns the applied velocity, or `None` if
    /// nothing was held.
    pub fn end(
        &mut self,
        state: &mut PhysicsState,
        hint: Option<Vec3>,
        max_speed: f32,
        dt: f32,
    ) -> Option<Vec3> {
        let velocity = hint
            .filter(|v| v.is_finite())
            .unwrap_or_else(|| self.estimated_velocity())
            .clamp_length_max(max_speed);
        let grab = self.grab.take()?;
        for m in &grab.members {
            let i = m.particle.index();
            if state.is_pinned(i) {
                continue;
            }
            let p = state.position(i);
            state.set_prev_position(i, p - velocity * dt);
        }
        tracing::debug!(particle = %grab.anchor, speed = velocity.length(), "grab released");
        Some(velocity)
    }
}

/// Drops samples that have left the throw window, keeping the newest
/// stale one as a baseline.
fn prune_history(history: &mut VecDeque<(Vec3, f32)>, now: f32) {
    while history.len() > 1 && history.get(1).is_some_and(|&(_, t)| now - t > THROW_WINDOW) {
        history.pop_front();
    }
    while history.len() > MAX_SAMPLES {
        history.pop_front();
    }
}
