//! Cloth-versus-body collision.
//!
//! Each free particle is compared against the closest body surface point:
//!
//! - **inside** the body: pushed out to `rescue_offset` along the face
//!   normal, velocity killed;
//! - **within `skin_offset`** of the surface: pushed to exactly
//!   `skin_offset`, inward normal velocity removed, tangential velocity
//!   scaled by `1 - friction`;
//! - otherwise untouched.
//!
//! Queries run in the body's local frame; [`BodyCollider::set_transform`]
//! moves the body rigidly without rebuilding the hierarchy.

use drape_math::{Affine3A, Vec3};
use drape_mesh::TriangleMesh;
use drape_solver::{InsideTest, PhysicsState, SimulationConfig};
use drape_types::DrapeResult;

use crate::bvh::TriangleBvh;
use crate::report::ContactReport;
use crate::surface::SurfaceQueryable;

/// Per-particle collision flag: no contact this frame.
pub const FLAG_NONE: u8 = 0;
/// Per-particle collision flag: pushed to the skin offset.
pub const FLAG_CONTACT: u8 = 1;
/// Per-particle collision flag: found inside the body and rescued.
pub const FLAG_RESCUED: u8 = 2;

/// Skewed direction for parity rays; avoids grazing axis-aligned edges.
const PARITY_RAY: Vec3 = Vec3::new(0.267_261_24, 0.801_783_7, 0.534_522_5);

/// Where a particle should end up after one collision check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionOutcome {
    /// True if the position was corrected.
    pub moved: bool,
    /// True if the particle was inside the body.
    pub deep: bool,
    pub position: Vec3,
    pub prev_position: Vec3,
}

/// Closest-surface relation of a point, in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Proximity {
    pub point: Vec3,
    pub normal: Vec3,
    pub distance: f32,
    pub inside: bool,
}

/// Collider for a rigid, static-topology body.
pub struct BodyCollider {
    surface: Box<dyn SurfaceQueryable>,
    transform: Affine3A,
    inverse: Affine3A,
    skin_offset: f32,
    rescue_offset: f32,
    friction: f32,
    inside_test: InsideTest,
}

impl BodyCollider {
    /// Wraps any queryable surface.
    pub fn new(surface: impl SurfaceQueryable + 'static, config: &SimulationConfig) -> Self {
        Self {
            surface: Box::new(surface),
            transform: Affine3A::IDENTITY,
            inverse: Affine3A::IDENTITY,
            skin_offset: config.skin_offset,
            rescue_offset: config.rescue_offset,
            friction: config.friction,
            inside_test: config.inside_test,
        }
    }

    /// Builds a BVH over `mesh` and wraps it.
    pub fn from_mesh(mesh: &TriangleMesh, config: &SimulationConfig) -> DrapeResult<Self> {
        Ok(Self::new(TriangleBvh::build(mesh)?, config))
    }

    /// Places the body. Only rigid transforms keep distances meaningful.
    pub fn set_transform(&mut self, transform: Affine3A) {
        self.transform = transform;
        self.inverse = transform.inverse();
    }

    pub fn transform(&self) -> Affine3A {
        self.transform
    }

    pub fn skin_offset(&self) -> f32 {
        self.skin_offset
    }

    pub fn surface_name(&self) -> &str {
        self.surface.name()
    }

    /// Closest surface point, normal and inside classification of `p`.
    pub fn proximity(&self, p: Vec3) -> Option<Proximity> {
        let local = self.inverse.transform_point3(p);
        let hit = self.surface.closest_point(local)?;
        let inside = match self.inside_test {
            InsideTest::NormalDot => (local - hit.point).dot(hit.normal) < 0.0,
            InsideTest::Parity => self.surface.ray_crossings(local, PARITY_RAY) % 2 == 1,
        };
        Some(Proximity {
            point: self.transform.transform_point3(hit.point),
            normal: self.transform.transform_vector3(hit.normal).normalize_or_zero(),
            distance: hit.distance,
            inside,
        })
    }

    /// Resolves one particle against the body.
    pub fn resolve(&self, position: Vec3, prev_position: Vec3) -> CollisionOutcome {
        let untouched = CollisionOutcome {
            moved: false,
            deep: false,
            position,
            prev_position,
        };
        let Some(prox) = self.proximity(position) else {
            return untouched;
        };

        if prox.inside {
            let rescued = prox.point + prox.normal * self.rescue_offset;
            return CollisionOutcome {
                moved: true,
                deep: true,
                position: rescued,
                prev_position: rescued,
            };
        }

        if prox.distance >= self.skin_offset {
            return untouched;
        }

        let pushed = prox.point + prox.normal * self.skin_offset;
        let v = position - prev_position;
        let vn = v.dot(prox.normal);
        let keep = 1.0 - self.friction;
        let prev = if vn < 0.0 {
            pushed - (v - prox.normal * vn) * keep
        } else {
            pushed - v * keep
        };
        CollisionOutcome {
            moved: true,
            deep: false,
            position: pushed,
            prev_position: prev,
        }
    }

    /// Where `p` would be pushed to, without touching any state.
    ///
    /// Points inside the body or closer than the skin offset land exactly
    /// one skin offset outside; others are returned unchanged.
    pub fn resolve_point(&self, p: Vec3) -> Vec3 {
        match self.proximity(p) {
            Some(prox) if prox.inside || prox.distance < self.skin_offset => {
                prox.point + prox.normal * self.skin_offset
            }
            _ => p,
        }
    }

    /// One pass over every free particle.
    ///
    /// `flags` (one byte per particle) is raised to [`FLAG_CONTACT`] or
    /// [`FLAG_RESCUED`] for touched particles; it is never lowered here.
    pub fn solve(&self, state: &mut PhysicsState, flags: &mut [u8]) -> ContactReport {
        let mut report = ContactReport::default();
        for i in 0..state.vertex_count {
            if state.is_pinned(i) {
                continue;
            }
            let pos = state.position(i);
            let outcome = self.resolve(pos, state.prev_position(i));
            if !outcome.moved {
                continue;
            }

            state.set_position(i, outcome.position);
            state.set_prev_position(i, outcome.prev_position);
            report.resolved += 1;
            report.max_correction = report.max_correction.max((outcome.position - pos).length());
            let flag = if outcome.deep {
                report.deep += 1;
                FLAG_RESCUED
            } else {
                FLAG_CONTACT
            };
            if let Some(slot) = flags.get_mut(i) {
                *slot = (*slot).max(flag);
            }
        }
        report
    }
}

impl std::fmt::Debug for BodyCollider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BodyCollider")
            .field("surface", &self.surface.name())
            .field("skin_offset", &self.skin_offset)
            .field("rescue_offset", &self.rescue_offset)
            .field("friction", &self.friction)
            .field("inside_test", &self.inside_test)
            .finish()
    }
}
