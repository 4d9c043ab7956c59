//! Surface query abstraction.
//!
//! The body collider only needs two questions answered about the body:
//! where is the closest surface point, and how many times does a ray
//! cross the surface. Anything that can answer both can act as a body.

use drape_math::Vec3;
use drape_types::constants::EPSILON;
use drape_types::TriangleId;

/// Closest-point query result, in the surface's own frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    /// Closest point on the surface.
    pub point: Vec3,
    /// Outward unit normal of the face containing `point`.
    pub normal: Vec3,
    /// Distance from the query point to `point`.
    pub distance: f32,
    /// Face the point lies on.
    pub face: TriangleId,
}

/// A static surface that supports closest-point and ray-crossing queries.
pub trait SurfaceQueryable: Send + Sync {
    /// Closest surface point to `p`, or `None` for an empty surface.
    fn closest_point(&self, p: Vec3) -> Option<SurfaceHit>;

    /// Outward unit normal of `face`, or `None` if the face is unknown or
    /// degenerate.
    fn face_normal(&self, face: TriangleId) -> Option<Vec3>;

    /// Number of surface crossings along the ray `origin + t·direction`, `t > 0`.
    fn ray_crossings(&self, origin: Vec3, direction: Vec3) -> usize;

    /// Returns the surface's name (for logging/telemetry).
    fn name(&self) -> &str;
}

/// An exact sphere. Handy as a body proxy and as a reference in tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereSurface {
    pub center: Vec3,
    pub radius: f32,
}

impl SphereSurface {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }
}

impl SurfaceQueryable for SphereSurface {
    fn closest_point(&self, p: Vec3) -> Option<SurfaceHit> {
        let offset = p - self.center;
        let len = offset.length();
        let normal = if len > EPSILON { offset / len } else { Vec3::Y };
        Some(SurfaceHit {
            point: self.center + normal * self.radius,
            normal,
            distance: (len - self.radius).abs(),
            face: TriangleId(0),
        })
    }

    /// The sphere has no faces; its normal is only defined per point.
    fn face_normal(&self, _face: TriangleId) -> Option<Vec3> {
        None
    }

    fn ray_crossings(&self, origin: Vec3, direction: Vec3) -> usize {
        let oc = origin - self.center;
        let a = direction.length_squared();
        let b = oc.dot(direction);
        let c = oc.length_squared() - self.radius * self.radius;
        let disc = b * b - a * c;
        if a <= 0.0 || disc <= 0.0 {
            return 0;
        }
        let root = disc.sqrt();
        [(-b - root) / a, (-b + root) / a]
            .iter()
            .filter(|&&t| t > 0.0)
            .count()
    }

    fn name(&self) -> &str {
        "sphere"
    }
}
