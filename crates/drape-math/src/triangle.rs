//! Point and ray queries against a single triangle.
//!
//! Winding convention: a triangle `(a, b, c)` listed counter-clockwise
//! when seen from outside has outward normal `(b - a) × (c - a)`.

use drape_types::constants::DEGENERATE_AREA_THRESHOLD;
use glam::Vec3;

/// Result of a closest-point query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClosestPoint {
    pub point: Vec3,
    /// Barycentric weights of `point` with respect to `(a, b, c)`.
    pub barycentric: Vec3,
}

/// Closest point on triangle `(a, b, c)` to `p`.
///
/// Voronoi-region walk: each vertex and edge region is tested before
/// falling through to the face interior.
pub fn closest_point_on_triangle(p: Vec3, a: Vec3, b: Vec3, c: Vec3) -> ClosestPoint {
    let ab = b - a;
    let ac = c - a;
    let ap = p - a;

    let d1 = ab.dot(ap);
    let d2 = ac.dot(ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return ClosestPoint { point: a, barycentric: Vec3::X };
    }

    let bp = p - b;
    let d3 = ab.dot(bp);
    let d4 = ac.dot(bp);
    if d3 >= 0.0 && d4 <= d3 {
        return ClosestPoint { point: b, barycentric: Vec3::Y };
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let v = d1 / (d1 - d3);
        return ClosestPoint {
            point: a + ab * v,
            barycentric: Vec3::new(1.0 - v, v, 0.0),
        };
    }

    let cp = p - c;
    let d5 = ab.dot(cp);
    let d6 = ac.dot(cp);
    if d6 >= 0.0 && d5 <= d6 {
        return ClosestPoint { point: c, barycentric: Vec3::Z };
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let w = d2 / (d2 - d6);
        return ClosestPoint {
            point: a + ac * w,
            barycentric: Vec3::new(1.0 - w, 0.0, w),
        };
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return ClosestPoint {
            point: b + (c - b) * w,
            barycentric: Vec3::new(0.0, 1.0 - w, w),
        };
    }

    let denom = va + vb + vc;
    if denom.abs() <= f32::MIN_POSITIVE {
        return ClosestPoint { point: a, barycentric: Vec3::X };
    }
    let v = vb / denom;
    let w = vc / denom;
    ClosestPoint {
        point: a + ab * v + ac * w,
        barycentric: Vec3::new(1.0 - v - w, v, w),
    }
}

/// Unit outward normal of a counter-clockwise triangle.
///
/// Returns `None` for degenerate (zero-area) triangles.
pub fn triangle_normal(a: Vec3, b: Vec3, c: Vec3) -> Option<Vec3> {
    let n = (b - a).cross(c - a);
    if n.length_squared() <= DEGENERATE_AREA_THRESHOLD {
        return None;
    }
    Some(n.normalize())
}

/// Ray/triangle intersection (Möller–Trumbore), two-sided.
///
/// Returns the hit parameter `t > 0` along `origin + t·dir`.
pub fn ray_triangle_hit(origin: Vec3, dir: Vec3, a: Vec3, b: Vec3, c: Vec3) -> Option<f32> {
    let e1 = b - a;
    let e2 = c - a;
    let h = dir.cross(e2);
    let det = e1.dot(h);
    if det.abs() < 1.0e-10 {
        return None;
    }
    let inv_det = 1.0 / det;
    let s = origin - a;
    let u = s.dot(h) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }
    let q = s.cross(e1);
    let v = dir.dot(q) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }
    let t = e2.dot(q) * inv_det;
    (t > 1.0e-6).then_some(t)
}
