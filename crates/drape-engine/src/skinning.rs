//! Drives a high-resolution visual mesh from the physics mesh.
//!
//! Each visual vertex is bound once to its nearest physics triangle:
//! barycentric weights of the closest point, plus the signed distance
//! along that triangle's normal. Applying the binding rebuilds the visual
//! vertex from the deformed triangle.

use drape_contact::{SurfaceQueryable, TriangleBvh};
use drape_math::triangle::{closest_point_on_triangle, triangle_normal};
use drape_math::Vec3;
use drape_mesh::TriangleMesh;
use drape_types::{DrapeError, DrapeResult, TriangleId};
use serde::{Deserialize, Serialize};

/// Binding of one visual vertex.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkinWeight {
    pub triangle: TriangleId,
    pub barycentric: [f32; 3],
    /// Signed offset along the triangle normal.
    pub offset: f32,
}

/// Visual-to-physics vertex bindings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkinBinding {
    weights: Vec<SkinWeight>,
}

impl SkinBinding {
    /// Binds interleaved `visual_positions` to the rest pose of `physics`.
    pub fn compute(visual_positions: &[f32], physics: &TriangleMesh) -> DrapeResult<Self> {
        if visual_positions.len() % 3 != 0 {
            return Err(DrapeError::InvalidMesh(format!(
                "visual position buffer length {} is not a multiple of 3",
                visual_positions.len()
            )));
        }
        let bvh = TriangleBvh::build(physics)?;

        let weights = visual_positions
            .chunks_exact(3)
            .map(|v| {
                let p = Vec3::new(v[0], v[1], v[2]);
                let hit = bvh.closest_point(p).ok_or_else(|| {
                    DrapeError::InvalidMesh("physics mesh has no usable triangles".into())
                })?;
                let [a, b, c] = physics.triangle_positions(hit.face.index());
                let cp = closest_point_on_triangle(p, a, b, c);
                let normal = triangle_normal(a, b, c).unwrap_or(Vec3::ZERO);
                Ok(SkinWeight {
                    triangle: hit.face,
                    barycentric: cp.barycentric.to_array(),
                    offset: (p - cp.point).dot(normal),
                })
            })
            .collect::<DrapeResult<Vec<_>>>()?;

        Ok(Self { weights })
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn weights(&self) -> &[SkinWeight] {
        &self.weights
    }

    /// Rebuilds visual positions into `out` from deformed physics positions.
    ///
    /// `physics_positions` is interleaved xyz; `physics_indices` must be the
    /// index buffer the binding was computed against.
    pub fn apply(
        &self,
        physics_positions: &[f32],
        physics_indices: &[u32],
        out: &mut [f32],
    ) -> DrapeResult<()> {
        if out.len() != self.weights.len() * 3 {
            return Err(DrapeError::InvalidMesh(format!(
                "visual output length {} does not match {} bound vertices",
                out.len(),
                self.weights.len()
            )));
        }

        let vertex = |i: u32| -> DrapeResult<Vec3> {
            let base = i as usize * 3;
            physics_positions
                .get(base..base + 3)
                .map(|s| Vec3::new(s[0], s[1], s[2]))
                .ok_or_else(|| DrapeError::InvalidMesh(format!("physics vertex {i} out of range")))
        };

        for (w, slot) in self.weights.iter().zip(out.chunks_exact_mut(3)) {
            let t = w.triangle.index() * 3;
            let tri = physics_indices.get(t..t + 3).ok_or_else(|| {
                DrapeError::InvalidMesh(format!("physics triangle {} out of range", w.triangle.0))
            })?;
            let (a, b, c) = (vertex(tri[0])?, vertex(tri[1])?, vertex(tri[2])?);
            let [u, v, s] = w.barycentric;
            let normal = triangle_normal(a, b, c).unwrap_or(Vec3::ZERO);
            let p = a * u + b * v + c * s + normal * w.offset;
            slot.copy_from_slice(&p.to_array());
        }
        Ok(())
    }
}
