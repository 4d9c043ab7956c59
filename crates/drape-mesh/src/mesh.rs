//! Core triangle mesh type with SoA (Structure of Arrays) layout.
//!
//! The SoA layout stores each coordinate channel contiguously:
//! - `pos_x: [x0, x1, x2, ...]`
//! - `pos_y: [y0, y1, y2, ...]`
//! - `pos_z: [z0, z1, z2, ...]`
//!
//! Both the cloth and the body are handed to the engine in this form.

use drape_math::{Aabb, Vec3};
use drape_types::{DrapeError, DrapeResult};
use serde::{Deserialize, Serialize};

/// A triangle mesh stored in Structure-of-Arrays layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TriangleMesh {
    /// X coordinates of all vertices.
    pub pos_x: Vec<f32>,
    /// Y coordinates of all vertices.
    pub pos_y: Vec<f32>,
    /// Z coordinates of all vertices.
    pub pos_z: Vec<f32>,

    /// Triangle indices, stored flat: `[t0v0, t0v1, t0v2, t1v0, ...]`.
    pub indices: Vec<u32>,
}

impl TriangleMesh {
    /// Returns the number of vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.pos_x.len()
    }

    /// Returns the number of triangles.
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Returns the position of vertex `i` as `[x, y, z]`.
    #[inline]
    pub fn position(&self, i: usize) -> [f32; 3] {
        [self.pos_x[i], self.pos_y[i], self.pos_z[i]]
    }

    /// Returns the position as a `glam::Vec3`.
    #[inline]
    pub fn position_vec3(&self, i: usize) -> Vec3 {
        Vec3::new(self.pos_x[i], self.pos_y[i], self.pos_z[i])
    }

    /// Returns the three vertex indices of triangle `t`.
    #[inline]
    pub fn triangle(&self, t: usize) -> [u32; 3] {
        let base = t * 3;
        [self.indices[base], self.indices[base + 1], self.indices[base + 2]]
    }

    /// Returns the corner positions of triangle `t`.
    #[inline]
    pub fn triangle_positions(&self, t: usize) -> [Vec3; 3] {
        let [a, b, c] = self.triangle(t);
        [
            self.position_vec3(a as usize),
            self.position_vec3(b as usize),
            self.position_vec3(c as usize),
        ]
    }

    /// Sets the position of vertex `i`.
    #[inline]
    pub fn set_position(&mut self, i: usize, p: Vec3) {
        self.pos_x[i] = p.x;
        self.pos_y[i] = p.y;
        self.pos_z[i] = p.z;
    }

    /// Appends a vertex and returns its index.
    pub fn push_vertex(&mut self, p: Vec3) -> u32 {
        self.pos_x.push(p.x);
        self.pos_y.push(p.y);
        self.pos_z.push(p.z);
        (self.pos_x.len() - 1) as u32
    }

    /// Appends a triangle.
    #[inline]
    pub fn push_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend_from_slice(&[a, b, c]);
    }

    /// Creates an empty mesh with pre-allocated capacity.
    pub fn with_capacity(vertex_capacity: usize, triangle_capacity: usize) -> Self {
        Self {
            pos_x: Vec::with_capacity(vertex_capacity),
            pos_y: Vec::with_capacity(vertex_capacity),
            pos_z: Vec::with_capacity(vertex_capacity),
            indices: Vec::with_capacity(triangle_capacity * 3),
        }
    }

    /// Axis-aligned bounds of all vertices.
    pub fn bounds(&self) -> Aabb {
        let mut aabb = Aabb::EMPTY;
        for i in 0..self.vertex_count() {
            aabb.grow(self.position_vec3(i));
        }
        aabb
    }

    /// Positions interleaved as `[x0, y0, z0, x1, ...]`.
    pub fn interleaved_positions(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.vertex_count() * 3);
        for i in 0..self.vertex_count() {
            out.extend_from_slice(&self.position(i));
        }
        out
    }

    /// Validates mesh integrity.
    ///
    /// Checks:
    /// - All SoA arrays have the same length
    /// - The mesh is indexed and has at least one face
    /// - Every coordinate is finite
    /// - Triangle indices are within bounds
    /// - No triangle repeats a vertex index
    pub fn validate(&self) -> DrapeResult<()> {
        let n = self.pos_x.len();

        if self.pos_y.len() != n || self.pos_z.len() != n {
            return Err(DrapeError::InvalidMesh(
                "Position arrays have inconsistent lengths".into(),
            ));
        }
        if n == 0 {
            return Err(DrapeError::InvalidMesh("Mesh has no vertices".into()));
        }
        if self.indices.is_empty() {
            return Err(DrapeError::InvalidMesh(
                "Mesh is not indexed or has no faces".into(),
            ));
        }
        if self.indices.len() % 3 != 0 {
            return Err(DrapeError::InvalidMesh(
                "Index count is not divisible by 3".into(),
            ));
        }

        for i in 0..n {
            if !self.position_vec3(i).is_finite() {
                return Err(DrapeError::InvalidMesh(format!(
                    "Vertex {} has a non-finite coordinate",
                    i
                )));
            }
        }

        for (i, &idx) in self.indices.iter().enumerate() {
            if idx as usize >= n {
                return Err(DrapeError::InvalidMesh(format!(
                    "Index {} at position {} is out of range (vertex count: {})",
                    idx, i, n
                )));
            }
        }

        for t in 0..self.triangle_count() {
            let [a, b, c] = self.triangle(t);
            if a == b || b == c || a == c {
                return Err(DrapeError::InvalidMesh(format!(
                    "Triangle {} has repeated vertex indices: [{}, {}, {}]",
                    t, a, b, c
                )));
            }
        }

        Ok(())
    }

    /// Constructs a mesh from interleaved position data `[x0, y0, z0, x1, ...]`.
    ///
    /// This is the layout hosts usually hand over from a GPU vertex buffer.
    pub fn from_interleaved(positions: &[f32], indices: &[u32]) -> DrapeResult<Self> {
        if positions.len() % 3 != 0 {
            return Err(DrapeError::InvalidMesh(
                "Interleaved positions length not divisible by 3".into(),
            ));
        }

        let n = positions.len() / 3;
        let mut mesh = Self::with_capacity(n, indices.len() / 3);
        for chunk in positions.chunks_exact(3) {
            mesh.pos_x.push(chunk[0]);
            mesh.pos_y.push(chunk[1]);
            mesh.pos_z.push(chunk[2]);
        }
        mesh.indices = indices.to_vec();

        mesh.validate()?;
        Ok(mesh)
    }

    /// Translates every vertex by `offset`.
    pub fn translate(&mut self, offset: Vec3) {
        for i in 0..self.vertex_count() {
            let p = self.position_vec3(i) + offset;
            self.set_position(i, p);
        }
    }
}
