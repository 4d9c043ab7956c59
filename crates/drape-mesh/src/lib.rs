//! # drape-mesh
//!
//! Triangle mesh representation with Structure-of-Arrays (SoA) layout.
//!
//! ## Key Types
//!
//! - [`TriangleMesh`]: positions in contiguous SoA buffers plus a flat
//!   index buffer.
//! - [`Topology`]: edge extraction, vertex adjacency, bending pairs and
//!   boundary (collar) detection.
//! - Procedural generators for tests and benchmarks (grids, spheres,
//!   tubes, capped cylinders).

pub mod generators;
pub mod mesh;
pub mod topology;

pub use mesh::TriangleMesh;
pub use topology::{canonical_key, BoundaryRing, Topology};
