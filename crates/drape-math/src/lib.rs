//! # drape-math
//!
//! Geometric primitives for the drape simulation engine.
//!
//! Provides:
//! - Re-exports of `glam` types (`Vec3`, `Affine3A`, etc.)
//! - Axis-aligned bounding boxes with point-distance queries
//! - Triangle queries: closest point with barycentrics, face normal,
//!   ray crossing

pub mod aabb;
pub mod triangle;

pub use aabb::Aabb;
pub use triangle::{closest_point_on_triangle, ray_triangle_hit, triangle_normal, ClosestPoint};

// Re-export glam types as the canonical math types for drape.
pub use glam::{Affine3A, Mat3, Quat, Vec3, Vec3A};
