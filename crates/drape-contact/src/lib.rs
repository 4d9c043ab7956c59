//! # drape-contact
//!
//! Collision handling for draped cloth.
//!
//! - **Body**: closest-point queries against the static body surface
//!   ([`SurfaceQueryable`], backed by a [`TriangleBvh`]) drive the
//!   [`BodyCollider`], which keeps cloth particles a skin offset outside.
//! - **Floor**: optional horizontal plane.
//! - **Self**: a [`SpatialHash`] over cloth particles feeds the
//!   [`SelfCollisionSystem`], which pushes non-adjacent particles apart.
//!
//! Every resolver reports a [`ContactReport`].

pub mod body;
pub mod bvh;
pub mod floor;
pub mod report;
pub mod self_collision;
pub mod spatial_hash;
pub mod surface;

pub use body::{BodyCollider, CollisionOutcome};
pub use bvh::TriangleBvh;
pub use floor::FloorPlane;
pub use report::ContactReport;
pub use self_collision::SelfCollisionSystem;
pub use spatial_hash::SpatialHash;
pub use surface::{SphereSurface, SurfaceHit, SurfaceQueryable};
