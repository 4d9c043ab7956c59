//! # drape-types
//!
//! Shared identifiers, error type and physical constants for the
//! drape cloth simulation engine.
//!
//! No simulation logic lives here. The crate defines the vocabulary
//! the other drape crates share.

pub mod constants;
pub mod error;
pub mod ids;

pub use error::{DrapeError, DrapeResult};
pub use ids::{ParticleId, TriangleId};
