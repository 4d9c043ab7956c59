//! # drape-solver
//!
//! Particle state and the position-based solver stages that act on it.
//!
//! ## Key Types
//!
//! - [`PhysicsState`]: SoA buffers for positions, previous positions,
//!   inverse masses and rest positions
//! - [`SimulationConfig`]: every tunable of a run, fixed at construction
//! - [`ConstraintSet`]: structural and bending distance constraints (XPBD)
//!   plus the hard stretch limiter
//! - [`InteractionConstraint`]: grab/drag/release state machine
//! - [`integrator`]: Verlet substep integration and the explosion guard

pub mod config;
pub mod constraints;
pub mod integrator;
pub mod interaction;
pub mod pin;
pub mod state;

pub use config::{InsideTest, SimulationConfig};
pub use constraints::{ConstraintSet, DistanceConstraint};
pub use interaction::{InteractionConstraint, InteractionRecord};
pub use pin::PinRule;
pub use state::PhysicsState;
