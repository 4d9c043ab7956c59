//! # drape-engine
//!
//! Runs a cloth garment over a rigid body in real time.
//!
//! ## Key Types
//!
//! - [`ClothEngine`]: owns particle state, constraints and colliders, and
//!   advances them one frame at a time
//! - [`Diagnostics`]: non-mutating penetration snapshot
//! - [`SharedBuffer`]: lock-free state exchange with a presenter, split
//!   into single-writer views
//! - [`SimulationWorker`]: runs an engine on its own thread at a fixed tick
//! - [`SkinBinding`]: drives a visual mesh from the physics mesh
//!
//! ```text
//! let mut engine = ClothEngine::initialize(&cloth, &body, config, &pin)?;
//! loop {
//!     engine.step(dt);
//!     engine.sync_to(&mut host_positions)?;
//! }
//! ```

pub mod diagnostics;
pub mod engine;
pub mod shared;
pub mod skinning;

pub use diagnostics::Diagnostics;
pub use engine::{ClothEngine, StepReport};
pub use shared::{PresentationView, SharedBuffer, SharedLayout, SimulationView, SimulationWorker, StopToken};
pub use skinning::{SkinBinding, SkinWeight};
