//! # drape-io
//!
//! Simulation input/output contract and input validation.
//!
//! Defines the boundary types that external callers (CLI, asset pipeline)
//! use to hand a cloth, a body and a configuration to the engine.

pub mod contract;
pub mod validator;

pub use contract::{SimulationInput, SimulationMetrics, SimulationOutput};
pub use validator::validate_input;
