//! Error types for the drape engine.
//!
//! Fallible construction returns `DrapeResult<T>`. Per-step numerical
//! trouble never surfaces here; the solver skips or resets instead.

use thiserror::Error;

/// Unified error type for the drape engine.
#[derive(Debug, Error)]
pub enum DrapeError {
    /// Mesh data is malformed: no faces, bad indices, non-finite coordinates.
    #[error("Invalid mesh: {0}")]
    InvalidMesh(String),

    /// Configuration value is invalid.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The engine could not be constructed from the given inputs.
    ///
    /// Hosts treat this as "simulation unavailable" and keep showing the
    /// static garment.
    #[error("Simulation unavailable: {0}")]
    SimulationUnavailable(String),

    /// An internal invariant was violated.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
}

/// Convenience alias for `Result<T, DrapeError>`.
pub type DrapeResult<T> = Result<T, DrapeError>;
