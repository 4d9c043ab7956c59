//! Input validation.
//!
//! Catches data-level errors before the engine is built, with messages
//! that name the offending part of the input.

use drape_solver::PinRule;
use drape_types::{DrapeError, DrapeResult};

use crate::contract::SimulationInput;

/// Validates a complete simulation input.
///
/// Checks:
/// - Cloth and body mesh integrity
/// - Explicit pin indices are in range
/// - Configuration values
/// - Frame count and timestep
pub fn validate_input(input: &SimulationInput) -> DrapeResult<()> {
    input
        .cloth
        .validate()
        .map_err(|e| mesh_error("Cloth", e))?;
    input
        .body
        .validate()
        .map_err(|e| mesh_error("Body", e))?;

    if let PinRule::Indices { indices } = &input.pin {
        let n = input.cloth.vertex_count();
        if let Some(&bad) = indices.iter().find(|&&i| i as usize >= n) {
            return Err(DrapeError::InvalidMesh(format!(
                "Pin index {} out of range for {} cloth vertices",
                bad, n
            )));
        }
    }

    input.config.validate()?;

    if input.frames == 0 {
        return Err(DrapeError::InvalidConfig("Frame count must be >= 1".into()));
    }
    if !(input.frame_dt > 0.0) || !input.frame_dt.is_finite() {
        return Err(DrapeError::InvalidConfig(format!(
            "Frame timestep must be positive and finite, got {}",
            input.frame_dt
        )));
    }
    if input.frame_dt > 1.0 {
        return Err(DrapeError::InvalidConfig(
            "Frame timestep > 1.0 is unreasonably large".into(),
        ));
    }

    Ok(())
}

/// Prefixes a mesh error with the part of the input it came from.
fn mesh_error(part: &str, e: DrapeError) -> DrapeError {
    match e {
        DrapeError::InvalidMesh(msg) => DrapeError::InvalidMesh(format!("{part} mesh: {msg}")),
        other => DrapeError::InvalidMesh(format!("{part} mesh: {other}")),
    }
}
