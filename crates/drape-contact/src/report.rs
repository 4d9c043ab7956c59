//! Contact resolution results.

use serde::{Deserialize, Serialize};

/// Result of one resolver pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactReport {
    /// Particles (or pairs) whose positions were corrected.
    pub resolved: u32,
    /// Particles found inside the body and rescued.
    pub deep: u32,
    /// Largest single position correction (meters).
    pub max_correction: f32,
}

impl ContactReport {
    /// Folds another pass into this one.
    pub fn merge(&mut self, other: ContactReport) {
        self.resolved += other.resolved;
        self.deep += other.deep;
        self.max_correction = self.max_correction.max(other.max_correction);
    }
}
