//! Editor configuration.

use serde::{Deserialize, Serialize};

use crate::units::DistanceUnit;

/// Tunables for an editing session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Number of committed route states kept for undo
    pub history_limit: usize,
    /// Target spacing between generated segment vertices in meters
    pub sample_spacing_m: f64,
    /// Upper bound on vertices per generated segment
    pub max_samples_per_segment: usize,
    /// Units used for readouts and distance markers when the caller has no preference
    pub default_units: DistanceUnit,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_limit: 10,
            sample_spacing_m: 50.0,
            max_samples_per_segment: 500,
            default_units: DistanceUnit::Miles,
        }
    }
}
