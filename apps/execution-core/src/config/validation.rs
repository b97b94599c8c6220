//! Trade-plan validation thresholds.

use serde::{Deserialize, Serialize};

use crate::risk::ValidationProfile;

/// Validation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Enforcement profile (`scanner` or `strict`).
    #[serde(default)]
    pub profile: ValidationProfile,
    /// Maximum entry deviation from last close, as a fraction.
    #[serde(default = "default_max_entry_deviation")]
    pub max_entry_deviation: f64,
    /// Maximum stop distance from entry relative to last close.
    #[serde(default = "default_max_stop_distance")]
    pub max_stop_distance: f64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            profile: ValidationProfile::default(),
            max_entry_deviation: default_max_entry_deviation(),
            max_stop_distance: default_max_stop_distance(),
        }
    }
}

fn default_max_entry_deviation() -> f64 {
    0.05
}

fn default_max_stop_distance() -> f64 {
    0.15
}
