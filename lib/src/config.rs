//! Editor settings.

use serde::{Deserialize, Serialize};

/// Tunables shared by every edit. All fields have defaults, so a settings
/// file only needs to name what it changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Frames the physics engine is asked to keep a warped vessel packed.
    pub unpack_hold_frames: u32,
    /// How long validation failures stay on screen (`s`).
    pub message_duration: f64,
    /// Fraction of a body's SOI offered as the upper end of editor slider
    /// ranges.
    pub soi_display_factor: f64,
    /// Upper bound on slider ranges (`m`), also used for the root body.
    pub soi_display_cap: f64,
    pub kepler_tolerance: f64,
    pub kepler_max_iter: u64,
    /// Tolerance used to detect circular/equatorial orbits when turning a
    /// state vector into elements.
    pub state_vector_tolerance: f64,
    /// How fast a landing vessel is lowered towards the surface (`m/s`).
    pub landing_descent_rate: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            unpack_hold_frames: 60,
            message_duration: 3.0,
            soi_display_factor: 0.95,
            soi_display_cap: 200_000_000_000.0,
            kepler_tolerance: 1e-12,
            kepler_max_iter: 64,
            state_vector_tolerance: 1e-8,
            landing_descent_rate: 10.0,
        }
    }
}
