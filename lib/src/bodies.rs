//! Definitions of celestial bodies.

use std::f64::consts;

use serde::{Deserialize, Serialize};

use crate::{kepler::orbits::OrbitId, time::UT};

crate::arena_id!(BodyId);

/// A celestial body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Body {
    /// Name of this body as displayed in game
    pub name: String,
    /// Standard gravitational parameter (`m^3/s^2`)
    pub mu: f64,
    /// Mean radius of the body's sphere (`m`)
    pub radius: f64,
    /// Radius of this body's sphere of influence (`m`). Infinite for the
    /// root of the hierarchy.
    pub soi: f64,
    /// The body's own orbit. `None` only for the root.
    pub orbit: Option<OrbitId>,
    /// The body this one orbits, if any.
    pub parent: Option<BodyId>,
    /// Bodies orbiting this body.
    pub satellites: Vec<BodyId>,
    /// Is this a star?
    pub is_star: bool,
    /// Sidereal rotation period (`s`). Zero for a body that does not spin.
    #[serde(default)]
    pub rotation_period: f64,
}

impl Body {
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Angle (radians) the body has turned through since UT 0, in
    /// `[0, 2pi)`. Body-fixed longitudes are offset from inertial ones by
    /// this much.
    pub fn rotation_angle(&self, ut: UT) -> f64 {
        if self.rotation_period > 0.0 {
            (2.0 * consts::PI * ut.as_seconds_f64() / self.rotation_period)
                .rem_euclid(2.0 * consts::PI)
        } else {
            0.0
        }
    }

    /// Spin rate (`rad/s`) about the body's z axis.
    pub fn angular_velocity(&self) -> f64 {
        if self.rotation_period > 0.0 {
            2.0 * consts::PI / self.rotation_period
        } else {
            0.0
        }
    }
}

/// Laplace sphere of influence radius for a body of parameter `mu` on an
/// orbit of semi-major axis `sma` around a parent of parameter
/// `parent_mu`.
pub fn laplace_soi(mu: f64, parent_mu: f64, sma: f64) -> f64 {
    sma.abs() * libm::pow(mu / parent_mu, 0.4)
}
