//! Keplerian orbits.
//!
//! An [`Elements`] value is a plain description of an orbit and is what
//! callers build when they want to edit something. An [`Orbit`] is the
//! live, host-owned object: the same elements plus the derived basis and
//! position/velocity cache that the rest of the simulation reads.

use std::f64::consts;

use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{bodies::BodyId, config::EditorConfig, time::UT};

crate::arena_id!(
    /// Handle to a live [`Orbit`] in host storage.
    OrbitId
);

/// Newton iteration limits for Kepler's equation.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Solver {
    pub tol: f64,
    pub maxiter: u64,
}

impl Default for Solver {
    fn default() -> Self {
        Self {
            tol: 1e-12,
            maxiter: 64,
        }
    }
}

impl From<&EditorConfig> for Solver {
    fn from(config: &EditorConfig) -> Self {
        Self {
            tol: config.kepler_tolerance,
            maxiter: config.kepler_max_iter,
        }
    }
}

/// Classical Keplerian elements relative to a reference body.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Elements {
    /// Inclination (radians).
    pub inclination: f64,
    /// Eccentricity (dimensionless).
    pub eccentricity: f64,
    /// Semi-major axis (`m`). Negative for hyperbolic orbits.
    pub semi_major_axis: f64,
    /// Longitude of ascending node (radians).
    pub lan: f64,
    /// Argument of periapsis (radians).
    pub argpe: f64,
    /// Mean anomaly at `epoch` (radians).
    pub mean_anomaly_at_epoch: f64,
    pub epoch: UT,
    pub reference_body: BodyId,
}

impl Elements {
    /// Returns a description of the first problem found, if any.
    pub fn check(&self) -> Result<(), &'static str> {
        let values = [
            self.inclination,
            self.eccentricity,
            self.semi_major_axis,
            self.lan,
            self.argpe,
            self.mean_anomaly_at_epoch,
            self.epoch.as_seconds_f64(),
        ];
        if values.iter().any(|x| !x.is_finite()) {
            return Err("elements must be finite");
        }
        if self.eccentricity < 0.0 {
            return Err("eccentricity must not be negative");
        }
        if (self.eccentricity - 1.0).abs() < f64::EPSILON {
            return Err("parabolic orbits are not supported");
        }
        if self.semi_major_axis == 0.0 {
            return Err("semi-major axis must not be zero");
        }
        if (self.eccentricity < 1.0) != (self.semi_major_axis > 0.0) {
            return Err("semi-major axis sign does not match eccentricity");
        }
        Ok(())
    }

    pub fn is_hyperbolic(&self) -> bool {
        self.eccentricity > 1.0
    }

    /// Semi-latus rectum (`m`).
    pub fn p(&self) -> f64 {
        self.semi_major_axis * (1.0 - self.eccentricity.powi(2))
    }

    pub fn periapsis_radius(&self) -> f64 {
        self.semi_major_axis * (1.0 - self.eccentricity)
    }

    /// Infinite for hyperbolic orbits.
    pub fn apoapsis_radius(&self) -> f64 {
        if self.is_hyperbolic() {
            f64::INFINITY
        } else {
            self.semi_major_axis * (1.0 + self.eccentricity)
        }
    }

    /// Mean motion (`rad/s`).
    pub fn mean_motion(&self, mu: f64) -> f64 {
        libm::sqrt(mu / self.semi_major_axis.abs().powi(3))
    }

    /// Orbital period (`s`), if the orbit is closed.
    pub fn period(&self, mu: f64) -> Option<f64> {
        (!self.is_hyperbolic()).then(|| 2.0 * consts::PI / self.mean_motion(mu))
    }

    pub fn mean_anomaly_at(&self, ut: UT, mu: f64) -> f64 {
        let dt = (ut - self.epoch).as_seconds_f64();
        let ma = self.mean_anomaly_at_epoch + self.mean_motion(mu) * dt;
        if self.is_hyperbolic() {
            ma
        } else {
            wrap_pi(ma)
        }
    }

    pub fn true_anomaly_at(&self, ut: UT, mu: f64, solver: Solver) -> f64 {
        ma_to_ta(self.mean_anomaly_at(ut, mu), self.eccentricity, solver)
    }

    /// Rotation from the perifocal frame PQW into the body-centred
    /// inertial frame IJK.
    pub fn pqw_ijk_matrix(&self) -> Matrix3<f64> {
        let (sl, cl) = (libm::sin(self.lan), libm::cos(self.lan));
        let (sw, cw) = (libm::sin(self.argpe), libm::cos(self.argpe));
        let (si, ci) = (libm::sin(self.inclination), libm::cos(self.inclination));

        Matrix3::new(
            cl * cw - sl * sw * ci,
            -cl * sw - sl * cw * ci,
            sl * si,
            sl * cw + cl * sw * ci,
            -sl * sw + cl * cw * ci,
            -cl * si,
            sw * si,
            cw * si,
            ci,
        )
    }

    /// Position and velocity in PQW at true anomaly `ta`.
    fn sv_pqw(&self, mu: f64, ta: f64) -> (Vector3<f64>, Vector3<f64>) {
        let p = self.p();
        let r = p / (1.0 + self.eccentricity * libm::cos(ta));
        let rv = Vector3::new(r * libm::cos(ta), r * libm::sin(ta), 0.0);
        let vv = libm::sqrt(mu / p)
            * Vector3::new(-libm::sin(ta), self.eccentricity + libm::cos(ta), 0.0);
        (rv, vv)
    }

    /// Position and velocity relative to the reference body at `ut`.
    pub fn state_at(&self, ut: UT, mu: f64, solver: Solver) -> (Vector3<f64>, Vector3<f64>) {
        let (rv, vv) = self.sv_pqw(mu, self.true_anomaly_at(ut, mu, solver));
        let mat = self.pqw_ijk_matrix();
        (mat * rv, mat * vv)
    }

    pub fn relative_position_at(&self, ut: UT, mu: f64, solver: Solver) -> Vector3<f64> {
        self.state_at(ut, mu, solver).0
    }
}

/// A live orbit owned by a vessel or body.
///
/// The elements can only be overwritten from inside the crate, through
/// the editor's applier; everything else reads.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Orbit {
    elements: Elements,
    basis: Matrix3<f64>,
    mean_anomaly: f64,
    true_anomaly: f64,
    pos: Vector3<f64>,
    vel: Vector3<f64>,
    ut: Option<UT>,
}

impl Orbit {
    /// An orbit whose basis and state have not been derived yet.
    pub fn new(elements: Elements) -> Self {
        Self {
            elements,
            basis: Matrix3::identity(),
            mean_anomaly: elements.mean_anomaly_at_epoch,
            true_anomaly: 0.0,
            pos: Vector3::zeros(),
            vel: Vector3::zeros(),
            ut: None,
        }
    }

    /// An orbit with basis and state derived at `ut`.
    pub fn derived(elements: Elements, mu: f64, ut: UT, solver: Solver) -> Self {
        let mut orbit = Self::new(elements);
        orbit.init();
        orbit.update_from_ut(ut, mu, solver);
        orbit
    }

    pub fn elements(&self) -> &Elements {
        &self.elements
    }

    pub fn reference_body(&self) -> BodyId {
        self.elements.reference_body
    }

    /// Position relative to the reference body (`m`), as of [`Self::ut`].
    pub fn pos(&self) -> Vector3<f64> {
        self.pos
    }

    /// Velocity relative to the reference body (`m/s`), as of [`Self::ut`].
    pub fn vel(&self) -> Vector3<f64> {
        self.vel
    }

    pub fn mean_anomaly(&self) -> f64 {
        self.mean_anomaly
    }

    pub fn true_anomaly(&self) -> f64 {
        self.true_anomaly
    }

    /// Time of the last derivation, `None` if never derived.
    pub fn ut(&self) -> Option<UT> {
        self.ut
    }

    pub fn basis(&self) -> &Matrix3<f64> {
        &self.basis
    }

    /// Overwrite every element in place. The cached state is stale until
    /// [`Self::init`] and [`Self::update_from_ut`] run.
    pub(crate) fn hardset(&mut self, target: &Elements) {
        self.elements.inclination = target.inclination;
        self.elements.eccentricity = target.eccentricity;
        self.elements.semi_major_axis = target.semi_major_axis;
        self.elements.lan = target.lan;
        self.elements.argpe = target.argpe;
        self.elements.mean_anomaly_at_epoch = target.mean_anomaly_at_epoch;
        self.elements.epoch = target.epoch;
        self.elements.reference_body = target.reference_body;
    }

    /// Re-derive the orbital basis from the elements.
    pub fn init(&mut self) {
        self.basis = self.elements.pqw_ijk_matrix();
    }

    /// Re-derive position and velocity at `ut`.
    pub fn update_from_ut(&mut self, ut: UT, mu: f64, solver: Solver) {
        self.mean_anomaly = self.elements.mean_anomaly_at(ut, mu);
        self.true_anomaly = ma_to_ta(self.mean_anomaly, self.elements.eccentricity, solver);
        let (rv, vv) = self.elements.sv_pqw(mu, self.true_anomaly);
        self.pos = self.basis * rv;
        self.vel = self.basis * vv;
        self.ut = Some(ut);
    }

    pub fn state_vector(&self) -> Option<StateVector> {
        self.ut.map(|time| StateVector {
            reference_body: self.elements.reference_body,
            position: self.pos,
            velocity: self.vel,
            time,
        })
    }
}

/// Position and velocity in the body-centred inertial frame of
/// `reference_body`.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateVector {
    pub reference_body: BodyId,
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
    pub time: UT,
}

impl StateVector {
    /// Convert this state vector into [`Elements`] with epoch
    /// `self.time`.
    ///
    /// Recommended tolerance (`tol`): `1e-8`.
    pub fn into_elements(self, mu: f64, tol: f64) -> Elements {
        let rv = self.position;
        let r = rv.norm();
        let vv = self.velocity;
        let v = vv.norm();
        let hv = rv.cross(&vv);
        let h = hv.norm();
        let nv = Vector3::new(0.0, 0.0, 1.0).cross(&hv);
        let ev = ((v.powi(2) - mu / r) * rv - rv.dot(&vv) * vv) / mu;
        let p = h.powi(2) / mu;
        let e = ev.norm();
        let i = libm::acos(hv[2] / h);

        let circular = e < tol;
        let equatorial = libm::sin(i).abs() < tol;
        // Angles measured in the equatorial plane flip sense for retrograde
        // equatorial orbits.
        let sense = if i > consts::FRAC_PI_2 { -1.0 } else { 1.0 };

        let (lan, argpe, ta) = if equatorial && !circular {
            (
                0.0,
                // Longitude of periapsis
                wrap_two_pi(sense * libm::atan2(ev[1], ev[0])),
                libm::atan2(hv.dot(&ev.cross(&rv)) / h, rv.dot(&ev)),
            )
        } else if !equatorial && circular {
            (
                wrap_two_pi(libm::atan2(nv[1], nv[0])),
                0.0,
                // Argument of latitude
                libm::atan2(rv.dot(&hv.cross(&nv)) / h, rv.dot(&nv)),
            )
        } else if equatorial && circular {
            (
                0.0,
                0.0,
                // True longitude
                sense * libm::atan2(rv[1], rv[0]),
            )
        } else {
            let lan = wrap_two_pi(libm::atan2(nv[1], nv[0]));
            let px = rv.dot(&nv);
            let py = rv.dot(&hv.cross(&nv)) / h;
            let ta = libm::atan2(hv.dot(&ev.cross(&rv)) / h, rv.dot(&ev));
            let argpe = wrap_two_pi(libm::atan2(py, px) - ta);
            (lan, argpe, ta)
        };

        let a = p / (1.0 - e.powi(2));
        Elements {
            inclination: i,
            eccentricity: e,
            semi_major_axis: a,
            lan,
            argpe,
            mean_anomaly_at_epoch: ta_to_ma(ta, e),
            epoch: self.time,
            reference_body: self.reference_body,
        }
    }
}

fn wrap_two_pi(x: f64) -> f64 {
    x.rem_euclid(2.0 * consts::PI)
}

/// Wrap into `[-pi, pi)`.
fn wrap_pi(x: f64) -> f64 {
    (x + consts::PI).rem_euclid(2.0 * consts::PI) - consts::PI
}

pub fn ma_to_ta(ma: f64, e: f64, solver: Solver) -> f64 {
    if e > 1.0 {
        ha_to_ta(ma_to_ha(ma, e, solver), e)
    } else {
        ea_to_ta(ma_to_ea(ma, e, solver), e)
    }
}

pub fn ta_to_ma(ta: f64, e: f64) -> f64 {
    if e > 1.0 {
        let ha = 2.0 * libm::atanh(libm::sqrt((e - 1.0) / (e + 1.0)) * libm::tan(ta / 2.0));
        e * libm::sinh(ha) - ha
    } else {
        let ea = 2.0 * libm::atan(libm::sqrt((1.0 - e) / (1.0 + e)) * libm::tan(ta / 2.0));
        ea - e * libm::sin(ea)
    }
}

pub fn ea_to_ta(ea: f64, e: f64) -> f64 {
    let beta = e / (1.0 + libm::sqrt(1.0 - e.powi(2)));
    ea + 2.0 * libm::atan2(beta * libm::sin(ea), 1.0 - beta * libm::cos(ea))
}

pub fn ha_to_ta(ha: f64, e: f64) -> f64 {
    2.0 * libm::atan(libm::sqrt((e + 1.0) / (e - 1.0)) * libm::tanh(ha / 2.0))
}

/// Solve `M = E - e sin E` for the eccentric anomaly.
pub fn ma_to_ea(ma: f64, e: f64, solver: Solver) -> f64 {
    let ma = wrap_pi(ma);
    let mut ea = if e > 0.8 { consts::PI.copysign(ma) } else { ma };

    for _ in 0..solver.maxiter {
        let step = (ea - e * libm::sin(ea) - ma) / (1.0 - e * libm::cos(ea));
        ea -= step;
        if step.abs() < solver.tol {
            return ea;
        }
    }
    warn!(ma, e, "ma_to_ea: failed to converge, using last estimate");
    ea
}

/// Solve `M = e sinh H - H` for the hyperbolic anomaly.
pub fn ma_to_ha(ma: f64, e: f64, solver: Solver) -> f64 {
    let mut ha = ma.signum() * libm::log(2.0 * ma.abs() / e + 1.8);

    for _ in 0..solver.maxiter {
        let step = (e * libm::sinh(ha) - ha - ma) / (e * libm::cosh(ha) - 1.0);
        ha -= step;
        if step.abs() < solver.tol {
            return ha;
        }
    }
    warn!(ma, e, "ma_to_ha: failed to converge, using last estimate");
    ha
}

#[cfg(test)]
mod tests {
    use super::*;

    const KERBIN_MU: f64 = 3.5316e12;

    fn elements(e: f64, a: f64) -> Elements {
        Elements {
            inclination: 0.3,
            eccentricity: e,
            semi_major_axis: a,
            lan: 1.1,
            argpe: 0.4,
            mean_anomaly_at_epoch: 0.7,
            epoch: UT::new_seconds(100.0),
            reference_body: BodyId(1),
        }
    }

    #[test]
    fn kepler_solvers_satisfy_their_equations() {
        let solver = Solver::default();
        for &e in &[0.0, 0.1, 0.5, 0.9, 0.99] {
            for &ma in &[-3.0, -1.0, 0.0, 0.5, 2.5, 3.1] {
                let ea = ma_to_ea(ma, e, solver);
                assert!((ea - e * libm::sin(ea) - ma).abs() < 1e-10, "e={e} ma={ma}");
            }
        }
        for &e in &[1.1, 2.0, 5.0] {
            for &ma in &[-20.0, -1.0, 0.0, 0.3, 8.0] {
                let ha = ma_to_ha(ma, e, solver);
                assert!((e * libm::sinh(ha) - ha - ma).abs() < 1e-9, "e={e} ma={ma}");
            }
        }
    }

    #[test]
    fn anomaly_conversions_round_trip() {
        for &(e, ta) in &[(0.2, 1.0), (0.7, -2.0), (1.5, 0.8), (3.0, -1.2)] {
            let ma = ta_to_ma(ta, e);
            let back = ma_to_ta(ma, e, Solver::default());
            assert!((back - ta).abs() < 1e-9, "e={e} ta={ta} back={back}");
        }
    }

    #[test]
    fn derived_state_matches_vis_viva() {
        let el = elements(0.3, 900_000.0);
        let orbit = Orbit::derived(el, KERBIN_MU, UT::new_seconds(5000.0), Solver::default());
        let r = orbit.pos().norm();
        let v = orbit.vel().norm();
        let expected = libm::sqrt(KERBIN_MU * (2.0 / r - 1.0 / el.semi_major_axis));
        assert!((v - expected).abs() < 1e-6);
        assert!(r >= el.periapsis_radius() - 1e-6 && r <= el.apoapsis_radius() + 1e-6);
    }

    #[test]
    fn hyperbolic_state_matches_vis_viva() {
        let el = elements(1.4, -2_000_000.0);
        let orbit = Orbit::derived(el, KERBIN_MU, UT::new_seconds(300.0), Solver::default());
        let r = orbit.pos().norm();
        let v = orbit.vel().norm();
        let expected = libm::sqrt(KERBIN_MU * (2.0 / r - 1.0 / el.semi_major_axis));
        assert!((v - expected).abs() < 1e-6);
    }

    #[test]
    fn state_vector_round_trips_to_elements() {
        let el = elements(0.25, 1_200_000.0);
        let ut = UT::new_seconds(100.0);
        let orbit = Orbit::derived(el, KERBIN_MU, ut, Solver::default());
        let sv = orbit.state_vector().unwrap();
        let back = sv.into_elements(KERBIN_MU, 1e-8);

        assert!((back.semi_major_axis - el.semi_major_axis).abs() < 1e-3);
        assert!((back.eccentricity - el.eccentricity).abs() < 1e-9);
        assert!((back.inclination - el.inclination).abs() < 1e-9);
        assert!((back.lan - el.lan).abs() < 1e-9);
        assert!((back.argpe - el.argpe).abs() < 1e-9);
        assert!((back.mean_anomaly_at_epoch - el.mean_anomaly_at_epoch).abs() < 1e-9);
        assert_eq!(back.reference_body, el.reference_body);
    }

    #[test]
    fn period_only_for_closed_orbits() {
        assert!(elements(0.1, 1e6).period(KERBIN_MU).is_some());
        assert!(elements(1.1, -1e6).period(KERBIN_MU).is_none());
    }

    #[test]
    fn check_rejects_inconsistent_elements() {
        assert!(elements(0.1, 1e6).check().is_ok());
        assert!(elements(1.5, -1e6).check().is_ok());
        assert!(elements(-0.1, 1e6).check().is_err());
        assert!(elements(1.0, 1e6).check().is_err());
        assert!(elements(0.5, -1e6).check().is_err());
        assert!(elements(1.5, 1e6).check().is_err());
        assert!(elements(0.5, 0.0).check().is_err());
        assert!(elements(f64::NAN, 1e6).check().is_err());
    }
}
