//! Builders for the element sets the orbit editor offers.

use nalgebra::Vector3;
use time::Duration;

use crate::{
    bodies::{Body, BodyId},
    coords::Coordinates,
    kepler::orbits::{Elements, Orbit, StateVector},
    time::UT,
};

/// A circular, equatorial orbit `altitude` metres above `body`'s surface,
/// starting at periapsis now.
pub fn simple(body_id: BodyId, body: &Body, altitude: f64, now: UT) -> Elements {
    Elements {
        inclination: 0.0,
        eccentricity: 0.0,
        semi_major_axis: body.radius + altitude,
        lan: 0.0,
        argpe: 0.0,
        mean_anomaly_at_epoch: 0.0,
        epoch: now,
        reference_body: body_id,
    }
}

/// Raw elements as typed into the editor: angles in degrees except the
/// mean anomaly, which is in radians.
#[allow(clippy::too_many_arguments)]
pub fn complex(
    reference_body: BodyId,
    inclination_deg: f64,
    eccentricity: f64,
    semi_major_axis: f64,
    lan_deg: f64,
    argpe_deg: f64,
    mean_anomaly_at_epoch: f64,
    epoch: UT,
) -> Elements {
    Elements {
        inclination: inclination_deg.to_radians(),
        eccentricity,
        semi_major_axis,
        lan: lan_deg.to_radians(),
        argpe: argpe_deg.to_radians(),
        mean_anomaly_at_epoch,
        epoch,
        reference_body,
    }
}

/// Keep `orbit`'s current position but replace its velocity.
///
/// Returns `None` if the orbit has never been derived.
pub fn velocity(orbit: &Orbit, velocity: Vector3<f64>, mu: f64, tol: f64) -> Option<Elements> {
    let mut sv = orbit.state_vector()?;
    sv.velocity = velocity;
    Some(sv.into_elements(mu, tol))
}

/// The orbit of `target`, shifted so that the edited vessel sits where the
/// target will be `lead_time` seconds from now.
pub fn rendezvous(target: &Orbit, lead_time: f64) -> Elements {
    let mut elements = *target.elements();
    elements.epoch = elements.epoch - Duration::seconds_f64(lead_time);
    elements
}

/// An orbit that passes `altitude` metres above the mean radius over
/// body-fixed `coordinates` right now, moving with the surface below.
///
/// Returns `None` where there is no surface velocity to match: on a body
/// that does not spin, or over a pole.
pub fn landing(
    body_id: BodyId,
    body: &Body,
    coordinates: Coordinates,
    altitude: f64,
    now: UT,
    tol: f64,
) -> Option<Elements> {
    let inertial = Coordinates::new(
        coordinates.latitude,
        coordinates.longitude + body.rotation_angle(now).to_degrees(),
    );
    let position = inertial.to_position(body.radius + altitude);
    let velocity = Vector3::new(0.0, 0.0, body.angular_velocity()).cross(&position);
    if velocity.norm() < tol {
        return None;
    }
    let sv = StateVector {
        reference_body: body_id,
        position,
        velocity,
        time: now,
    };
    Some(sv.into_elements(body.mu, tol))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kepler::orbits::Solver;

    const MU: f64 = 3.5316e12;

    fn kerbin() -> Body {
        Body {
            name: "Kerbin".into(),
            mu: MU,
            radius: 600_000.0,
            soi: 84_159_286.0,
            orbit: None,
            parent: None,
            satellites: vec![],
            is_star: false,
            rotation_period: 0.0,
        }
    }

    #[test]
    fn simple_orbit_keeps_constant_altitude() {
        let el = simple(BodyId(1), &kerbin(), 100_000.0, UT::new_seconds(10.0));
        for t in [10.0, 500.0, 1234.5, 9000.0] {
            let r = el
                .relative_position_at(UT::new_seconds(t), MU, Solver::default())
                .norm();
            assert!((r - 700_000.0).abs() < 1e-6, "t={t} r={r}");
        }
    }

    #[test]
    fn complex_converts_degrees() {
        let el = complex(BodyId(1), 90.0, 0.1, 1e6, 180.0, 45.0, 1.0, UT::ZERO);
        assert!((el.inclination - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
        assert!((el.lan - std::f64::consts::PI).abs() < 1e-12);
        assert!((el.argpe - std::f64::consts::FRAC_PI_4).abs() < 1e-12);
        assert_eq!(el.mean_anomaly_at_epoch, 1.0);
    }

    #[test]
    fn velocity_keeps_position() {
        let now = UT::new_seconds(50.0);
        let el = complex(BodyId(1), 10.0, 0.1, 900_000.0, 30.0, 60.0, 0.5, now);
        let orbit = Orbit::derived(el, MU, now, Solver::default());
        let new_vel = orbit.vel() * 1.05;
        let edited = velocity(&orbit, new_vel, MU, 1e-8).unwrap();
        let (pos, vel) = edited.state_at(now, MU, Solver::default());
        assert!((pos - orbit.pos()).norm() < 1e-3);
        assert!((vel - new_vel).norm() < 1e-6);
    }

    #[test]
    fn landing_hovers_over_the_site() {
        let mut body = kerbin();
        body.rotation_period = 21_549.425;
        let now = UT::new_seconds(1000.0);
        let site = Coordinates::new(-0.0972, -74.5577);

        let el = landing(BodyId(1), &body, site, 100.0, now, 1e-8).unwrap();
        assert!(el.check().is_ok());
        let (pos, vel) = el.state_at(now, MU, Solver::default());
        assert!((pos.norm() - 600_100.0).abs() < 1e-3);
        let spin = Vector3::new(0.0, 0.0, body.angular_velocity());
        assert!((vel - spin.cross(&pos)).norm() < 1e-6);

        let seen = Coordinates::from_position(pos);
        let longitude = seen.longitude - body.rotation_angle(now).to_degrees();
        assert!((seen.latitude - site.latitude).abs() < 1e-9);
        let drift = (longitude - site.longitude).rem_euclid(360.0);
        assert!(drift < 1e-8 || 360.0 - drift < 1e-8, "{drift}");
    }

    #[test]
    fn landing_needs_surface_motion() {
        let now = UT::new_seconds(1000.0);
        let site = Coordinates::new(10.0, 20.0);
        assert!(landing(BodyId(1), &kerbin(), site, 0.0, now, 1e-8).is_none());

        let mut body = kerbin();
        body.rotation_period = 21_549.425;
        let pole = Coordinates::new(90.0, 0.0);
        assert!(landing(BodyId(1), &body, pole, 0.0, now, 1e-8).is_none());
    }

    #[test]
    fn rendezvous_leads_the_target() {
        let now = UT::new_seconds(0.0);
        let el = complex(BodyId(1), 0.0, 0.0, 800_000.0, 0.0, 0.0, 0.0, now);
        let target = Orbit::derived(el, MU, now, Solver::default());
        let lead = rendezvous(&target, 120.0);

        let ours = lead.relative_position_at(now, MU, Solver::default());
        let theirs = el.relative_position_at(UT::new_seconds(120.0), MU, Solver::default());
        assert!((ours - theirs).norm() < 1e-6);
    }
}
