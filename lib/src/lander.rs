//! Putting a vessel down on a body's surface.
//!
//! There is no terrain model, so altitudes are measured above the body's
//! mean radius. Longitudes are body-fixed: they turn with the body (see
//! [`Body::rotation_angle`](crate::bodies::Body::rotation_angle)).

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    bodies::BodyId,
    coords::{self, Coordinates},
    edit::Editor,
    error::EditError,
    host::Host,
    targets,
    vessel::VesselId,
};

/// A spot above a body's surface.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub body: BodyId,
    pub coordinates: Coordinates,
    /// Height above the mean radius (`m`).
    pub altitude: f64,
}

/// Where `vessel` is right now, over the body it orbits.
pub fn current_site<H: Host>(host: &H, vessel: VesselId) -> Result<Site, EditError> {
    let orbit = host
        .vessel(vessel)
        .ok_or(EditError::UnknownVessel(vessel))?
        .orbit;
    let orbit = host.orbit(orbit).ok_or(EditError::UnknownOrbit(orbit))?;
    let body_id = orbit.reference_body();
    let body = host.body(body_id).ok_or(EditError::UnknownBody(body_id))?;

    let pos = orbit.pos();
    let inertial = Coordinates::from_position(pos);
    let longitude = coords::clamp_degrees_180(
        inertial.longitude - body.rotation_angle(host.universal_time()).to_degrees(),
    );
    Ok(Site {
        body: body_id,
        coordinates: Coordinates::new(inertial.latitude, longitude),
        altitude: pos.norm() - body.radius,
    })
}

/// Teleport `vessel` to hover over `site`, moving with the surface below
/// it. At zero altitude the vessel is left marked as landed.
pub fn land_at<H: Host>(
    editor: &mut Editor<'_, H>,
    vessel: VesselId,
    site: &Site,
) -> Result<(), EditError> {
    if !site.altitude.is_finite() || site.altitude < 0.0 {
        return Err(EditError::InvalidAltitude(site.altitude));
    }
    let body = editor
        .host()
        .body(site.body)
        .ok_or(EditError::UnknownBody(site.body))?;
    let target = targets::landing(
        site.body,
        body,
        site.coordinates,
        site.altitude,
        editor.now(),
        editor.config().state_vector_tolerance,
    )
    .ok_or(EditError::NoSurfaceMotion(site.body))?;

    editor.warp_vessel(vessel, &target)?;

    if site.altitude > 0.0 {
        debug!(?vessel, altitude = site.altitude, "hovering");
    } else {
        if let Some(v) = editor.host_mut().vessel_mut(vessel) {
            v.landed = true;
        }
        info!(
            ?vessel,
            site = %site.coordinates.to_string_dms(false),
            "vessel landed"
        );
    }
    Ok(())
}

/// A descent in progress. The host calls [`Landing::step`] every frame
/// until it reports touchdown. Dropping it cancels the descent and leaves
/// the vessel wherever it was last put.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Landing {
    vessel: VesselId,
    site: Site,
}

impl Landing {
    pub fn start<H: Host>(
        editor: &mut Editor<'_, H>,
        vessel: VesselId,
        site: Site,
    ) -> Result<Self, EditError> {
        land_at(editor, vessel, &site)?;
        info!(?vessel, altitude = site.altitude, "landing started");
        Ok(Self { vessel, site })
    }

    pub fn vessel(&self) -> VesselId {
        self.vessel
    }

    /// The spot the vessel is currently held over.
    pub fn site(&self) -> &Site {
        &self.site
    }

    pub fn is_down(&self) -> bool {
        self.site.altitude <= 0.0
    }

    /// Lower the vessel by `dt` seconds of descent and put it back over
    /// the site. Returns whether it has touched down.
    pub fn step<H: Host>(&mut self, editor: &mut Editor<'_, H>, dt: f64) -> Result<bool, EditError> {
        if self.is_down() {
            return Ok(true);
        }
        let mut next = self.site;
        next.altitude = (next.altitude - editor.config().landing_descent_rate * dt).max(0.0);
        land_at(editor, self.vessel, &next)?;
        self.site = next;
        Ok(self.is_down())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::EditorConfig, time::UT, vessel::Part, world::World};

    const KSC: Coordinates = Coordinates {
        latitude: -0.0972,
        longitude: -74.5577,
    };

    fn kerbin() -> (World, BodyId, VesselId) {
        let mut world = World::new(UT::new_seconds(1000.0));
        let kerbin = world.add_root_body("Kerbin", 3.5316e12, 600_000.0);
        world.bodies[kerbin].rotation_period = 21_549.425;
        let parking = targets::simple(kerbin, &world.bodies[kerbin], 100_000.0, world.ut);
        let clamp = Part {
            name: "launchClamp1".into(),
            is_launch_clamp: true,
            ..Part::default()
        };
        let craft = world.add_vessel("Lander", parking, vec![clamp]).unwrap();
        (world, kerbin, craft)
    }

    fn site(body: BodyId, altitude: f64) -> Site {
        Site {
            body,
            coordinates: KSC,
            altitude,
        }
    }

    #[test]
    fn hovers_over_site() {
        let (mut world, kerbin, craft) = kerbin();
        let config = EditorConfig::default();
        let mut editor = Editor::new(&mut world, &config);

        land_at(&mut editor, craft, &site(kerbin, 100.0)).unwrap();
        let here = current_site(editor.host(), craft).unwrap();
        assert_eq!(here.body, kerbin);
        assert!((here.altitude - 100.0).abs() < 1e-2);
        assert!((here.coordinates.latitude - KSC.latitude).abs() < 1e-5);
        assert!((here.coordinates.longitude - KSC.longitude).abs() < 1e-5);

        let v = &world.vessels[craft];
        assert!(!v.landed);
        assert!(v.packed);
        assert!(v.launch_clamps().is_empty());
    }

    #[test]
    fn descends_to_touchdown() {
        let (mut world, kerbin, craft) = kerbin();
        let config = EditorConfig::default();
        let mut editor = Editor::new(&mut world, &config);

        let mut landing = Landing::start(&mut editor, craft, site(kerbin, 25.0)).unwrap();
        assert!(!landing.step(&mut editor, 1.0).unwrap());
        assert_eq!(landing.site().altitude, 15.0);
        assert!(!landing.step(&mut editor, 1.0).unwrap());
        assert!(landing.step(&mut editor, 1.0).unwrap());
        assert_eq!(landing.site().altitude, 0.0);
        assert!(landing.step(&mut editor, 1.0).unwrap());

        let here = current_site(editor.host(), craft).unwrap();
        assert!(here.altitude.abs() < 1e-2);
        assert!(world.vessels[craft].landed);
    }

    #[test]
    fn refuses_unusable_sites() {
        let (mut world, kerbin, craft) = kerbin();
        let config = EditorConfig::default();
        let orbit = world.vessels[craft].orbit;
        let before = world.orbits[orbit].clone();

        let mut editor = Editor::new(&mut world, &config);
        assert_eq!(
            land_at(&mut editor, craft, &site(kerbin, -5.0)),
            Err(EditError::InvalidAltitude(-5.0))
        );
        let pole = Site {
            coordinates: Coordinates::new(90.0, 0.0),
            ..site(kerbin, 10.0)
        };
        assert_eq!(
            land_at(&mut editor, craft, &pole),
            Err(EditError::NoSurfaceMotion(kerbin))
        );
        editor.host_mut().bodies[kerbin].rotation_period = 0.0;
        assert_eq!(
            land_at(&mut editor, craft, &site(kerbin, 10.0)),
            Err(EditError::NoSurfaceMotion(kerbin))
        );

        assert_eq!(world.orbits[orbit], before);
        assert_eq!(world.vessels[craft].launch_clamps().len(), 1);
    }
}
