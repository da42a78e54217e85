//! An in-memory simulation host.
//!
//! `World` implements every host trait over plain arenas. It does no
//! physics of its own: packing a vessel flips a flag, frame offsets
//! accumulate into [`World::frame_origin`] and time only moves through
//! [`Clock::set_universal_time`]. It backs the tests and the headless
//! driver.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    arena::Arena,
    bodies::{laplace_soi, Body, BodyId},
    error::{EditError, HoldError},
    host::{Clock, Messenger, Physics, Universe},
    kepler::orbits::{Elements, Orbit, OrbitId, Solver},
    time::UT,
    vessel::{OrbitDriver, Part, PartId, Vessel, VesselId},
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScreenMessage {
    pub text: String,
    pub duration: f64,
}

#[derive(Clone, Debug)]
pub struct World {
    pub bodies: Arena<BodyId, Body>,
    pub vessels: Arena<VesselId, Vessel>,
    pub orbits: Arena<OrbitId, Orbit>,
    pub ut: UT,
    /// Whether a flight scene is loaded. Without one the vessel list is
    /// unavailable.
    pub flight: bool,
    pub active_vessel: Option<VesselId>,
    /// Whether the physics manager accepts unpack holds.
    pub physics_ready: bool,
    /// Frames of the last granted unpack hold.
    pub unpack_hold: Option<u32>,
    pub frame_origin: Vector3<f64>,
    pub messages: Vec<ScreenMessage>,
    pub solver: Solver,
}

impl Default for World {
    fn default() -> Self {
        Self::new(UT::ZERO)
    }
}

impl World {
    pub fn new(ut: UT) -> Self {
        Self {
            bodies: Arena::new(),
            vessels: Arena::new(),
            orbits: Arena::new(),
            ut,
            flight: true,
            active_vessel: None,
            physics_ready: true,
            unpack_hold: None,
            frame_origin: Vector3::zeros(),
            messages: Vec::new(),
            solver: Solver::default(),
        }
    }

    pub fn add_root_body(&mut self, name: &str, mu: f64, radius: f64) -> BodyId {
        self.bodies.push(Body {
            name: name.to_owned(),
            mu,
            radius,
            soi: f64::INFINITY,
            orbit: None,
            parent: None,
            satellites: Vec::new(),
            is_star: true,
            rotation_period: 0.0,
        })
    }

    /// Add a body orbiting `elements.reference_body`.
    pub fn add_body(
        &mut self,
        name: &str,
        mu: f64,
        radius: f64,
        elements: Elements,
    ) -> Result<BodyId, EditError> {
        let orbit = self.add_orbit(elements)?;
        let parent = elements.reference_body;
        let id = self.bodies.push(Body {
            name: name.to_owned(),
            mu,
            radius,
            soi: f64::INFINITY,
            orbit: Some(orbit),
            parent: Some(parent),
            satellites: Vec::new(),
            is_star: false,
            rotation_period: 0.0,
        });
        self.bodies[parent].satellites.push(id);
        self.refresh_body(id);
        Ok(id)
    }

    pub fn add_vessel(
        &mut self,
        name: &str,
        elements: Elements,
        parts: Vec<Part>,
    ) -> Result<VesselId, EditError> {
        let orbit = self.add_orbit(elements)?;
        let driver = OrbitDriver {
            pos: self.orbits[orbit].pos().xzy(),
            vel: self.orbits[orbit].vel(),
        };
        let mut arena = Arena::new();
        for part in parts {
            arena.push(part);
        }
        let id = self.vessels.push(Vessel {
            name: name.to_owned(),
            orbit,
            packed: true,
            landed: false,
            splashed: false,
            landed_at: String::new(),
            parts: arena,
            driver,
        });
        if self.active_vessel.is_none() {
            self.active_vessel = Some(id);
        }
        Ok(id)
    }

    /// An orbit owned by nothing, e.g. a template being edited before it
    /// is copied somewhere.
    pub fn add_orbit(&mut self, elements: Elements) -> Result<OrbitId, EditError> {
        elements.check().map_err(EditError::InvalidElements)?;
        let mu = self
            .bodies
            .get(elements.reference_body)
            .ok_or(EditError::UnknownBody(elements.reference_body))?
            .mu;
        Ok(self
            .orbits
            .push(Orbit::derived(elements, mu, self.ut, self.solver)))
    }

    pub fn body_by_name(&self, name: &str) -> Option<BodyId> {
        self.bodies
            .iter()
            .find(|(_, b)| b.name == name)
            .map(|(id, _)| id)
    }

    pub fn vessel_by_name(&self, name: &str) -> Option<VesselId> {
        self.vessels
            .iter()
            .find(|(_, v)| v.name == name)
            .map(|(id, _)| id)
    }

    /// Re-derive every orbit, and the vessel drivers that mirror them, at
    /// the current time.
    fn update_orbits(&mut self) {
        let ut = self.ut;
        let solver = self.solver;
        let bodies = &self.bodies;
        for (_, orbit) in self.orbits.iter_mut() {
            if let Some(parent) = bodies.get(orbit.reference_body()) {
                orbit.update_from_ut(ut, parent.mu, solver);
            }
        }
        for (_, vessel) in self.vessels.iter_mut() {
            if let Some(orbit) = self.orbits.get(vessel.orbit) {
                vessel.driver.pos = orbit.pos().xzy();
                vessel.driver.vel = orbit.vel();
            }
        }
    }
}

impl Universe for World {
    fn vessel_ids(&self) -> Option<Vec<VesselId>> {
        self.flight.then(|| self.vessels.ids().collect())
    }

    fn body_ids(&self) -> Vec<BodyId> {
        self.bodies.ids().collect()
    }

    fn vessel(&self, id: VesselId) -> Option<&Vessel> {
        self.vessels.get(id)
    }

    fn vessel_mut(&mut self, id: VesselId) -> Option<&mut Vessel> {
        self.vessels.get_mut(id)
    }

    fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(id)
    }

    fn body_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.bodies.get_mut(id)
    }

    fn orbit(&self, id: OrbitId) -> Option<&Orbit> {
        self.orbits.get(id)
    }

    fn orbit_mut(&mut self, id: OrbitId) -> Option<&mut Orbit> {
        self.orbits.get_mut(id)
    }

    fn destroy_part(&mut self, vessel: VesselId, part: PartId) {
        if let Some(v) = self.vessels.get_mut(vessel) {
            v.parts.remove(part);
        }
    }

    fn destroy_vessel(&mut self, vessel: VesselId) -> bool {
        let Some(v) = self.vessels.remove(vessel) else {
            return false;
        };
        self.orbits.remove(v.orbit);
        if self.active_vessel == Some(vessel) {
            self.active_vessel = None;
        }
        true
    }

    fn refresh_body(&mut self, body: BodyId) {
        let Some(b) = self.bodies.get(body) else {
            return;
        };
        let (Some(parent), Some(orbit)) = (b.parent, b.orbit) else {
            return;
        };
        let (Some(p), Some(o)) = (self.bodies.get(parent), self.orbits.get(orbit)) else {
            return;
        };
        let soi = laplace_soi(b.mu, p.mu, o.elements().semi_major_axis);
        debug!(body = %b.name, soi, "body refreshed");
        self.bodies[body].soi = soi;
    }
}

impl Physics for World {
    fn go_on_rails(&mut self, vessel: VesselId) {
        if let Some(v) = self.vessels.get_mut(vessel) {
            v.packed = true;
        }
    }

    fn hold_vessel_unpack(&mut self, frames: u32) -> Result<(), HoldError> {
        if !self.physics_ready {
            return Err(HoldError::NotReady);
        }
        self.unpack_hold = Some(frames);
        Ok(())
    }

    fn active_vessel(&self) -> Option<VesselId> {
        self.active_vessel
    }

    fn set_frame_offset(&mut self, offset: Vector3<f64>) {
        self.frame_origin += offset;
    }
}

impl Clock for World {
    fn universal_time(&self) -> UT {
        self.ut
    }

    fn set_universal_time(&mut self, ut: UT) {
        self.ut = ut;
        self.update_orbits();
    }
}

impl Messenger for World {
    fn post(&mut self, message: &str, duration: f64) {
        self.messages.push(ScreenMessage {
            text: message.to_owned(),
            duration,
        });
    }
}
