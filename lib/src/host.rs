//! The boundary between the editor and the simulation host.
//!
//! The host owns every vessel, body and orbit. The editor only reaches them
//! through these traits, so any host (the game itself, the in-memory
//! [`World`](crate::world::World), a test double) can be driven by the
//! same transition code.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::{
    bodies::{Body, BodyId},
    error::HoldError,
    kepler::orbits::{Orbit, OrbitId},
    time::UT,
    vessel::{PartId, Vessel, VesselId},
};

/// The entity an orbit belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Owner {
    Vessel(VesselId),
    Body(BodyId),
}

/// Entity repository.
pub trait Universe {
    /// All live vessels, or `None` when no flight scene is loaded.
    fn vessel_ids(&self) -> Option<Vec<VesselId>>;
    fn body_ids(&self) -> Vec<BodyId>;

    fn vessel(&self, id: VesselId) -> Option<&Vessel>;
    fn vessel_mut(&mut self, id: VesselId) -> Option<&mut Vessel>;
    fn body(&self, id: BodyId) -> Option<&Body>;
    fn body_mut(&mut self, id: BodyId) -> Option<&mut Body>;
    fn orbit(&self, id: OrbitId) -> Option<&Orbit>;
    fn orbit_mut(&mut self, id: OrbitId) -> Option<&mut Orbit>;

    fn destroy_part(&mut self, vessel: VesselId, part: PartId);
    /// Returns whether the vessel existed.
    fn destroy_vessel(&mut self, vessel: VesselId) -> bool;

    /// Recompute a body's parent-dependent state after its orbit changed.
    fn refresh_body(&mut self, body: BodyId);

    /// Every entity whose orbit is `orbit`, vessels first, each group in
    /// repository order.
    ///
    /// The default is a linear scan; hosts with an index may override it.
    fn owners_of(&self, orbit: OrbitId) -> Vec<Owner> {
        let vessels = self
            .vessel_ids()
            .unwrap_or_default()
            .into_iter()
            .filter(|&id| self.vessel(id).is_some_and(|v| v.orbit == orbit))
            .map(Owner::Vessel);
        let bodies = self
            .body_ids()
            .into_iter()
            .filter(|&id| self.body(id).is_some_and(|b| b.orbit == Some(orbit)))
            .map(Owner::Body);
        vessels.chain(bodies).collect()
    }
}

pub trait Physics {
    /// Switch a vessel to analytic propagation.
    fn go_on_rails(&mut self, vessel: VesselId);
    /// Ask the engine to keep vessels packed for the next `frames` frames.
    fn hold_vessel_unpack(&mut self, frames: u32) -> Result<(), HoldError>;
    fn active_vessel(&self) -> Option<VesselId>;
    /// Shift the floating origin of the local physics frame.
    fn set_frame_offset(&mut self, offset: Vector3<f64>);
}

pub trait Clock {
    fn universal_time(&self) -> UT;
    fn set_universal_time(&mut self, ut: UT);
}

pub trait Messenger {
    /// Show a short notice to the player for `duration` seconds.
    fn post(&mut self, message: &str, duration: f64);
}

pub trait Host: Universe + Physics + Clock + Messenger {}

impl<T: Universe + Physics + Clock + Messenger> Host for T {}
