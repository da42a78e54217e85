use std::collections::BTreeMap;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::{arena::Arena, kepler::orbits::OrbitId};

crate::arena_id!(VesselId);
crate::arena_id!(PartId);

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub amount: f64,
    pub max_amount: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub name: String,
    /// Holds the vessel to a launch pad. Destroyed whenever the vessel is
    /// teleported.
    #[serde(default)]
    pub is_launch_clamp: bool,
    #[serde(default)]
    pub resources: BTreeMap<String, Resource>,
}

/// The engine-side copy of a vessel's state that some physics and
/// rendering paths read instead of the orbit. Position uses the engine's
/// world axis convention (y and z swapped relative to the orbit frame).
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OrbitDriver {
    pub pos: Vector3<f64>,
    pub vel: Vector3<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vessel {
    pub name: String,
    pub orbit: OrbitId,
    /// On rails: the orbit is propagated analytically from its elements.
    /// Off rails the vessel is integrated numerically by the physics
    /// engine.
    pub packed: bool,
    pub landed: bool,
    pub splashed: bool,
    /// Name of the launch site or biome the vessel rests at, empty when
    /// flying.
    pub landed_at: String,
    pub parts: Arena<PartId, Part>,
    pub driver: OrbitDriver,
}

impl Vessel {
    pub fn launch_clamps(&self) -> Vec<PartId> {
        self.parts
            .iter()
            .filter(|(_, part)| part.is_launch_clamp)
            .map(|(id, _)| id)
            .collect()
    }
}
