//! Orbit editing.
//!
//! Every orbit change goes through [`Editor::apply_elements`], which
//! overwrites the elements in place and re-derives the cached state. The
//! higher-level transitions wrap it with whatever the owning entity needs
//! to stay consistent: vessels are packed and unclamped, bodies are
//! relinked in the body tree.
//!
//! All validation happens before the first write, so a refused edit
//! leaves the host untouched.

use nalgebra::Vector3;
use tracing::{debug, error, info};

use crate::{
    bodies::BodyId,
    config::EditorConfig,
    error::EditError,
    host::{Host, Owner},
    kepler::orbits::{Elements, OrbitId, Solver},
    time::UT,
    vessel::VesselId,
};

/// Borrows the host for the duration of one or more edits. Holding the
/// host mutably keeps transitions from re-entering each other.
pub struct Editor<'a, H: Host> {
    host: &'a mut H,
    config: &'a EditorConfig,
}

impl<'a, H: Host> Editor<'a, H> {
    pub fn new(host: &'a mut H, config: &'a EditorConfig) -> Self {
        Self { host, config }
    }

    pub fn host(&self) -> &H {
        self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        self.host
    }

    pub fn config(&self) -> &EditorConfig {
        self.config
    }

    pub fn now(&self) -> UT {
        self.host.universal_time()
    }

    pub fn solver(&self) -> Solver {
        Solver::from(self.config)
    }

    pub fn mu_of(&self, body: BodyId) -> Result<f64, EditError> {
        self.host
            .body(body)
            .map(|b| b.mu)
            .ok_or(EditError::UnknownBody(body))
    }

    /// Check the element set on its own and resolve its reference body's
    /// gravitational parameter.
    fn check_target(&self, target: &Elements) -> Result<f64, EditError> {
        target.check().map_err(EditError::InvalidElements)?;
        self.mu_of(target.reference_body)
    }

    /// Refuse targets that would put a vessel outside its new reference
    /// body's sphere of influence right now. The player is told why.
    fn check_soi(&mut self, target: &Elements, mu: f64) -> Result<(), EditError> {
        let soi = self
            .host
            .body(target.reference_body)
            .map_or(f64::INFINITY, |b| b.soi);
        let distance = target
            .relative_position_at(self.now(), mu, self.solver())
            .norm();
        if distance > soi {
            let err = EditError::AboveSphereOfInfluence { distance, soi };
            self.host
                .post(&err.to_string(), self.config.message_duration);
            return Err(err);
        }
        Ok(())
    }

    /// Refuse reparenting a body under itself or one of its satellites.
    fn check_hierarchy(&self, body: BodyId, parent: BodyId) -> Result<(), EditError> {
        let mut cursor = Some(parent);
        while let Some(current) = cursor {
            if current == body {
                return Err(EditError::HierarchyCycle { body, parent });
            }
            cursor = self.host.body(current).and_then(|b| b.parent);
        }
        Ok(())
    }

    /// Find the single entity owning `orbit`, if any.
    pub fn classify(&self, orbit: OrbitId) -> Result<Option<Owner>, EditError> {
        let owners = self.host.owners_of(orbit);
        match owners.as_slice() {
            [] => Ok(None),
            [owner] => Ok(Some(*owner)),
            _ => {
                error!(?orbit, ?owners, "orbit is shared by several entities");
                Err(EditError::AmbiguousOwner {
                    orbit,
                    owners: owners.len(),
                })
            }
        }
    }

    /// Run every check [`Self::set_orbit`] would run without changing
    /// anything.
    pub fn validate(&mut self, orbit: OrbitId, target: &Elements) -> Result<Option<Owner>, EditError> {
        let mu = self.check_target(target)?;
        if self.host.orbit(orbit).is_none() {
            return Err(EditError::UnknownOrbit(orbit));
        }
        let owner = self.classify(orbit)?;
        match owner {
            Some(Owner::Vessel(_)) => self.check_soi(target, mu)?,
            Some(Owner::Body(body)) => self.check_hierarchy(body, target.reference_body)?,
            None => {}
        }
        Ok(owner)
    }

    /// Overwrite `orbit` with `target` and re-derive its basis and its
    /// position/velocity at the current time.
    pub fn apply_elements(&mut self, orbit: OrbitId, target: &Elements) -> Result<(), EditError> {
        let mu = self.check_target(target)?;
        let now = self.now();
        let solver = self.solver();
        let live = self
            .host
            .orbit_mut(orbit)
            .ok_or(EditError::UnknownOrbit(orbit))?;
        live.hardset(target);
        live.init();
        live.update_from_ut(now, mu, solver);
        debug!(?orbit, %now, "orbit elements applied");
        Ok(())
    }

    /// Edit any orbit, routing through the transition that matches its
    /// owner. Orbits nobody owns are edited directly.
    pub fn set_orbit(&mut self, orbit: OrbitId, target: &Elements) -> Result<(), EditError> {
        match self.classify(orbit)? {
            Some(Owner::Vessel(vessel)) => self.warp_vessel(vessel, target),
            Some(Owner::Body(body)) => self.warp_body(body, target),
            None => {
                self.apply_elements(orbit, target)?;
                info!(?orbit, "scratch orbit edited");
                Ok(())
            }
        }
    }

    /// Move a vessel onto a new orbit.
    pub fn warp_vessel(&mut self, vessel: VesselId, target: &Elements) -> Result<(), EditError> {
        let mu = self.check_target(target)?;
        let orbit = self
            .host
            .vessel(vessel)
            .ok_or(EditError::UnknownVessel(vessel))?
            .orbit;
        if self.host.orbit(orbit).is_none() {
            return Err(EditError::UnknownOrbit(orbit));
        }
        self.check_soi(target, mu)?;

        let (name, clamps) = {
            let v = self
                .host
                .vessel_mut(vessel)
                .ok_or(EditError::UnknownVessel(vessel))?;
            v.landed = false;
            v.splashed = false;
            v.landed_at.clear();
            (v.name.clone(), v.launch_clamps())
        };

        for clamp in clamps {
            debug!(vessel = %name, ?clamp, "destroying launch clamp");
            self.host.destroy_part(vessel, clamp);
        }

        self.pack_vessels(Some(vessel));
        if self.host.vessel(vessel).is_some_and(|v| !v.packed) {
            self.host.go_on_rails(vessel);
        }

        if let Err(err) = self.host.hold_vessel_unpack(self.config.unpack_hold_frames) {
            debug!(%err, "unpack hold refused, continuing");
        }

        self.apply_elements(orbit, target)?;

        let (pos, vel) = self
            .host
            .orbit(orbit)
            .map(|o| (o.pos(), o.vel()))
            .ok_or(EditError::UnknownOrbit(orbit))?;
        if let Some(v) = self.host.vessel_mut(vessel) {
            v.driver.pos = pos.xzy();
            v.driver.vel = vel;
        }

        info!(vessel = %name, body = ?target.reference_body, "vessel warped");
        Ok(())
    }

    /// Move a celestial body onto a new orbit, relinking it in the body
    /// tree when its parent changes.
    pub fn warp_body(&mut self, body: BodyId, target: &Elements) -> Result<(), EditError> {
        self.check_target(target)?;
        let (orbit, old_parent, name) = {
            let b = self.host.body(body).ok_or(EditError::UnknownBody(body))?;
            (
                b.orbit.ok_or(EditError::RootBody(body))?,
                b.parent,
                b.name.clone(),
            )
        };
        let new_parent = target.reference_body;
        self.check_hierarchy(body, new_parent)?;

        self.apply_elements(orbit, target)?;

        if old_parent != Some(new_parent) {
            if let Some(old) = old_parent {
                if let Some(old) = self.host.body_mut(old) {
                    old.satellites.retain(|&s| s != body);
                }
            }
            if let Some(new) = self.host.body_mut(new_parent) {
                if !new.satellites.contains(&body) {
                    new.satellites.push(body);
                }
            }
            if let Some(b) = self.host.body_mut(body) {
                b.parent = Some(new_parent);
            }
            debug!(body = %name, ?old_parent, ?new_parent, "body reparented");
        }
        self.host.refresh_body(body);

        info!(body = %name, "body warped");
        Ok(())
    }

    /// Shift the whole local physics frame. Everything but the active
    /// vessel is put on rails first.
    pub fn offset_frame(&mut self, offset: Vector3<f64>) -> Result<(), EditError> {
        if self.host.vessel_ids().is_none() {
            return Err(EditError::NoFlightScene);
        }
        let active = self.host.active_vessel();
        self.pack_vessels(active);
        self.host.set_frame_offset(offset);
        info!(?offset, "frame offset applied");
        Ok(())
    }

    /// Put every unpacked vessel except `except` on rails.
    fn pack_vessels(&mut self, except: Option<VesselId>) {
        let ids = self.host.vessel_ids().unwrap_or_default();
        for id in ids {
            if Some(id) == except {
                continue;
            }
            if self.host.vessel(id).is_some_and(|v| !v.packed) {
                debug!(vessel = ?id, "going on rails");
                self.host.go_on_rails(id);
            }
        }
    }
}
