//! Scenario files: a starting universe plus a script of edits, in RON.

use std::fmt;

use color_eyre::eyre::{self, bail, OptionExt, WrapErr};
use hyperedit::{
    config::EditorConfig,
    coords::Coordinates,
    kepler::orbits::{Elements, OrbitId, Solver},
    lander::{self, Site},
    queue::EditCommand,
    si, targets,
    time::UT,
    vessel::Part,
    world::World,
};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

fn yes() -> bool {
    true
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Scenario {
    /// Starting universal time (`s`).
    #[serde(default)]
    pub ut: f64,
    #[serde(default = "yes")]
    pub flight: bool,
    #[serde(default = "yes")]
    pub physics_ready: bool,
    /// Parents must come before their satellites. The first body without
    /// an orbit is the root.
    pub bodies: Vec<BodySpec>,
    #[serde(default)]
    pub vessels: Vec<VesselSpec>,
    #[serde(default)]
    pub commands: Vec<Command>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BodySpec {
    pub name: String,
    pub mu: f64,
    pub radius: f64,
    /// Sidereal rotation period (`s`); leave out for a body that does not
    /// spin.
    #[serde(default)]
    pub rotation_period: f64,
    #[serde(default)]
    pub orbit: Option<OrbitSpec>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VesselSpec {
    pub name: String,
    pub orbit: OrbitSpec,
    #[serde(default)]
    pub parts: Vec<Part>,
    #[serde(default)]
    pub landed_at: Option<String>,
    #[serde(default)]
    pub splashed: bool,
    /// Start off rails.
    #[serde(default)]
    pub unpacked: bool,
    #[serde(default)]
    pub active: bool,
}

/// Orbital elements as a person would write them: angles in degrees
/// (mean anomaly in radians) and the semi-major axis with an optional SI
/// prefix, e.g. `"13.6G"`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OrbitSpec {
    pub body: String,
    pub semi_major_axis: String,
    #[serde(default)]
    pub eccentricity: f64,
    #[serde(default)]
    pub inclination: f64,
    #[serde(default)]
    pub lan: f64,
    #[serde(default)]
    pub argpe: f64,
    #[serde(default)]
    pub mean_anomaly: f64,
    /// Defaults to the current time.
    #[serde(default)]
    pub epoch: Option<f64>,
}

impl OrbitSpec {
    pub fn elements(&self, world: &World) -> eyre::Result<Elements> {
        let body = world
            .body_by_name(&self.body)
            .ok_or_else(|| eyre::eyre!("no body named {:?}", self.body))?;
        let sma = si::parse(&self.semi_major_axis)
            .wrap_err_with(|| format!("semi-major axis around {}", self.body))?;
        Ok(targets::complex(
            body,
            self.inclination,
            self.eccentricity,
            sma,
            self.lan,
            self.argpe,
            self.mean_anomaly,
            self.epoch.map_or(world.ut, UT::from),
        ))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Target {
    Vessel(String),
    Body(String),
}

impl Target {
    fn orbit(&self, world: &World) -> eyre::Result<OrbitId> {
        match self {
            Target::Vessel(name) => {
                let id = world
                    .vessel_by_name(name)
                    .ok_or_else(|| eyre::eyre!("no vessel named {name:?}"))?;
                Ok(world.vessels[id].orbit)
            }
            Target::Body(name) => {
                let id = world
                    .body_by_name(name)
                    .ok_or_else(|| eyre::eyre!("no body named {name:?}"))?;
                world.bodies[id]
                    .orbit
                    .ok_or_else(|| eyre::eyre!("{name} is the root body"))
            }
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Vessel(name) | Target::Body(name) => write!(f, "{name}"),
        }
    }
}

/// One scripted edit. Names are resolved against the universe as it is
/// when the command runs, so later commands see earlier edits.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Command {
    /// Circular equatorial orbit `altitude` (SI string) above `body`.
    Simple {
        target: Target,
        body: String,
        altitude: String,
    },
    Complex {
        target: Target,
        orbit: OrbitSpec,
    },
    /// Keep the current position, replace the velocity (`m/s`).
    Velocity {
        target: Target,
        velocity: (f64, f64, f64),
    },
    /// Put `vessel` where `target` will be `lead_time` seconds from now.
    Rendezvous {
        vessel: String,
        target: String,
        lead_time: f64,
    },
    OffsetFrame((f64, f64, f64)),
    SetTime(f64),
    AlignSemiMajorAxes {
        vessels: Vec<String>,
        semi_major_axis: String,
    },
    DestroyVessel(String),
    RefillResources(String),
    /// Hover `vessel` `altitude` above `body` at `(latitude, longitude)`,
    /// or land it at zero altitude. Leaving out the body or coordinates
    /// keeps the ones the vessel is over now.
    Land {
        vessel: String,
        #[serde(default)]
        body: Option<String>,
        #[serde(default)]
        coordinates: Option<(f64, f64)>,
        altitude: String,
    },
}

impl Command {
    pub fn resolve(&self, world: &World, config: &EditorConfig) -> eyre::Result<EditCommand> {
        let command = match self {
            Command::Simple {
                target,
                body,
                altitude,
            } => {
                let body_id = world
                    .body_by_name(body)
                    .ok_or_else(|| eyre::eyre!("no body named {body:?}"))?;
                let altitude = si::parse(altitude).wrap_err("altitude")?;
                EditCommand::SetOrbit {
                    orbit: target.orbit(world)?,
                    elements: targets::simple(body_id, &world.bodies[body_id], altitude, world.ut),
                }
            }
            Command::Complex { target, orbit } => EditCommand::SetOrbit {
                orbit: target.orbit(world)?,
                elements: orbit.elements(world)?,
            },
            Command::Velocity {
                target,
                velocity: (x, y, z),
            } => {
                let id = target.orbit(world)?;
                let orbit = &world.orbits[id];
                let mu = world.bodies[orbit.reference_body()].mu;
                let elements = targets::velocity(
                    orbit,
                    Vector3::new(*x, *y, *z),
                    mu,
                    config.state_vector_tolerance,
                )
                .ok_or_eyre("orbit has no derived state")?;
                EditCommand::SetOrbit {
                    orbit: id,
                    elements,
                }
            }
            Command::Rendezvous {
                vessel,
                target,
                lead_time,
            } => {
                let chased = Target::Vessel(target.clone()).orbit(world)?;
                EditCommand::SetOrbit {
                    orbit: Target::Vessel(vessel.clone()).orbit(world)?,
                    elements: targets::rendezvous(&world.orbits[chased], *lead_time),
                }
            }
            Command::OffsetFrame((x, y, z)) => EditCommand::OffsetFrame(Vector3::new(*x, *y, *z)),
            Command::SetTime(ut) => EditCommand::SetTime(UT::new_seconds(*ut)),
            Command::AlignSemiMajorAxes {
                vessels,
                semi_major_axis,
            } => EditCommand::AlignSemiMajorAxes {
                orbits: vessels
                    .iter()
                    .map(|name| Target::Vessel(name.clone()).orbit(world))
                    .collect::<eyre::Result<_>>()?,
                semi_major_axis: si::parse(semi_major_axis).wrap_err("semi-major axis")?,
            },
            Command::DestroyVessel(name) => EditCommand::DestroyVessel(
                world
                    .vessel_by_name(name)
                    .ok_or_else(|| eyre::eyre!("no vessel named {name:?}"))?,
            ),
            Command::RefillResources(name) => EditCommand::RefillResources(
                world
                    .vessel_by_name(name)
                    .ok_or_else(|| eyre::eyre!("no vessel named {name:?}"))?,
            ),
            Command::Land {
                vessel,
                body,
                coordinates,
                altitude,
            } => {
                let id = world
                    .vessel_by_name(vessel)
                    .ok_or_else(|| eyre::eyre!("no vessel named {vessel:?}"))?;
                let here = lander::current_site(world, id)?;
                let body = match body {
                    Some(name) => world
                        .body_by_name(name)
                        .ok_or_else(|| eyre::eyre!("no body named {name:?}"))?,
                    None => here.body,
                };
                EditCommand::Land {
                    vessel: id,
                    site: Site {
                        body,
                        coordinates: coordinates
                            .map_or(here.coordinates, |(lat, lon)| Coordinates::new(lat, lon)),
                        altitude: si::parse(altitude).wrap_err("altitude")?,
                    },
                }
            }
        };
        Ok(command)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Simple {
                target,
                body,
                altitude,
            } => write!(f, "simple {target} -> {body} @ {altitude}m"),
            Command::Complex { target, orbit } => write!(
                f,
                "complex {target} -> {} a={}m e={}",
                orbit.body, orbit.semi_major_axis, orbit.eccentricity
            ),
            Command::Velocity {
                target,
                velocity: (x, y, z),
            } => write!(f, "velocity {target} -> ({x}, {y}, {z}) m/s"),
            Command::Rendezvous {
                vessel,
                target,
                lead_time,
            } => write!(f, "rendezvous {vessel} -> {target} lead {lead_time}s"),
            Command::OffsetFrame((x, y, z)) => write!(f, "offset frame ({x}, {y}, {z})"),
            Command::SetTime(ut) => write!(f, "set time {ut}s"),
            Command::AlignSemiMajorAxes {
                vessels,
                semi_major_axis,
            } => write!(f, "align {} @ {semi_major_axis}m", vessels.join(", ")),
            Command::DestroyVessel(name) => write!(f, "destroy {name}"),
            Command::RefillResources(name) => write!(f, "refill {name}"),
            Command::Land {
                vessel,
                body,
                coordinates,
                altitude,
            } => {
                write!(f, "land {vessel}")?;
                if let Some(body) = body {
                    write!(f, " on {body}")?;
                }
                match coordinates {
                    Some((lat, lon)) => {
                        write!(f, " at {}", Coordinates::new(*lat, *lon).to_string_dms(false))?
                    }
                    None => write!(f, " where it is")?,
                }
                write!(f, " +{altitude}m")
            }
        }
    }
}

impl Scenario {
    pub fn build(&self, config: &EditorConfig) -> eyre::Result<World> {
        let mut world = World::new(UT::new_seconds(self.ut));
        world.flight = self.flight;
        world.physics_ready = self.physics_ready;
        world.solver = Solver::from(config);

        for body in &self.bodies {
            match &body.orbit {
                None => {
                    if !world.bodies.is_empty() {
                        bail!(
                            "{} has no orbit but {} is already the root",
                            body.name,
                            self.bodies[0].name
                        );
                    }
                    let id = world.add_root_body(&body.name, body.mu, body.radius);
                    world.bodies[id].rotation_period = body.rotation_period;
                }
                Some(orbit) => {
                    let elements = orbit
                        .elements(&world)
                        .wrap_err_with(|| format!("orbit of {}", body.name))?;
                    let id = world
                        .add_body(&body.name, body.mu, body.radius, elements)
                        .wrap_err_with(|| format!("adding body {}", body.name))?;
                    world.bodies[id].rotation_period = body.rotation_period;
                }
            }
        }

        for spec in &self.vessels {
            let elements = spec
                .orbit
                .elements(&world)
                .wrap_err_with(|| format!("orbit of {}", spec.name))?;
            let id = world
                .add_vessel(&spec.name, elements, spec.parts.clone())
                .wrap_err_with(|| format!("adding vessel {}", spec.name))?;
            let vessel = &mut world.vessels[id];
            if let Some(site) = &spec.landed_at {
                vessel.landed = true;
                vessel.landed_at.clone_from(site);
            }
            vessel.splashed = spec.splashed;
            vessel.packed = !spec.unpacked;
            if spec.active {
                world.active_vessel = Some(id);
            }
        }

        Ok(world)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SYSTEM: &str = r#"Scenario(
        ut: 100.0,
        bodies: [
            (name: "Kerbin", mu: 3.5316e12, radius: 600000.0, rotation_period: 21549.425),
            (name: "Mun", mu: 6.5138398e10, radius: 200000.0,
             orbit: Some((body: "Kerbin", semi_major_axis: "12M"))),
        ],
        vessels: [
            (name: "Probe", orbit: (body: "Kerbin", semi_major_axis: "700k"), unpacked: true),
        ],
        commands: [
            Simple(target: Vessel("Probe"), body: "Mun", altitude: "50k"),
            SetTime(200.0),
        ],
    )"#;

    #[test]
    fn builds_world() {
        let scenario: Scenario = ron::from_str(SYSTEM).unwrap();
        let world = scenario.build(&EditorConfig::default()).unwrap();
        let mun = world.body_by_name("Mun").unwrap();
        assert!(world.bodies[mun].soi > 2e6);
        let probe = world.vessel_by_name("Probe").unwrap();
        assert!(!world.vessels[probe].packed);
        assert_eq!(world.active_vessel, Some(probe));
        assert!((world.orbits[world.vessels[probe].orbit].pos().norm() - 700_000.0).abs() < 1e-6);
    }

    #[test]
    fn resolves_names() {
        let scenario: Scenario = ron::from_str(SYSTEM).unwrap();
        let config = EditorConfig::default();
        let world = scenario.build(&config).unwrap();
        let EditCommand::SetOrbit { elements, .. } =
            scenario.commands[0].resolve(&world, &config).unwrap()
        else {
            panic!("expected an orbit edit");
        };
        assert_eq!(elements.semi_major_axis, 250_000.0);
        assert_eq!(elements.reference_body, world.body_by_name("Mun").unwrap());
        assert_eq!(scenario.commands[0].to_string(), "simple Probe -> Mun @ 50km");

        let missing = Command::DestroyVessel("Nobody".into());
        assert!(missing.resolve(&world, &config).is_err());
    }

    #[test]
    fn land_defaults_to_current_position() {
        let scenario: Scenario = ron::from_str(SYSTEM).unwrap();
        let config = EditorConfig::default();
        let world = scenario.build(&config).unwrap();
        let kerbin = world.body_by_name("Kerbin").unwrap();
        assert_eq!(world.bodies[kerbin].rotation_period, 21549.425);

        let here = Command::Land {
            vessel: "Probe".into(),
            body: None,
            coordinates: None,
            altitude: "0".into(),
        };
        let EditCommand::Land { site, .. } = here.resolve(&world, &config).unwrap() else {
            panic!("expected a landing");
        };
        assert_eq!(site.body, kerbin);
        assert_eq!(site.altitude, 0.0);
        assert!(site.coordinates.latitude.abs() < 1e-9);
        assert_eq!(here.to_string(), "land Probe where it is +0m");

        let ksc = Command::Land {
            vessel: "Probe".into(),
            body: Some("Kerbin".into()),
            coordinates: Some((-0.0972, -74.5577)),
            altitude: "1k".into(),
        };
        let EditCommand::Land { site, .. } = ksc.resolve(&world, &config).unwrap() else {
            panic!("expected a landing");
        };
        assert_eq!(site.altitude, 1000.0);
        assert_eq!(site.coordinates, Coordinates::new(-0.0972, -74.5577));
        assert_eq!(
            ksc.to_string(),
            "land Probe on Kerbin at 0° 05' 49\" S, 74° 33' 27\" W +1km"
        );
    }
}
