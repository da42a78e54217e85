use crate::{bodies::BodyId, kepler::orbits::OrbitId, vessel::VesselId};

/// Reasons an edit was refused. Every variant is raised before anything
/// has been mutated.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum EditError {
    #[error("Destination position was above the sphere of influence ({distance:.0} m > {soi:.0} m)")]
    AboveSphereOfInfluence { distance: f64, soi: f64 },
    #[error("Invalid orbital elements: {0}")]
    InvalidElements(&'static str),
    #[error("Unknown orbit {0:?}")]
    UnknownOrbit(OrbitId),
    #[error("Unknown vessel {0:?}")]
    UnknownVessel(VesselId),
    #[error("Unknown body {0:?}")]
    UnknownBody(BodyId),
    #[error("Orbit {orbit:?} is owned by {owners} entities")]
    AmbiguousOwner { orbit: OrbitId, owners: usize },
    #[error("Body {body:?} cannot orbit {parent:?}, which is itself or one of its satellites")]
    HierarchyCycle { body: BodyId, parent: BodyId },
    #[error("The root body {0:?} has no orbit to edit")]
    RootBody(BodyId),
    #[error("Cannot align the orbit of {body:?} together with orbits around it")]
    InterdependentOrbits { body: BodyId },
    #[error("Cannot hover over this spot on {0:?}: the surface there does not move")]
    NoSurfaceMotion(BodyId),
    #[error("Invalid landing altitude {0} m")]
    InvalidAltitude(f64),
    #[error("Could not find any vessels (are you in the flight scene?)")]
    NoFlightScene,
    #[error("The edit queue has been shut down")]
    QueueClosed,
}

/// A malformed numeric or DMS string.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Empty input")]
    Empty,
    #[error("Not a number: {0:?}")]
    InvalidNumber(String),
    #[error("Expected degrees, minutes and seconds (x° x' x\"): {0:?}")]
    MissingDelimiter(String),
    #[error("Invalid {field} field in {input:?}")]
    InvalidField { field: &'static str, input: String },
}

/// The physics engine declined a best-effort request.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldError {
    #[error("The physics manager is not ready")]
    NotReady,
}
