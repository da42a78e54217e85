//! Miscellaneous tools that sit next to the orbit editor.

use tracing::info;

use crate::{
    bodies::Body,
    config::EditorConfig,
    edit::Editor,
    error::EditError,
    host::{Host, Owner},
    kepler::orbits::{Elements, OrbitId},
    time::UT,
    vessel::VesselId,
};

/// Jump the save game's clock.
pub fn set_universal_time<H: Host>(editor: &mut Editor<'_, H>, ut: UT) {
    let from = editor.now();
    editor.host_mut().set_universal_time(ut);
    info!(%from, to = %ut, "universal time set");
}

/// Give every orbit in `orbits` the same semi-major axis, and therefore
/// the same period. Nothing changes unless every edit would succeed.
pub fn align_semi_major_axes<H: Host>(
    editor: &mut Editor<'_, H>,
    orbits: &[OrbitId],
    semi_major_axis: f64,
) -> Result<(), EditError> {
    let targets = orbits
        .iter()
        .map(|&id| {
            let mut target: Elements = *editor
                .host()
                .orbit(id)
                .ok_or(EditError::UnknownOrbit(id))?
                .elements();
            target.semi_major_axis = semi_major_axis;
            let owner = editor.validate(id, &target)?;
            Ok((id, target, owner))
        })
        .collect::<Result<Vec<_>, EditError>>()?;

    // Moving a body resizes its SOI, which would invalidate the checks
    // already run for anything orbiting it.
    for (_, _, owner) in &targets {
        if let Some(Owner::Body(body)) = *owner {
            if targets.iter().any(|(_, t, _)| t.reference_body == body) {
                return Err(EditError::InterdependentOrbits { body });
            }
        }
    }

    for (id, target, _) in &targets {
        editor.set_orbit(*id, target)?;
    }
    info!(count = targets.len(), semi_major_axis, "semi-major axes aligned");
    Ok(())
}

pub fn destroy_vessel<H: Host>(editor: &mut Editor<'_, H>, vessel: VesselId) -> Result<(), EditError> {
    if !editor.host_mut().destroy_vessel(vessel) {
        return Err(EditError::UnknownVessel(vessel));
    }
    info!(?vessel, "vessel destroyed");
    Ok(())
}

/// Fill every resource on the vessel to capacity. Returns how many
/// resource containers were topped up.
pub fn refill_resources<H: Host>(
    editor: &mut Editor<'_, H>,
    vessel: VesselId,
) -> Result<usize, EditError> {
    let v = editor
        .host_mut()
        .vessel_mut(vessel)
        .ok_or(EditError::UnknownVessel(vessel))?;
    let mut count = 0;
    for (_, part) in v.parts.iter_mut() {
        for resource in part.resources.values_mut() {
            resource.amount = resource.max_amount;
            count += 1;
        }
    }
    info!(vessel = %v.name, count, "resources refilled");
    Ok(count)
}

/// Upper end of the altitude/semi-major axis sliders for orbits around
/// `body`: most of its SOI, capped for the root body and for SOIs that
/// are unusable.
pub fn soi_display_radius(body: &Body, config: &EditorConfig) -> f64 {
    let radius = body.soi * config.soi_display_factor;
    if body.is_root() || !radius.is_finite() || radius < 0.0 || radius > config.soi_display_cap {
        config.soi_display_cap
    } else {
        radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bodies::BodyId;

    fn body(soi: f64, parent: Option<BodyId>) -> Body {
        Body {
            name: "Test".into(),
            mu: 1.0,
            radius: 1.0,
            soi,
            orbit: None,
            parent,
            satellites: vec![],
            is_star: parent.is_none(),
            rotation_period: 0.0,
        }
    }

    #[test]
    fn soi_display_radius_clamps() {
        let config = EditorConfig::default();
        let mun = body(2_429_559.0, Some(BodyId(1)));
        assert!((soi_display_radius(&mun, &config) - 2_429_559.0 * 0.95).abs() < 1e-6);

        let sun = body(f64::INFINITY, None);
        assert_eq!(soi_display_radius(&sun, &config), 2e11);

        let broken = body(f64::NAN, Some(BodyId(1)));
        assert_eq!(soi_display_radius(&broken, &config), 2e11);

        let huge = body(1e12, Some(BodyId(1)));
        assert_eq!(soi_display_radius(&huge, &config), 2e11);
    }
}
