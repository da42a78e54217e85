//! Plain-text summary of a [`World`] after the script ran.

use std::fmt;

use hyperedit::{coords, coords::Coordinates, si, world::World};
use itertools::Itertools;

/// Displays every body, vessel and pending message in a [`World`].
pub struct Report<'a>(pub &'a World);

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let world = self.0;
        writeln!(f, "time: {}", world.ut)?;
        writeln!(f, "frame origin: {:?}", world.frame_origin.as_slice())?;

        writeln!(f, "bodies:")?;
        for (_, body) in world.bodies.iter() {
            let satellites = body
                .satellites
                .iter()
                .filter_map(|&id| world.bodies.get(id))
                .map(|b| b.name.as_str())
                .join(", ");
            match body.parent.and_then(|id| world.bodies.get(id)) {
                Some(parent) => {
                    let sma = body
                        .orbit
                        .and_then(|id| world.orbits.get(id))
                        .map_or(f64::NAN, |o| o.elements().semi_major_axis);
                    writeln!(
                        f,
                        "  {} around {}: a={}m soi={}m satellites=[{satellites}]",
                        body.name,
                        parent.name,
                        si::format(sma),
                        si::format(body.soi),
                    )?;
                }
                None => writeln!(f, "  {} (root): satellites=[{satellites}]", body.name)?,
            }
        }

        writeln!(f, "vessels:")?;
        for (id, vessel) in world.vessels.iter() {
            let Some(orbit) = world.orbits.get(vessel.orbit) else {
                continue;
            };
            let Some(body) = world.bodies.get(orbit.reference_body()) else {
                continue;
            };
            let mut flags = vec![if vessel.packed { "packed" } else { "unpacked" }];
            if vessel.landed {
                flags.push("landed");
            }
            if vessel.splashed {
                flags.push("splashed");
            }
            if world.active_vessel == Some(id) {
                flags.push("active");
            }
            let inertial = Coordinates::from_position(orbit.pos());
            let ground_track = Coordinates::new(
                inertial.latitude,
                coords::clamp_degrees_180(
                    inertial.longitude - body.rotation_angle(world.ut).to_degrees(),
                ),
            );
            writeln!(
                f,
                "  {} around {}: a={}m e={:.4} alt={}m {} [{}]",
                vessel.name,
                body.name,
                si::format(orbit.elements().semi_major_axis),
                orbit.elements().eccentricity,
                si::format(orbit.pos().norm() - body.radius),
                ground_track.to_string_dms(false),
                flags.join(" "),
            )?;
        }

        if !world.messages.is_empty() {
            writeln!(f, "messages:")?;
            for message in &world.messages {
                writeln!(f, "  [{}s] {}", message.duration, message.text)?;
            }
        }
        Ok(())
    }
}
