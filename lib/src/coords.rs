//! Latitude/longitude formatting.
//!
//! Degree/minute/second strings look like `45° 30' 00"`. They carry no
//! sign; hemispheres are written as N/S and E/W letters next to them.

use std::collections::BTreeMap;

use itertools::Itertools;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// `|angle|` as whole degrees, minutes and seconds. Each step truncates.
pub fn angle_to_dms(angle: f64) -> String {
    let abs = angle.abs();
    let degrees = abs.floor();
    let minutes = (60.0 * (abs - degrees)).floor();
    let seconds = (3600.0 * (abs - degrees - minutes / 60.0)).max(0.0).floor();
    format!("{degrees:.0}° {minutes:02.0}' {seconds:02.0}\"")
}

/// Parse `x° x' x"` back into (unsigned) decimal degrees. Signs on the
/// fields are dropped and anything after the seconds marker is ignored.
pub fn angle_from_dms(dms: &str) -> Result<f64, ParseError> {
    if !(dms.contains('°') && dms.contains('\'') && dms.contains('"')) {
        return Err(ParseError::MissingDelimiter(dms.to_owned()));
    }
    let mut fields = dms.split(['°', '\'', '"']);
    let mut next = |field: &'static str| -> Result<i64, ParseError> {
        fields
            .next()
            .and_then(|s| s.trim().parse::<i64>().ok())
            .ok_or_else(|| ParseError::InvalidField {
                field,
                input: dms.to_owned(),
            })
    };
    let degrees = next("degrees")?.unsigned_abs();
    let minutes = next("minutes")?.unsigned_abs();
    let seconds = next("seconds")?.unsigned_abs();
    Ok(degrees as f64 + minutes as f64 / 60.0 + seconds as f64 / 3600.0)
}

/// Reduce into `[0, 360)`.
pub fn clamp_degrees_360(angle: f64) -> f64 {
    let angle = angle % 360.0;
    if angle < 0.0 {
        angle + 360.0
    } else {
        angle
    }
}

/// Reduce into `(-180, 180]`. Angles already in range come back
/// bit-for-bit unchanged.
pub fn clamp_degrees_180(angle: f64) -> f64 {
    if angle > -180.0 && angle <= 180.0 {
        return angle;
    }
    let angle = clamp_degrees_360(angle);
    if angle > 180.0 {
        angle - 360.0
    } else {
        angle
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Latitude and longitude of `pos` in its body's frame. The origin
    /// maps to 0, 0.
    pub fn from_position(pos: Vector3<f64>) -> Self {
        let r = pos.norm();
        if r <= 0.0 {
            return Self::default();
        }
        Self::new(
            libm::asin(pos.z / r).to_degrees(),
            libm::atan2(pos.y, pos.x).to_degrees(),
        )
    }

    /// Point `radius` metres from the centre, in the body's frame.
    pub fn to_position(&self, radius: f64) -> Vector3<f64> {
        let (lat, lon) = (self.latitude.to_radians(), self.longitude.to_radians());
        radius
            * Vector3::new(
                libm::cos(lat) * libm::cos(lon),
                libm::cos(lat) * libm::sin(lon),
                libm::sin(lat),
            )
    }

    pub fn dms_latitude(&self) -> String {
        angle_to_dms(self.latitude)
    }

    pub fn dms_longitude(&self) -> String {
        angle_to_dms(self.longitude)
    }

    /// The parsed value is unsigned, so this always lands in the northern
    /// hemisphere.
    pub fn set_dms_latitude(&mut self, dms: &str) -> Result<(), ParseError> {
        self.latitude = angle_from_dms(dms)?;
        Ok(())
    }

    /// The parsed value is unsigned, so this always lands east of the
    /// prime meridian.
    pub fn set_dms_longitude(&mut self, dms: &str) -> Result<(), ParseError> {
        self.longitude = angle_from_dms(dms)?;
        Ok(())
    }

    /// e.g. `45.500° N, 122.419° W`.
    pub fn to_string_decimal(&self, newline: bool, precision: usize) -> String {
        let longitude = clamp_degrees_180(self.longitude);
        format!(
            "{:.precision$}° {}{}{:.precision$}° {}",
            self.latitude.abs(),
            north_south(self.latitude),
            separator(newline),
            longitude.abs(),
            east_west(longitude),
        )
    }

    /// e.g. `45° 30' 00" N, 122° 25' 09" W`.
    pub fn to_string_dms(&self, newline: bool) -> String {
        let longitude = clamp_degrees_180(self.longitude);
        format!(
            "{} {}{}{} {}",
            angle_to_dms(self.latitude),
            north_south(self.latitude),
            separator(newline),
            angle_to_dms(longitude),
            east_west(longitude),
        )
    }
}

fn north_south(latitude: f64) -> char {
    if latitude > 0.0 {
        'N'
    } else {
        'S'
    }
}

fn east_west(longitude: f64) -> char {
    if longitude > 0.0 {
        'E'
    } else {
        'W'
    }
}

fn separator(newline: bool) -> &'static str {
    if newline {
        "\n"
    } else {
        ", "
    }
}

/// Named landing spots. Storage is up to the host; this is only the map.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CoordinatePresets {
    presets: BTreeMap<String, Coordinates>,
}

impl CoordinatePresets {
    /// Returns the coordinates previously saved under `name`, if any.
    pub fn save(&mut self, name: &str, coordinates: Coordinates) -> Option<Coordinates> {
        self.presets.insert(name.to_owned(), coordinates)
    }

    pub fn load(&self, name: &str) -> Option<Coordinates> {
        self.presets.get(name).copied()
    }

    pub fn delete(&mut self, name: &str) -> Option<Coordinates> {
        self.presets.remove(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.presets.keys().map(String::as_str)
    }

    /// One `name: coordinates` line per preset, in name order.
    pub fn render(&self) -> String {
        self.presets
            .iter()
            .map(|(name, c)| format!("{name}: {}", c.to_string_dms(false)))
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dms_formatting() {
        assert_eq!(angle_to_dms(45.5), "45° 30' 00\"");
        assert_eq!(angle_to_dms(-122.4194), "122° 25' 09\"");
        assert_eq!(angle_to_dms(0.0), "0° 00' 00\"");
        // 60 * fraction rounds up to a whole minute here.
        assert_eq!(angle_to_dms(83.0 / 60.0), "1° 23' 00\"");
        assert_eq!(angle_to_dms(-106.0 / 60.0), "1° 46' 00\"");
    }

    #[test]
    fn dms_round_trip_within_one_arcsecond() {
        for angle in [0.0, 45.5, -122.4194, 12.345_678, 89.999, -0.0001, 179.5] {
            let back = angle_from_dms(&angle_to_dms(angle)).unwrap();
            let err = (back - f64::abs(angle)).abs();
            assert!(err < 1.0 / 3600.0, "{angle}: {back}");
        }
        assert_eq!(angle_from_dms("45° 30' 00\"").unwrap(), 45.5);
    }

    #[test]
    fn dms_parse_failures() {
        assert!(matches!(
            angle_from_dms("45° 30'"),
            Err(ParseError::MissingDelimiter(_))
        ));
        assert!(matches!(
            angle_from_dms("45 30' 00\""),
            Err(ParseError::MissingDelimiter(_))
        ));
        assert!(matches!(
            angle_from_dms("4x° 30' 00\""),
            Err(ParseError::InvalidField { field: "degrees", .. })
        ));
        assert!(matches!(
            angle_from_dms("45° 30' 1.5\""),
            Err(ParseError::InvalidField { field: "seconds", .. })
        ));
    }

    #[test]
    fn dms_parse_ignores_sign_and_suffix() {
        assert_eq!(angle_from_dms("-45° 00' 00\" S").unwrap(), 45.0);
        assert_eq!(angle_from_dms("-45° 30' 00\"").unwrap(), 45.5);
        assert!((angle_from_dms("-10° -30' -36\"").unwrap() - 10.51).abs() < 1e-12);
    }

    #[test]
    fn longitude_clamping() {
        assert_eq!(clamp_degrees_180(190.0), -170.0);
        assert_eq!(clamp_degrees_180(-190.0), 170.0);
        assert_eq!(clamp_degrees_180(180.0), 180.0);
        assert_eq!(clamp_degrees_180(-180.0), 180.0);
        assert_eq!(clamp_degrees_180(540.0), 180.0);
        assert_eq!(clamp_degrees_180(720.5), 0.5);

        let mut x = -1000.0;
        while x < 1000.0 {
            let once = clamp_degrees_180(x);
            assert!(once > -180.0 && once <= 180.0, "{x} -> {once}");
            assert_eq!(clamp_degrees_180(once), once, "{x}");
            x += 7.3;
        }
    }

    #[test]
    fn coordinate_strings() {
        let c = Coordinates::new(45.5, -122.4194);
        assert_eq!(c.to_string_decimal(false, 3), "45.500° N, 122.419° W");
        assert_eq!(c.to_string_dms(false), "45° 30' 00\" N, 122° 25' 09\" W");
        assert_eq!(
            Coordinates::new(-10.0, 200.0).to_string_dms(true),
            "10° 00' 00\" S\n160° 00' 00\" W"
        );
    }

    #[test]
    fn dms_setters() {
        let mut c = Coordinates::default();
        c.set_dms_latitude("10° 30' 00\"").unwrap();
        assert_eq!(c.latitude, 10.5);
        assert!(c.set_dms_longitude("bad").is_err());
        assert_eq!(c.longitude, 0.0);
        assert_eq!(c.dms_latitude(), "10° 30' 00\"");
        c.longitude = -74.5577;
        assert_eq!(c.dms_longitude(), "74° 33' 27\"");
    }

    #[test]
    fn position_round_trip() {
        let c = Coordinates::new(-0.0972, -74.5577);
        let pos = c.to_position(600_000.0);
        assert!((pos.norm() - 600_000.0).abs() < 1e-6);
        let back = Coordinates::from_position(pos);
        assert!((back.latitude - c.latitude).abs() < 1e-9);
        assert!((back.longitude - c.longitude).abs() < 1e-9);

        let pole = Coordinates::from_position(Vector3::new(0.0, 0.0, -3.0));
        assert!((pole.latitude + 90.0).abs() < 1e-9);
        assert_eq!(Coordinates::from_position(Vector3::zeros()), Coordinates::default());
    }

    #[test]
    fn presets() {
        let mut presets = CoordinatePresets::default();
        assert!(presets.save("KSC", Coordinates::new(-0.0972, -74.5577)).is_none());
        presets.save("Island", Coordinates::new(-1.5, -71.9));
        assert_eq!(presets.names().collect::<Vec<_>>(), vec!["Island", "KSC"]);
        assert_eq!(presets.load("KSC"), Some(Coordinates::new(-0.0972, -74.5577)));
        assert_eq!(
            presets.render(),
            "Island: 1° 30' 00\" S, 71° 54' 00\" W\nKSC: 0° 05' 49\" S, 74° 33' 27\" W"
        );
        assert!(presets.delete("KSC").is_some());
        assert!(presets.load("KSC").is_none());
    }
}
