//! Universal time.

use std::{fmt, ops};

use serde::{Deserialize, Serialize};
use time::Duration;

/// Seconds since the start of the save game. Element epochs and the host
/// clock are both expressed in it.
///
/// Serialised as a plain number of seconds so scenario files stay
/// readable.
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
#[repr(transparent)]
pub struct UT(Duration);

impl UT {
    pub const ZERO: UT = UT(Duration::ZERO);

    pub fn new_seconds(sec: f64) -> UT {
        UT(Duration::seconds_f64(sec))
    }

    /// Kerbin calendar: six-hour days.
    pub fn new_dhms(days: u32, hours: u8, minutes: u8, seconds: u8) -> Self {
        Self(
            Duration::hours(days as i64 * 6 + hours as i64)
                + Duration::minutes(minutes as i64)
                + Duration::seconds(seconds as i64),
        )
    }

    pub fn as_seconds_f64(self) -> f64 {
        self.0.as_seconds_f64()
    }
}

impl From<f64> for UT {
    fn from(sec: f64) -> Self {
        UT::new_seconds(sec)
    }
}

impl From<UT> for f64 {
    fn from(ut: UT) -> Self {
        ut.as_seconds_f64()
    }
}

/// Time elapsed between two instants.
impl ops::Sub for UT {
    type Output = Duration;

    fn sub(self, earlier: UT) -> Duration {
        self.0 - earlier.0
    }
}

impl ops::Sub<Duration> for UT {
    type Output = UT;

    fn sub(self, dt: Duration) -> UT {
        UT(self.0 - dt)
    }
}

impl ops::Add<Duration> for UT {
    type Output = UT;

    fn add(self, dt: Duration) -> UT {
        UT(self.0 + dt)
    }
}

impl fmt::Display for UT {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UT({}s)", self.as_seconds_f64())
    }
}

impl fmt::Debug for UT {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
