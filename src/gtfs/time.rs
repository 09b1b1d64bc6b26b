use std::fmt;

use serde::de::{self, Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};

use crate::gtfs::error::Error;

const SECONDS_PER_DAY: u32 = 86_400;

/// A GTFS time of day, stored as seconds since midnight.
///
/// The hour component is not clamped: `25:10:00` is a valid value denoting
/// post-midnight service on the following calendar day. Ordering compares the
/// raw value so stop times keep their position within a trip;
/// [`ServiceTime::normalized_seconds`] wraps the value back onto the 24 hour
/// clock and is what arrival queries compare against "now".
///
/// Displaying (and serializing) a `ServiceTime` yields the raw, un-wrapped
/// `HH:MM:SS` form as it appeared in the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ServiceTime(u32);

impl ServiceTime {
    pub fn from_hms(hours: u32, minutes: u32, seconds: u32) -> ServiceTime {
        ServiceTime(hours * 3600 + minutes * 60 + seconds)
    }

    /// Parses a colon-delimited `HH:MM:SS` value, hour unclamped.
    pub fn parse(s: &str) -> Result<ServiceTime, Error> {
        let len = s.len();
        if !s.is_ascii() || !(7..=8).contains(&len) {
            return Err(Error::InvalidTime(s.to_owned()));
        }
        if &s[len - 6..len - 5] != ":" || &s[len - 3..len - 2] != ":" {
            return Err(Error::InvalidTime(s.to_owned()));
        }
        let hours = &s[..len - 6];
        let minutes = &s[len - 5..len - 3];
        let seconds = &s[len - 2..];
        parse_hms(hours, minutes, seconds).map_err(|_| Error::InvalidTime(s.to_owned()))
    }

    /// Raw seconds since midnight, possibly ≥ 86 400.
    pub fn seconds(&self) -> u32 {
        self.0
    }

    /// Seconds since midnight wrapped onto the 24 hour clock, for comparison
    /// against a wall-clock time of day.
    pub fn normalized_seconds(&self) -> u32 {
        self.0 % SECONDS_PER_DAY
    }
}

fn parse_hms(h: &str, m: &str, s: &str) -> Result<ServiceTime, std::num::ParseIntError> {
    let hours: u32 = h.parse()?;
    let minutes: u32 = m.parse()?;
    let seconds: u32 = s.parse()?;
    Ok(ServiceTime::from_hms(hours, minutes, seconds))
}

impl fmt::Display for ServiceTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.0 / 3600,
            self.0 % 3600 / 60,
            self.0 % 60
        )
    }
}

impl<'de> Deserialize<'de> for ServiceTime {
    fn deserialize<D>(deserializer: D) -> Result<ServiceTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s: &str = Deserialize::deserialize(deserializer)?;
        ServiceTime::parse(s).map_err(de::Error::custom)
    }
}

impl Serialize for ServiceTime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
