use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use geom::Angle;

/// Appended to a secondary radial's label when a primary radial already uses it.
pub const SECONDARY_SUFFIX: &str = "_sec";

/// A time on the diagram's clock face, naming the direction of a radial. 12:00 points up and time
/// increases clockwise.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime {
    hour: u8,
    minute: u8,
}

impl ClockTime {
    pub fn new(hour: u8, minute: u8) -> Result<ClockTime> {
        if hour > 23 || minute > 59 {
            bail!("{}:{:02} isn't a clock time", hour, minute);
        }
        Ok(ClockTime { hour, minute })
    }

    pub fn hour(self) -> u8 {
        self.hour
    }

    pub fn minute(self) -> u8 {
        self.minute
    }

    /// Degrees clockwise from 12:00, in [0, 360). The hour hand moves half a degree per minute.
    pub fn clock_degrees(self) -> f64 {
        (self.hour as f64 * 30.0 + self.minute as f64 * 0.5).rem_euclid(360.0)
    }

    /// The direction of this time's radial in diagram space, where 0 degrees points along +x and
    /// Y points down. 3:00 is 0 degrees and 6:00 is 90.
    pub fn design_angle(self) -> Angle {
        Angle::degrees((self.clock_degrees() - 90.0).rem_euclid(360.0))
    }

    /// Every time from `start` through `end` inclusive, stepping by some minutes.
    pub fn range(start: ClockTime, end: ClockTime, step_minutes: u16) -> Vec<ClockTime> {
        assert!(step_minutes > 0);
        let to_minutes = |t: ClockTime| t.hour as u16 * 60 + t.minute as u16;
        let mut results = Vec::new();
        let mut now = to_minutes(start);
        while now <= to_minutes(end) {
            results.push(ClockTime {
                hour: (now / 60) as u8,
                minute: (now % 60) as u8,
            });
            now += step_minutes;
        }
        results
    }

    /// Extracts the time a radial's label refers to. Compound labels like "3:30-9:30" name the
    /// first time; secondary radials carry a suffix that's ignored.
    pub fn from_label(label: &str) -> Result<ClockTime> {
        let base = label.strip_suffix(SECONDARY_SUFFIX).unwrap_or(label);
        let first = base.split('-').next().unwrap_or(base);
        first
            .parse()
            .with_context(|| format!("radial label {} doesn't name a time", label))
    }

    /// Every time a radial's label names, in order. A compound label like "3:30-9:30" names
    /// both ends of a diameter. Parts that aren't times are skipped.
    pub fn all_from_label(label: &str) -> Vec<ClockTime> {
        let base = label.strip_suffix(SECONDARY_SUFFIX).unwrap_or(label);
        base.split('-').filter_map(|part| part.parse().ok()).collect()
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for ClockTime {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<ClockTime> {
        let parts = raw.trim().split(':').collect::<Vec<_>>();
        if parts.len() != 2 {
            bail!("Bad clock time {}", raw);
        }
        let hour = parts[0]
            .parse::<u8>()
            .with_context(|| format!("Bad hour in {}", raw))?;
        let minute = parts[1]
            .parse::<u8>()
            .with_context(|| format!("Bad minute in {}", raw))?;
        ClockTime::new(hour, minute)
    }
}

impl TryFrom<String> for ClockTime {
    type Error = anyhow::Error;

    fn try_from(raw: String) -> Result<ClockTime> {
        raw.parse()
    }
}

impl From<ClockTime> for String {
    fn from(time: ClockTime) -> String {
        time.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(raw: &str) -> ClockTime {
        raw.parse().unwrap()
    }

    #[test]
    fn angles() {
        assert_eq!(t("12:00").clock_degrees(), 0.0);
        assert_eq!(t("3:30").clock_degrees(), 105.0);
        assert!(t("3:00").design_angle().approx_eq(Angle::ZERO, 1e-9));
        assert!(t("6:00").design_angle().approx_eq(Angle::degrees(90.0), 1e-9));
        assert!(t("9:00").design_angle().approx_eq(Angle::degrees(180.0), 1e-9));
        assert!(t("12:00").design_angle().approx_eq(Angle::degrees(270.0), 1e-9));
        assert!(t("2:00").design_angle().approx_eq(Angle::degrees(330.0), 1e-9));
    }

    #[test]
    fn parsing() {
        assert_eq!(t(" 2:15 ").to_string(), "2:15");
        assert_eq!(t("10:05").to_string(), "10:05");
        assert!("2".parse::<ClockTime>().is_err());
        assert!("2:60".parse::<ClockTime>().is_err());
        assert!("two:00".parse::<ClockTime>().is_err());

        assert_eq!(ClockTime::from_label("3:30-9:30").unwrap(), t("3:30"));
        assert_eq!(ClockTime::from_label("4:45_sec").unwrap(), t("4:45"));
        assert!(ClockTime::from_label("Center Camp").is_err());

        assert_eq!(
            ClockTime::all_from_label("3:30-9:30_sec"),
            vec![t("3:30"), t("9:30")]
        );
        assert_eq!(ClockTime::all_from_label("4:00"), vec![t("4:00")]);
        assert!(ClockTime::all_from_label("Center Camp").is_empty());
    }

    #[test]
    fn ranges() {
        let half_hours = ClockTime::range(t("2:00"), t("10:00"), 30);
        assert_eq!(half_hours.len(), 17);
        assert_eq!(half_hours[1], t("2:30"));
        let quarters = ClockTime::range(t("2:00"), t("10:00"), 15);
        assert_eq!(quarters.len(), 33);
        assert_eq!(*quarters.last().unwrap(), t("10:00"));
    }

    #[test]
    fn serializes_as_a_string() {
        let json = serde_json::to_string(&t("7:45")).unwrap();
        assert_eq!(json, "\"7:45\"");
        let back: ClockTime = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t("7:45"));
        assert!(serde_json::from_str::<ClockTime>("\"7:99\"").is_err());
    }
}
