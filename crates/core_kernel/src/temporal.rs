//! Time handling
//!
//! Settlement decisions compare calendar dates, not instants, so every
//! "today" in the system is derived from a [`Clock`] interpreted in the
//! association's [`Timezone`].

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

/// Timezone wrapper for the association's local calendar
///
/// Wraps chrono_tz::Tz with custom serialization support.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timezone(pub Tz);

impl Serialize for Timezone {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.0.name())
    }
}

impl<'de> Deserialize<'de> for Timezone {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Tz::from_str(&s)
            .map(Timezone)
            .map_err(|_| serde::de::Error::custom(format!("Invalid timezone: {}", s)))
    }
}

impl FromStr for Timezone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tz::from_str(s)
            .map(Timezone)
            .map_err(|_| format!("Invalid timezone: {}", s))
    }
}

impl Timezone {
    pub fn new(tz: Tz) -> Self {
        Self(tz)
    }

    /// Converts a UTC datetime to the local timezone
    pub fn to_local(&self, utc: DateTime<Utc>) -> DateTime<Tz> {
        utc.with_timezone(&self.0)
    }

    /// Returns the local calendar date of an instant, time-of-day stripped
    pub fn local_date(&self, utc: DateTime<Utc>) -> NaiveDate {
        self.to_local(utc).date_naive()
    }

    /// Gets the first instant of a local date as UTC
    ///
    /// Returns `None` only for dates whose midnight does not exist locally.
    pub fn start_of_day(&self, date: NaiveDate) -> Option<DateTime<Utc>> {
        let midnight = date.and_hms_opt(0, 0, 0)?;
        self.0
            .from_local_datetime(&midnight)
            .earliest()
            .map(|local| local.with_timezone(&Utc))
    }
}

impl Default for Timezone {
    fn default() -> Self {
        Self(chrono_tz::UTC)
    }
}

/// Source of the current instant
///
/// Services receive a clock instead of calling `Utc::now()` so settlement
/// boundaries can be tested deterministically.
pub trait Clock: Send + Sync {
    /// Current instant
    fn now(&self) -> DateTime<Utc>;

    /// Timezone used to derive calendar dates
    fn timezone(&self) -> Timezone {
        Timezone::default()
    }

    /// Today's date in the clock's timezone
    fn today(&self) -> NaiveDate {
        self.timezone().local_date(self.now())
    }
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock {
    timezone: Timezone,
}

impl SystemClock {
    pub fn new(timezone: Timezone) -> Self {
        Self { timezone }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn timezone(&self) -> Timezone {
        self.timezone
    }
}

/// Clock frozen at a given instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    instant: DateTime<Utc>,
    timezone: Timezone,
}

impl FixedClock {
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self {
            instant,
            timezone: Timezone::default(),
        }
    }

    pub fn with_timezone(mut self, timezone: Timezone) -> Self {
        self.timezone = timezone;
        self
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.instant
    }

    fn timezone(&self) -> Timezone {
        self.timezone
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_date_crosses_midnight() {
        let paris = Timezone::new(chrono_tz::Europe::Paris);
        let instant = Utc.with_ymd_and_hms(2024, 9, 14, 22, 30, 0).unwrap();

        assert_eq!(paris.local_date(instant), NaiveDate::from_ymd_opt(2024, 9, 15).unwrap());
        assert_eq!(Timezone::default().local_date(instant), NaiveDate::from_ymd_opt(2024, 9, 14).unwrap());
    }

    #[test]
    fn test_fixed_clock_today() {
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 1, 31, 23, 59, 59).unwrap());
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
    }

    #[test]
    fn test_timezone_round_trips_through_serde() {
        let tz = Timezone::new(chrono_tz::Europe::Paris);
        let json = serde_json::to_string(&tz).unwrap();
        assert_eq!(json, "\"Europe/Paris\"");
        let back: Timezone = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tz);
    }
}
