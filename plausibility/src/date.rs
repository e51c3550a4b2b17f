//! Event dates at day, month or year granularity.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::PlausibilityError;

/// How precisely an [`EventDate`] was recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Granularity {
    Year,
    Month,
    Day,
}

/// The calendar date of a sighting.
///
/// Coarse dates are anchored to the first day of their period, so
/// `"2020-03"` compares as 2020-03-01 and `"2020"` as 2020-01-01.
/// Serializes back to the same precision it was parsed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EventDate {
    date: NaiveDate,
    granularity: Granularity,
}

impl EventDate {
    /// Creates a day-precision EventDate.
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            granularity: Granularity::Day,
        }
    }

    /// Parses an event date.
    ///
    /// Accepted forms:
    /// - `YYYY-MM-DD`, optionally followed by `T` or a space and a time of
    ///   day (with or without offset), which is dropped
    /// - `YYYY-MM`
    /// - `YYYY`
    /// - an interval `start/end` of the above, which resolves to `start`
    pub fn parse(s: &str) -> Result<Self, PlausibilityError> {
        let invalid = || PlausibilityError::InvalidDate(s.to_string());

        let s = s.trim();
        let s = s.split('/').next().unwrap_or(s);
        let day_part = s.split(['T', ' ']).next().unwrap_or(s);
        if day_part.is_empty() {
            return Err(invalid());
        }

        let fields: Vec<&str> = day_part.split('-').collect();
        if fields.iter().any(|f| f.is_empty() || !f.bytes().all(|b| b.is_ascii_digit())) {
            return Err(invalid());
        }
        if fields[0].len() != 4 {
            return Err(invalid());
        }

        let num = |f: &str| f.parse::<u32>().map_err(|_| invalid());
        let year = fields[0].parse::<i32>().map_err(|_| invalid())?;

        let (date, granularity) = match fields.len() {
            1 => (NaiveDate::from_ymd_opt(year, 1, 1), Granularity::Year),
            2 => (
                NaiveDate::from_ymd_opt(year, num(fields[1])?, 1),
                Granularity::Month,
            ),
            3 => (
                NaiveDate::from_ymd_opt(year, num(fields[1])?, num(fields[2])?),
                Granularity::Day,
            ),
            _ => (None, Granularity::Day),
        };

        let date = date.ok_or_else(invalid)?;
        Ok(Self { date, granularity })
    }

    /// Returns the anchored calendar date.
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Returns the precision the date was recorded at.
    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    /// Absolute number of whole days between two dates.
    pub fn days_between(&self, other: &Self) -> u64 {
        self.date
            .signed_duration_since(other.date)
            .num_days()
            .unsigned_abs()
    }
}

impl From<NaiveDate> for EventDate {
    fn from(date: NaiveDate) -> Self {
        Self::new(date)
    }
}

impl FromStr for EventDate {
    type Err = PlausibilityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for EventDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.granularity {
            Granularity::Year => write!(f, "{:04}", self.date.year()),
            Granularity::Month => write!(f, "{:04}-{:02}", self.date.year(), self.date.month()),
            Granularity::Day => write!(f, "{}", self.date.format("%Y-%m-%d")),
        }
    }
}

impl Serialize for EventDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EventDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
