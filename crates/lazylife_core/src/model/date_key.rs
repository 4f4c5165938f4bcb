//! Calendar date keys and month arithmetic.
//!
//! # Invariants
//! - A `DateKey` always serializes as `YYYY-MM-DD`.
//! - Month helpers never panic on out-of-range input; they return `None`.

use super::record::RecordError;
use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};

const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// One calendar day, used as a habit completions map key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DateKey(NaiveDate);

impl DateKey {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Parses a strict `YYYY-MM-DD` key.
    pub fn parse(value: &str) -> Result<Self, RecordError> {
        let trimmed = value.trim();
        // chrono accepts unpadded fields; keys must be canonical.
        if trimmed.len() != 10 {
            return Err(RecordError::InvalidDateKey(value.to_string()));
        }
        NaiveDate::parse_from_str(trimmed, DATE_KEY_FORMAT)
            .map(Self)
            .map_err(|_| RecordError::InvalidDateKey(value.to_string()))
    }

    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// Today's key on the local clock.
    pub fn today() -> Self {
        Self::at(Local::now())
    }

    /// The calendar day of `instant` in its own time zone.
    pub fn at<Tz: TimeZone>(instant: DateTime<Tz>) -> Self {
        Self(instant.date_naive())
    }

    pub fn date(self) -> NaiveDate {
        self.0
    }

    pub fn is_in_month(self, year: i32, month: u32) -> bool {
        self.0.year() == year && self.0.month() == month
    }
}

impl Display for DateKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(DATE_KEY_FORMAT))
    }
}

impl Serialize for DateKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DateKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(D::Error::custom)
    }
}

/// Returns every day of the given month in order.
pub fn month_days(year: i32, month: u32) -> Option<Vec<DateKey>> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    Some(
        first
            .iter_days()
            .take_while(|day| day.month() == month)
            .map(DateKey)
            .collect(),
    )
}

/// Converts a calendar day to epoch milliseconds at UTC midnight.
pub fn epoch_ms_at_midnight(date: NaiveDate) -> i64 {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::default()))
        .timestamp_millis()
}

/// Converts epoch milliseconds to the UTC calendar day.
pub fn date_from_epoch_ms(epoch_ms: i64) -> Option<NaiveDate> {
    Utc.timestamp_millis_opt(epoch_ms)
        .single()
        .map(|value| value.date_naive())
}

#[cfg(test)]
mod tests {
    use super::{date_from_epoch_ms, epoch_ms_at_midnight, month_days, DateKey};
    use chrono::{FixedOffset, TimeZone, Utc};

    #[test]
    fn day_follows_the_instant_offset_not_utc() {
        let evening = FixedOffset::west_opt(5 * 3600)
            .unwrap()
            .with_ymd_and_hms(2025, 6, 1, 23, 30, 0)
            .unwrap();
        assert_eq!(DateKey::at(evening).to_string(), "2025-06-01");
        assert_eq!(DateKey::at(evening.with_timezone(&Utc)).to_string(), "2025-06-02");
    }

    #[test]
    fn parse_accepts_canonical_keys_only() {
        assert_eq!(DateKey::parse("2025-06-01").unwrap().to_string(), "2025-06-01");
        assert!(DateKey::parse("2025-6-1").is_err());
        assert!(DateKey::parse("2025-02-30").is_err());
        assert!(DateKey::parse("not a date").is_err());
    }

    #[test]
    fn month_days_handles_leap_years() {
        assert_eq!(month_days(2024, 2).unwrap().len(), 29);
        assert_eq!(month_days(2025, 2).unwrap().len(), 28);
        assert!(month_days(2025, 13).is_none());
    }

    #[test]
    fn epoch_conversion_round_trips_the_day() {
        let key = DateKey::parse("2025-06-01").unwrap();
        let epoch = epoch_ms_at_midnight(key.date());
        assert_eq!(epoch, 1_748_736_000_000);
        assert_eq!(date_from_epoch_ms(epoch), Some(key.date()));
    }

    #[test]
    fn serializes_as_plain_string() {
        let key = DateKey::from_ymd(2025, 1, 9).unwrap();
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"2025-01-09\"");
    }
}
