//! Canonical week identity.
//!
//! # Responsibility
//! - Map any calendar date to the Monday that starts its week.
//! - Provide the zero-padded `YYYY-MM-DD` string form used as storage key.
//!
//! # Invariants
//! - `WeekKey` always wraps a Monday.
//! - Ordering of `WeekKey` equals lexicographic ordering of its string form.
//! - Only calendar dates are used; no instant or timezone conversion happens.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};

const KEY_FORMAT: &str = "%Y-%m-%d";
const DATE_PREFIX_LEN: usize = 10;

/// Number of days stored per week.
pub const DAYS_PER_WEEK: usize = 7;

/// Monday-based identity of one planner week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WeekKey(NaiveDate);

impl WeekKey {
    /// Returns the week containing `date`.
    pub fn containing(date: NaiveDate) -> Self {
        Self(monday_on_or_before(date))
    }

    /// Parses a raw date string and canonicalizes it to its Monday.
    ///
    /// Returns `None` when the input has no leading `YYYY-MM-DD` date.
    pub fn parse(raw: &str) -> Option<Self> {
        parse_calendar_date(raw).map(Self::containing)
    }

    /// Monday of this week.
    pub fn monday(&self) -> NaiveDate {
        self.0
    }

    /// Date of weekday `index` (0 = Monday .. 6 = Sunday).
    pub fn day(&self, index: usize) -> NaiveDate {
        self.0 + Duration::days(index as i64)
    }

    /// Returns whether `raw` is spelled exactly as this key (`YYYY-MM-DD`, a Monday).
    pub fn is_spelled(&self, raw: &str) -> bool {
        self.to_string() == raw
    }
}

impl Display for WeekKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(KEY_FORMAT))
    }
}

impl Serialize for WeekKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for WeekKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid week key `{raw}`")))
    }
}

/// Returns the canonical Monday key for a raw date string.
///
/// Accepts `YYYY-MM-DD` and ISO-8601 timestamps with a leading date part.
pub fn canonical_week_key(raw: &str) -> Option<String> {
    WeekKey::parse(raw).map(|key| key.to_string())
}

/// Parses the leading calendar date of `raw`.
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    let prefix = trimmed.get(..DATE_PREFIX_LEN)?;
    if trimmed.len() > DATE_PREFIX_LEN && !trimmed[DATE_PREFIX_LEN..].starts_with(['T', ' ']) {
        return None;
    }
    NaiveDate::parse_from_str(prefix, KEY_FORMAT).ok()
}

/// Formats a calendar date as a zero-padded day key.
pub fn format_day_key(date: NaiveDate) -> String {
    date.format(KEY_FORMAT).to_string()
}

fn monday_on_or_before(date: NaiveDate) -> NaiveDate {
    // 0 = Sunday .. 6 = Saturday
    let day_of_week = date.weekday().num_days_from_sunday() as i64;
    let offset = if date.weekday() == Weekday::Sun {
        -6
    } else {
        -(day_of_week - 1)
    };
    date + Duration::days(offset)
}

#[cfg(test)]
mod tests {
    use super::{canonical_week_key, parse_calendar_date, WeekKey};
    use chrono::{Datelike, Duration, NaiveDate, Weekday};

    #[test]
    fn sunday_maps_to_previous_monday() {
        assert_eq!(canonical_week_key("2024-01-07").as_deref(), Some("2024-01-01"));
    }

    #[test]
    fn monday_is_fixed_point() {
        assert_eq!(canonical_week_key("2024-01-08").as_deref(), Some("2024-01-08"));
    }

    #[test]
    fn crosses_year_boundary() {
        assert_eq!(canonical_week_key("2021-01-02").as_deref(), Some("2020-12-28"));
    }

    #[test]
    fn accepts_iso_timestamps() {
        assert_eq!(
            canonical_week_key("2023-06-14T00:00:00.000Z").as_deref(),
            Some("2023-06-12")
        );
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(canonical_week_key(""), None);
        assert_eq!(canonical_week_key("not a date"), None);
        assert_eq!(canonical_week_key("2024-02-30"), None);
        assert_eq!(parse_calendar_date("2024-01-01xyz"), None);
    }

    #[test]
    fn every_day_of_a_year_maps_to_a_monday_within_six_days() {
        let mut date = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        while date < end {
            let key = WeekKey::containing(date);
            assert_eq!(key.monday().weekday(), Weekday::Mon);
            let distance = (date - key.monday()).num_days();
            assert!((0..7).contains(&distance), "{date} -> {key}");
            assert_eq!(WeekKey::containing(key.monday()), key);
            date += Duration::days(1);
        }
    }

    #[test]
    fn key_order_matches_string_order() {
        let a = WeekKey::parse("2023-12-25").unwrap();
        let b = WeekKey::parse("2024-01-01").unwrap();
        assert!(a < b);
        assert!(a.to_string() < b.to_string());
    }

    #[test]
    fn exact_spelling_check() {
        let key = WeekKey::parse("2024-01-03").unwrap();
        assert!(key.is_spelled("2024-01-01"));
        assert!(!key.is_spelled("2024-01-03"));
        assert!(!key.is_spelled("2024-01-01T00:00:00Z"));
    }
}
