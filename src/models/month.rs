//! Calendar month value type
//!
//! The time axis for every ledger calculation. A `Month` has first-of-month
//! semantics: two months are equal iff they share year and calendar month.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A calendar month (e.g., "2025-01")
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month {
    year: i32,
    month: u32,
}

impl Month {
    /// Create a month. Month numbers outside 1..=12 roll into the
    /// neighbouring years, so `Month::new(2024, 13)` is January 2025.
    pub fn new(year: i32, month: i32) -> Self {
        Self::from_index(i64::from(year) * 12 + i64::from(month) - 1)
    }

    /// Truncate a date to its month
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The month containing today's local date
    pub fn current() -> Self {
        Self::of(chrono::Local::now().date_naive())
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// Calendar month number, 1..=12
    pub fn month(&self) -> u32 {
        self.month
    }

    fn index(&self) -> i64 {
        i64::from(self.year) * 12 + i64::from(self.month) - 1
    }

    fn from_index(index: i64) -> Self {
        Self {
            year: index.div_euclid(12) as i32,
            month: index.rem_euclid(12) as u32 + 1,
        }
    }

    /// Shift by `n` months; negative values go back in time
    pub fn add_months(&self, n: i32) -> Self {
        Self::from_index(self.index() + i64::from(n))
    }

    pub fn next(&self) -> Self {
        self.add_months(1)
    }

    pub fn prev(&self) -> Self {
        self.add_months(-1)
    }

    pub fn before(&self, other: Month) -> bool {
        *self < other
    }

    pub fn after(&self, other: Month) -> bool {
        *self > other
    }

    /// Number of months from `self` to `other` (negative if `other` is earlier)
    pub fn months_until(&self, other: Month) -> i64 {
        other.index() - self.index()
    }

    /// First day of the month
    pub fn start_date(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// Last day of the month (inclusive)
    pub fn end_date(&self) -> NaiveDate {
        self.next().start_date() - Duration::days(1)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        Self::of(date) == *self
    }

    /// Every calendar month from `self` through `end`, inclusive.
    /// Empty when `end` is earlier than `self`.
    pub fn iter_through(&self, end: Month) -> MonthRange {
        MonthRange {
            next: *self,
            end,
        }
    }

    /// Parse a "YYYY-MM" string. The year must lie in the range chrono can
    /// represent as a date.
    pub fn parse(s: &str) -> Result<Self, MonthParseError> {
        let s = s.trim();
        let (year, month) = s
            .split_once('-')
            .ok_or_else(|| MonthParseError::InvalidFormat(s.to_string()))?;

        let year: i32 = year
            .parse()
            .map_err(|_| MonthParseError::InvalidFormat(s.to_string()))?;
        let month: u32 = month
            .parse()
            .map_err(|_| MonthParseError::InvalidFormat(s.to_string()))?;

        if !(1..=12).contains(&month) {
            return Err(MonthParseError::InvalidMonth(month));
        }
        if !(NaiveDate::MIN.year()..=NaiveDate::MAX.year()).contains(&year) {
            return Err(MonthParseError::YearOutOfRange(year));
        }

        Ok(Self { year, month })
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Month {
    type Err = MonthParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<NaiveDate> for Month {
    fn from(date: NaiveDate) -> Self {
        Self::of(date)
    }
}

impl Serialize for Month {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Month {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Month::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Inclusive iterator over consecutive calendar months
#[derive(Debug, Clone)]
pub struct MonthRange {
    next: Month,
    end: Month,
}

impl Iterator for MonthRange {
    type Item = Month;

    fn next(&mut self) -> Option<Month> {
        if self.next > self.end {
            return None;
        }
        let current = self.next;
        self.next = current.next();
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.next.months_until(self.end) + 1;
        let remaining = usize::try_from(remaining).unwrap_or(0);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for MonthRange {}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MonthParseError {
    #[error("Invalid month format (expected YYYY-MM): {0}")]
    InvalidFormat(String),
    #[error("Invalid month number: {0}")]
    InvalidMonth(u32),
    #[error("Year out of range: {0}")]
    YearOutOfRange(i32),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_bounds() {
        let feb = Month::new(2024, 2);
        assert_eq!(feb.start_date(), date(2024, 2, 1));
        assert_eq!(feb.end_date(), date(2024, 2, 29));
    }

    #[test]
    fn test_new_normalizes() {
        assert_eq!(Month::new(2024, 13), Month::new(2025, 1));
        assert_eq!(Month::new(2024, 0), Month::new(2023, 12));
        assert_eq!(Month::new(2024, -11), Month::new(2023, 1));
    }

    #[test]
    fn test_add_months() {
        let dec = Month::new(2024, 12);
        assert_eq!(dec.next(), Month::new(2025, 1));
        assert_eq!(dec.add_months(14), Month::new(2026, 2));
        assert_eq!(Month::new(2025, 1).prev(), dec);
        assert_eq!(Month::new(2025, 3).add_months(-27), Month::new(2022, 12));
    }

    #[test]
    fn test_ordering() {
        let jan = Month::new(2025, 1);
        let dec = Month::new(2024, 12);
        assert!(dec.before(jan));
        assert!(jan.after(dec));
        assert!(!jan.before(jan));
        assert_eq!(dec.months_until(jan), 1);
    }

    #[test]
    fn test_contains_and_of() {
        let jan = Month::new(2025, 1);
        assert!(jan.contains(date(2025, 1, 31)));
        assert!(!jan.contains(date(2025, 2, 1)));
        assert_eq!(Month::of(date(2025, 1, 17)), jan);
    }

    #[test]
    fn test_iter_through() {
        let months: Vec<_> = Month::new(2024, 11).iter_through(Month::new(2025, 2)).collect();
        assert_eq!(
            months,
            vec![
                Month::new(2024, 11),
                Month::new(2024, 12),
                Month::new(2025, 1),
                Month::new(2025, 2),
            ]
        );
        assert_eq!(Month::new(2025, 2).iter_through(Month::new(2025, 1)).count(), 0);
        assert_eq!(Month::new(2025, 1).iter_through(Month::new(2025, 1)).len(), 1);
    }

    #[test]
    fn test_parse_and_display() {
        let month = Month::parse("2025-03").unwrap();
        assert_eq!(month, Month::new(2025, 3));
        assert_eq!(month.to_string(), "2025-03");
        assert_eq!(Month::parse("2025-13"), Err(MonthParseError::InvalidMonth(13)));
        assert!(Month::parse("March").is_err());
    }

    #[test]
    fn test_parse_rejects_years_without_dates() {
        assert_eq!(Month::parse("300000-01"), Err(MonthParseError::YearOutOfRange(300000)));
        assert!(serde_json::from_str::<Month>("\"300000-01\"").is_err());

        let last = Month::parse(&format!("{}-12", NaiveDate::MAX.year())).unwrap();
        assert_eq!(last.start_date().year(), NaiveDate::MAX.year());
    }

    #[test]
    fn test_serialization() {
        let month = Month::new(2025, 1);
        let json = serde_json::to_string(&month).unwrap();
        assert_eq!(json, "\"2025-01\"");
        let deserialized: Month = serde_json::from_str(&json).unwrap();
        assert_eq!(month, deserialized);
    }
}
