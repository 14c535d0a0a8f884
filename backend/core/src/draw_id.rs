//! Draw identifiers for the official results API.
//!
//! The results service keys each draw by `YYYYWWD`: calendar year, two-digit
//! ISO week and ISO weekday (1 = Monday .. 7 = Sunday). Any deviation from
//! this format is a lookup miss on their side.
//!
//! Mixing the calendar year with the ISO week means a few days around New
//! Year share a key with a day at the other end of the same year, e.g.
//! 2023-01-01 and 2023-12-31 are both `2023527`.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, Weekday};

use crate::error::DateError;

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// A (calendar year, ISO week, ISO weekday) triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawId {
    pub year: i32,
    pub week: u32,
    pub weekday: u32,
}

impl DrawId {
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            week: date.iso_week().week(),
            weekday: date.weekday().number_from_monday(),
        }
    }

    /// A calendar date carrying this identifier, if any does.
    ///
    /// The week may belong to the neighbouring ISO year around New Year. When
    /// two dates share the key, the one inside the same ISO year wins.
    pub fn to_date(&self) -> Option<NaiveDate> {
        let weekday = *WEEKDAYS.get(self.weekday.checked_sub(1)? as usize)?;
        [self.year, self.year - 1, self.year + 1]
            .into_iter()
            .filter_map(|iso_year| NaiveDate::from_isoywd_opt(iso_year, self.week, weekday))
            .find(|date| date.year() == self.year)
    }
}

impl fmt::Display for DrawId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}{:02}{}", self.year, self.week, self.weekday)
    }
}

impl FromStr for DrawId {
    type Err = DateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || DateError::BadDrawId(s.to_string());
        if s.len() != 7 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(bad());
        }
        let id = DrawId {
            year: s[0..4].parse().map_err(|_| bad())?,
            week: s[4..6].parse().map_err(|_| bad())?,
            weekday: s[6..7].parse().map_err(|_| bad())?,
        };
        id.to_date().ok_or_else(bad)?;
        Ok(id)
    }
}

/// Derive the results-API key for a draw date.
pub fn derive_draw_id(date: NaiveDate) -> String {
    DrawId::from_date(date).to_string()
}

pub fn parse_draw_id(id: &str) -> Result<DrawId, DateError> {
    id.parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn thursday_in_week_five() {
        assert_eq!(derive_draw_id(date(2024, 2, 1)), "2024054");
    }

    #[test]
    fn sunday_is_seven() {
        assert_eq!(derive_draw_id(date(2024, 2, 4)), "2024057");
    }

    #[test]
    fn single_digit_week_is_padded() {
        // 2024-01-03 is the Wednesday of ISO week 1.
        assert_eq!(derive_draw_id(date(2024, 1, 3)), "2024013");
    }

    #[test]
    fn year_boundary_keeps_calendar_year() {
        // Monday 2024-12-30 is in ISO week 1 of 2025.
        assert_eq!(derive_draw_id(date(2024, 12, 30)), "2024011");
        // Sunday 2021-01-03 is in ISO week 53 of 2020.
        assert_eq!(derive_draw_id(date(2021, 1, 3)), "2021537");
    }

    #[test]
    fn boundary_ids_parse() {
        // Monday 2024-01-01 carries the same key as 2024-12-30.
        assert_eq!(derive_draw_id(date(2024, 1, 1)), "2024011");
        assert_eq!(parse_draw_id("2024011").unwrap().to_date(), Some(date(2024, 1, 1)));
        assert_eq!(parse_draw_id("2021537").unwrap().to_date(), Some(date(2021, 1, 3)));
        // Shared key: the December Sunday is in ISO year 2023 itself.
        assert_eq!(derive_draw_id(date(2023, 1, 1)), "2023527");
        assert_eq!(parse_draw_id("2023527").unwrap().to_date(), Some(date(2023, 12, 31)));
        // No day of 2021 is in an ISO week 53.
        assert!(parse_draw_id("2021531").is_err());
    }

    #[test]
    fn round_trip_recovers_triple() {
        let mut day = date(2019, 12, 20);
        while day < date(2026, 1, 15) {
            let id = derive_draw_id(day);
            let parsed = parse_draw_id(&id).unwrap();
            assert_eq!(parsed, DrawId::from_date(day), "round trip failed for {day}");
            let back = parsed.to_date().unwrap();
            assert_eq!(derive_draw_id(back), id, "{day} resolved to {back}");
            day = day.succ_opt().unwrap();
        }
    }

    #[test]
    fn rejects_malformed_ids() {
        assert!(parse_draw_id("202405").is_err());
        assert!(parse_draw_id("2024x54").is_err());
        assert!(parse_draw_id("2024058").is_err());
        assert!(parse_draw_id("2024004").is_err());
        assert!(parse_draw_id("2024544").is_err());
    }
}
