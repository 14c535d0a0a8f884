//! Date string helpers.
//!
//! Tickets print dates as `D.M.YYYY`, the lookup endpoint takes `YYYY-MM-DD`
//! and the results feed returns RFC 3339 timestamps. These helpers move
//! between the three without ever failing: unrecognised input is returned
//! unchanged so the user still sees what the model read.

use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::DateError;

static DOTTED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})\.(\d{1,2})\.(\d{4})$").unwrap());

static ISO_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{4})-(\d{2})-(\d{2})$").unwrap());

/// Normalize a ticket date to `YYYY-MM-DD` for the lookup endpoint.
pub fn normalize_date(input: &str) -> String {
    let s = input.trim();
    if let Some(caps) = DOTTED_RE.captures(s) {
        return format!("{}-{:0>2}-{:0>2}", &caps[3], &caps[2], &caps[1]);
    }
    if ISO_RE.is_match(s) {
        return s.to_string();
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return ts.with_timezone(&Utc).format("%Y-%m-%d").to_string();
    }
    input.to_string()
}

/// Format a date as `DD.MM.YYYY` for display.
pub fn display_date(input: &str) -> String {
    let s = input.trim();
    if let Some(caps) = ISO_RE.captures(s) {
        return format!("{}.{}.{}", &caps[3], &caps[2], &caps[1]);
    }
    if DOTTED_RE.is_match(s) {
        return s.to_string();
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return ts.format("%d.%m.%Y").to_string();
    }
    input.to_string()
}

/// Strict parse of the lookup endpoint's `date` parameter.
pub fn parse_lookup_date(input: &str) -> Result<NaiveDate, DateError> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|_| DateError::Malformed(input.to_string()))
}
