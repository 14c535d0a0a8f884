//! Response normalizer: pull a ticket record out of a free-text model reply.
//!
//! The model is asked for bare JSON but regularly wraps it in markdown fences
//! or surrounds it with commentary. Candidate locators run in order and the
//! first one that finds something wins. A located candidate that does not
//! parse is reported as malformed; it never falls through to the next locator.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use ticketscan_core::{ExtractedTicket, ExtractionError};

static TAGGED_FENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)```json\s*([\s\S]*?)\s*```").unwrap());

static ANY_FENCE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"```[\s\S]*?```").unwrap());

type Locate = fn(&str) -> Option<&str>;

/// One step of the fallback chain.
struct Locator {
    name: &'static str,
    locate: Locate,
}

const LOCATORS: &[Locator] = &[
    Locator { name: "json fence", locate: tagged_fence },
    Locator { name: "fence", locate: any_fence },
    Locator { name: "braces", locate: outer_braces },
];

const DATE_KEYS: &[&str] = &["date"];
const BONUS_KEYS: &[&str] = &["sanceNumber", "bonusNumber", "sance_number", "bonus_number"];
const ROWS_KEYS: &[&str] = &["winningNumbers", "winningRows", "winning_numbers", "winning_rows"];

/// Interior of the first fence explicitly tagged `json`.
fn tagged_fence(text: &str) -> Option<&str> {
    TAGGED_FENCE_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Interior of the first fence of any kind, minus its language tag.
fn any_fence(text: &str) -> Option<&str> {
    let block = ANY_FENCE_RE.find(text)?.as_str();
    let body = &block[3..block.len() - 3];
    let body = body.trim_start_matches(|c: char| c.is_ascii_alphabetic());
    let body = body.strip_prefix('\n').unwrap_or(body);
    Some(body.trim())
}

/// Greedy span from the first `{` to the last `}`.
fn outer_braces(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Locate and parse the JSON payload of a model reply.
pub fn extract_json_value(raw: &str) -> Result<Value, ExtractionError> {
    for locator in LOCATORS {
        if let Some(candidate) = (locator.locate)(raw) {
            return serde_json::from_str(candidate).map_err(|source| {
                ExtractionError::InvalidJson {
                    step: locator.name,
                    raw: raw.to_string(),
                    source,
                }
            });
        }
    }
    Err(ExtractionError::NoJson { raw: raw.to_string() })
}

/// Normalize a raw model reply into a ticket record.
pub fn normalize(raw: &str) -> Result<ExtractedTicket, ExtractionError> {
    let value = extract_json_value(raw)?;
    ticket_from_value(&value, raw)
}

/// Map a parsed JSON object onto [`ExtractedTicket`].
///
/// `raw` is only carried into errors.
pub fn ticket_from_value(value: &Value, raw: &str) -> Result<ExtractedTicket, ExtractionError> {
    let shape = |reason: String| ExtractionError::InvalidShape { raw: raw.to_string(), reason };

    let obj = value
        .as_object()
        .ok_or_else(|| shape("expected a JSON object".into()))?;

    let date = string_field(obj, DATE_KEYS).map_err(&shape)?;
    let bonus_number = string_field(obj, BONUS_KEYS).map_err(&shape)?;

    let (rows_key, rows) = lookup(obj, ROWS_KEYS)
        .ok_or_else(|| shape(format!("missing '{}'", ROWS_KEYS[0])))?;
    let rows = rows
        .as_array()
        .ok_or_else(|| shape(format!("'{rows_key}' must be an array")))?;

    let winning_rows = rows
        .iter()
        .map(|row| {
            row.as_str()
                .map(|s| s.trim().to_string())
                .ok_or_else(|| shape(format!("'{rows_key}' entries must be strings")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    if winning_rows.is_empty() {
        return Err(shape(format!("'{rows_key}' is empty")));
    }

    Ok(ExtractedTicket { date, bonus_number, winning_rows })
}

fn lookup<'a>(obj: &'a Map<String, Value>, keys: &[&'static str]) -> Option<(&'static str, &'a Value)> {
    keys.iter().find_map(|k| obj.get(*k).map(|v| (*k, v)))
}

/// A JSON number is refused: it has already lost any leading zeros.
fn string_field(obj: &Map<String, Value>, keys: &[&'static str]) -> Result<String, String> {
    match lookup(obj, keys) {
        Some((_, Value::String(s))) => Ok(s.trim().to_string()),
        Some((key, _)) => Err(format!("'{key}' must be a string")),
        None => Err(format!("missing '{}'", keys[0])),
    }
}
