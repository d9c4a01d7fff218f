//! Loose scalar semantics over `serde_json::Value`.
//!
//! JSON does not distinguish `33` from `33.0` in any way a query author
//! cares about, so equality and ordering treat numbers numerically.
//! Everything else compares structurally.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;
use std::cmp::Ordering;

/// Value equality with numeric loosening.
///
/// Numbers compare as f64 regardless of integer/float representation;
/// all other values compare structurally.
#[must_use]
pub fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
        _ => a == b,
    }
}

/// Partial ordering for the `gt`/`lt`/`gte`/`lte` operators.
///
/// Defined when both sides are numbers (numeric) or both are strings
/// (lexicographic). Mixed or non-orderable types return `None`, which
/// the operators treat as a non-match.
#[must_use]
pub fn loose_cmp(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// Parse a JSON value as an instant for the temporal operators.
///
/// Strings parse as RFC 3339, then `YYYY-MM-DD HH:MM:SS` (UTC assumed),
/// then a bare `YYYY-MM-DD` date. Numbers are Unix epoch milliseconds.
/// Anything else, including parse failures, yields `None`.
#[must_use]
pub fn parse_instant(v: &Value) -> Option<DateTime<Utc>> {
    match v {
        Value::String(s) => parse_instant_str(s),
        Value::Number(n) => DateTime::from_timestamp_millis(n.as_i64()?),
        _ => None,
    }
}

fn parse_instant_str(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt.and_utc());
        }
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d.and_hms_opt(0, 0, 0)?.and_utc());
    }
    None
}
