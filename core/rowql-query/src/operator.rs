//! The closed registry of RowQL comparison and temporal operators.
//!
//! Each operator is a binary predicate over `(field value, query value)`.
//! The field value is `Option<&Value>` because a row may simply not have
//! the field; an absent value fails every operator except the negative
//! identity tests (`not_null`, `not_true`, `not_false`).
//!
//! Evaluation is fail-closed by contract: a type mismatch (a string
//! operator against a number, a non-array `in` payload, an unparsable
//! timestamp) makes the statement a non-match. It never raises.

use crate::value::{loose_cmp, loose_eq, parse_instant};
use crate::wildcard;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;

/// A query operator, parsed from the `__operator` suffix of a query key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Is,
    Not,
    Gt,
    Lt,
    Gte,
    Lte,
    Contains,
    IContains,
    StartsWith,
    IStartsWith,
    EndsWith,
    IEndsWith,
    WordStartsWith,
    IWordStartsWith,
    WordEndsWith,
    IWordEndsWith,
    Like,
    ILike,
    IsNull,
    NotNull,
    IsTrue,
    NotTrue,
    IsFalse,
    NotFalse,
    In,
    NotIn,
    RecencyLt,
    RecencyLte,
    RecencyGt,
    RecencyGte,
    UpcomingLt,
    UpcomingLte,
    UpcomingGt,
    UpcomingGte,
    DateLt,
    DateLte,
    DateGt,
    DateGte,
}

/// All registered operators, in grammar order.
pub const ALL_OPERATORS: &[Operator] = &[
    Operator::Is,
    Operator::Not,
    Operator::Gt,
    Operator::Lt,
    Operator::Gte,
    Operator::Lte,
    Operator::Contains,
    Operator::IContains,
    Operator::StartsWith,
    Operator::IStartsWith,
    Operator::EndsWith,
    Operator::IEndsWith,
    Operator::WordStartsWith,
    Operator::IWordStartsWith,
    Operator::WordEndsWith,
    Operator::IWordEndsWith,
    Operator::Like,
    Operator::ILike,
    Operator::IsNull,
    Operator::NotNull,
    Operator::IsTrue,
    Operator::NotTrue,
    Operator::IsFalse,
    Operator::NotFalse,
    Operator::In,
    Operator::NotIn,
    Operator::RecencyLt,
    Operator::RecencyLte,
    Operator::RecencyGt,
    Operator::RecencyGte,
    Operator::UpcomingLt,
    Operator::UpcomingLte,
    Operator::UpcomingGt,
    Operator::UpcomingGte,
    Operator::DateLt,
    Operator::DateLte,
    Operator::DateGt,
    Operator::DateGte,
];

impl Operator {
    /// Look up an operator by its wire token, e.g. `"icontains"`.
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        let op = match token {
            "is" => Self::Is,
            "not" => Self::Not,
            "gt" => Self::Gt,
            "lt" => Self::Lt,
            "gte" => Self::Gte,
            "lte" => Self::Lte,
            "contains" => Self::Contains,
            "icontains" => Self::IContains,
            "startswith" => Self::StartsWith,
            "istartswith" => Self::IStartsWith,
            "endswith" => Self::EndsWith,
            "iendswith" => Self::IEndsWith,
            "wordstartswith" => Self::WordStartsWith,
            "iwordstartswith" => Self::IWordStartsWith,
            "wordendswith" => Self::WordEndsWith,
            "iwordendswith" => Self::IWordEndsWith,
            "like" => Self::Like,
            "ilike" => Self::ILike,
            "is_null" => Self::IsNull,
            "not_null" => Self::NotNull,
            "is_true" => Self::IsTrue,
            "not_true" => Self::NotTrue,
            "is_false" => Self::IsFalse,
            "not_false" => Self::NotFalse,
            "in" => Self::In,
            "not_in" => Self::NotIn,
            "recency_lt" => Self::RecencyLt,
            "recency_lte" => Self::RecencyLte,
            "recency_gt" => Self::RecencyGt,
            "recency_gte" => Self::RecencyGte,
            "upcoming_lt" => Self::UpcomingLt,
            "upcoming_lte" => Self::UpcomingLte,
            "upcoming_gt" => Self::UpcomingGt,
            "upcoming_gte" => Self::UpcomingGte,
            "date_lt" => Self::DateLt,
            "date_lte" => Self::DateLte,
            "date_gt" => Self::DateGt,
            "date_gte" => Self::DateGte,
            _ => return None,
        };
        Some(op)
    }

    /// The wire token for this operator.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Is => "is",
            Self::Not => "not",
            Self::Gt => "gt",
            Self::Lt => "lt",
            Self::Gte => "gte",
            Self::Lte => "lte",
            Self::Contains => "contains",
            Self::IContains => "icontains",
            Self::StartsWith => "startswith",
            Self::IStartsWith => "istartswith",
            Self::EndsWith => "endswith",
            Self::IEndsWith => "iendswith",
            Self::WordStartsWith => "wordstartswith",
            Self::IWordStartsWith => "iwordstartswith",
            Self::WordEndsWith => "wordendswith",
            Self::IWordEndsWith => "iwordendswith",
            Self::Like => "like",
            Self::ILike => "ilike",
            Self::IsNull => "is_null",
            Self::NotNull => "not_null",
            Self::IsTrue => "is_true",
            Self::NotTrue => "not_true",
            Self::IsFalse => "is_false",
            Self::NotFalse => "not_false",
            Self::In => "in",
            Self::NotIn => "not_in",
            Self::RecencyLt => "recency_lt",
            Self::RecencyLte => "recency_lte",
            Self::RecencyGt => "recency_gt",
            Self::RecencyGte => "recency_gte",
            Self::UpcomingLt => "upcoming_lt",
            Self::UpcomingLte => "upcoming_lte",
            Self::UpcomingGt => "upcoming_gt",
            Self::UpcomingGte => "upcoming_gte",
            Self::DateLt => "date_lt",
            Self::DateLte => "date_lte",
            Self::DateGt => "date_gt",
            Self::DateGte => "date_gte",
        }
    }

    /// Evaluate this operator against a row's field value.
    ///
    /// `now` is captured once per query execution so every temporal
    /// statement in a pass sees the same instant.
    #[must_use]
    pub fn eval(self, field: Option<&Value>, query: &Value, now: DateTime<Utc>) -> bool {
        let Some(a) = field else {
            // An absent value is not null, not true, and not false.
            return matches!(self, Self::NotNull | Self::NotTrue | Self::NotFalse);
        };
        match self {
            Self::Is => loose_eq(a, query),
            Self::Not => !loose_eq(a, query),
            Self::Gt => loose_cmp(a, query) == Some(Ordering::Greater),
            Self::Lt => loose_cmp(a, query) == Some(Ordering::Less),
            Self::Gte => matches!(
                loose_cmp(a, query),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            Self::Lte => matches!(loose_cmp(a, query), Some(Ordering::Less | Ordering::Equal)),

            Self::Contains => contains(a, query, false),
            Self::IContains => contains(a, query, true),

            Self::StartsWith => str_pair(a, query).is_some_and(|(s, q)| s.starts_with(q)),
            Self::IStartsWith => str_pair(a, query)
                .is_some_and(|(s, q)| s.to_lowercase().starts_with(&q.to_lowercase())),
            Self::EndsWith => str_pair(a, query).is_some_and(|(s, q)| s.ends_with(q)),
            Self::IEndsWith => {
                str_pair(a, query).is_some_and(|(s, q)| s.to_lowercase().ends_with(&q.to_lowercase()))
            }

            Self::WordStartsWith => {
                str_pair(a, query).is_some_and(|(s, q)| s.split(' ').any(|w| w.starts_with(q)))
            }
            Self::IWordStartsWith => str_pair(a, query).is_some_and(|(s, q)| {
                let q = q.to_lowercase();
                s.to_lowercase().split(' ').any(|w| w.starts_with(&q))
            }),
            Self::WordEndsWith => {
                str_pair(a, query).is_some_and(|(s, q)| s.split(' ').any(|w| w.ends_with(q)))
            }
            Self::IWordEndsWith => str_pair(a, query).is_some_and(|(s, q)| {
                let q = q.to_lowercase();
                s.to_lowercase().split(' ').any(|w| w.ends_with(&q))
            }),

            Self::Like => str_pair(a, query).is_some_and(|(s, q)| wildcard::is_match(s, q)),
            Self::ILike => str_pair(a, query).is_some_and(|(s, q)| wildcard::is_match_ci(s, q)),

            Self::IsNull => a.is_null(),
            Self::NotNull => !a.is_null(),
            Self::IsTrue => *a == Value::Bool(true),
            Self::NotTrue => *a != Value::Bool(true),
            Self::IsFalse => *a == Value::Bool(false),
            Self::NotFalse => *a != Value::Bool(false),

            Self::In => query
                .as_array()
                .is_some_and(|items| items.iter().any(|v| loose_eq(a, v))),
            Self::NotIn => query
                .as_array()
                .is_some_and(|items| !items.iter().any(|v| loose_eq(a, v))),

            Self::RecencyLt => recency(a, now, query).is_some_and(|(d, w)| d >= 0.0 && d < w),
            Self::RecencyLte => recency(a, now, query).is_some_and(|(d, w)| d >= 0.0 && d <= w),
            Self::RecencyGt => recency(a, now, query).is_some_and(|(d, w)| d > w),
            Self::RecencyGte => recency(a, now, query).is_some_and(|(d, w)| d >= w),

            Self::UpcomingLt => upcoming(a, now, query).is_some_and(|(d, w)| d > 0.0 && d < w),
            Self::UpcomingLte => upcoming(a, now, query).is_some_and(|(d, w)| d > 0.0 && d <= w),
            Self::UpcomingGt => upcoming(a, now, query).is_some_and(|(d, w)| d > 0.0 && d > w),
            Self::UpcomingGte => upcoming(a, now, query).is_some_and(|(d, w)| d > 0.0 && d >= w),

            Self::DateLt => date_cmp(a, query) == Some(Ordering::Less),
            Self::DateLte => matches!(date_cmp(a, query), Some(Ordering::Less | Ordering::Equal)),
            Self::DateGt => date_cmp(a, query) == Some(Ordering::Greater),
            Self::DateGte => matches!(
                date_cmp(a, query),
                Some(Ordering::Greater | Ordering::Equal)
            ),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn str_pair<'a>(a: &'a Value, b: &'a Value) -> Option<(&'a str, &'a str)> {
    Some((a.as_str()?, b.as_str()?))
}

/// `contains` over both string fields (substring) and array fields
/// (exact element membership).
fn contains(a: &Value, query: &Value, case_insensitive: bool) -> bool {
    match a {
        Value::String(s) => {
            let Some(q) = query.as_str() else { return false };
            if case_insensitive {
                s.to_lowercase().contains(&q.to_lowercase())
            } else {
                s.contains(q)
            }
        }
        Value::Array(items) => {
            if case_insensitive {
                let Some(q) = query.as_str() else { return false };
                let q = q.to_lowercase();
                items
                    .iter()
                    .any(|v| v.as_str().is_some_and(|s| s.to_lowercase() == q))
            } else {
                items.iter().any(|v| loose_eq(v, query))
            }
        }
        _ => false,
    }
}

/// Milliseconds elapsed since the field's instant, paired with the query
/// window (seconds) scaled to milliseconds.
fn recency(a: &Value, now: DateTime<Utc>, query: &Value) -> Option<(f64, f64)> {
    let t = parse_instant(a)?;
    let window = query.as_f64()? * 1000.0;
    Some(((now.timestamp_millis() - t.timestamp_millis()) as f64, window))
}

/// Milliseconds until the field's instant, paired with the scaled window.
fn upcoming(a: &Value, now: DateTime<Utc>, query: &Value) -> Option<(f64, f64)> {
    let t = parse_instant(a)?;
    let window = query.as_f64()? * 1000.0;
    Some(((t.timestamp_millis() - now.timestamp_millis()) as f64, window))
}

fn date_cmp(a: &Value, b: &Value) -> Option<Ordering> {
    Some(parse_instant(a)?.cmp(&parse_instant(b)?))
}
