//! Spreadsheet-formula backend: `{field}=value` fragments composed with
//! `AND(…)`/`OR(…)`, `TRUE()`/`FALSE()`/`BLANK()` literals, and
//! `LEFT`/`RIGHT`/`SEARCH`/`LOWER` renderings for affix and substring
//! operators.

use crate::Translator;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use rowql_query::{Operator, parse_instant};
use serde_json::Value;

// Joins array fields into a single searchable string with an unambiguous
// separator.
const ARRAY_SEPARATOR: &str = "\u{a4}\u{a4}\u{a4}";

/// The spreadsheet-formula backend, registered as `"formula"`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormulaSyntax;

impl Translator for FormulaSyntax {
    fn render(&self, operator: Operator, field: &str, value: &Value) -> Option<String> {
        let key = format!("{{{field}}}");
        let rendered = match operator {
            Operator::Is => format!("{key}={}", literal(value)),
            Operator::Not => format!("{key}!={}", literal(value)),
            Operator::Gt => format!("{key}>{}", literal(value)),
            Operator::Lt => format!("{key}<{}", literal(value)),
            Operator::Gte => format!("{key}>={}", literal(value)),
            Operator::Lte => format!("{key}<={}", literal(value)),
            Operator::Contains => search_formula(&key, value, false),
            Operator::IContains => search_formula(&key, value, true),
            Operator::StartsWith => affix_formula(&key, value, Affix::Prefix, false),
            Operator::IStartsWith => affix_formula(&key, value, Affix::Prefix, true),
            Operator::EndsWith => affix_formula(&key, value, Affix::Suffix, false),
            Operator::IEndsWith => affix_formula(&key, value, Affix::Suffix, true),
            Operator::IsNull => format!("OR({key}=BLANK(),{key}='')"),
            Operator::NotNull => format!("AND({key}!=BLANK(),{key}!='')"),
            Operator::IsTrue => format!("{key}=TRUE()"),
            Operator::IsFalse => format!("{key}=FALSE()"),
            Operator::NotTrue => format!("{key}!=TRUE()"),
            Operator::NotFalse => format!("{key}!=FALSE()"),
            Operator::In => {
                let terms: Vec<String> = value
                    .as_array()?
                    .iter()
                    .map(|elem| format!("{key}={}", literal(elem)))
                    .collect();
                format!("OR({})", terms.join(","))
            }
            Operator::NotIn => {
                let terms: Vec<String> = value
                    .as_array()?
                    .iter()
                    .map(|elem| format!("{key}!={}", literal(elem)))
                    .collect();
                format!("AND({})", terms.join(","))
            }
            Operator::RecencyLt => window(value, |now, cutoff| {
                format!("AND({key}>{},{key}<={})", instant(cutoff), instant(now))
            }),
            Operator::RecencyLte => window(value, |now, cutoff| {
                format!("AND({key}>={},{key}<={})", instant(cutoff), instant(now))
            }),
            Operator::RecencyGt => window(value, |_, cutoff| format!("{key}<{}", instant(cutoff))),
            Operator::RecencyGte => {
                window(value, |_, cutoff| format!("{key}<={}", instant(cutoff)))
            }
            Operator::UpcomingLt => future_window(value, |now, cutoff| {
                format!("AND({key}>={},{key}<{})", instant(now), instant(cutoff))
            }),
            Operator::UpcomingLte => future_window(value, |now, cutoff| {
                format!("AND({key}>={},{key}<={})", instant(now), instant(cutoff))
            }),
            Operator::UpcomingGt => {
                future_window(value, |_, cutoff| format!("{key}>{}", instant(cutoff)))
            }
            Operator::UpcomingGte => {
                future_window(value, |_, cutoff| format!("{key}>={}", instant(cutoff)))
            }
            Operator::DateLt => date_fragment(value, |date| format!("{key}<{}", instant(date))),
            Operator::DateLte => date_fragment(value, |date| format!("{key}<={}", instant(date))),
            Operator::DateGt => date_fragment(value, |date| format!("{key}>{}", instant(date))),
            Operator::DateGte => date_fragment(value, |date| format!("{key}>={}", instant(date))),
            _ => return None,
        };
        Some(rendered)
    }

    fn combine(&self, clauses: Vec<Vec<String>>) -> String {
        let groups: Vec<String> = clauses
            .into_iter()
            .map(|clause| match clause.len() {
                1 => clause.into_iter().next().unwrap_or_default(),
                _ => format!("AND({})", clause.join(",")),
            })
            .collect();
        match groups.len() {
            1 => groups.into_iter().next().unwrap_or_default(),
            _ => format!("OR({})", groups.join(",")),
        }
    }
}

fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Render a value as a formula literal. Falsy values (null, empty string,
/// zero) render as `BLANK()`; strings are single-quoted with embedded
/// quotes spliced back in through concatenation.
fn literal(value: &Value) -> String {
    match value {
        Value::Bool(true) => "TRUE()".to_string(),
        Value::Bool(false) => "FALSE()".to_string(),
        Value::Null => "BLANK()".to_string(),
        Value::Number(n) if n.as_f64() == Some(0.0) => "BLANK()".to_string(),
        Value::String(s) if s.is_empty() => "BLANK()".to_string(),
        other => format!("'{}'", text(other).replace('\'', "'&\"'\"&'")),
    }
}

enum Affix {
    Prefix,
    Suffix,
}

fn affix_formula(key: &str, value: &Value, affix: Affix, case_insensitive: bool) -> String {
    let needle = text(value);
    if needle.is_empty() || *value == Value::Null {
        return "BLANK()".to_string();
    }
    let slice = match affix {
        Affix::Prefix => "LEFT",
        Affix::Suffix => "RIGHT",
    };
    let len = needle.chars().count();
    if case_insensitive {
        format!(
            "LOWER({slice}({key},{len}))=LOWER({})",
            literal(value)
        )
    } else {
        format!("{slice}({key},{len})={}", literal(value))
    }
}

/// `SEARCH`-based containment that works for both text fields and array
/// fields (arrays are joined with [`ARRAY_SEPARATOR`] and searched with
/// the separator glued to both sides of the needle).
fn search_formula(key: &str, value: &Value, case_insensitive: bool) -> String {
    let needle = literal(value);
    let sep = format!("'{ARRAY_SEPARATOR}'");
    if case_insensitive {
        format!(
            "IF(T({key}),SEARCH(LOWER({needle}),LOWER({key})),\
             SEARCH({sep}&LOWER({needle})&{sep},{sep}&LOWER(ARRAYJOIN({key},{sep}))&{sep}))"
        )
    } else {
        format!(
            "IF(T({key}),SEARCH({needle},{key}),\
             SEARCH({sep}&{needle}&{sep},{sep}&ARRAYJOIN({key},{sep})&{sep}))"
        )
    }
}

fn instant(t: DateTime<Utc>) -> String {
    format!("'{}'", t.to_rfc3339_opts(SecondsFormat::Millis, true))
}

fn window(value: &Value, render: impl Fn(DateTime<Utc>, DateTime<Utc>) -> String) -> String {
    let Some(seconds) = value.as_f64() else {
        return "BLANK()".to_string();
    };
    let now = Utc::now();
    render(now, now - Duration::milliseconds((seconds * 1000.0) as i64))
}

fn future_window(value: &Value, render: impl Fn(DateTime<Utc>, DateTime<Utc>) -> String) -> String {
    let Some(seconds) = value.as_f64() else {
        return "BLANK()".to_string();
    };
    let now = Utc::now();
    render(now, now + Duration::milliseconds((seconds * 1000.0) as i64))
}

fn date_fragment(value: &Value, render: impl Fn(DateTime<Utc>) -> String) -> String {
    match parse_instant(value) {
        Some(t) => render(t),
        None => "BLANK()".to_string(),
    }
}
