//! Token-search filter backend: `field:"value"` terms, `-` negation,
//! relational prefixes inside the quotes, and `(a AND b) OR (c)`
//! composition.

use crate::Translator;
use chrono::{DateTime, Duration, Utc};
use rowql_query::{Operator, parse_instant};
use serde_json::Value;

/// The token-search backend, registered as `"search"`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchSyntax;

impl Translator for SearchSyntax {
    fn render(&self, operator: Operator, field: &str, value: &Value) -> Option<String> {
        let rendered = match operator {
            Operator::Is => format!("{field}:\"{}\"", escape(value)),
            Operator::Not => format!("-{field}:\"{}\"", escape(value)),
            Operator::Gt => format!("{field}:>\"{}\"", escape(value)),
            Operator::Lt => format!("{field}:<\"{}\"", escape(value)),
            Operator::Gte => format!("{field}:>=\"{}\"", escape(value)),
            Operator::Lte => format!("{field}:<=\"{}\"", escape(value)),
            Operator::IWordStartsWith => format!("{field}:\\\"{}\\\"*", escape(value)),
            Operator::IsNull => format!("-{field}:*"),
            Operator::NotNull => format!("{field}:*"),
            Operator::IsTrue => format!("{field}:true"),
            Operator::IsFalse => format!("{field}:false"),
            Operator::NotTrue => format!("-{field}:true"),
            Operator::NotFalse => format!("-{field}:false"),
            Operator::In => {
                let terms: Vec<String> = value
                    .as_array()?
                    .iter()
                    .map(|elem| format!("{field}:\"{}\"", escape(elem)))
                    .collect();
                format!("({})", terms.join(" OR "))
            }
            Operator::NotIn => {
                let terms: Vec<String> = value
                    .as_array()?
                    .iter()
                    .map(|elem| format!("-{field}:\"{}\"", escape(elem)))
                    .collect();
                format!("({})", terms.join(" AND "))
            }
            Operator::RecencyLt => window(value, |now, cutoff| {
                format!("{field}:>\"{cutoff}\" AND {field}:<=\"{now}\"")
            }),
            Operator::RecencyLte => window(value, |now, cutoff| {
                format!("{field}:>=\"{cutoff}\" AND {field}:<=\"{now}\"")
            }),
            Operator::RecencyGt => window(value, |_, cutoff| format!("{field}:<\"{cutoff}\"")),
            Operator::RecencyGte => window(value, |_, cutoff| format!("{field}:<=\"{cutoff}\"")),
            Operator::UpcomingLt => future_window(value, |now, cutoff| {
                format!("{field}:>=\"{now}\" AND {field}:<\"{cutoff}\"")
            }),
            Operator::UpcomingLte => future_window(value, |now, cutoff| {
                format!("{field}:>=\"{now}\" AND {field}:<=\"{cutoff}\"")
            }),
            Operator::UpcomingGt => {
                future_window(value, |_, cutoff| format!("{field}:>\"{cutoff}\""))
            }
            Operator::UpcomingGte => {
                future_window(value, |_, cutoff| format!("{field}:>=\"{cutoff}\""))
            }
            Operator::DateLt => date_fragment(value, |date| format!("{field}:<\"{date}\"")),
            Operator::DateLte => date_fragment(value, |date| format!("{field}:<=\"{date}\"")),
            Operator::DateGt => date_fragment(value, |date| format!("{field}:>\"{date}\"")),
            Operator::DateGte => date_fragment(value, |date| format!("{field}:>=\"{date}\"")),
            _ => return None,
        };
        Some(rendered)
    }

    fn combine(&self, clauses: Vec<Vec<String>>) -> String {
        let groups: Vec<String> = clauses.iter().map(|c| c.join(" AND ")).collect();
        format!("({})", groups.join(") OR ("))
    }
}

fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn escape(value: &Value) -> String {
    let mut out = String::new();
    for c in text(value).chars() {
        if matches!(c, '\\' | ':' | '(' | ')') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn format_instant(t: DateTime<Utc>) -> String {
    t.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Render a recency window as absolute cutoffs; `cutoff` is `seconds`
/// before now. A non-numeric window renders an empty fragment.
fn window(value: &Value, render: impl Fn(&str, &str) -> String) -> String {
    let Some(seconds) = value.as_f64() else {
        return String::new();
    };
    let now = Utc::now();
    let cutoff = now - Duration::milliseconds((seconds * 1000.0) as i64);
    render(&format_instant(now), &format_instant(cutoff))
}

/// Like [`window`] but with the cutoff `seconds` after now.
fn future_window(value: &Value, render: impl Fn(&str, &str) -> String) -> String {
    let Some(seconds) = value.as_f64() else {
        return String::new();
    };
    let now = Utc::now();
    let cutoff = now + Duration::milliseconds((seconds * 1000.0) as i64);
    render(&format_instant(now), &format_instant(cutoff))
}

fn date_fragment(value: &Value, render: impl Fn(&str) -> String) -> String {
    match parse_instant(value) {
        Some(t) => render(&format_instant(t)),
        None => String::new(),
    }
}
