//! Structured filter-tree backend: statements render as JSON nodes
//! (`{field: {"values": […]}}`), negation wraps a node in `{"not": […]}`,
//! and composition nests `{"and": […]}` / `{"or": […]}` arrays. The
//! rendered query is itself a JSON document, not a flat expression.

use crate::Translator;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use rowql_query::{Operator, parse_instant};
use serde_json::{Value, json};

// Placeholder the target system uses for absent values.
const NONE_VALUE: &str = "NONE_VALUE_ID";

/// The JSON filter-tree backend, registered as `"filter"`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterTree;

impl Translator for FilterTree {
    fn render(&self, operator: Operator, field: &str, value: &Value) -> Option<String> {
        let node = match operator {
            Operator::Is => values_node(field, json!([text(value)])),
            Operator::Not => negated(field, json!([text(value)])),
            Operator::IsNull => values_node(field, json!([NONE_VALUE])),
            Operator::NotNull => negated(field, json!([NONE_VALUE])),
            Operator::IsTrue => values_node(field, json!([true])),
            Operator::NotTrue => negated(field, json!([true])),
            Operator::IsFalse => values_node(field, json!([false])),
            Operator::NotFalse => negated(field, json!([false])),
            Operator::In => values_node(field, value.as_array()?.clone().into()),
            Operator::NotIn => negated(field, value.as_array()?.clone().into()),
            Operator::RecencyLt => window(value, |now, cutoff| {
                json!({"and": [date_node(field, "gt", cutoff), date_node(field, "lt", now)]})
            }),
            Operator::RecencyGt => window(value, |_, cutoff| date_node(field, "lt", cutoff)),
            Operator::UpcomingLt => future_window(value, |now, cutoff| {
                json!({"and": [date_node(field, "gt", now), date_node(field, "lt", cutoff)]})
            }),
            Operator::UpcomingGt => {
                future_window(value, |_, cutoff| date_node(field, "gt", cutoff))
            }
            Operator::DateLt => date_bound(field, "lt", value),
            Operator::DateGt => date_bound(field, "gt", value),
            _ => return None,
        };
        Some(node.to_string())
    }

    fn combine(&self, clauses: Vec<Vec<String>>) -> String {
        let groups: Vec<Value> = clauses
            .into_iter()
            .map(|clause| {
                let nodes: Vec<Value> = clause.iter().map(|s| parse_node(s)).collect();
                match nodes.len() {
                    1 => nodes.into_iter().next().unwrap_or(Value::Null),
                    _ => json!({"and": nodes}),
                }
            })
            .collect();
        let tree = match groups.len() {
            1 => groups.into_iter().next().unwrap_or(Value::Null),
            _ => json!({"or": groups}),
        };
        tree.to_string()
    }
}

fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn values_node(field: &str, values: Value) -> Value {
    json!({field: {"values": values}})
}

fn negated(field: &str, values: Value) -> Value {
    json!({"not": [values_node(field, values)]})
}

fn date_node(field: &str, bound: &str, t: DateTime<Utc>) -> Value {
    json!({field: {bound: {"date": t.to_rfc3339_opts(SecondsFormat::Millis, true)}}})
}

fn date_bound(field: &str, bound: &str, value: &Value) -> Value {
    match parse_instant(value) {
        Some(t) => date_node(field, bound, t),
        None => Value::Null,
    }
}

/// Absolute cutoffs for a past window; a non-numeric window renders a
/// null node, like an unparsable date.
fn window(value: &Value, render: impl Fn(DateTime<Utc>, DateTime<Utc>) -> Value) -> Value {
    let Some(seconds) = value.as_f64() else {
        return Value::Null;
    };
    let now = Utc::now();
    render(now, now - Duration::milliseconds((seconds * 1000.0) as i64))
}

/// Like [`window`] but with the cutoff after now.
fn future_window(value: &Value, render: impl Fn(DateTime<Utc>, DateTime<Utc>) -> Value) -> Value {
    let Some(seconds) = value.as_f64() else {
        return Value::Null;
    };
    let now = Utc::now();
    render(now, now + Duration::milliseconds((seconds * 1000.0) as i64))
}

// Fragments round-trip through the string interface; they are rendered
// by this backend and always parse.
fn parse_node(fragment: &str) -> Value {
    serde_json::from_str(fragment).unwrap_or(Value::Null)
}
