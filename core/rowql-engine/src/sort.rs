//! Deterministic multi-type ordering for the `order` operation.
//!
//! Rows compare lexicographically over the declared terms: the first
//! declared term is most significant, values tied on a term fall through
//! to the next, and rows tied on every term break by row id. Per-term
//! DESC reverses that term's comparison outright, and the id tiebreak
//! follows the least significant term's direction, so output is
//! deterministic for any dataset and order terms.
//!
//! Within one term, values of different JSON types order by a fixed type
//! rank; same-rank values that cannot be distinguished count as tied.

use crate::store::Row;
use rowql_query::{OrderTerm, SortDirection, loose_eq};
use serde_json::Value;
use std::cmp::Ordering;

pub(crate) fn apply(mut rows: Vec<Row>, terms: &[OrderTerm]) -> Vec<Row> {
    if !terms.is_empty() {
        rows.sort_by(|a, b| compare_rows(a, b, terms));
    }
    rows
}

fn compare_rows(a: &Row, b: &Row, terms: &[OrderTerm]) -> Ordering {
    for term in terms {
        let ord = compare_values(a.fields.get(&term.field), b.fields.get(&term.field));
        if let Some(ord) = ord {
            return directed(ord, term.sort);
        }
    }
    let last = terms.last().map_or(SortDirection::Asc, |t| t.sort);
    directed(a.id.cmp(&b.id), last)
}

fn directed(ord: Ordering, sort: SortDirection) -> Ordering {
    match sort {
        SortDirection::Asc => ord,
        SortDirection::Desc => ord.reverse(),
    }
}

/// Compare two optional field values; `None` means the values are
/// indistinguishable and the caller falls through to the next term.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Option<Ordering> {
    let (a, b) = match (a, b) {
        // A missing field sorts after everything, null included.
        (None, None) => return None,
        (None, Some(_)) => return Some(Ordering::Greater),
        (Some(_), None) => return Some(Ordering::Less),
        (Some(a), Some(b)) => (a, b),
    };
    if loose_eq(a, b) {
        return None;
    }
    match type_rank(a).cmp(&type_rank(b)) {
        Ordering::Equal => {}
        unequal => return Some(unequal),
    }
    match (a, b) {
        (Value::String(x), Value::String(y)) => distinct(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => distinct(x.cmp(y)),
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x.partial_cmp(&y).and_then(distinct),
            _ => None,
        },
        // Distinct objects and arrays share a rank and count as tied.
        _ => None,
    }
}

/// Ascending type rank: containers, strings, booleans, numbers, null.
/// Missing fields are handled before ranking and sort after null.
fn type_rank(v: &Value) -> u8 {
    match v {
        Value::Object(_) | Value::Array(_) => 0,
        Value::String(_) => 1,
        Value::Bool(_) => 2,
        Value::Number(_) => 3,
        Value::Null => 4,
    }
}

fn distinct(ord: Ordering) -> Option<Ordering> {
    (ord != Ordering::Equal).then_some(ord)
}
