//! Validators that turn raw JSON input into typed query structures.
//!
//! The raw surface is deliberately untyped (`serde_json::Value`) so the
//! same validators serve the engine, translator backends, and any
//! embedding tooling. Every validator either returns a fully typed
//! structure or a [`QueryError`] naming the offending token.

use crate::error::{QueryError, QueryResult};
use crate::operator::Operator;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Separator between field name and operator suffix in query keys.
pub const DELIMITER: &str = "__";

/// Operator assumed when a key carries no `__operator` suffix.
pub const DEFAULT_OPERATOR: Operator = Operator::Is;

/// One `{field, operator, value}` triple within a clause.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub field: String,
    pub operator: Operator,
    pub value: Value,
}

impl Statement {
    /// Evaluate this statement against a projected row. Fail-closed.
    #[must_use]
    pub fn matches(&self, fields: &Map<String, Value>, now: DateTime<Utc>) -> bool {
        self.operator.eval(fields.get(&self.field), &self.value, now)
    }
}

/// One OR-branch of a query: an AND-group of statements.
///
/// A clause with zero statements matches every row.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Clause {
    pub statements: Vec<Statement>,
}

impl Clause {
    #[must_use]
    pub fn matches(&self, fields: &Map<String, Value>, now: DateTime<Utc>) -> bool {
        self.statements.iter().all(|s| s.matches(fields, now))
    }
}

/// A validated query: OR across clauses, AND within each clause.
///
/// A query with zero clauses matches nothing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Query {
    pub clauses: Vec<Clause>,
}

impl Query {
    #[must_use]
    pub fn matches(&self, fields: &Map<String, Value>, now: DateTime<Utc>) -> bool {
        self.clauses.iter().any(|c| c.matches(fields, now))
    }
}

/// A pagination window. `count == 0` means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Limit {
    pub offset: usize,
    pub count: usize,
}

/// Sort direction for an [`OrderTerm`]. Descending reverses the term's
/// comparison outright, type ranks included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// One term of an order specification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTerm {
    pub field: String,
    #[serde(default)]
    pub sort: SortDirection,
}

/// Validate a raw query: an array of clause objects.
///
/// Each clause object key is split on [`DELIMITER`]; the final segment is
/// the operator token and the remaining segments, rejoined, are the field
/// name (so field names may themselves contain `__`). A key with no
/// delimiter uses [`DEFAULT_OPERATOR`]. A non-empty `valid_fields`
/// allowlist restricts field names.
pub fn validate_query(raw: &Value, valid_fields: Option<&[String]>) -> QueryResult<Query> {
    let Value::Array(items) = raw else {
        return Err(QueryError::InvalidQuery);
    };
    let clauses = items
        .iter()
        .map(|obj| validate_query_object(obj, valid_fields))
        .collect::<QueryResult<Vec<_>>>()?;
    Ok(Query { clauses })
}

/// Validate a single clause object into an AND-group of statements.
pub fn validate_query_object(raw: &Value, valid_fields: Option<&[String]>) -> QueryResult<Clause> {
    let Value::Object(map) = raw else {
        return Err(QueryError::InvalidClause);
    };
    let mut statements = Vec::with_capacity(map.len());
    for (key, value) in map {
        let (field, operator) = split_key(key)?;
        check_field(&field, valid_fields)?;
        statements.push(Statement {
            field,
            operator,
            value: value.clone(),
        });
    }
    Ok(Clause { statements })
}

fn split_key(key: &str) -> QueryResult<(String, Operator)> {
    match key.rsplit_once(DELIMITER) {
        // A bare key is a field name, even one that collides with an
        // operator token ("is" queries the field named "is").
        None => Ok((key.to_string(), DEFAULT_OPERATOR)),
        Some((field, token)) => {
            let operator = Operator::parse(token)
                .ok_or_else(|| QueryError::UnknownOperator(token.to_string()))?;
            Ok((field.to_string(), operator))
        }
    }
}

fn check_field(field: &str, valid_fields: Option<&[String]>) -> QueryResult<()> {
    match valid_fields {
        Some(allowed) if !allowed.is_empty() && !allowed.iter().any(|f| f == field) => {
            Err(QueryError::InvalidField(field.to_string()))
        }
        _ => Ok(()),
    }
}

/// Validate a raw limit object.
///
/// Only `offset` and `count` keys are permitted, both optional, both
/// non-negative integers. `count == 0` means unbounded.
pub fn validate_limit(raw: &Value) -> QueryResult<Limit> {
    let Value::Object(map) = raw else {
        return Err(QueryError::InvalidLimit("must be an object".into()));
    };
    let mut limit = Limit::default();
    for (key, value) in map {
        let slot = match key.as_str() {
            "offset" => &mut limit.offset,
            "count" => &mut limit.count,
            other => {
                return Err(QueryError::InvalidLimit(format!(
                    "unexpected key \"{other}\""
                )));
            }
        };
        let n = value.as_u64().ok_or_else(|| {
            QueryError::InvalidLimit(format!("\"{key}\" must be a non-negative integer"))
        })?;
        *slot = n as usize;
    }
    Ok(limit)
}

/// Validate a raw order specification: an array of
/// `{field, sort?: "ASC"|"DESC"}` objects.
pub fn validate_order(raw: &Value, valid_fields: Option<&[String]>) -> QueryResult<Vec<OrderTerm>> {
    let Value::Array(items) = raw else {
        return Err(QueryError::InvalidOrder("must be an array".into()));
    };
    items
        .iter()
        .map(|item| validate_order_term(item, valid_fields))
        .collect()
}

fn validate_order_term(raw: &Value, valid_fields: Option<&[String]>) -> QueryResult<OrderTerm> {
    let Value::Object(map) = raw else {
        return Err(QueryError::InvalidOrder("each term must be an object".into()));
    };
    let mut field = None;
    let mut sort = SortDirection::default();
    for (key, value) in map {
        match key.as_str() {
            "field" => {
                let Value::String(name) = value else {
                    return Err(QueryError::InvalidOrder("\"field\" must be a string".into()));
                };
                field = Some(name.clone());
            }
            "sort" => {
                sort = match value.as_str() {
                    Some("ASC") => SortDirection::Asc,
                    Some("DESC") => SortDirection::Desc,
                    _ => {
                        return Err(QueryError::InvalidOrder(
                            "\"sort\" must be \"ASC\" or \"DESC\"".into(),
                        ));
                    }
                };
            }
            other => {
                return Err(QueryError::InvalidOrder(format!(
                    "unexpected key \"{other}\""
                )));
            }
        }
    }
    let Some(field) = field else {
        return Err(QueryError::InvalidOrder("\"field\" is required".into()));
    };
    check_field(&field, valid_fields)?;
    Ok(OrderTerm { field, sort })
}

/// Validate an update payload: a plain object of field assignments.
pub fn validate_fields(raw: &Value) -> QueryResult<Map<String, Value>> {
    match raw {
        Value::Object(map) => Ok(map.clone()),
        _ => Err(QueryError::InvalidFields),
    }
}
