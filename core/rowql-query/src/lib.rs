//! Query grammar for RowQL.
//!
//! Defines everything needed to turn a raw JSON query into a validated,
//! typed structure and to evaluate it against a projected row:
//! - [`Operator`] — the closed registry of comparison and temporal operators
//! - [`Query`], [`Clause`], [`Statement`] — OR-of-AND filter structure
//! - [`Limit`], [`OrderTerm`] — pagination and ordering descriptors
//! - `validate_*` — standalone validators for embedding in higher-level tooling
//! - [`wildcard`] — the SQL-`LIKE`-style matcher behind `like`/`ilike`
//!
//! Query keys use the `field__operator` syntax; a key with no `__` suffix
//! defaults to the `is` operator. All operator evaluation is fail-closed:
//! a type mismatch or unparsable timestamp makes the statement a non-match,
//! never an error.

mod error;
mod operator;
mod parse;
mod value;
pub mod wildcard;

pub use error::{QueryError, QueryResult};
pub use operator::{ALL_OPERATORS, Operator};
pub use parse::{
    Clause, Limit, OrderTerm, Query, SortDirection, Statement, validate_fields, validate_limit,
    validate_order, validate_query, validate_query_object, DEFAULT_OPERATOR, DELIMITER,
};
pub use value::{loose_cmp, loose_eq, parse_instant};
