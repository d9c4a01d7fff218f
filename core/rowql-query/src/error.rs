//! Error types for query parsing and validation.

use thiserror::Error;

/// Result type for query validation.
pub type QueryResult<T> = Result<T, QueryError>;

/// Errors raised while validating raw query input.
///
/// These are all parse-time failures. Operator evaluation itself never
/// errors: a statement that cannot be evaluated is a non-match.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// The query was not an array of clause objects.
    #[error("query must be an array of clause objects")]
    InvalidQuery,

    /// A clause was not a plain object.
    #[error("query clause must be an object")]
    InvalidClause,

    /// A key's operator suffix named no registered operator.
    #[error("unknown operator: \"{0}\"")]
    UnknownOperator(String),

    /// A field name was not in the supplied allowlist.
    #[error("invalid field: \"{0}\"")]
    InvalidField(String),

    /// Malformed limit object.
    #[error("invalid limit: {0}")]
    InvalidLimit(String),

    /// Malformed order specification.
    #[error("invalid order: {0}")]
    InvalidOrder(String),

    /// Update payload was not a plain object.
    #[error("update fields must be an object")]
    InvalidFields,
}
