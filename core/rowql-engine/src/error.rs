//! Error types for the row store and query commands.

use rowql_query::QueryError;
use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors raised by store construction, updates, and command validation.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The raw dataset was not an array of records.
    #[error("dataset must be an array of records")]
    InvalidDataset,

    /// The projection did not map the first record to an object.
    #[error("projection must map each record to an object")]
    InvalidProjection,

    /// The projection cannot route a field update back to its record.
    #[error("projection cannot write field \"{0}\" back to the record")]
    ReadOnlyProjection(String),

    /// An update targeted a row id absent from the dataset. The row view
    /// is derived from the dataset, so this indicates a corrupted store.
    #[error("row {0} not found in dataset")]
    RowNotFound(usize),

    /// Query, limit, order, or fields validation failed.
    #[error(transparent)]
    Parse(#[from] QueryError),
}
