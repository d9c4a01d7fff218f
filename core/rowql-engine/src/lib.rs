//! In-memory query engine for RowQL.
//!
//! Given a dataset of JSON records, a [`Store`] derives an id-tagged row
//! view through a [`Projection`] and serves chained query commands:
//!
//! ```
//! use rowql_engine::Store;
//! use serde_json::json;
//!
//! let store = Store::new(vec![
//!     json!({"id": 1, "last_name": "Snow"}),
//!     json!({"id": 2, "last_name": "Stark"}),
//!     json!({"id": 5, "last_name": "Snow"}),
//! ])?;
//!
//! let rows = store
//!     .query()
//!     .select(&json!([{"last_name": "Snow"}]))?
//!     .values();
//! assert_eq!(rows.len(), 2);
//! # Ok::<(), rowql_engine::EngineError>(())
//! ```
//!
//! Everything is synchronous and single-threaded: commands share their
//! store through an `Rc` handle, and the caller serializes access.
//! Updates mutate the stored records in place and are reflected in the
//! row view after the reinitialization that [`Command::update`] performs;
//! [`Store::commit`] produces an independent snapshot with an empty
//! changeset.

mod command;
mod error;
mod sort;
mod store;

pub use command::Command;
pub use error::{EngineError, EngineResult};
pub use store::{Identity, Projection, Row, Store};
