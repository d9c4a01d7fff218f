//! The row store: owns the dataset, its projection, and the derived row view.
//!
//! Each record gets a [`Row`] — an id-tagged copy of its projection,
//! restricted to the canonical field set derived from the first record.
//! Row ids are original dataset indices and never move, regardless of how
//! a query filters or reorders its results.
//!
//! Updates land on the underlying records immediately but the row view is
//! only rebuilt on an explicit [`Store::reinitialize`] (which
//! [`Command::update`](crate::Command::update) performs) or through a
//! fresh [`Store::commit`] snapshot. The changeset survives
//! reinitialization; only `commit` forgets it.

use crate::command::Command;
use crate::error::{EngineError, EngineResult};
use serde_json::{Map, Value};
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;
use tracing::debug;

/// Maps a record to its queryable view and routes field updates back.
///
/// `project` must return a JSON object; its keys become the queryable
/// fields. The key set is derived once from the first record and treated
/// as a fixed schema, so all records must project compatible key sets.
///
/// For `update` to have any effect the projection must also know how to
/// write a field back onto the record. The default `write` covers the
/// common case of records that are themselves JSON objects; projections
/// over other shapes must override it or updates fail with
/// [`EngineError::ReadOnlyProjection`] rather than silently vanishing.
pub trait Projection {
    /// Derive the queryable view of one record.
    fn project(&self, record: &Value) -> Value;

    /// Write one updated field back onto the underlying record.
    fn write(&self, record: &mut Value, field: &str, value: Value) -> EngineResult<()> {
        match record {
            Value::Object(map) => {
                map.insert(field.to_string(), value);
                Ok(())
            }
            _ => Err(EngineError::ReadOnlyProjection(field.to_string())),
        }
    }
}

/// The identity projection: records are queried as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl Projection for Identity {
    fn project(&self, record: &Value) -> Value {
        record.clone()
    }
}

impl<F> Projection for F
where
    F: Fn(&Value) -> Value,
{
    fn project(&self, record: &Value) -> Value {
        self(record)
    }
}

/// A projected, id-tagged view of one dataset record.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// The record's original dataset index. Stable for the life of the
    /// store; never a position in a filtered or sorted result.
    pub id: usize,
    /// The projection of the record, restricted to the canonical fields.
    pub fields: Map<String, Value>,
}

pub(crate) struct StoreInner {
    records: Vec<Value>,
    projection: Rc<dyn Projection>,
    fields: Vec<String>,
    rows: Vec<Row>,
    changed: BTreeSet<usize>,
}

impl StoreInner {
    fn rebuild(&mut self) -> EngineResult<()> {
        self.fields = canonical_fields(&self.records, self.projection.as_ref())?;
        self.rows = build_rows(&self.records, self.projection.as_ref(), &self.fields);
        Ok(())
    }

    fn apply_field_update(
        &mut self,
        id: usize,
        fields: &Map<String, Value>,
    ) -> EngineResult<Value> {
        let projection = Rc::clone(&self.projection);
        let record = self
            .records
            .get_mut(id)
            .ok_or(EngineError::RowNotFound(id))?;
        for (key, value) in fields {
            projection.write(record, key, value.clone())?;
        }
        self.changed.insert(id);
        Ok(record.clone())
    }
}

/// An in-memory store over a dataset of JSON records.
///
/// Commands built from one store share its row view and changeset through
/// a single-threaded `Rc<RefCell<…>>` handle; the store is not `Send`,
/// matching the engine's single-threaded contract.
#[derive(Clone)]
pub struct Store {
    inner: Rc<RefCell<StoreInner>>,
}

impl Store {
    /// Build a store over `records` with the identity projection.
    pub fn new(records: Vec<Value>) -> EngineResult<Self> {
        Self::with_projection(records, Identity)
    }

    /// Build a store with a custom projection.
    pub fn with_projection(
        records: Vec<Value>,
        projection: impl Projection + 'static,
    ) -> EngineResult<Self> {
        Self::build(records, Rc::new(projection))
    }

    /// Build a store from a raw JSON dataset, which must be an array.
    pub fn from_json(dataset: Value) -> EngineResult<Self> {
        match dataset {
            Value::Array(records) => Self::new(records),
            _ => Err(EngineError::InvalidDataset),
        }
    }

    fn build(records: Vec<Value>, projection: Rc<dyn Projection>) -> EngineResult<Self> {
        let mut inner = StoreInner {
            records,
            projection,
            fields: Vec::new(),
            rows: Vec::new(),
            changed: BTreeSet::new(),
        };
        inner.rebuild()?;
        debug!(
            records = inner.records.len(),
            fields = inner.fields.len(),
            "initialized store"
        );
        Ok(Self {
            inner: Rc::new(RefCell::new(inner)),
        })
    }

    /// Start a query command chain at the root (no operations).
    #[must_use]
    pub fn query(&self) -> Command {
        Command::root(self.clone())
    }

    /// The canonical field names, derived from the first projected record.
    #[must_use]
    pub fn fields(&self) -> Vec<String> {
        self.inner.borrow().fields.clone()
    }

    /// A snapshot of the current row view, in record order.
    #[must_use]
    pub fn rows(&self) -> Vec<Row> {
        self.inner.borrow().rows.clone()
    }

    /// Number of records in the dataset.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.borrow().records.len()
    }

    /// Whether the dataset is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().records.is_empty()
    }

    /// Records mutated since this store was built, ascending by id.
    #[must_use]
    pub fn changeset(&self) -> Vec<Value> {
        let inner = self.inner.borrow();
        inner
            .changed
            .iter()
            .filter_map(|&id| inner.records.get(id).cloned())
            .collect()
    }

    /// A fresh snapshot over the current record values: new row view,
    /// empty changeset. Mutations already applied are kept.
    pub fn commit(&self) -> EngineResult<Store> {
        let inner = self.inner.borrow();
        debug!(records = inner.records.len(), "committing store snapshot");
        Self::build(inner.records.clone(), Rc::clone(&inner.projection))
    }

    /// Rebuild the row view from the current records, keeping the
    /// changeset. Called after updates so subsequent queries on this
    /// store see the new values.
    pub fn reinitialize(&self) -> EngineResult<()> {
        self.inner.borrow_mut().rebuild()
    }

    /// Write `fields` onto the record with the given row id, mark it in
    /// the changeset, and return the updated record. Does not rebuild
    /// the row view.
    pub fn apply_field_update(
        &self,
        id: usize,
        fields: &Map<String, Value>,
    ) -> EngineResult<Value> {
        self.inner.borrow_mut().apply_field_update(id, fields)
    }

    /// Clone the original records for the given row ids, in the order given.
    #[must_use]
    pub(crate) fn records_by_id(&self, ids: impl Iterator<Item = usize>) -> Vec<Value> {
        let inner = self.inner.borrow();
        ids.filter_map(|id| inner.records.get(id).cloned())
            .collect()
    }
}

fn canonical_fields(
    records: &[Value],
    projection: &dyn Projection,
) -> EngineResult<Vec<String>> {
    let Some(first) = records.first() else {
        return Ok(Vec::new());
    };
    match projection.project(first) {
        Value::Object(map) => Ok(map.keys().cloned().collect()),
        _ => Err(EngineError::InvalidProjection),
    }
}

fn build_rows(records: &[Value], projection: &dyn Projection, fields: &[String]) -> Vec<Row> {
    records
        .iter()
        .enumerate()
        .map(|(id, record)| {
            let view = projection.project(record);
            let mut row_fields = Map::new();
            if let Value::Object(map) = view {
                for field in fields {
                    if let Some(value) = map.get(field) {
                        row_fields.insert(field.clone(), value.clone());
                    }
                }
            }
            Row {
                id,
                fields: row_fields,
            }
        })
        .collect()
}
