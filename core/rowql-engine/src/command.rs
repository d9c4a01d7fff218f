//! The chained query command: select → order → limit → values/update.
//!
//! A command is a builder value holding a shared store handle and an
//! owned list of validated operations. Every chained call clones the
//! list and returns a new command, so partially built chains can be
//! reused and extended independently — value semantics, no aliasing.
//!
//! Terminal calls replay the operations in chain order over a snapshot
//! of the store's row view: filter (OR of AND clauses), the multi-term
//! sort, then the pagination slice.

use crate::error::EngineResult;
use crate::sort;
use crate::store::{Row, Store};
use chrono::Utc;
use rowql_query::{
    Limit, OrderTerm, Query, validate_fields, validate_limit, validate_order, validate_query,
};
use serde_json::Value;
use tracing::{debug, trace};

#[derive(Debug, Clone)]
enum Op {
    Select(Query),
    Order(Vec<OrderTerm>),
    Limit(Limit),
}

/// One node of a query command chain.
#[derive(Clone)]
pub struct Command {
    store: Store,
    ops: Vec<Op>,
}

impl Command {
    pub(crate) fn root(store: Store) -> Self {
        Self {
            store,
            ops: Vec::new(),
        }
    }

    /// Append a filter operation. The raw query is validated against the
    /// store's canonical fields before it is accepted.
    pub fn select(&self, raw: &Value) -> EngineResult<Command> {
        let fields = self.store.fields();
        let query = validate_query(raw, Some(&fields))?;
        Ok(self.push(Op::Select(query)))
    }

    /// Append an ordering operation.
    pub fn order(&self, raw: &Value) -> EngineResult<Command> {
        let fields = self.store.fields();
        let order = validate_order(raw, Some(&fields))?;
        Ok(self.push(Op::Order(order)))
    }

    /// Append a pagination window.
    pub fn limit(&self, raw: &Value) -> EngineResult<Command> {
        Ok(self.push(Op::Limit(validate_limit(raw)?)))
    }

    fn push(&self, op: Op) -> Command {
        let mut ops = self.ops.clone();
        ops.push(op);
        Command {
            store: self.store.clone(),
            ops,
        }
    }

    /// Execute the chain and return the matching original records, in
    /// final order.
    #[must_use]
    pub fn values(&self) -> Vec<Value> {
        let rows = self.run();
        self.store.records_by_id(rows.iter().map(|row| row.id))
    }

    /// Execute the chain, write `raw_fields` onto every matching record,
    /// reinitialize the store, and return the updated records.
    pub fn update(&self, raw_fields: &Value) -> EngineResult<Vec<Value>> {
        let fields = validate_fields(raw_fields)?;
        let rows = self.run();
        let mut updated = Vec::with_capacity(rows.len());
        for row in &rows {
            updated.push(self.store.apply_field_update(row.id, &fields)?);
        }
        // Commit the new values into the row view so subsequent queries
        // on this store see them.
        self.store.reinitialize()?;
        debug!(rows = updated.len(), "applied field update");
        Ok(updated)
    }

    fn run(&self) -> Vec<Row> {
        // One instant per execution pass; every temporal statement in the
        // chain compares against the same now.
        let now = Utc::now();
        let mut rows = self.store.rows();
        for op in &self.ops {
            rows = match op {
                Op::Select(query) => rows
                    .into_iter()
                    .filter(|row| query.matches(&row.fields, now))
                    .collect(),
                Op::Order(terms) => sort::apply(rows, terms),
                Op::Limit(limit) => apply_limit(rows, *limit),
            };
        }
        trace!(ops = self.ops.len(), rows = rows.len(), "executed command chain");
        rows
    }
}

fn apply_limit(rows: Vec<Row>, limit: Limit) -> Vec<Row> {
    let take = if limit.count == 0 {
        usize::MAX
    } else {
        limit.count
    };
    rows.into_iter().skip(limit.offset).take(take).collect()
}
