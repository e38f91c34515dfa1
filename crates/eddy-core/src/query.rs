//! The immutable query value.
//!
//! A [`Query`] bundles a dataset, a projection, a predicate and an
//! optional limit. Every transformation returns a new value; nothing is
//! mutated, so queries can be cloned, shared and compiled any number of
//! times with identical output.

use crate::expr::Expr;
use crate::join::{Dataset, Join, JoinCondition, JoinDirection, JoinKind};
use crate::predicate::Predicate;
use crate::table::Table;

/// Row-window clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    Rows(u64),
    OffsetRows { offset: u64, rows: u64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    dataset: Dataset,
    projection: Expr,
    predicate: Predicate,
    limit: Option<Limit>,
}

impl Query {
    pub(crate) fn new(
        dataset: Dataset,
        projection: Expr,
        predicate: Predicate,
        limit: Option<Limit>,
    ) -> Self {
        Self {
            dataset,
            projection,
            predicate,
            limit,
        }
    }

    /// A whole-row table handle; chain [`Table::select`] or convert with
    /// `Query::from` to start building.
    pub fn table(name: impl Into<String>) -> Table {
        Table::new(name)
    }

    /// Starts a single-table query, optionally narrowing the projected
    /// columns.
    pub fn select<S: Into<String>>(
        columns: Option<Vec<S>>,
        from: impl Into<String>,
    ) -> Query {
        let table = Table::new(from);
        match columns {
            Some(columns) => table.select(columns),
            None => Query::from(table),
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn projection(&self) -> &Expr {
        &self.projection
    }

    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    pub fn limit(&self) -> Option<Limit> {
        self.limit
    }

    /// Replaces the projection, keeping dataset, predicate and limit.
    pub fn map(self, f: impl FnOnce(Expr) -> Expr) -> Query {
        Query {
            projection: f(self.projection),
            ..self
        }
    }

    /// Conjoins a new predicate onto the existing one. The prior filter
    /// is never discarded.
    pub fn filter(self, f: impl FnOnce(&Expr) -> Predicate) -> Query {
        let added = f(&self.projection);
        Query {
            predicate: added.and(self.predicate),
            ..self
        }
    }

    fn joined(self, right: Table, kind: JoinKind) -> Query {
        let projection = Expr::Tuple(vec![self.projection, Expr::Table(right.clone())]);
        let dataset = Dataset::from(Join {
            left: self.dataset,
            right,
            kind,
        });
        Query {
            dataset,
            projection,
            predicate: self.predicate,
            limit: self.limit,
        }
    }

    /// Cross join: the projection becomes a 2-tuple of both sides.
    pub fn zip(self, table: Table) -> Query {
        self.joined(table, JoinKind::Cross)
    }

    /// Inner join with the given condition.
    pub fn zip_inner(self, table: Table, condition: JoinCondition) -> Query {
        self.joined(table, JoinKind::Inner(condition))
    }

    /// Outer join with the given direction and condition.
    pub fn zip_outer(
        self,
        table: Table,
        direction: JoinDirection,
        condition: JoinCondition,
    ) -> Query {
        self.joined(table, JoinKind::Outer(direction, condition))
    }

    /// Keeps at most `n` rows. Replaces any prior limit.
    pub fn take(self, n: u64) -> Query {
        Query {
            limit: Some(Limit::Rows(n)),
            ..self
        }
    }

    /// Keeps at most `n` rows after skipping `drop`. Replaces any prior
    /// limit.
    pub fn take_drop(self, n: u64, drop: u64) -> Query {
        Query {
            limit: Some(Limit::OffsetRows {
                offset: drop,
                rows: n,
            }),
            ..self
        }
    }
}
