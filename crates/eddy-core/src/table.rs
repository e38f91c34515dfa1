//! Tables and column references.
//!
//! A [`Table`] is the minimal dataset: it can sit in a FROM clause on its
//! own, serve as the projection of a whole-row SELECT, and hand out
//! [`Column`] references for filters and joins.

use crate::expr::Expr;
use crate::join::Dataset;
use crate::predicate::Predicate;
use crate::query::Query;
use crate::typed::Typed;

/// Which columns of a table participate in a projection.
#[derive(Debug, Clone, PartialEq)]
pub enum Columns {
    /// Every column, rendered as `*`.
    All,
    /// An explicit ordered list of column names.
    List(Vec<String>),
}

/// A named table with its projected column set.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    name: String,
    columns: Columns,
}

impl Table {
    /// A table projecting all of its columns.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Columns::All,
        }
    }

    /// A table projecting an explicit column list, in declaration order.
    pub fn with_columns<S: Into<String>>(
        name: impl Into<String>,
        columns: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            name: name.into(),
            columns: Columns::List(columns.into_iter().map(Into::into).collect()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &Columns {
        &self.columns
    }

    /// A reference to one of this table's columns.
    pub fn col(&self, name: impl Into<String>) -> Column {
        Column {
            name: name.into(),
            table: self.clone(),
        }
    }

    /// Starts a query over this table with the given projected columns.
    pub fn select<S: Into<String>>(&self, columns: impl IntoIterator<Item = S>) -> Query {
        let table = Table::with_columns(self.name.clone(), columns);
        Query::new(
            Dataset::Table(self.clone()),
            Expr::Table(table),
            Predicate::Null,
            None,
        )
    }

    /// Starts a query over this table filtered by `predicate`.
    pub fn filter(&self, predicate: Predicate) -> Query {
        Query::from(self.clone()).filter(|_| predicate)
    }
}

impl From<Table> for Query {
    fn from(table: Table) -> Self {
        Query::new(
            Dataset::Table(table.clone()),
            Expr::Table(table),
            Predicate::Null,
            None,
        )
    }
}

/// A reference to a column of a concrete table.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    table: Table,
}

impl Column {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Asserts the value type of this column, yielding a typed wrapper
    /// whose comparison builders only accept compatible operands.
    pub fn bind<T>(self) -> Typed<T> {
        Typed::from_expr(Expr::Column(self))
    }
}
