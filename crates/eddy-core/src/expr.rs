//! The erased expression model.
//!
//! Everything renderable with a known value shape is an [`Expr`]: column
//! references, literals, whole-table projections, tuples of expressions,
//! and SQL function calls. Tuples exist only to group projections — they
//! flatten away through [`Expr::stripe`] before any rendering happens.

use crate::table::{Column, Table};
use crate::value::Value;

/// Name of a SQL function callable from a projection or filter.
#[derive(Debug, Clone, PartialEq)]
pub enum FunctionName {
    Upper,
    Lower,
    Custom(String),
}

/// A renderable expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Column(Column),
    Literal(Value),
    /// A whole-table projection; expands to the table's column list.
    Table(Table),
    Tuple(Vec<Expr>),
    Function { name: FunctionName, args: Vec<Expr> },
}

impl Expr {
    pub fn literal(value: impl Into<Value>) -> Expr {
        Expr::Literal(value.into())
    }

    pub fn tuple(items: impl IntoIterator<Item = Expr>) -> Expr {
        Expr::Tuple(items.into_iter().collect())
    }

    pub fn function(name: FunctionName, args: impl IntoIterator<Item = Expr>) -> Expr {
        Expr::Function {
            name,
            args: args.into_iter().collect(),
        }
    }

    /// The flattened leaf expressions of this expression, in declaration
    /// order. Nested tuples flatten recursively; every other variant is a
    /// leaf. This order becomes column order in SELECT lists and value
    /// order in INSERT tuples.
    pub fn stripe(&self) -> Vec<&Expr> {
        match self {
            Expr::Tuple(items) => items.iter().flat_map(Expr::stripe).collect(),
            leaf => vec![leaf],
        }
    }
}

impl From<Column> for Expr {
    fn from(column: Column) -> Self {
        Expr::Column(column)
    }
}

impl From<Table> for Expr {
    fn from(table: Table) -> Self {
        Expr::Table(table)
    }
}

impl From<Value> for Expr {
    fn from(value: Value) -> Self {
        Expr::Literal(value)
    }
}
