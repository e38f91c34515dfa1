//! Datasets and joins.
//!
//! Anything that can appear in a FROM clause is a [`Dataset`]: a plain
//! table or a join. Joins are left-deep — the left side may itself be a
//! join, the right side is always a single table.

use crate::predicate::Predicate;
use crate::table::Table;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinDirection {
    Left,
    Right,
    Full,
}

/// How a conditional join matches rows.
#[derive(Debug, Clone, PartialEq)]
pub enum JoinCondition {
    On(Predicate),
    Using(Vec<String>),
    Natural,
}

/// Join flavor. Only inner and outer joins carry a condition.
#[derive(Debug, Clone, PartialEq)]
pub enum JoinKind {
    Cross,
    Inner(JoinCondition),
    Outer(JoinDirection, JoinCondition),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub left: Dataset,
    pub right: Table,
    pub kind: JoinKind,
}

/// A FROM-clause source.
#[derive(Debug, Clone, PartialEq)]
pub enum Dataset {
    Table(Table),
    Join(Box<Join>),
}

impl Dataset {
    /// Flattens the constituent tables in declaration order.
    ///
    /// A table flattens to itself; a join flattens to its left side's
    /// tables followed by its right table. Alias assignment depends on
    /// this order.
    pub fn tables(&self) -> Vec<&Table> {
        match self {
            Dataset::Table(table) => vec![table],
            Dataset::Join(join) => {
                let mut tables = join.left.tables();
                tables.push(&join.right);
                tables
            }
        }
    }

    /// The sole table of a non-join dataset, if any.
    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Dataset::Table(table) => Some(table),
            Dataset::Join(_) => None,
        }
    }
}

impl From<Table> for Dataset {
    fn from(table: Table) -> Self {
        Dataset::Table(table)
    }
}

impl From<Join> for Dataset {
    fn from(join: Join) -> Self {
        Dataset::Join(Box::new(join))
    }
}
