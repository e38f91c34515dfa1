//! SQL dialect compilers.
//!
//! A [`Dialect`] turns immutable query values into [`Sql`] fragments:
//! statement text plus an ordered parameter list. Compilation is a pure
//! function of its inputs — compiling the same query twice yields
//! byte-identical text and parameters.

pub mod sqlite;

pub use sqlite::SqliteDialect;

use crate::error::Result;
use crate::expr::Expr;
use crate::predicate::Predicate;
use crate::query::Query;
use crate::sql::Sql;
use crate::table::Table;
use crate::value::Value;

/// A concrete SQL flavor: quoting, placeholders, keyword spelling and
/// parameter coercion rules.
pub trait Dialect: Send + Sync {
    /// Protocol identifier matching the driver this dialect compiles for
    /// (e.g. `"sqlite"`).
    fn proto(&self) -> &'static str;

    fn compile_select(&self, query: &Query) -> Result<Sql>;

    /// Compiles a multi-row INSERT. `projection` supplies the column
    /// list; each row's values must follow the projection's stripe order.
    fn compile_insert(&self, table: &Table, projection: &Expr, rows: &[Vec<Value>])
        -> Result<Sql>;

    fn compile_update(
        &self,
        table: &Table,
        projection: &Expr,
        values: &[Value],
        predicate: &Predicate,
    ) -> Result<Sql>;

    fn compile_delete(&self, table: &Table, predicate: &Predicate) -> Result<Sql>;
}
