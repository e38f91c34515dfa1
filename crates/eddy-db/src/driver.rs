//! Driver and connection abstractions.
//!
//! A [`Driver`] knows how to open connections for one URL scheme; a
//! [`Connection`] executes already-compiled [`Sql`] and reports the
//! outcome. Both are object-safe so pools and handles can hold them
//! behind `Arc<dyn …>`.

use std::sync::Arc;

use futures::future::BoxFuture;
use url::Url;

use eddy_core::{Sql, Value};

use crate::error::Result;

/// Rows returned by a statement, with their column names in
/// projection order.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

/// Outcome of executing one statement.
///
/// Statements that produce no result set report the number of rows they
/// touched instead; a SELECT that matches nothing is `Rows` with an
/// empty row list, never an error.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecResult {
    Rows(QueryResult),
    Done { affected: u64 },
}

/// An open database connection.
pub trait Connection: Send + Sync {
    fn execute(&self, sql: Sql) -> BoxFuture<'static, Result<ExecResult>>;
}

/// A connection factory for one URL scheme.
pub trait Driver: Send + Sync {
    /// The URL scheme this driver serves (e.g. `"sqlite"`).
    fn proto(&self) -> &'static str;

    fn connect(&self, url: &Url) -> Result<Arc<dyn Connection>>;
}
