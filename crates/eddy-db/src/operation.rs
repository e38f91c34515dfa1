//! Deferred database operations.
//!
//! An [`Operation`] is a reusable unit of work: it captures a query (and
//! any values) at build time and compiles + executes against whatever
//! handle it is eventually run on. Operations are inert until executed
//! and can be run any number of times.

use std::sync::Arc;

use futures::future::BoxFuture;
use futures::Future;
use futures::FutureExt;

use eddy_core::{CompileError, Query, Table, Value};

use crate::driver::ExecResult;
use crate::error::{DbError, Result};
use crate::row::{FromRow, ToRow};
use crate::swirl::Swirl;

pub struct Operation<T> {
    run: Arc<dyn Fn(Swirl) -> BoxFuture<'static, Result<T>> + Send + Sync>,
}

impl<T> Clone for Operation<T> {
    fn clone(&self) -> Self {
        Self {
            run: Arc::clone(&self.run),
        }
    }
}

impl<T> Operation<T> {
    pub fn new<F, Fut>(f: F) -> Operation<T>
    where
        F: Fn(Swirl) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        Operation {
            run: Arc::new(move |swirl| f(swirl).boxed()),
        }
    }

    pub async fn execute(&self, swirl: &Swirl) -> Result<T> {
        (self.run)(swirl.clone()).await
    }
}

impl Swirl {
    /// Runs one operation against this handle.
    pub async fn run<T>(&self, operation: &Operation<T>) -> Result<T> {
        operation.execute(self).await
    }

    /// Runs operations in order on a single pinned connection. The first
    /// failure aborts the batch; earlier effects are not rolled back.
    pub async fn run_all<T>(&self, operations: &[Operation<T>]) -> Result<Vec<T>> {
        let pinned = self.sequential().await?;
        let mut results = Vec::with_capacity(operations.len());
        for operation in operations {
            results.push(operation.execute(&pinned).await?);
        }
        Ok(results)
    }
}

/// Builds operations out of a query.
pub trait Executable {
    /// SELECT, decoding each row into `T`. A query matching nothing
    /// yields an empty vector.
    fn result<T: FromRow + Send + 'static>(&self) -> Operation<Vec<T>>;

    /// INSERT of a single row following the query's projection.
    fn insert(&self, item: impl ToRow) -> Operation<u64>;

    /// Multi-row INSERT in one statement. Values are ordered row-major.
    fn insert_all<R: ToRow>(&self, items: impl IntoIterator<Item = R>) -> Operation<u64>;

    /// UPDATE of the projected columns on rows matching the query's
    /// predicate.
    fn update(&self, item: impl ToRow) -> Operation<u64>;

    /// DELETE of rows matching the query's predicate.
    fn delete(&self) -> Operation<u64>;

    /// UPDATE, then INSERT if nothing matched, both on one pinned
    /// connection. Not atomic: a writer on another handle can still
    /// slip between the two statements.
    fn upsert(&self, item: impl ToRow) -> Operation<u64>;
}

/// Write statements target exactly one table.
fn target_table(query: &Query) -> Result<Table> {
    query.dataset().as_table().cloned().ok_or_else(|| {
        DbError::Compile(CompileError::UnsupportedExpression(
            "write statement over a join".to_string(),
        ))
    })
}

fn affected(result: ExecResult) -> u64 {
    match result {
        ExecResult::Done { affected } => affected,
        ExecResult::Rows(result) => result.rows.len() as u64,
    }
}

impl Executable for Query {
    fn result<T: FromRow + Send + 'static>(&self) -> Operation<Vec<T>> {
        let query = self.clone();
        Operation::new(move |swirl: Swirl| {
            let query = query.clone();
            async move {
                let sql = swirl.dialect().compile_select(&query)?;
                match swirl.execute(sql).await? {
                    ExecResult::Rows(result) => result
                        .rows
                        .iter()
                        .map(|row| T::from_row(row))
                        .collect::<std::result::Result<Vec<T>, _>>()
                        .map_err(DbError::from),
                    ExecResult::Done { .. } => Ok(Vec::new()),
                }
            }
        })
    }

    fn insert(&self, item: impl ToRow) -> Operation<u64> {
        self.insert_all([item])
    }

    fn insert_all<R: ToRow>(&self, items: impl IntoIterator<Item = R>) -> Operation<u64> {
        let query = self.clone();
        let rows: Vec<Vec<Value>> = items.into_iter().map(ToRow::to_row).collect();
        Operation::new(move |swirl: Swirl| {
            let query = query.clone();
            let rows = rows.clone();
            async move {
                let table = target_table(&query)?;
                let sql = swirl
                    .dialect()
                    .compile_insert(&table, query.projection(), &rows)?;
                Ok(affected(swirl.execute(sql).await?))
            }
        })
    }

    fn update(&self, item: impl ToRow) -> Operation<u64> {
        let query = self.clone();
        let values = item.to_row();
        Operation::new(move |swirl: Swirl| {
            let query = query.clone();
            let values = values.clone();
            async move {
                let table = target_table(&query)?;
                let sql = swirl.dialect().compile_update(
                    &table,
                    query.projection(),
                    &values,
                    query.predicate(),
                )?;
                Ok(affected(swirl.execute(sql).await?))
            }
        })
    }

    fn delete(&self) -> Operation<u64> {
        let query = self.clone();
        Operation::new(move |swirl: Swirl| {
            let query = query.clone();
            async move {
                let table = target_table(&query)?;
                let sql = swirl
                    .dialect()
                    .compile_delete(&table, query.predicate())?;
                Ok(affected(swirl.execute(sql).await?))
            }
        })
    }

    fn upsert(&self, item: impl ToRow) -> Operation<u64> {
        let query = self.clone();
        let values = item.to_row();
        Operation::new(move |swirl: Swirl| {
            let query = query.clone();
            let values = values.clone();
            async move {
                let pinned = swirl.sequential().await?;
                let table = target_table(&query)?;

                let update = pinned.dialect().compile_update(
                    &table,
                    query.projection(),
                    &values,
                    query.predicate(),
                )?;
                let changed = affected(pinned.execute(update).await?);
                if changed > 0 {
                    return Ok(changed);
                }

                let insert = pinned
                    .dialect()
                    .compile_insert(&table, query.projection(), &[values])?;
                Ok(affected(pinned.execute(insert).await?))
            }
        })
    }
}
