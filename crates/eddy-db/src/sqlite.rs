//! The SQLite driver.
//!
//! Wraps a `rusqlite::Connection` behind a mutex and runs statements on
//! the blocking thread pool, since rusqlite's API is synchronous. The
//! special path `:memory:` opens a private in-memory database per
//! connection (`sqlite::memory:`); any other path opens a file.

use std::sync::{Arc, Mutex};

use futures::future::BoxFuture;
use futures::FutureExt;
use rusqlite::types::ValueRef;
use tokio::task;
use tracing::debug;
use url::Url;

use eddy_core::{Sql, Value};

use crate::driver::{Connection, Driver, ExecResult, QueryResult};
use crate::error::{DbError, Result};

#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteDriver;

impl SqliteDriver {
    pub fn new() -> Self {
        Self
    }
}

impl Driver for SqliteDriver {
    fn proto(&self) -> &'static str {
        "sqlite"
    }

    fn connect(&self, url: &Url) -> Result<Arc<dyn Connection>> {
        let path = url.path();
        let conn = if path == ":memory:" {
            rusqlite::Connection::open_in_memory()?
        } else {
            rusqlite::Connection::open(path)?
        };
        debug!("opened sqlite connection at {path}");
        Ok(Arc::new(SqliteConnection {
            inner: Arc::new(Mutex::new(conn)),
        }))
    }
}

pub struct SqliteConnection {
    inner: Arc<Mutex<rusqlite::Connection>>,
}

impl Connection for SqliteConnection {
    fn execute(&self, sql: Sql) -> BoxFuture<'static, Result<ExecResult>> {
        let inner = Arc::clone(&self.inner);
        async move {
            task::spawn_blocking(move || run_statement(&inner, sql))
                .await
                .map_err(|e| DbError::Execute(e.to_string()))?
        }
        .boxed()
    }
}

fn run_statement(
    inner: &Mutex<rusqlite::Connection>,
    sql: Sql,
) -> Result<ExecResult> {
    let conn = inner
        .lock()
        .map_err(|_| DbError::Execute("connection mutex poisoned".to_string()))?;
    let mut stmt = conn.prepare(&sql.text)?;
    let params = rusqlite::params_from_iter(sql.params.into_iter().map(to_sqlite));

    if stmt.column_count() > 0 {
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let mut rows = stmt.query(params)?;
        let mut collected = Vec::new();
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(columns.len());
            for i in 0..columns.len() {
                values.push(from_sqlite(row.get_ref(i)?));
            }
            collected.push(values);
        }
        Ok(ExecResult::Rows(QueryResult {
            columns,
            rows: collected,
        }))
    } else {
        let affected = stmt.execute(params)? as u64;
        Ok(ExecResult::Done { affected })
    }
}

fn to_sqlite(value: Value) -> rusqlite::types::Value {
    match value {
        Value::Null => rusqlite::types::Value::Null,
        // dialects coerce booleans already; map stragglers the same way
        Value::Bool(b) => rusqlite::types::Value::Integer(if b { 1 } else { 0 }),
        Value::Integer(i) => rusqlite::types::Value::Integer(i),
        Value::Real(r) => rusqlite::types::Value::Real(r),
        Value::Text(t) => rusqlite::types::Value::Text(t),
        Value::Blob(b) => rusqlite::types::Value::Blob(b),
    }
}

fn from_sqlite(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Integer(i),
        ValueRef::Real(r) => Value::Real(r),
        ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::Blob(b.to_vec()),
    }
}
