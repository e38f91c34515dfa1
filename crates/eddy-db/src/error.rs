//! Execution errors.

use thiserror::Error;

use eddy_core::CompileError;

use crate::row::RowError;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("query compilation failed: {0}")]
    Compile(#[from] CompileError),

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("row decoding failed: {0}")]
    Row(#[from] RowError),

    #[error("no driver registered for scheme '{0}'")]
    NoDriver(String),

    #[error("no dialect registered for scheme '{0}'")]
    NoDialect(String),

    #[error("invalid connection url: {0}")]
    InvalidUrl(String),

    #[error("connection pool is closed")]
    PoolClosed,

    #[error("execution failed: {0}")]
    Execute(String),
}

pub type Result<T> = std::result::Result<T, DbError>;
