//! Compilation errors.

use thiserror::Error;

/// Failure to compile a query into SQL.
#[derive(Error, Debug)]
pub enum CompileError {
    /// The dialect has no rendering for this expression shape.
    #[error("unsupported expression: {0}")]
    UnsupportedExpression(String),
}

pub type Result<T> = std::result::Result<T, CompileError>;
