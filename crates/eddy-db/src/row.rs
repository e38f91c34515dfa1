//! Row encoding and decoding.
//!
//! [`FromRow`] turns a decoded value row into a Rust type; [`ToRow`]
//! goes the other way for inserts and updates. Tuples up to arity six
//! are covered so projections map onto plain Rust tuples without
//! ceremony.

use thiserror::Error;

use eddy_core::{FromValue, Value, ValueError};

#[derive(Error, Debug)]
pub enum RowError {
    #[error("expected {expected} columns, found {found}")]
    ColumnCount { expected: usize, found: usize },

    #[error("column {index}: {source}")]
    Column { index: usize, source: ValueError },
}

/// Decodes one result row, in projection order.
pub trait FromRow: Sized {
    fn from_row(row: &[Value]) -> Result<Self, RowError>;
}

/// Encodes one row of values, in projection order.
pub trait ToRow {
    fn to_row(self) -> Vec<Value>;
}

impl FromRow for Vec<Value> {
    fn from_row(row: &[Value]) -> Result<Self, RowError> {
        Ok(row.to_vec())
    }
}

impl ToRow for Vec<Value> {
    fn to_row(self) -> Vec<Value> {
        self
    }
}

macro_rules! impl_row_tuple {
    ($n:expr; $(($idx:tt, $t:ident)),+) => {
        impl<$($t: FromValue),+> FromRow for ($($t,)+) {
            fn from_row(row: &[Value]) -> Result<Self, RowError> {
                if row.len() != $n {
                    return Err(RowError::ColumnCount {
                        expected: $n,
                        found: row.len(),
                    });
                }
                Ok(($(
                    $t::from_value(row[$idx].clone())
                        .map_err(|source| RowError::Column { index: $idx, source })?,
                )+))
            }
        }

        impl<$($t: Into<Value>),+> ToRow for ($($t,)+) {
            fn to_row(self) -> Vec<Value> {
                vec![$(self.$idx.into()),+]
            }
        }
    };
}

impl_row_tuple!(1; (0, A));
impl_row_tuple!(2; (0, A), (1, B));
impl_row_tuple!(3; (0, A), (1, B), (2, C));
impl_row_tuple!(4; (0, A), (1, B), (2, C), (3, D));
impl_row_tuple!(5; (0, A), (1, B), (2, C), (3, D), (4, E));
impl_row_tuple!(6; (0, A), (1, B), (2, C), (3, D), (4, E), (5, F));
