//! Typed wrappers over expressions.
//!
//! [`Typed<T>`] ties an expression to the Rust type its column is
//! expected to hold, so comparisons against values of another type fail
//! to compile instead of producing SQL the database rejects. The type
//! parameter is a phantom tag — it carries no runtime representation.

use std::marker::PhantomData;

use crate::expr::{Expr, FunctionName};
use crate::predicate::{BinaryOp, Predicate};
use crate::value::Value;

/// An expression with a statically asserted value type.
///
/// Obtained from [`Column::bind`](crate::Column::bind) or [`lit`].
#[derive(Debug, Clone, PartialEq)]
pub struct Typed<T> {
    expr: Expr,
    _type: PhantomData<T>,
}

/// Wraps a literal so it can take either side of a typed comparison.
pub fn lit<T: Into<Value>>(value: T) -> Typed<T> {
    Typed::from_expr(Expr::Literal(value.into()))
}

impl<T> Typed<T> {
    pub(crate) fn from_expr(expr: Expr) -> Self {
        Self {
            expr,
            _type: PhantomData,
        }
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    pub fn into_expr(self) -> Expr {
        self.expr
    }
}

impl<T: Into<Value>> Typed<T> {
    fn cmp_value(&self, op: BinaryOp, value: impl Into<T>) -> Predicate {
        Predicate::comparison(op, self.expr.clone(), Expr::Literal(value.into().into()))
    }

    fn cmp_expr(&self, op: BinaryOp, other: &Typed<T>) -> Predicate {
        Predicate::comparison(op, self.expr.clone(), other.expr.clone())
    }

    /// Null-safe equality (`IS` in the SQLite dialect).
    pub fn eq(&self, value: impl Into<T>) -> Predicate {
        self.cmp_value(BinaryOp::Eq, value)
    }

    pub fn ne(&self, value: impl Into<T>) -> Predicate {
        self.cmp_value(BinaryOp::Neq, value)
    }

    pub fn gt(&self, value: impl Into<T>) -> Predicate {
        self.cmp_value(BinaryOp::Gt, value)
    }

    pub fn lt(&self, value: impl Into<T>) -> Predicate {
        self.cmp_value(BinaryOp::Lt, value)
    }

    pub fn gte(&self, value: impl Into<T>) -> Predicate {
        self.cmp_value(BinaryOp::Gte, value)
    }

    pub fn lte(&self, value: impl Into<T>) -> Predicate {
        self.cmp_value(BinaryOp::Lte, value)
    }

    /// Compares against another expression of the same value type.
    pub fn eq_col(&self, other: &Typed<T>) -> Predicate {
        self.cmp_expr(BinaryOp::Eq, other)
    }

    pub fn ne_col(&self, other: &Typed<T>) -> Predicate {
        self.cmp_expr(BinaryOp::Neq, other)
    }

    pub fn gt_col(&self, other: &Typed<T>) -> Predicate {
        self.cmp_expr(BinaryOp::Gt, other)
    }

    pub fn lt_col(&self, other: &Typed<T>) -> Predicate {
        self.cmp_expr(BinaryOp::Lt, other)
    }

    pub fn gte_col(&self, other: &Typed<T>) -> Predicate {
        self.cmp_expr(BinaryOp::Gte, other)
    }

    pub fn lte_col(&self, other: &Typed<T>) -> Predicate {
        self.cmp_expr(BinaryOp::Lte, other)
    }
}

impl Typed<String> {
    pub fn like(&self, pattern: impl Into<String>) -> Predicate {
        Predicate::comparison(
            BinaryOp::Like,
            self.expr.clone(),
            Expr::Literal(Value::Text(pattern.into())),
        )
    }

    /// `UPPER(self)` — still string-typed.
    pub fn upper(&self) -> Typed<String> {
        Typed::from_expr(Expr::function(FunctionName::Upper, [self.expr.clone()]))
    }

    /// `LOWER(self)` — still string-typed.
    pub fn lower(&self) -> Typed<String> {
        Typed::from_expr(Expr::function(FunctionName::Lower, [self.expr.clone()]))
    }
}

impl<T> From<Typed<T>> for Expr {
    fn from(typed: Typed<T>) -> Self {
        typed.expr
    }
}
