//! The predicate algebra.
//!
//! Predicates form WHERE clauses compositionally. [`Predicate::Null`] is
//! the identity element ("no filter"); combining constants folds
//! algebraically so that statically decidable filters never reach the
//! compiler as trees.

use std::cmp::Ordering;
use std::ops::{BitAnd, BitOr, BitXor};

use crate::expr::Expr;
use crate::value::Value;

/// Binary operators usable in comparisons and compounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    And,
    Or,
    Xor,
    Eq,
    Neq,
    Like,
    Gt,
    Lt,
    Gte,
    Lte,
}

/// A WHERE-clause expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Absence of a filter. Identity for `and`/`or`.
    Null,
    /// A constant filter.
    Bool(bool),
    Comparison {
        op: BinaryOp,
        a: Expr,
        b: Expr,
    },
    Compound {
        op: BinaryOp,
        a: Box<Predicate>,
        b: Box<Predicate>,
    },
}

impl Predicate {
    /// Builds a comparison, folding to a constant when both operands are
    /// literals the operator can decide statically.
    pub fn comparison(op: BinaryOp, a: Expr, b: Expr) -> Predicate {
        if let (Expr::Literal(x), Expr::Literal(y)) = (&a, &b) {
            if let Some(known) = fold_comparison(op, x, y) {
                return Predicate::Bool(known);
            }
        }
        Predicate::Comparison { op, a, b }
    }

    fn compound(op: BinaryOp, a: Predicate, b: Predicate) -> Predicate {
        Predicate::Compound {
            op,
            a: Box::new(a),
            b: Box::new(b),
        }
    }

    /// Conjunction. `Null` is the identity; constants fold; a constant
    /// `false` annihilates the other side.
    pub fn and(self, other: Predicate) -> Predicate {
        match (self, other) {
            (Predicate::Null, Predicate::Null) => Predicate::Null,
            (Predicate::Null, p) => p,
            (p, Predicate::Null) => p,
            (Predicate::Bool(a), Predicate::Bool(b)) => Predicate::Bool(a && b),
            (p, Predicate::Bool(b)) | (Predicate::Bool(b), p) => {
                if b {
                    p
                } else {
                    Predicate::Bool(false)
                }
            }
            (a, b) => Predicate::compound(BinaryOp::And, a, b),
        }
    }

    /// Disjunction. `Null` is the identity; constants fold.
    ///
    /// When exactly one side is a boolean constant, the non-constant side
    /// is returned unchanged regardless of the constant's value — so
    /// `p.or(Bool(true))` is `p`, not `true`. This asymmetry versus
    /// [`and`](Self::and) is preserved deliberately; callers relying on a
    /// literal `true` to widen a filter must fold it themselves.
    pub fn or(self, other: Predicate) -> Predicate {
        match (self, other) {
            (Predicate::Null, Predicate::Null) => Predicate::Null,
            (Predicate::Null, p) => p,
            (p, Predicate::Null) => p,
            (Predicate::Bool(a), Predicate::Bool(b)) => Predicate::Bool(a || b),
            (p, Predicate::Bool(_)) | (Predicate::Bool(_), p) => p,
            (a, b) => Predicate::compound(BinaryOp::Or, a, b),
        }
    }

    /// Exclusive or. Only constant-constant pairs fold; `Null` operands
    /// are kept symbolically (rendered as a parameterized NULL).
    pub fn xor(self, other: Predicate) -> Predicate {
        match (self, other) {
            (Predicate::Bool(a), Predicate::Bool(b)) => Predicate::Bool(a != b),
            (a, b) => Predicate::compound(BinaryOp::Xor, a, b),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Predicate::Null)
    }
}

fn fold_comparison(op: BinaryOp, a: &Value, b: &Value) -> Option<bool> {
    // kinds the value ordering cannot relate stay symbolic, so the
    // database decides (after parameter coercion)
    let ordering = a.compare(b)?;
    match op {
        BinaryOp::Eq => Some(ordering == Ordering::Equal),
        BinaryOp::Neq => Some(ordering != Ordering::Equal),
        BinaryOp::Gt => Some(ordering == Ordering::Greater),
        BinaryOp::Lt => Some(ordering == Ordering::Less),
        BinaryOp::Gte => Some(ordering != Ordering::Less),
        BinaryOp::Lte => Some(ordering != Ordering::Greater),
        // LIKE and the logical operators never fold here
        _ => None,
    }
}

impl From<bool> for Predicate {
    fn from(b: bool) -> Self {
        Predicate::Bool(b)
    }
}

impl BitAnd for Predicate {
    type Output = Predicate;

    fn bitand(self, rhs: Predicate) -> Predicate {
        self.and(rhs)
    }
}

impl BitOr for Predicate {
    type Output = Predicate;

    fn bitor(self, rhs: Predicate) -> Predicate {
        self.or(rhs)
    }
}

impl BitXor for Predicate {
    type Output = Predicate;

    fn bitxor(self, rhs: Predicate) -> Predicate {
        self.xor(rhs)
    }
}
