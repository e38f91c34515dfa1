//! Compiled SQL fragments.
//!
//! A [`Sql`] pairs statement text with its ordered parameter list.
//! Fragments concatenate left to right and parameters follow, so the
//! final parameter order is exactly the depth-first order in which
//! literal leaves were rendered.

use crate::value::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct Sql {
    pub text: String,
    pub params: Vec<Value>,
}

impl Sql {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            params: Vec::new(),
        }
    }

    pub fn with_params(text: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            text: text.into(),
            params,
        }
    }

    /// Appends raw text, leaving parameters untouched.
    pub fn push(&mut self, text: &str) {
        self.text.push_str(text);
    }

    /// Appends another fragment, text and parameters both.
    pub fn append(&mut self, other: Sql) {
        self.text.push_str(&other.text);
        self.params.extend(other.params);
    }

    /// Joins fragments with a separator, concatenating parameters in
    /// fragment order.
    pub fn join(parts: impl IntoIterator<Item = Sql>, separator: &str) -> Sql {
        let mut out = Sql::new("");
        for (i, part) in parts.into_iter().enumerate() {
            if i > 0 {
                out.push(separator);
            }
            out.append(part);
        }
        out
    }
}
