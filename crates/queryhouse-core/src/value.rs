//! Column values.
//!
//! `Value` is the closed set of scalar values QueryHouse reads from and
//! writes to the database: `NULL`, integers, and bounded strings. Statements
//! are rendered as inline SQL literals rather than bound parameters; see
//! [`Value::sql_literal`] for the quoting rules.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single column value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Value {
    /// SQL `NULL`.
    Null,
    /// An integer column value (also carries foreign-key and primary-key ids).
    Int(i64),
    /// A bounded-string column value.
    Str(String),
}

impl Value {
    /// Returns the integer content, if any.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the string content, if any.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Whether this value is `NULL`.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Render this value as an inline SQL literal.
    ///
    /// Strings are single-quoted with embedded quotes doubled so the
    /// generated statement stays well-formed. Integers and `NULL` are
    /// rendered bare. The engine deliberately issues inline literals
    /// instead of bound parameters; the injection exposure that comes with
    /// that is a documented non-goal of this design, not an oversight.
    #[must_use]
    pub fn sql_literal(&self) -> String {
        match self {
            Value::Null => "NULL".to_string(),
            Value::Int(i) => i.to_string(),
            Value::Str(s) => format!("'{}'", s.replace('\'', "''")),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql_literal())
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}
