//! Fact values

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

/// Mapping of fact name to value, as supplied by callers
pub type Facts = HashMap<String, FactValue>;

/// A directly supplied (or placeholder derived) fact value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FactValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl FactValue {
    /// Truthiness used when a condition targets a boolean
    pub fn truthy(&self) -> bool {
        match self {
            FactValue::Bool(b) => *b,
            FactValue::Int(n) => *n != 0,
            FactValue::Float(f) => *f != 0.0,
            FactValue::Text(s) => !s.is_empty(),
        }
    }

    /// Numeric view, `None` for booleans and text
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FactValue::Int(n) => Some(*n as f64),
            FactValue::Float(f) => Some(*f),
            FactValue::Bool(_) | FactValue::Text(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FactValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, FactValue::Bool(_))
    }

    /// Numeric view where booleans count as 1 and 0, `None` for text
    fn numeric(&self) -> Option<f64> {
        match self {
            FactValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => self.as_f64(),
        }
    }

    /// Order two values of compatible kinds.
    ///
    /// Numbers compare numerically regardless of integer/float tag, and a
    /// boolean against a number compares as 1/0. Text compares only with
    /// text. Any other pairing, or a NaN operand, is incomparable.
    pub fn compare(&self, other: &FactValue) -> Option<Ordering> {
        match (self, other) {
            (FactValue::Int(a), FactValue::Int(b)) => Some(a.cmp(b)),
            (FactValue::Bool(a), FactValue::Bool(b)) => Some(a.cmp(b)),
            (FactValue::Text(a), FactValue::Text(b)) => Some(a.cmp(b)),
            _ => {
                let (a, b) = (self.numeric()?, other.numeric()?);
                a.partial_cmp(&b)
            }
        }
    }
}

impl fmt::Display for FactValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FactValue::Bool(b) => write!(f, "{}", b),
            FactValue::Int(n) => write!(f, "{}", n),
            FactValue::Float(x) => write!(f, "{}", x),
            FactValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<bool> for FactValue {
    fn from(value: bool) -> Self {
        FactValue::Bool(value)
    }
}

impl From<i64> for FactValue {
    fn from(value: i64) -> Self {
        FactValue::Int(value)
    }
}

impl From<i32> for FactValue {
    fn from(value: i32) -> Self {
        FactValue::Int(value as i64)
    }
}

impl From<f64> for FactValue {
    fn from(value: f64) -> Self {
        FactValue::Float(value)
    }
}

impl From<&str> for FactValue {
    fn from(value: &str) -> Self {
        FactValue::Text(value.to_string())
    }
}

impl From<String> for FactValue {
    fn from(value: String) -> Self {
        FactValue::Text(value)
    }
}
