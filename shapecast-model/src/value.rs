//! The typed runtime value.

use crate::instance::Instance;
use chrono::{DateTime, Utc};
use serde_json::Number;

/// A typed value held by an [`Instance`] field.
///
/// Plain input data (`serde_json::Value`) is converted into this
/// representation by the parse engine and back by the serialize engine.
/// `Opaque` carries the untouched plain value of a passthrough field.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    DateTime(DateTime<Utc>),
    BigInt(i128),
    Array(Vec<Value>),
    Instance(Instance),
    Opaque(serde_json::Value),
}

impl Value {
    /// The kind name used in error messages ("Expected string, received number").
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::DateTime(_) => "datetime",
            Self::BigInt(_) => "bigint",
            Self::Array(_) => "array",
            Self::Instance(_) => "object",
            Self::Opaque(_) => "opaque",
        }
    }

    /// Returns true for `Value::Null`.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the string slice if this is a `String`.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the boolean if this is a `Bool`.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the number as `f64` if this is a `Number`.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    /// Returns the number as `i64` if this is an integral `Number`.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    /// Returns the elements if this is an `Array`.
    #[must_use]
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the nested instance if this is an `Instance`.
    #[must_use]
    pub fn as_instance(&self) -> Option<&Instance> {
        match self {
            Self::Instance(inner) => Some(inner),
            _ => None,
        }
    }

    /// Returns the timestamp if this is a `DateTime`.
    #[must_use]
    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    /// Returns the large integer if this is a `BigInt`.
    #[must_use]
    pub fn as_bigint(&self) -> Option<i128> {
        match self {
            Self::BigInt(v) => Some(*v),
            _ => None,
        }
    }

    /// Creates a `Number` value from a float. `None` for NaN/infinity,
    /// which have no plain-data representation.
    #[must_use]
    pub fn from_f64(v: f64) -> Option<Self> {
        Number::from_f64(v).map(Self::Number)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Number(Number::from(v))
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Self::Number(Number::from(v))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Self::DateTime(v)
    }
}

impl From<i128> for Value {
    fn from(v: i128) -> Self {
        Self::BigInt(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Self::Array(v)
    }
}

impl From<Instance> for Value {
    fn from(v: Instance) -> Self {
        Self::Instance(v)
    }
}
