//! Field values.
//!
//! [Value] is the dynamically typed representation of anything a record field
//! may hold. Comparison between values is deliberately loose across numeric
//! representations: `SignedInt(3)`, `UnsignedInt(3)` and `Float(3.0)` are all
//! [Value::equivalent] to one another, which is what policy authors expect
//! when they write `owner_id = actor.id` without caring how either side was
//! produced.

use std::{
    cmp::Ordering,
    fmt::{Display, Formatter},
    hash::Hash,
};

use serde::{Deserialize, Serialize};

/// All value representations a record field may hold
#[derive(Debug, Clone, PartialOrd, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Value {
    /// An empty (null) value
    #[default]
    Null,
    /// A boolean
    Boolean(bool),
    /// A UTF-8 string
    String(String),
    /// A 128-bit signed integer
    SignedInt(i128),
    /// A 128-bit unsigned integer
    UnsignedInt(u128),
    /// A floating point number
    Float(f64),
    /// A byte buffer
    Bytes(Vec<u8>),
}

#[derive(Clone, Copy)]
enum Number {
    Signed(i128),
    Unsigned(u128),
    Float(f64),
}

impl Number {
    fn compare(self, other: Number) -> Option<Ordering> {
        match (self, other) {
            (Number::Signed(a), Number::Signed(b)) => Some(a.cmp(&b)),
            (Number::Unsigned(a), Number::Unsigned(b)) => Some(a.cmp(&b)),
            (Number::Signed(a), Number::Unsigned(b)) => Some(if a < 0 {
                Ordering::Less
            } else {
                (a as u128).cmp(&b)
            }),
            (Number::Unsigned(_), Number::Signed(_)) => {
                other.compare(self).map(Ordering::reverse)
            }
            (Number::Float(a), b) => a.partial_cmp(&b.as_float()),
            (a, Number::Float(b)) => a.as_float().partial_cmp(&b),
        }
    }

    fn as_float(self) -> f64 {
        match self {
            Number::Signed(value) => value as f64,
            Number::Unsigned(value) => value as f64,
            Number::Float(value) => value,
        }
    }
}

impl Value {
    /// True if this is [Value::Null]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Borrow the inner string, if this is a [Value::String]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(value) => Some(value),
            _ => None,
        }
    }

    fn as_number(&self) -> Option<Number> {
        match self {
            Value::SignedInt(value) => Some(Number::Signed(*value)),
            Value::UnsignedInt(value) => Some(Number::Unsigned(*value)),
            Value::Float(value) => Some(Number::Float(*value)),
            _ => None,
        }
    }

    /// Order two values. Numbers compare across their representations;
    /// values of unrelated kinds (e.g. a string and a number) have no order.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Null, Value::Null) => Some(Ordering::Equal),
            (Value::Boolean(a), Value::Boolean(b)) => Some(a.cmp(b)),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::Bytes(a), Value::Bytes(b)) => Some(a.cmp(b)),
            _ => match (self.as_number(), other.as_number()) {
                (Some(a), Some(b)) => a.compare(b),
                _ => None,
            },
        }
    }

    /// Loose equality used by restrictions and validators
    pub fn equivalent(&self, other: &Value) -> bool {
        self.compare(other) == Some(Ordering::Equal)
    }
}

impl Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Null => {}
            Value::Boolean(b) => b.hash(state),
            Value::String(s) => s.hash(state),
            Value::SignedInt(i) => i.hash(state),
            Value::UnsignedInt(u) => u.hash(state),
            Value::Float(f) => f.to_le_bytes().hash(state),
            Value::Bytes(b) => b.hash(state),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::SignedInt(a), Value::SignedInt(b)) => a == b,
            (Value::UnsignedInt(a), Value::UnsignedInt(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_le_bytes() == b.to_le_bytes(),
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Boolean(value) => write!(f, "{value}"),
            Value::String(value) => write!(f, "{value:?}"),
            Value::SignedInt(value) => write!(f, "{value}"),
            Value::UnsignedInt(value) => write!(f, "{value}"),
            Value::Float(value) => write!(f, "{value}"),
            Value::Bytes(value) => write!(f, "<{} bytes>", value.len()),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_owned())
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Bytes(value)
    }
}

impl From<i128> for Value {
    fn from(value: i128) -> Self {
        Value::SignedInt(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::SignedInt(value.into())
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::SignedInt(value.into())
    }
}

impl From<u128> for Value {
    fn from(value: u128) -> Self {
        Value::UnsignedInt(value)
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::UnsignedInt(value.into())
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::UnsignedInt(value.into())
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        Value::UnsignedInt(value as u128)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}
