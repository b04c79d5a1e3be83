//! Typed values
//!
//! Values flow both ways: request arguments are `Value`s handed to field
//! encoders, and decoded responses are ordered `Record`s of `Value`s.

use std::fmt;

use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use uuid::Uuid;

/// Ordered mapping from field name to decoded value
pub type Record = IndexMap<String, Value>;

/// A single field value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Int(u64),
    Bool(bool),
    Text(String),
    Uuid(Uuid),
    UuidList(Vec<Uuid>),
    IntList(Vec<u64>),
    /// Decoded batch region, one record per item
    Records(Vec<Record>),
}

impl Value {
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_uuid(&self) -> Option<Uuid> {
        match self {
            Value::Uuid(u) => Some(*u),
            _ => None,
        }
    }

    pub fn as_records(&self) -> Option<&[Record]> {
        match self {
            Value::Records(r) => Some(r),
            _ => None,
        }
    }

    /// Short type label used in error messages and help output
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Int(_) => "integer",
            Value::Bool(_) => "boolean",
            Value::Text(_) => "text",
            Value::Uuid(_) => "uuid",
            Value::UuidList(_) => "uuid list",
            Value::IntList(_) => "integer list",
            Value::Records(_) => "records",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{}", v),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Text(s) => f.write_str(s),
            Value::Uuid(u) => write!(f, "{}", u),
            Value::UuidList(list) => {
                let items: Vec<String> = list.iter().map(Uuid::to_string).collect();
                write!(f, "[{}]", items.join(", "))
            }
            Value::IntList(list) => {
                let items: Vec<String> = list.iter().map(u64::to_string).collect();
                write!(f, "[{}]", items.join(", "))
            }
            Value::Records(records) => write!(f, "<{} records>", records.len()),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Int(v) => serializer.serialize_u64(*v),
            Value::Bool(v) => serializer.serialize_bool(*v),
            Value::Text(s) => serializer.serialize_str(s),
            Value::Uuid(u) => u.serialize(serializer),
            Value::UuidList(list) => list.serialize(serializer),
            Value::IntList(list) => list.serialize(serializer),
            Value::Records(records) => records.serialize(serializer),
        }
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::Int(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(u64::from(v))
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Value::Uuid(v)
    }
}

/// Arguments for one request: positional values plus values bound by field name
#[derive(Debug, Clone, Default)]
pub struct Args {
    pub positional: Vec<Value>,
    pub named: Vec<(String, Value)>,
}

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a positional argument
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Bind an argument to a field by name
    pub fn named(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.named.push((name.into(), value.into()));
        self
    }

    pub fn len(&self) -> usize {
        self.positional.len() + self.named.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<V: Into<Value>> FromIterator<V> for Args {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Self {
            positional: iter.into_iter().map(Into::into).collect(),
            named: Vec::new(),
        }
    }
}
