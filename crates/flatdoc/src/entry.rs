//! Entry variants of the flat store.
//!
//! | Variant             | Holds                          | JSON view |
//! |---------------------|--------------------------------|-----------|
//! | `Entry::Object`     | ordered field name → child key | object    |
//! | `Entry::Array`      | ordered child keys             | array     |
//! | `Entry::Primitive`  | one [`Scalar`]                 | scalar    |

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::key::Key;

// ── EntryKind ──────────────────────────────────────────────────────────────

/// Runtime type tag of an entry (or of a JSON value about to become one).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Object,
    Array,
    String,
    Number,
    Boolean,
}

impl EntryKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Object => "object",
            Self::Array => "array",
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
        }
    }

    /// Classify a JSON value. `None` for `null`.
    pub fn of_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Bool(_) => Some(Self::Boolean),
            Value::Number(_) => Some(Self::Number),
            Value::String(_) => Some(Self::String),
            Value::Array(_) => Some(Self::Array),
            Value::Object(_) => Some(Self::Object),
        }
    }

    pub fn is_primitive(self) -> bool {
        matches!(self, Self::String | Self::Number | Self::Boolean)
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ── Scalar ─────────────────────────────────────────────────────────────────

/// The single value held by a primitive entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    String(String),
    Number(Number),
    Boolean(bool),
}

impl Scalar {
    /// Convert a JSON scalar. Containers and `null` yield `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Self::String(s.clone())),
            Value::Number(n) => Some(Self::Number(n.clone())),
            Value::Bool(b) => Some(Self::Boolean(*b)),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    pub fn kind(&self) -> EntryKind {
        match self {
            Self::String(_) => EntryKind::String,
            Self::Number(_) => EntryKind::Number,
            Self::Boolean(_) => EntryKind::Boolean,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Self::String(s) => Value::String(s.clone()),
            Self::Number(n) => Value::Number(n.clone()),
            Self::Boolean(b) => Value::Bool(*b),
        }
    }
}

// ── Entry ──────────────────────────────────────────────────────────────────

/// One flat node of the normalized document.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    Object(IndexMap<String, Key>),
    Array(Vec<Key>),
    Primitive(Scalar),
}

impl Entry {
    pub fn kind(&self) -> EntryKind {
        match self {
            Self::Object(_) => EntryKind::Object,
            Self::Array(_) => EntryKind::Array,
            Self::Primitive(scalar) => scalar.kind(),
        }
    }

    /// Direct child keys, in field or sequence order. Empty for primitives.
    pub fn children(&self) -> Vec<Key> {
        match self {
            Self::Object(fields) => fields.values().copied().collect(),
            Self::Array(items) => items.clone(),
            Self::Primitive(_) => Vec::new(),
        }
    }

    pub fn to_record(&self, key: Key) -> EntryRecord {
        let value = match self {
            Self::Object(fields) => RecordValue::Object(fields.clone()),
            Self::Array(items) => RecordValue::Array(items.clone()),
            Self::Primitive(scalar) => RecordValue::Primitive(scalar.clone()),
        };
        EntryRecord {
            kind: self.kind(),
            key,
            value,
        }
    }
}

// ── EntryRecord ────────────────────────────────────────────────────────────

/// Export form of an entry: `{ "type": ..., "key": ..., "value": ... }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryRecord {
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub key: Key,
    pub value: RecordValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordValue {
    Object(IndexMap<String, Key>),
    Array(Vec<Key>),
    Primitive(Scalar),
}
