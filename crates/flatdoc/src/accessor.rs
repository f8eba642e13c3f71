//! Typed accessors over the entries of a [`Store`].
//!
//! An accessor is a `(store, key)` pair. It holds no data of its own, so it
//! is `Copy`, cheap to create, and always reads the current entry. Mutating
//! methods run inside [`Store::update`]: called from a mutator they join the
//! running transaction, called on their own they form one.
//!
//! | Variant                          | Entry kind | Operations                         |
//! |----------------------------------|------------|------------------------------------|
//! | [`ObjectAccessor`]               | object     | `get`, `has`, `fields`             |
//! | [`ArrayAccessor`]                | array      | `values`, `get`, `insert`, `delete`|
//! | [`StringAccessor`]               | string     | `get_value`, `set_value`           |
//! | [`NumberAccessor`]               | number     | `get_value`, `set_value`           |
//! | [`BooleanAccessor`]              | boolean    | `get_value`, `set_value`, `toggle` |

use serde_json::{Number, Value};

use crate::arena::ArraySplice;
use crate::entry::{Entry, EntryKind, Scalar};
use crate::error::{Result, StoreError};
use crate::key::Key;
use crate::store::Store;

// ── AccessorValue ──────────────────────────────────────────────────────────

/// An accessor of whichever variant matches the entry's kind.
#[derive(Debug, Clone, Copy)]
pub enum AccessorValue<'s> {
    Object(ObjectAccessor<'s>),
    Array(ArrayAccessor<'s>),
    String(StringAccessor<'s>),
    Number(NumberAccessor<'s>),
    Boolean(BooleanAccessor<'s>),
}

impl<'s> AccessorValue<'s> {
    /// Fails with [`StoreError::UnknownKey`] if `key` is not live.
    pub fn new(store: &'s Store, key: Key) -> Result<Self> {
        let kind = store.kind(key)?;
        Ok(match kind {
            EntryKind::Object => Self::Object(ObjectAccessor { store, key }),
            EntryKind::Array => Self::Array(ArrayAccessor { store, key }),
            EntryKind::String => Self::String(StringAccessor { store, key }),
            EntryKind::Number => Self::Number(NumberAccessor { store, key }),
            EntryKind::Boolean => Self::Boolean(BooleanAccessor { store, key }),
        })
    }

    pub fn key(&self) -> Key {
        match self {
            Self::Object(a) => a.key,
            Self::Array(a) => a.key,
            Self::String(a) => a.key,
            Self::Number(a) => a.key,
            Self::Boolean(a) => a.key,
        }
    }

    pub fn kind(&self) -> EntryKind {
        match self {
            Self::Object(_) => EntryKind::Object,
            Self::Array(_) => EntryKind::Array,
            Self::String(_) => EntryKind::String,
            Self::Number(_) => EntryKind::Number,
            Self::Boolean(_) => EntryKind::Boolean,
        }
    }

    /// Rehydrate the whole subtree.
    pub fn read(&self) -> Result<Value> {
        let store = match self {
            Self::Object(a) => a.store,
            Self::Array(a) => a.store,
            Self::String(a) => a.store,
            Self::Number(a) => a.store,
            Self::Boolean(a) => a.store,
        };
        store.read(self.key())
    }

    pub fn as_object(self) -> Result<ObjectAccessor<'s>> {
        match self {
            Self::Object(a) => Ok(a),
            other => Err(other.mismatch(EntryKind::Object)),
        }
    }

    pub fn as_array(self) -> Result<ArrayAccessor<'s>> {
        match self {
            Self::Array(a) => Ok(a),
            other => Err(other.mismatch(EntryKind::Array)),
        }
    }

    pub fn as_string(self) -> Result<StringAccessor<'s>> {
        match self {
            Self::String(a) => Ok(a),
            other => Err(other.mismatch(EntryKind::String)),
        }
    }

    pub fn as_number(self) -> Result<NumberAccessor<'s>> {
        match self {
            Self::Number(a) => Ok(a),
            other => Err(other.mismatch(EntryKind::Number)),
        }
    }

    pub fn as_boolean(self) -> Result<BooleanAccessor<'s>> {
        match self {
            Self::Boolean(a) => Ok(a),
            other => Err(other.mismatch(EntryKind::Boolean)),
        }
    }

    fn mismatch(&self, expected: EntryKind) -> StoreError {
        StoreError::TypeMismatch {
            key: self.key(),
            expected: expected.name(),
            found: self.kind().name(),
        }
    }
}

// ── ObjectAccessor ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub struct ObjectAccessor<'s> {
    store: &'s Store,
    key: Key,
}

impl<'s> ObjectAccessor<'s> {
    pub(crate) fn new(store: &'s Store, key: Key) -> Self {
        Self { store, key }
    }

    pub fn key(&self) -> Key {
        self.key
    }

    /// Accessor for the value stored under `field`.
    pub fn get(&self, field: &str) -> Result<AccessorValue<'s>> {
        let child = self.with_fields(|fields| fields.get(field).copied())?;
        let child = child.ok_or_else(|| StoreError::MissingField {
            key: self.key,
            field: field.to_owned(),
        })?;
        AccessorValue::new(self.store, child)
    }

    pub fn has(&self, field: &str) -> Result<bool> {
        self.with_fields(|fields| fields.contains_key(field))
    }

    /// Field names in their recorded order.
    pub fn fields(&self) -> Result<Vec<String>> {
        self.with_fields(|fields| fields.keys().cloned().collect())
    }

    pub fn read(&self) -> Result<Value> {
        self.store.read(self.key)
    }

    fn with_fields<R>(&self, f: impl FnOnce(&indexmap::IndexMap<String, Key>) -> R) -> Result<R> {
        self.store.with_arena(|arena| match arena.entry(self.key)? {
            Entry::Object(fields) => Ok(f(fields)),
            other => Err(StoreError::TypeMismatch {
                key: self.key,
                expected: EntryKind::Object.name(),
                found: other.kind().name(),
            }),
        })
    }
}

// ── ArrayAccessor ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub struct ArrayAccessor<'s> {
    store: &'s Store,
    key: Key,
}

impl<'s> ArrayAccessor<'s> {
    pub fn key(&self) -> Key {
        self.key
    }

    /// Child keys in array order.
    pub fn child_keys(&self) -> Result<Vec<Key>> {
        self.store.with_arena(|arena| match arena.entry(self.key)? {
            Entry::Array(items) => Ok(items.clone()),
            other => Err(StoreError::TypeMismatch {
                key: self.key,
                expected: EntryKind::Array.name(),
                found: other.kind().name(),
            }),
        })
    }

    /// One accessor per element, in array order.
    pub fn values(&self) -> Result<Vec<AccessorValue<'s>>> {
        self.child_keys()?
            .into_iter()
            .map(|child| AccessorValue::new(self.store, child))
            .collect()
    }

    /// Accessor for the element at `index`, if there is one.
    pub fn get(&self, index: usize) -> Result<Option<AccessorValue<'s>>> {
        match self.child_keys()?.get(index) {
            Some(child) => AccessorValue::new(self.store, *child).map(Some),
            None => Ok(None),
        }
    }

    pub fn len(&self) -> Result<usize> {
        self.child_keys().map(|items| items.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        self.len().map(|len| len == 0)
    }

    /// Append a freshly normalized `value`. Returns its key.
    pub fn insert(&self, value: &Value) -> Result<Key> {
        self.splice(ArraySplice::Insert {
            index: None,
            value: value.clone(),
        })
    }

    /// Insert a freshly normalized `value` at `index` (clamped to the length).
    pub fn insert_at(&self, index: usize, value: &Value) -> Result<Key> {
        self.splice(ArraySplice::Insert {
            index: Some(index),
            value: value.clone(),
        })
    }

    /// Remove `child` from this array; its subtree is freed.
    pub fn delete(&self, child: Key) -> Result<()> {
        self.splice(ArraySplice::Delete { child }).map(|_| ())
    }

    pub fn read(&self) -> Result<Value> {
        self.store.read(self.key)
    }

    fn splice(&self, splice: ArraySplice) -> Result<Key> {
        let key = self.key;
        self.store.update(|tx| tx.splice_array(key, splice))
    }
}

// ── Primitive accessors ────────────────────────────────────────────────────

/// Read the scalar behind `key`, requiring it to be of kind `expected`.
fn scalar(store: &Store, key: Key, expected: EntryKind) -> Result<Scalar> {
    store.with_arena(|arena| match arena.entry(key)? {
        Entry::Primitive(scalar) if scalar.kind() == expected => Ok(scalar.clone()),
        other => Err(StoreError::TypeMismatch {
            key,
            expected: expected.name(),
            found: other.kind().name(),
        }),
    })
}

fn set_scalar(store: &Store, key: Key, value: Value) -> Result<()> {
    store.update(|tx| tx.set_primitive(key, &value))
}

#[derive(Debug, Clone, Copy)]
pub struct StringAccessor<'s> {
    store: &'s Store,
    key: Key,
}

impl StringAccessor<'_> {
    pub fn key(&self) -> Key {
        self.key
    }

    pub fn get_value(&self) -> Result<String> {
        match scalar(self.store, self.key, EntryKind::String)? {
            Scalar::String(s) => Ok(s),
            other => Err(StoreError::TypeMismatch {
                key: self.key,
                expected: EntryKind::String.name(),
                found: other.kind().name(),
            }),
        }
    }

    pub fn set_value(&self, value: impl Into<String>) -> Result<()> {
        set_scalar(self.store, self.key, Value::String(value.into()))
    }

    /// Length in characters, the unit of cursor offsets.
    pub fn char_len(&self) -> Result<usize> {
        self.get_value().map(|s| s.chars().count())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct NumberAccessor<'s> {
    store: &'s Store,
    key: Key,
}

impl NumberAccessor<'_> {
    pub fn key(&self) -> Key {
        self.key
    }

    pub fn get_value(&self) -> Result<Number> {
        match scalar(self.store, self.key, EntryKind::Number)? {
            Scalar::Number(n) => Ok(n),
            other => Err(StoreError::TypeMismatch {
                key: self.key,
                expected: EntryKind::Number.name(),
                found: other.kind().name(),
            }),
        }
    }

    pub fn set_value(&self, value: impl Into<Number>) -> Result<()> {
        set_scalar(self.store, self.key, Value::Number(value.into()))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BooleanAccessor<'s> {
    store: &'s Store,
    key: Key,
}

impl BooleanAccessor<'_> {
    pub fn key(&self) -> Key {
        self.key
    }

    pub fn get_value(&self) -> Result<bool> {
        match scalar(self.store, self.key, EntryKind::Boolean)? {
            Scalar::Boolean(b) => Ok(b),
            other => Err(StoreError::TypeMismatch {
                key: self.key,
                expected: EntryKind::Boolean.name(),
                found: other.kind().name(),
            }),
        }
    }

    pub fn set_value(&self, value: bool) -> Result<()> {
        set_scalar(self.store, self.key, Value::Bool(value))
    }

    /// Flip the value in place. Returns the new value.
    pub fn toggle(&self) -> Result<bool> {
        self.store.update(|_| {
            let next = !self.get_value()?;
            self.set_value(next)?;
            Ok(next)
        })
    }
}
