//! The flat entry arena.
//!
//! # Overview
//!
//! An [`EntryArena`] owns every [`Entry`] of one document, keyed by [`Key`].
//! [`EntryArena::insert`] decomposes a nested JSON value into one entry per
//! node (scalars included), allocating keys pre-order so that a container's
//! key is always smaller than its children's. [`EntryArena::read`] rebuilds
//! the nested value from any key.
//!
//! Every insert allocates fresh keys and no operation grafts an existing key
//! under a second parent, so the entries always form a forest of trees.
//!
//! While a journal is open every write records the prior state of the key it
//! touches, so a failed transaction can be undone without copying the table.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::entry::{Entry, EntryKind, Scalar};
use crate::error::{Result, StoreError};
use crate::key::{Key, KeyAllocator};

/// Membership change applied to an array entry.
#[derive(Debug, Clone, PartialEq)]
pub enum ArraySplice {
    /// Normalize `value` and place it at `index`, or append when `None`.
    /// An index past the end appends.
    Insert { index: Option<usize>, value: Value },
    /// Remove `child` from the array and free its subtree.
    Delete { child: Key },
}

/// Prior state of one key: `None` if it did not exist.
type UndoRecord = (Key, Option<Entry>);

#[derive(Debug, Clone, Default)]
pub struct EntryArena {
    entries: BTreeMap<Key, Entry>,
    keys: KeyAllocator,
    journal: Option<Vec<UndoRecord>>,
}

impl EntryArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: Key) -> bool {
        self.entries.contains_key(&key)
    }

    /// Number of keys ever issued by this arena.
    pub fn issued_keys(&self) -> u64 {
        self.keys.issued()
    }

    // ── Insertion ─────────────────────────────────────────────────────────

    /// Normalize `value` into entries and return the key of its top node.
    ///
    /// Fails with [`StoreError::InvalidValue`] if `null` appears anywhere in
    /// `value`; nothing is added to the arena in that case.
    pub fn insert(&mut self, value: &Value) -> Result<Key> {
        let mut staged = Vec::new();
        let mut path = String::new();
        let key = self.stage(value, &mut path, &mut staged)?;
        for (staged_key, entry) in staged {
            self.record(staged_key, None);
            self.entries.insert(staged_key, entry);
        }
        Ok(key)
    }

    fn stage(
        &mut self,
        value: &Value,
        path: &mut String,
        staged: &mut Vec<(Key, Entry)>,
    ) -> Result<Key> {
        let (key, entry) = match value {
            Value::Null => {
                return Err(StoreError::InvalidValue { path: path.clone() });
            }
            Value::Object(map) => {
                let key = self.keys.next_key();
                let mut fields = IndexMap::with_capacity(map.len());
                for (name, child) in map {
                    let len = path.len();
                    push_pointer_token(path, name);
                    let child_key = self.stage(child, path, staged)?;
                    path.truncate(len);
                    fields.insert(name.clone(), child_key);
                }
                (key, Entry::Object(fields))
            }
            Value::Array(items) => {
                let key = self.keys.next_key();
                let mut children = Vec::with_capacity(items.len());
                for (index, child) in items.iter().enumerate() {
                    let len = path.len();
                    push_pointer_token(path, &index.to_string());
                    children.push(self.stage(child, path, staged)?);
                    path.truncate(len);
                }
                (key, Entry::Array(children))
            }
            Value::String(s) => (self.keys.next_key(), Entry::Primitive(Scalar::String(s.clone()))),
            Value::Number(n) => (self.keys.next_key(), Entry::Primitive(Scalar::Number(n.clone()))),
            Value::Bool(b) => (self.keys.next_key(), Entry::Primitive(Scalar::Boolean(*b))),
        };
        staged.push((key, entry));
        Ok(key)
    }

    // ── Lookup ────────────────────────────────────────────────────────────

    pub fn entry(&self, key: Key) -> Result<&Entry> {
        self.entries.get(&key).ok_or(StoreError::UnknownKey(key))
    }

    pub fn kind(&self, key: Key) -> Result<EntryKind> {
        self.entry(key).map(Entry::kind)
    }

    /// Direct child keys of `key`, in field or sequence order.
    pub fn children(&self, key: Key) -> Result<Vec<Key>> {
        self.entry(key).map(Entry::children)
    }

    /// Rebuild the nested value rooted at `key`.
    pub fn read(&self, key: Key) -> Result<Value> {
        match self.entry(key)? {
            Entry::Object(fields) => {
                let mut map = Map::with_capacity(fields.len());
                for (name, child) in fields {
                    map.insert(name.clone(), self.read(*child)?);
                }
                Ok(Value::Object(map))
            }
            Entry::Array(items) => items
                .iter()
                .map(|child| self.read(*child))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            Entry::Primitive(scalar) => Ok(scalar.to_value()),
        }
    }

    /// All entries in key order, which is also allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (Key, &Entry)> + '_ {
        self.entries.iter().map(|(key, entry)| (*key, entry))
    }

    // ── Mutation ──────────────────────────────────────────────────────────

    /// Replace the scalar of a primitive entry with a value of the same type.
    ///
    /// Any other value, `null` included, is a [`StoreError::TypeMismatch`].
    pub fn set_primitive(&mut self, key: Key, value: &Value) -> Result<()> {
        let entry = self
            .entries
            .get_mut(&key)
            .ok_or(StoreError::UnknownKey(key))?;
        let current = match entry {
            Entry::Primitive(current) => current,
            other => {
                return Err(StoreError::TypeMismatch {
                    key,
                    expected: "primitive",
                    found: other.kind().name(),
                })
            }
        };
        let expected = current.kind();
        let previous = match Scalar::from_value(value) {
            Some(next) if next.kind() == expected => std::mem::replace(current, next),
            _ => {
                return Err(StoreError::TypeMismatch {
                    key,
                    expected: expected.name(),
                    found: EntryKind::of_value(value).map_or("null", EntryKind::name),
                })
            }
        };
        self.record(key, Some(Entry::Primitive(previous)));
        Ok(())
    }

    /// Insert into or delete from an array entry.
    ///
    /// Returns the key of the inserted or deleted child.
    pub fn splice_array(&mut self, key: Key, splice: ArraySplice) -> Result<Key> {
        self.array_items(key)?;
        match splice {
            ArraySplice::Insert { index, value } => {
                let child = self.insert(&value)?;
                self.record_current(key);
                let items = self.array_items_mut(key)?;
                let at = index.map_or(items.len(), |i| i.min(items.len()));
                items.insert(at, child);
                Ok(child)
            }
            ArraySplice::Delete { child } => {
                let at = self
                    .array_items(key)?
                    .iter()
                    .position(|k| *k == child)
                    .ok_or(StoreError::UnknownKey(child))?;
                self.record_current(key);
                self.array_items_mut(key)?.remove(at);
                let freed = self.remove_subtree(child);
                tracing::debug!(array = %key, %child, freed, "deleted array element");
                Ok(child)
            }
        }
    }

    fn array_items(&self, key: Key) -> Result<&Vec<Key>> {
        match self.entry(key)? {
            Entry::Array(items) => Ok(items),
            other => Err(StoreError::TypeMismatch {
                key,
                expected: EntryKind::Array.name(),
                found: other.kind().name(),
            }),
        }
    }

    fn array_items_mut(&mut self, key: Key) -> Result<&mut Vec<Key>> {
        match self.entries.get_mut(&key) {
            Some(Entry::Array(items)) => Ok(items),
            Some(other) => Err(StoreError::TypeMismatch {
                key,
                expected: EntryKind::Array.name(),
                found: other.kind().name(),
            }),
            None => Err(StoreError::UnknownKey(key)),
        }
    }

    /// Remove `root` and everything below it. Returns the number of entries freed.
    fn remove_subtree(&mut self, root: Key) -> usize {
        let mut stack = vec![root];
        let mut freed = 0;
        while let Some(key) = stack.pop() {
            if let Some(entry) = self.entries.remove(&key) {
                freed += 1;
                stack.extend(entry.children());
                self.record(key, Some(entry));
            }
        }
        freed
    }

    // ── Rollback ──────────────────────────────────────────────────────────

    /// Start recording undo information, dropping any earlier journal.
    pub(crate) fn open_journal(&mut self) {
        self.journal = Some(Vec::new());
    }

    pub(crate) fn close_journal(&mut self) {
        self.journal = None;
    }

    /// Position to roll back to; `0` when no journal is open.
    pub(crate) fn journal_mark(&self) -> usize {
        self.journal.as_ref().map_or(0, Vec::len)
    }

    /// Undo every write recorded after `mark`, newest first. The key counter
    /// is left where it is so keys handed out meanwhile are never reused.
    pub(crate) fn rollback_to(&mut self, mark: usize) {
        let Some(journal) = self.journal.as_mut() else {
            return;
        };
        let undo = journal.split_off(mark.min(journal.len()));
        for (key, previous) in undo.into_iter().rev() {
            match previous {
                Some(entry) => {
                    self.entries.insert(key, entry);
                }
                None => {
                    self.entries.remove(&key);
                }
            }
        }
    }

    fn record(&mut self, key: Key, previous: Option<Entry>) {
        if let Some(journal) = self.journal.as_mut() {
            journal.push((key, previous));
        }
    }

    fn record_current(&mut self, key: Key) {
        if self.journal.is_some() {
            let previous = self.entries.get(&key).cloned();
            self.record(key, previous);
        }
    }
}

/// Append one RFC 6901 reference token to `path`.
fn push_pointer_token(path: &mut String, token: &str) {
    path.push('/');
    for ch in token.chars() {
        match ch {
            '~' => path.push_str("~0"),
            '/' => path.push_str("~1"),
            _ => path.push(ch),
        }
    }
}
