//! Store manager and change notifier.
//!
//! # Overview
//!
//! A [`Store`] owns one [`EntryArena`] and its root key. All mutation goes
//! through [`Store::update`], which hands the mutator a [`Transaction`].
//! Updates nest: a mutator (or an accessor method it calls) may open further
//! updates, and listeners run once, in registration order, when the
//! outermost update returns successfully.
//!
//! ## Failure policy
//!
//! Each `update` level is all-or-nothing. The outermost level opens an undo
//! journal in the arena and every level remembers where in it it started; if
//! a mutator returns `Err`, the writes recorded since that mark are undone
//! and the error is passed through. A failed outermost update notifies
//! nobody. Keys issued inside a failed update stay burned.
//!
//! The store is single-threaded (`!Send`, `!Sync`). Listeners may read the
//! store and may start new updates.

mod events;

pub use events::ListenerId;

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use crate::accessor::{AccessorValue, ObjectAccessor};
use crate::arena::{ArraySplice, EntryArena};
use crate::entry::{Entry, EntryKind, EntryRecord};
use crate::error::{Result, StoreError};
use crate::key::Key;
use events::Listeners;

pub struct Store {
    arena: RefCell<EntryArena>,
    root: Key,
    depth: Cell<usize>,
    listeners: RefCell<Listeners>,
}

impl Store {
    /// Create a store whose root is the normalized form of `value`.
    ///
    /// The root must be an object.
    pub fn new(value: &Value) -> Result<Self> {
        let mut arena = EntryArena::new();
        let root = arena.insert(value)?;
        let kind = arena.kind(root)?;
        if kind != EntryKind::Object {
            return Err(StoreError::TypeMismatch {
                key: root,
                expected: EntryKind::Object.name(),
                found: kind.name(),
            });
        }
        Ok(Self {
            arena: RefCell::new(arena),
            root,
            depth: Cell::new(0),
            listeners: RefCell::new(Listeners::default()),
        })
    }

    pub fn root_key(&self) -> Key {
        self.root
    }

    pub fn root_value(&self) -> ObjectAccessor<'_> {
        ObjectAccessor::new(self, self.root)
    }

    /// Typed accessor for any live key.
    pub fn accessor(&self, key: Key) -> Result<AccessorValue<'_>> {
        AccessorValue::new(self, key)
    }

    /// Fully rehydrated document.
    pub fn value(&self) -> Result<Value> {
        self.read(self.root)
    }

    pub fn read(&self, key: Key) -> Result<Value> {
        self.arena.borrow().read(key)
    }

    pub fn entry(&self, key: Key) -> Result<Entry> {
        self.arena.borrow().entry(key).cloned()
    }

    pub fn kind(&self, key: Key) -> Result<EntryKind> {
        self.arena.borrow().kind(key)
    }

    pub fn contains(&self, key: Key) -> bool {
        self.arena.borrow().contains(key)
    }

    pub fn len(&self) -> usize {
        self.arena.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.borrow().is_empty()
    }

    /// Every live entry in key order.
    pub fn entries(&self) -> Vec<(Key, Entry)> {
        self.arena
            .borrow()
            .iter()
            .map(|(key, entry)| (key, entry.clone()))
            .collect()
    }

    /// Every live entry in its export form.
    pub fn export_entries(&self) -> Vec<EntryRecord> {
        self.arena
            .borrow()
            .iter()
            .map(|(key, entry)| entry.to_record(key))
            .collect()
    }

    pub(crate) fn with_arena<R>(&self, f: impl FnOnce(&EntryArena) -> R) -> R {
        f(&self.arena.borrow())
    }

    // ── Transactions ──────────────────────────────────────────────────────

    /// Current nesting depth; `0` when idle.
    pub fn depth(&self) -> usize {
        self.depth.get()
    }

    pub fn is_in_transaction(&self) -> bool {
        self.depth.get() > 0
    }

    /// Run `mutator` as a transaction.
    ///
    /// On `Ok` from the outermost level every listener is invoked once.
    /// On `Err` the changes made by this level are undone.
    pub fn update<T, E, F>(&self, mutator: F) -> Result<T, E>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T, E>,
    {
        let outermost = self.depth.get() == 0;
        let mark = {
            let mut arena = self.arena.borrow_mut();
            if outermost {
                arena.open_journal();
            }
            arena.journal_mark()
        };
        let outcome = {
            let _guard = DepthGuard::enter(&self.depth);
            mutator(&Transaction { store: self })
        };
        match outcome {
            Ok(value) => {
                if outermost {
                    self.arena.borrow_mut().close_journal();
                    tracing::debug!(entries = self.len(), "transaction committed");
                    self.notify();
                }
                Ok(value)
            }
            Err(err) => {
                {
                    let mut arena = self.arena.borrow_mut();
                    arena.rollback_to(mark);
                    if outermost {
                        arena.close_journal();
                    }
                }
                tracing::debug!(depth = self.depth.get(), "transaction rolled back");
                Err(err)
            }
        }
    }

    // ── Listeners ─────────────────────────────────────────────────────────

    pub fn add_update_listener<F>(&self, listener: F) -> ListenerId
    where
        F: Fn() + 'static,
    {
        self.listeners.borrow_mut().add(Rc::new(listener))
    }

    /// Returns `false` if `id` was not registered.
    pub fn remove_update_listener(&self, id: ListenerId) -> bool {
        self.listeners.borrow_mut().remove(id)
    }

    fn notify(&self) {
        let listeners = self.listeners.borrow().snapshot();
        tracing::trace!(listeners = listeners.len(), "notifying update listeners");
        for listener in listeners {
            listener();
        }
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("root", &self.root)
            .field("entries", &self.len())
            .field("depth", &self.depth.get())
            .field("listeners", &self.listeners.borrow().len())
            .finish()
    }
}

/// Keeps the depth counter balanced even if the mutator panics.
struct DepthGuard<'a>(&'a Cell<usize>);

impl<'a> DepthGuard<'a> {
    fn enter(depth: &'a Cell<usize>) -> Self {
        depth.set(depth.get() + 1);
        Self(depth)
    }
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.0.set(self.0.get() - 1);
    }
}

// ── Transaction ────────────────────────────────────────────────────────────

/// Mutation surface handed to an [`Store::update`] mutator.
pub struct Transaction<'s> {
    store: &'s Store,
}

impl<'s> Transaction<'s> {
    /// The owning store, for nested updates and accessor calls.
    pub fn store(&self) -> &'s Store {
        self.store
    }

    pub fn root_value(&self) -> ObjectAccessor<'s> {
        self.store.root_value()
    }

    pub fn read(&self, key: Key) -> Result<Value> {
        self.store.read(key)
    }

    pub fn set_primitive(&self, key: Key, value: &Value) -> Result<()> {
        self.store.arena.borrow_mut().set_primitive(key, value)
    }

    pub fn splice_array(&self, key: Key, splice: ArraySplice) -> Result<Key> {
        self.store.arena.borrow_mut().splice_array(key, splice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn counter(store: &Store) -> Rc<Cell<usize>> {
        let count = Rc::new(Cell::new(0));
        let seen = Rc::clone(&count);
        store.add_update_listener(move || seen.set(seen.get() + 1));
        count
    }

    #[test]
    fn root_must_be_an_object() {
        assert!(matches!(
            Store::new(&json!([1])),
            Err(StoreError::TypeMismatch { expected: "object", found: "array", .. })
        ));
        assert!(matches!(
            Store::new(&Value::Null),
            Err(StoreError::InvalidValue { .. })
        ));
    }

    #[test]
    fn update_notifies_once() {
        let store = Store::new(&json!({ "n": 1 })).unwrap();
        let count = counter(&store);
        let n = store.root_value().get("n").unwrap().key();
        store
            .update(|tx| tx.set_primitive(n, &json!(2)))
            .unwrap();
        assert_eq!(count.get(), 1);
        assert_eq!(store.value().unwrap(), json!({ "n": 2 }));
    }

    #[test]
    fn nested_updates_collapse_into_one_notification() {
        let store = Store::new(&json!({ "n": 0 })).unwrap();
        let count = counter(&store);
        let n = store.root_value().get("n").unwrap().key();
        store
            .update(|tx| {
                assert_eq!(tx.store().depth(), 1);
                tx.store().update(|inner| {
                    assert_eq!(inner.store().depth(), 2);
                    inner.set_primitive(n, &json!(1))?;
                    inner.store().update(|deepest| deepest.set_primitive(n, &json!(2)))
                })?;
                assert_eq!(count.get(), 0);
                Ok::<_, StoreError>(())
            })
            .unwrap();
        assert_eq!(count.get(), 1);
        assert_eq!(store.depth(), 0);
    }

    #[test]
    fn unchanged_commit_still_notifies() {
        let store = Store::new(&json!({})).unwrap();
        let count = counter(&store);
        store.update(|_| Ok::<_, StoreError>(())).unwrap();
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn failed_update_rolls_back_and_stays_silent() {
        let store = Store::new(&json!({ "n": 1, "list": [] })).unwrap();
        let count = counter(&store);
        let root = store.root_value();
        let n = root.get("n").unwrap().key();
        let list = root.get("list").unwrap().key();

        let err = store
            .update(|tx| {
                tx.set_primitive(n, &json!(5))?;
                tx.splice_array(list, ArraySplice::Insert { index: None, value: json!("x") })?;
                tx.set_primitive(list, &json!(0))
            })
            .unwrap_err();

        assert!(matches!(err, StoreError::TypeMismatch { .. }));
        assert_eq!(store.value().unwrap(), json!({ "n": 1, "list": [] }));
        assert_eq!(count.get(), 0);
        assert!(!store.is_in_transaction());
    }

    #[test]
    fn failed_inner_update_rolls_back_only_its_own_changes() {
        let store = Store::new(&json!({ "a": 0, "b": 0 })).unwrap();
        let count = counter(&store);
        let root = store.root_value();
        let a = root.get("a").unwrap().key();
        let b = root.get("b").unwrap().key();

        store
            .update(|tx| {
                tx.set_primitive(a, &json!(1))?;
                let inner = tx.store().update(|inner| {
                    inner.set_primitive(b, &json!(1))?;
                    inner.set_primitive(b, &json!("wrong type"))
                });
                assert!(inner.is_err());
                Ok::<_, StoreError>(())
            })
            .unwrap();

        assert_eq!(store.value().unwrap(), json!({ "a": 1, "b": 0 }));
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn nested_levels_share_one_journal() {
        let store = Store::new(&json!({ "n": 0 })).unwrap();
        let n = store.root_value().get("n").unwrap().key();
        store
            .update(|tx| {
                tx.set_primitive(n, &json!(1))?;
                let outer_mark = tx.store().with_arena(EntryArena::journal_mark);
                assert_eq!(outer_mark, 1);
                tx.store().update(|inner| {
                    inner.set_primitive(n, &json!(2))?;
                    assert_eq!(inner.store().with_arena(EntryArena::journal_mark), 2);
                    Ok::<_, StoreError>(())
                })
            })
            .unwrap();
        assert_eq!(store.with_arena(EntryArena::journal_mark), 0);
        assert_eq!(store.value().unwrap(), json!({ "n": 2 }));
    }

    #[test]
    fn removed_listener_is_not_called() {
        let store = Store::new(&json!({})).unwrap();
        let count = Rc::new(Cell::new(0));
        let seen = Rc::clone(&count);
        let id = store.add_update_listener(move || seen.set(seen.get() + 1));
        assert!(store.remove_update_listener(id));
        store.update(|_| Ok::<_, StoreError>(())).unwrap();
        assert_eq!(count.get(), 0);
        assert!(!store.remove_update_listener(id));
    }

    #[test]
    fn listeners_run_in_registration_order_and_see_committed_state() {
        let store = Rc::new(Store::new(&json!({ "n": 0 })).unwrap());
        let n = store.root_value().get("n").unwrap().key();
        let log = Rc::new(RefCell::new(Vec::new()));
        for tag in ["first", "second"] {
            let log = Rc::clone(&log);
            let observed = Rc::clone(&store);
            store.add_update_listener(move || {
                let value = observed.read(n).unwrap();
                log.borrow_mut().push((tag, value));
            });
        }
        store
            .update(|tx| tx.set_primitive(n, &json!(7)))
            .unwrap();
        assert_eq!(
            *log.borrow(),
            vec![("first", json!(7)), ("second", json!(7))]
        );
    }

    #[test]
    fn export_entries_lists_records_in_key_order() {
        let store = Store::new(&json!({ "text": "hi" })).unwrap();
        let records = serde_json::to_value(store.export_entries()).unwrap();
        assert_eq!(
            records,
            json!([
                { "type": "object", "key": "0", "value": { "text": "1" } },
                { "type": "string", "key": "1", "value": "hi" }
            ])
        );
    }
}
