//! flatdoc: a normalized in-memory document store.
//!
//! A nested JSON-like value is decomposed into flat, individually keyed
//! entries so that every addressable unit of a document, down to a single
//! text value, can be referenced by key. On top of the flat arena sit typed
//! accessors and a store manager that batches mutations into transactions
//! and notifies listeners once per committed outermost transaction.
//!
//! - [`key`]: keys and the arena-local allocator
//! - [`entry`]: entry variants and their export records
//! - [`arena`]: normalization, rehydration and raw mutation
//! - [`accessor`]: typed `(store, key)` views
//! - [`store`]: transactions and update listeners
//! - [`inspect`]: debug export used by the `flatdoc-entries` binary

pub mod accessor;
pub mod arena;
pub mod entry;
pub mod error;
pub mod inspect;
pub mod key;
pub mod store;

pub use accessor::{
    AccessorValue, ArrayAccessor, BooleanAccessor, NumberAccessor, ObjectAccessor,
    StringAccessor,
};
pub use arena::{ArraySplice, EntryArena};
pub use entry::{Entry, EntryKind, EntryRecord, RecordValue, Scalar};
pub use error::{Result, StoreError};
pub use key::{Key, KeyAllocator, ParseKeyError};
pub use store::{ListenerId, Store, Transaction};
