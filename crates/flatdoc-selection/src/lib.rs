//! Cursor resolution for flatdoc documents.
//!
//! The render layer tags every node it draws for a store entry with a marker
//! attribute holding the entry's key. From those markers a native text
//! selection can be turned into a [`Cursor`] of key paths, independent of
//! how the document happens to be rendered, and a stored cursor can be put
//! back onto the rendered tree after it changes.

pub mod cursor;
pub mod host;
pub mod memory;
pub mod resolver;

pub use cursor::{Cursor, Position};
pub use host::{NativePoint, NativeSelection, SelectionHost};
pub use memory::{MemoryTree, NodeId};
pub use resolver::{ApplyOutcome, CursorResolver, ResolverConfig, DEFAULT_MARKER_ATTRIBUTE};
