//! Logical cursor: a pair of key-path positions.
//!
//! A [`Position`] names the node being edited by the chain of keys leading to
//! it (outermost first) plus a character offset inside that node's text. A
//! [`Cursor`] pairs an anchor and a focus position; when both are equal it
//! is a caret, otherwise a range. Equality is structural.

use flatdoc::Key;
use serde::Serialize;

// ── Position ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Position {
    keys: Vec<Key>,
    offset: usize,
}

impl Position {
    /// `None` if `keys` is empty; a position always names at least one node.
    pub fn new(keys: Vec<Key>, offset: usize) -> Option<Self> {
        if keys.is_empty() {
            return None;
        }
        Some(Self { keys, offset })
    }

    /// Keys from outermost ancestor to the innermost node.
    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The node that owns the text.
    pub fn innermost(&self) -> Key {
        self.keys[self.keys.len() - 1]
    }

    /// `true` if `key` is the innermost node or one of its ancestors.
    pub fn is_within(&self, key: Key) -> bool {
        self.keys.contains(&key)
    }

    /// Same node, different offset.
    pub fn with_offset(&self, offset: usize) -> Self {
        Self {
            keys: self.keys.clone(),
            offset,
        }
    }
}

// ── Cursor ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Cursor {
    pub anchor: Position,
    pub focus: Position,
}

impl Cursor {
    pub fn new(anchor: Position, focus: Position) -> Self {
        Self { anchor, focus }
    }

    /// A collapsed cursor at `position`.
    pub fn caret(position: Position) -> Self {
        Self {
            anchor: position.clone(),
            focus: position,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    /// `true` when anchor and focus sit in the same node.
    pub fn is_within_one_node(&self) -> bool {
        self.anchor.keys == self.focus.keys
    }
}
