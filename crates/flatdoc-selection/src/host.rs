//! The host tree and native selection the resolver reads and writes.
//!
//! A browser binding implements [`SelectionHost`] over the DOM and
//! `window.getSelection()`; [`MemoryTree`](crate::memory::MemoryTree) is an
//! in-process implementation. Offsets are in whatever unit the host's
//! selection API uses.

use std::fmt::Debug;

/// One end of a native selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativePoint<N> {
    pub node: N,
    pub offset: usize,
}

impl<N> NativePoint<N> {
    pub fn new(node: N, offset: usize) -> Self {
        Self { node, offset }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeSelection<N> {
    pub anchor: NativePoint<N>,
    pub focus: NativePoint<N>,
}

impl<N: Clone> NativeSelection<N> {
    pub fn new(anchor: NativePoint<N>, focus: NativePoint<N>) -> Self {
        Self { anchor, focus }
    }

    pub fn caret(point: NativePoint<N>) -> Self {
        Self {
            anchor: point.clone(),
            focus: point,
        }
    }
}

pub trait SelectionHost {
    type Node: Clone + PartialEq + Debug;

    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;

    /// Attribute `name` of an element. Always `None` for text nodes.
    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;

    /// First element in document order whose attribute `name` equals `value`.
    fn find_by_attribute(&self, name: &str, value: &str) -> Option<Self::Node>;

    fn first_text_child(&self, node: &Self::Node) -> Option<Self::Node>;

    /// Length of a text node, in selection offset units.
    fn text_len(&self, node: &Self::Node) -> usize;

    fn selection(&self) -> Option<NativeSelection<Self::Node>>;

    fn clear_selection(&mut self);

    fn set_selection(&mut self, selection: NativeSelection<Self::Node>);
}
