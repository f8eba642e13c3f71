//! In-memory rendered tree implementing [`SelectionHost`].
//!
//! Nodes live in a flat vector and are addressed by [`NodeId`]. Elements
//! carry a tag and attributes; text nodes carry a string whose length is
//! counted in characters. Detached subtrees stay in the vector but are no
//! longer reachable from the root, so lookups ignore them.

use std::collections::BTreeMap;

use crate::host::{NativeSelection, SelectionHost};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
enum NodeData {
    Element {
        tag: String,
        attributes: BTreeMap<String, String>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
struct NodeRecord {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct MemoryTree {
    nodes: Vec<NodeRecord>,
    selection: Option<NativeSelection<NodeId>>,
    selection_writes: usize,
}

impl MemoryTree {
    /// A tree holding a single root element.
    pub fn new(root_tag: &str) -> Self {
        Self {
            nodes: vec![NodeRecord {
                data: NodeData::Element {
                    tag: root_tag.to_string(),
                    attributes: BTreeMap::new(),
                },
                parent: None,
                children: Vec::new(),
            }],
            selection: None,
            selection_writes: 0,
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn append_element(&mut self, parent: NodeId, tag: &str) -> NodeId {
        self.append(
            parent,
            NodeData::Element {
                tag: tag.to_string(),
                attributes: BTreeMap::new(),
            },
        )
    }

    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        self.append(parent, NodeData::Text(text.to_string()))
    }

    fn append(&mut self, parent: NodeId, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeRecord {
            data,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// No-op on text nodes.
    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let NodeData::Element { attributes, .. } = &mut self.nodes[node.0].data {
            attributes.insert(name.to_string(), value.to_string());
        }
    }

    /// Detach `node` and its subtree from its parent.
    pub fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.0].parent.take() {
            self.nodes[parent.0].children.retain(|child| *child != node);
        }
    }

    pub fn parent_of(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    pub fn tag(&self, node: NodeId) -> Option<&str> {
        match &self.nodes[node.0].data {
            NodeData::Element { tag, .. } => Some(tag),
            NodeData::Text(_) => None,
        }
    }

    pub fn text(&self, node: NodeId) -> Option<&str> {
        match &self.nodes[node.0].data {
            NodeData::Text(text) => Some(text),
            NodeData::Element { .. } => None,
        }
    }

    /// Concatenated text of `node`'s subtree in document order.
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            let record = &self.nodes[current.0];
            if let NodeData::Text(text) = &record.data {
                out.push_str(text);
            }
            stack.extend(record.children.iter().rev());
        }
        out
    }

    /// Number of times the selection was set or cleared.
    pub fn selection_writes(&self) -> usize {
        self.selection_writes
    }

    /// Attached nodes in document order.
    fn descendants(&self) -> impl Iterator<Item = NodeId> + '_ {
        let mut stack = vec![self.root()];
        std::iter::from_fn(move || {
            let current = stack.pop()?;
            stack.extend(self.nodes[current.0].children.iter().rev());
            Some(current)
        })
    }
}

impl SelectionHost for MemoryTree {
    type Node = NodeId;

    fn parent(&self, node: &NodeId) -> Option<NodeId> {
        self.parent_of(*node)
    }

    fn attribute(&self, node: &NodeId, name: &str) -> Option<String> {
        match &self.nodes[node.0].data {
            NodeData::Element { attributes, .. } => attributes.get(name).cloned(),
            NodeData::Text(_) => None,
        }
    }

    fn find_by_attribute(&self, name: &str, value: &str) -> Option<NodeId> {
        self.descendants()
            .find(|node| self.attribute(node, name).as_deref() == Some(value))
    }

    fn first_text_child(&self, node: &NodeId) -> Option<NodeId> {
        self.children(*node)
            .iter()
            .copied()
            .find(|child| self.text(*child).is_some())
    }

    fn text_len(&self, node: &NodeId) -> usize {
        self.text(*node).map_or(0, |text| text.chars().count())
    }

    fn selection(&self) -> Option<NativeSelection<NodeId>> {
        self.selection.clone()
    }

    fn clear_selection(&mut self) {
        self.selection = None;
        self.selection_writes += 1;
    }

    fn set_selection(&mut self, selection: NativeSelection<NodeId>) {
        self.selection = Some(selection);
        self.selection_writes += 1;
    }
}
