#![allow(dead_code)]

use std::fs;
use std::path::Path;

use flatdoc::{AccessorValue, Store};
use flatdoc_selection::{MemoryTree, NodeId, DEFAULT_MARKER_ATTRIBUTE};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("flatdoc_selection=info".parse().unwrap()),
        )
        .with_test_writer()
        .try_init();
}

pub fn read_fixture(name: &str) -> Value {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures").join(name);
    let data = fs::read_to_string(&path).unwrap_or_else(|e| panic!("failed to read {:?}: {e}", path));
    serde_json::from_str(&data).unwrap_or_else(|e| panic!("failed to parse {:?}: {e}", path))
}

/// Minimal render adapter: one element per entry, each tagged with its key.
/// Strings and numbers become `<span>` elements holding their text.
pub fn render(store: &Store) -> MemoryTree {
    let mut tree = MemoryTree::new("body");
    let root = tree.root();
    render_value(&mut tree, root, AccessorValue::Object(store.root_value()));
    tree
}

fn render_value(tree: &mut MemoryTree, parent: NodeId, value: AccessorValue<'_>) {
    let tag = match value {
        AccessorValue::Object(_) | AccessorValue::Array(_) => "div",
        AccessorValue::String(_) | AccessorValue::Number(_) => "span",
        AccessorValue::Boolean(_) => "input",
    };
    let element = tree.append_element(parent, tag);
    tree.set_attribute(element, DEFAULT_MARKER_ATTRIBUTE, &value.key().to_string());
    match value {
        AccessorValue::Object(object) => {
            for field in object.fields().unwrap() {
                render_value(tree, element, object.get(&field).unwrap());
            }
        }
        AccessorValue::Array(array) => {
            for item in array.values().unwrap() {
                render_value(tree, element, item);
            }
        }
        AccessorValue::String(s) => {
            tree.append_text(element, &s.get_value().unwrap());
        }
        AccessorValue::Number(n) => {
            tree.append_text(element, &n.get_value().unwrap().to_string());
        }
        AccessorValue::Boolean(b) => {
            tree.set_attribute(element, "checked", &b.get_value().unwrap().to_string());
        }
    }
}

/// Text node rendered for the string entry `key`.
pub fn text_node_of(tree: &MemoryTree, key: flatdoc::Key) -> NodeId {
    use flatdoc_selection::SelectionHost;
    let element = tree
        .find_by_attribute(DEFAULT_MARKER_ATTRIBUTE, &key.to_string())
        .unwrap_or_else(|| panic!("key {key} not rendered"));
    tree.first_text_child(&element)
        .unwrap_or_else(|| panic!("key {key} has no text"))
}
