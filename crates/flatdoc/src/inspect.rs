//! Debug export of a store's entry table.
//!
//! Provides the logic behind the `flatdoc-entries` binary: parse a JSON
//! document, normalize it into a [`Store`], and print either the entry
//! records or the rehydrated document.

use std::fmt;

use serde_json::Value;

use crate::error::StoreError;
use crate::store::Store;

#[derive(Debug)]
pub enum InspectError {
    Json(serde_json::Error),
    Io(std::io::Error),
    Store(StoreError),
}

impl fmt::Display for InspectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InspectError::Json(e) => write!(f, "{e}"),
            InspectError::Io(e) => write!(f, "{e}"),
            InspectError::Store(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for InspectError {}

impl From<serde_json::Error> for InspectError {
    fn from(e: serde_json::Error) -> Self {
        InspectError::Json(e)
    }
}

impl From<std::io::Error> for InspectError {
    fn from(e: std::io::Error) -> Self {
        InspectError::Io(e)
    }
}

impl From<StoreError> for InspectError {
    fn from(e: StoreError) -> Self {
        InspectError::Store(e)
    }
}

/// What to print for a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InspectMode {
    /// `[{ "type", "key", "value" }, ...]` in key order.
    #[default]
    Entries,
    /// The document read back from its root key.
    Root,
}

/// Normalize the JSON document in `json` and render it per `mode`.
pub fn inspect_document(json: &str, mode: InspectMode) -> Result<String, InspectError> {
    let value: Value = serde_json::from_str(json)?;
    let store = Store::new(&value)?;
    tracing::info!(entries = store.len(), "document normalized");
    let out = match mode {
        InspectMode::Entries => serde_json::to_string_pretty(&store.export_entries())?,
        InspectMode::Root => serde_json::to_string_pretty(&store.value()?)?,
    };
    Ok(out)
}
