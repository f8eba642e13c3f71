use thiserror::Error;

use crate::key::Key;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// `null`, or a value with no entry representation, at `path` (a JSON Pointer).
    #[error("invalid value at {path:?}: null is not allowed")]
    InvalidValue { path: String },
    #[error("unknown key {0}")]
    UnknownKey(Key),
    /// `expected` names what the operation needs: an entry kind, or
    /// `"primitive"` when any scalar entry would do. `found` is the kind
    /// actually present, or `"null"` for a rejected write.
    #[error("type mismatch at key {key}: expected {expected}, found {found}")]
    TypeMismatch {
        key: Key,
        expected: &'static str,
        found: &'static str,
    },
    #[error("missing field {field:?} on object {key}")]
    MissingField { key: Key, field: String },
}

pub type Result<T, E = StoreError> = std::result::Result<T, E>;
