//! Entry keys and the arena-local key allocator.
//!
//! A [`Key`] is issued once per entry and never reissued, even after the
//! entry is deleted or the transaction that created it is rolled back.
//! Its textual form (`"0"`, `"1"`, ...) is what the render layer writes into
//! marker attributes, so it round-trips through [`Key::from_str`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ── Key ────────────────────────────────────────────────────────────────────

/// Opaque identifier of one entry inside one store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Key(u64);

impl Key {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned when a marker string is not a key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid key: {0:?}")]
pub struct ParseKeyError(pub String);

impl FromStr for Key {
    type Err = ParseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // `u64::from_str` accepts a leading '+', which is never emitted.
        if s.starts_with('+') {
            return Err(ParseKeyError(s.to_owned()));
        }
        s.parse::<u64>()
            .map(Key)
            .map_err(|_| ParseKeyError(s.to_owned()))
    }
}

impl Serialize for Key {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Key {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ── KeyAllocator ───────────────────────────────────────────────────────────

/// Monotonic key counter owned by a single arena.
#[derive(Debug, Clone, Default)]
pub struct KeyAllocator {
    next: u64,
}

impl KeyAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next key.
    pub fn next_key(&mut self) -> Key {
        let key = Key(self.next);
        self.next += 1;
        key
    }

    /// Number of keys issued so far.
    pub fn issued(&self) -> u64 {
        self.next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocator_is_monotonic() {
        let mut alloc = KeyAllocator::new();
        let a = alloc.next_key();
        let b = alloc.next_key();
        assert!(a < b);
        assert_eq!(alloc.issued(), 2);
    }

    #[test]
    fn separate_allocators_do_not_share_state() {
        let mut a = KeyAllocator::new();
        let mut b = KeyAllocator::new();
        a.next_key();
        a.next_key();
        assert_eq!(b.next_key(), Key::new(0));
    }

    #[test]
    fn display_and_parse_agree() {
        let key = Key::new(42);
        assert_eq!(key.to_string(), "42");
        assert_eq!("42".parse::<Key>().unwrap(), key);
    }

    #[test]
    fn parse_rejects_non_numeric_markers() {
        assert!("abc".parse::<Key>().is_err());
        assert!("".parse::<Key>().is_err());
        assert!("+1".parse::<Key>().is_err());
        assert!("-1".parse::<Key>().is_err());
    }

    #[test]
    fn serializes_as_string() {
        let json = serde_json::to_value(Key::new(7)).unwrap();
        assert_eq!(json, serde_json::json!("7"));
        let back: Key = serde_json::from_value(json).unwrap();
        assert_eq!(back, Key::new(7));
    }
}
