//! Property Dictionary
//!
//! Sorted key/value store of interned strings, unique by ASCII
//! case-insensitive key. Used for declaration blocks and for computed
//! property sets. Iteration order is sorted key order, which feeds the
//! cascade memoization hash and must therefore be reproducible.

use std::cmp::Ordering;

use crate::pool::Atom;

/// Compare two strings ASCII case-insensitively
pub fn cmp_ignore_case(a: &str, b: &str) -> Ordering {
    a.bytes()
        .map(|c| c.to_ascii_lowercase())
        .cmp(b.bytes().map(|c| c.to_ascii_lowercase()))
}

/// Sorted property dictionary
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dictionary {
    entries: Vec<(Atom, Atom)>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    fn search(&self, key: &str) -> Result<usize, usize> {
        self.entries.binary_search_by(|(k, _)| cmp_ignore_case(k, key))
    }

    /// Set `key` to `value`, overwriting an existing entry in place
    pub fn set(&mut self, key: Atom, value: Atom) {
        match self.search(&key) {
            Ok(idx) => self.entries[idx].1 = value,
            Err(_) => {
                self.entries.push((key, value));
                self.entries.sort_by(|a, b| cmp_ignore_case(&a.0, &b.0));
            }
        }
    }

    /// Get a value by key
    pub fn get(&self, key: &str) -> Option<&Atom> {
        self.search(key).ok().map(|idx| &self.entries[idx].1)
    }

    /// Get a value as a string slice
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).map(Atom::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.search(key).is_ok()
    }

    /// Remove a key, returning its value
    pub fn remove(&mut self, key: &str) -> Option<Atom> {
        let idx = self.search(key).ok()?;
        Some(self.entries.remove(idx).1)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry at a sorted position
    pub fn get_at(&self, index: usize) -> Option<(&Atom, &Atom)> {
        self.entries.get(index).map(|(k, v)| (k, v))
    }

    /// Iterate in sorted key order
    pub fn iter(&self) -> impl Iterator<Item = (&Atom, &Atom)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    /// Copy every entry of `other` into `self`, overwriting shared keys
    pub fn merge_from(&mut self, other: &Dictionary) {
        for (k, v) in other.iter() {
            self.set(k.clone(), v.clone());
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
