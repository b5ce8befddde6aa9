//! String Pool - Deduplicate strings shared by rules and property sets
//!
//! Every selector name, property key and property value is interned here.
//! Equal content always yields the same allocation, so two [`Atom`]s from
//! one pool compare by pointer.
//!
//! Storage is a sorted array searched with binary search. A new string is
//! inserted at the position the failed search reports, so the array never
//! needs re-sorting.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::rc::Rc;

/// Interned string handle
#[derive(Clone)]
pub struct Atom(Rc<str>);

impl Atom {
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Same underlying storage
    #[inline]
    pub fn ptr_eq(a: &Atom, b: &Atom) -> bool {
        Rc::ptr_eq(&a.0, &b.0)
    }
}

impl Deref for Atom {
    type Target = str;

    #[inline]
    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Atom {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Identity comparison; only meaningful between atoms of one pool.
impl PartialEq for Atom {
    #[inline]
    fn eq(&self, other: &Atom) -> bool {
        Atom::ptr_eq(self, other)
    }
}

impl Eq for Atom {}

impl Hash for Atom {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl PartialEq<str> for Atom {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for Atom {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

impl fmt::Debug for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// String interner
#[derive(Debug)]
pub struct StringPool {
    /// Owned strings, sorted by content
    strings: Vec<Atom>,
    /// Reserved empty string
    empty: Atom,
}

impl StringPool {
    pub fn new() -> Self {
        Self {
            strings: Vec::with_capacity(256),
            empty: Atom(Rc::from("")),
        }
    }

    /// The reserved empty string
    #[inline]
    pub fn empty(&self) -> Atom {
        self.empty.clone()
    }

    fn search(&self, s: &str) -> Result<usize, usize> {
        self.strings.binary_search_by(|a| a.as_str().cmp(s))
    }

    /// Intern a string, returning the shared handle
    pub fn intern(&mut self, s: &str) -> Atom {
        if s.is_empty() {
            return self.empty();
        }
        match self.search(s) {
            Ok(idx) => self.strings[idx].clone(),
            Err(idx) => {
                let atom = Atom(Rc::from(s));
                self.strings.insert(idx, atom.clone());
                atom
            }
        }
    }

    /// Intern an owned string, lowercased (ASCII)
    pub fn intern_lower(&mut self, s: &str) -> Atom {
        if s.bytes().any(|b| b.is_ascii_uppercase()) {
            self.intern(&s.to_ascii_lowercase())
        } else {
            self.intern(s)
        }
    }

    /// Look up a string without interning it
    pub fn lookup(&self, s: &str) -> Option<Atom> {
        if s.is_empty() {
            return Some(self.empty());
        }
        self.search(s).ok().map(|idx| self.strings[idx].clone())
    }

    /// Number of interned strings (excluding the empty string)
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// Bytes held by interned strings
    pub fn memory_usage(&self) -> usize {
        self.strings.capacity() * std::mem::size_of::<Atom>()
            + self.strings.iter().map(|a| a.len()).sum::<usize>()
    }
}

impl Default for StringPool {
    fn default() -> Self {
        Self::new()
    }
}
