//! Content Hashing
//!
//! 256-bit SHA3 digests identify rules: parsed rules by their selector
//! structure, synthesized rules by the matched rules and merged properties
//! that produced them. Collisions are assumed not to happen.

use std::fmt;

use sha3::{Digest, Sha3_256};

/// 256-bit rule identity
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RuleHash(pub [u8; 32]);

impl RuleHash {
    #[inline]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for RuleHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RuleHash(")?;
        for b in &self.0[..8] {
            write!(f, "{:02x}", b)?;
        }
        write!(f, "..)")
    }
}

/// Incremental hasher producing a [`RuleHash`]
pub struct ContentHasher {
    inner: Sha3_256,
}

impl ContentHasher {
    pub fn new() -> Self {
        Self { inner: Sha3_256::new() }
    }

    #[inline]
    pub fn update(&mut self, bytes: &[u8]) {
        self.inner.update(bytes);
    }

    #[inline]
    pub fn write_u8(&mut self, v: u8) {
        self.inner.update([v]);
    }

    #[inline]
    pub fn write_u32(&mut self, v: u32) {
        self.inner.update(v.to_le_bytes());
    }

    /// Length-prefixed string
    pub fn write_str(&mut self, s: &str) {
        self.write_u32(s.len() as u32);
        self.inner.update(s.as_bytes());
    }

    pub fn finish(self) -> RuleHash {
        let digest = self.inner.finalize();
        let mut out = [0u8; 32];
        out.copy_from_slice(&digest);
        RuleHash(out)
    }
}

impl Default for ContentHasher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic() {
        let mut a = ContentHasher::new();
        a.write_str("div");
        a.write_u8(1);
        let mut b = ContentHasher::new();
        b.write_str("div");
        b.write_u8(1);
        assert_eq!(a.finish(), b.finish());
    }

    #[test]
    fn test_length_prefix_separates_fields() {
        let mut a = ContentHasher::new();
        a.write_str("ab");
        a.write_str("c");
        let mut b = ContentHasher::new();
        b.write_str("a");
        b.write_str("bc");
        assert_ne!(a.finish(), b.finish());
    }

    #[test]
    fn test_empty_is_sha3_of_nothing() {
        let h = ContentHasher::new().finish();
        // SHA3-256("") = a7ffc6f8bf1ed766...
        assert_eq!(&h.0[..4], &[0xa7, 0xff, 0xc6, 0xf8]);
    }
}
