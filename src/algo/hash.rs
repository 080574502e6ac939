//! Content fingerprints for rendered subtrees
//!
//! A fingerprint is a 64-bit blake3-derived hash computed bottom-up while
//! wrapping a tree. Different fingerprints prove two subtrees differ;
//! equal fingerprints still go through the exact deep comparison.

use crate::attr::Attrs;

/// Deterministic hasher built on blake3.
pub struct StableHasher {
    inner: blake3::Hasher,
}

impl StableHasher {
    #[inline]
    pub fn new() -> Self {
        Self {
            inner: blake3::Hasher::new(),
        }
    }

    /// Update with raw bytes
    #[inline]
    pub fn update(mut self, data: &[u8]) -> Self {
        self.inner.update(data);
        self
    }

    /// Update with a length-prefixed string, so `("ab", "c")` and
    /// `("a", "bc")` hash apart.
    #[inline]
    pub fn update_str(self, s: &str) -> Self {
        self.update_usize(s.len()).update(s.as_bytes())
    }

    #[inline]
    pub fn update_u64(self, v: u64) -> Self {
        self.update(&v.to_le_bytes())
    }

    #[inline]
    pub fn update_usize(self, v: usize) -> Self {
        self.update_u64(v as u64)
    }

    /// First 8 bytes of the blake3 output, little-endian.
    #[inline]
    pub fn finish(self) -> u64 {
        let hash = self.inner.finalize();
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&hash.as_bytes()[..8]);
        u64::from_le_bytes(bytes)
    }
}

impl Default for StableHasher {
    fn default() -> Self {
        Self::new()
    }
}

/// Fingerprint of a text node.
pub fn text_fingerprint(content: &str) -> u64 {
    StableHasher::new()
        .update_str("#text")
        .update_str(content)
        .finish()
}

/// Fingerprint of an element from its tag, attributes and child
/// fingerprints.
///
/// Attribute hashes are combined with a wrapping sum so the result does
/// not depend on attribute order.
pub fn element_fingerprint(tag: &str, attrs: &Attrs, children: impl IntoIterator<Item = u64>) -> u64 {
    let attrs_hash = attrs.iter().fold(0u64, |acc, (k, v)| {
        acc.wrapping_add(StableHasher::new().update_str(k).update_str(v).finish())
    });

    let mut hasher = StableHasher::new()
        .update_str(tag)
        .update_u64(attrs_hash);
    let mut count = 0usize;
    for child in children {
        hasher = hasher.update_u64(child);
        count += 1;
    }
    hasher.update_usize(count).finish()
}
