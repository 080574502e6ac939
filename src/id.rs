//! Identity tags for reconciliation passes
//!
//! Every [`OrderedTree`](crate::tree::OrderedTree) node gets a [`TreeId`]
//! when it is constructed. Ids key the per-node diff caches and, rendered
//! as short hex strings, the node-identity maps handed to the patcher.
//!
//! Ids are not persisted and mean nothing across runs. Uniqueness only
//! has to hold for the lifetime of the [`IdAllocator`] that issued them,
//! which the [`Reconciler`](crate::reconcile::Reconciler) owns.

use std::fmt;

use compact_str::{CompactString, format_compact};

/// Key shared by an old node and a new node in an identity map.
pub type NodeKey = CompactString;

// =============================================================================
// TreeId
// =============================================================================

/// Monotonic identity tag of one wrapped node.
///
/// - 8 bytes (u64), `Copy`
/// - Ordered by allocation time
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[must_use]
pub struct TreeId(u64);

impl TreeId {
    /// Create a TreeId from a raw u64 value.
    #[inline]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw u64 representation
    #[inline]
    pub const fn as_raw(&self) -> u64 {
        self.0
    }

    /// Render as an identity-map key (lowercase hex, no prefix).
    #[inline]
    pub fn to_key(self) -> NodeKey {
        format_compact!("{:x}", self.0)
    }
}

impl fmt::Debug for TreeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TreeId({:x})", self.0)
    }
}

impl fmt::Display for TreeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:x}", self.0)
    }
}

// =============================================================================
// IdAllocator
// =============================================================================

/// Monotonic [`TreeId`] source.
///
/// Never reset; starts at 1 so that 0 stays free as a sentinel for hosts.
#[derive(Debug)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub const fn new() -> Self {
        Self { next: 1 }
    }

    /// Issue the next id.
    #[inline]
    pub fn next_id(&mut self) -> TreeId {
        let id = TreeId(self.next);
        self.next += 1;
        id
    }

    /// Issue a fresh identity-map key.
    #[inline]
    pub fn next_key(&mut self) -> NodeKey {
        self.next_id().to_key()
    }

    /// Number of ids issued so far.
    pub fn issued(&self) -> u64 {
        self.next - 1
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocator_is_monotonic() {
        let mut ids = IdAllocator::new();
        let a = ids.next_id();
        let b = ids.next_id();
        assert!(a < b);
        assert_eq!(ids.issued(), 2);
    }

    #[test]
    fn test_key_is_hex() {
        assert_eq!(TreeId::from_raw(255).to_key(), "ff");
        assert_eq!(format!("{}", TreeId::from_raw(0x1a)), "#1a");
    }
}
