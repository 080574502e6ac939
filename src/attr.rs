//! Attribute system for rendered elements
//!
//! Attributes are kept as an ordered list of key-value pairs, the way the
//! renderer emitted them. Comparison is order-insensitive, matching how a
//! DOM compares attribute sets.

use compact_str::CompactString;
use smallvec::SmallVec;

/// Attribute name.
pub type AttrKey = CompactString;

/// Attribute value.
pub type AttrValue = CompactString;

/// Element tag name.
pub type Tag = CompactString;

/// Element attributes as key-value pairs in source order.
pub type Attrs = SmallVec<[(AttrKey, AttrValue); 4]>;

/// Extension trait for attribute operations on [`Attrs`].
pub trait AttrsExt {
    /// Get an attribute value by name
    fn get_attr(&self, name: &str) -> Option<&str>;

    /// Check if an attribute exists
    fn has_attr(&self, name: &str) -> bool;

    /// Set an attribute value (insert or update)
    fn set_attr(&mut self, name: impl Into<AttrKey>, value: impl Into<AttrValue>);

    /// Remove an attribute by name, returning the old value if present
    fn remove_attr(&mut self, name: &str) -> Option<AttrValue>;

    /// Whether the whitespace-separated `class` list contains `token`.
    fn has_class(&self, token: &str) -> bool;

    /// Same attribute set, ignoring order.
    fn same_set(&self, other: &Self) -> bool;
}

impl AttrsExt for Attrs {
    fn get_attr(&self, name: &str) -> Option<&str> {
        self.iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    fn has_attr(&self, name: &str) -> bool {
        self.iter().any(|(k, _)| k == name)
    }

    fn set_attr(&mut self, name: impl Into<AttrKey>, value: impl Into<AttrValue>) {
        let name = name.into();
        let value = value.into();
        if let Some(attr) = self.iter_mut().find(|(k, _)| k == &name) {
            attr.1 = value;
        } else {
            self.push((name, value));
        }
    }

    fn remove_attr(&mut self, name: &str) -> Option<AttrValue> {
        self.iter()
            .position(|(k, _)| k == name)
            .map(|pos| self.remove(pos).1)
    }

    fn has_class(&self, token: &str) -> bool {
        self.get_attr("class")
            .is_some_and(|class| class.split_ascii_whitespace().any(|t| t == token))
    }

    fn same_set(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(k, v)| other.get_attr(k) == Some(v.as_str()))
    }
}

// =============================================================================
// Tests
// =============================================================================
