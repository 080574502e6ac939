//! Node classification for reconciliation.
//!
//! Each family owns one rule deciding whether an element belongs to it.
//! Classification runs once when a tree is wrapped and the resulting
//! [`NodeKind`] is stored on the node, so comparisons never re-parse
//! attribute strings.
//!
//! # Available Families
//!
//! - `MathFamily` - math containers holding a script payload
//! - `EditorFamily` - embedded stateful editor hosts
//! - `LinkFamily` - `<a>` anchors
//! - `MediaFamily` - `<img>`, `<video>`, `<audio>`, ...
//!
//! Order matters: a `<span class="math">` is math even though nothing
//! else claims it, and an `<a class="math">` is math, not an anchor.

pub mod editor;
pub mod link;
pub mod math;
pub mod media;

pub use editor::EditorFamily;
pub use link::LinkFamily;
pub use math::{MathFamily, MathPayload, math_equal};
pub use media::MediaFamily;

use crate::attr::Attrs;
use crate::node::Node;

/// A class of elements sharing reconciliation rules.
pub trait Family {
    const NAME: &'static str;
    const KIND: NodeKind;

    /// Whether an element with this tag and these attributes belongs here.
    fn identify(tag: &str, attrs: &Attrs) -> bool;
}

/// Classification of a rendered node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Text,
    Math,
    Editor,
    Anchor,
    Media,
    /// Any other element.
    Other,
}

impl NodeKind {
    /// Classify an element by tag and attributes.
    pub fn of_element(tag: &str, attrs: &Attrs) -> Self {
        if MathFamily::identify(tag, attrs) {
            MathFamily::KIND
        } else if EditorFamily::identify(tag, attrs) {
            EditorFamily::KIND
        } else if LinkFamily::identify(tag, attrs) {
            LinkFamily::KIND
        } else if MediaFamily::identify(tag, attrs) {
            MediaFamily::KIND
        } else {
            Self::Other
        }
    }

    pub fn of(node: &Node) -> Self {
        match node {
            Node::Text(_) => Self::Text,
            Node::Element(e) => Self::of_element(&e.tag, &e.attrs),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Math => MathFamily::NAME,
            Self::Editor => EditorFamily::NAME,
            Self::Anchor => LinkFamily::NAME,
            Self::Media => MediaFamily::NAME,
            Self::Other => "other",
        }
    }

    /// Kinds that must never be patched in place.
    pub fn is_opaque(&self) -> bool {
        matches!(self, Self::Text | Self::Math | Self::Editor | Self::Anchor)
    }
}
