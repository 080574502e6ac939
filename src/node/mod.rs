//! Rendered document tree: `Element`, `Text`, `Node`, `NodePath`.
//!
//! This is the DOM-like tree the reconciler mutates in place. The live
//! tree and the staged tree each own their nodes; nothing is shared
//! between them.
//!
//! # Key Features
//!
//! - Builder API for constructing trees in tests and hosts
//! - `is_equal_node`: exact deep equality with order-insensitive attributes
//! - `NodePath`: child-index paths whose ordering is document order

mod element;
mod path;
mod text;

pub use element::Element;
pub use path::NodePath;
pub use text::Text;

use smallvec::SmallVec;

/// Node in a rendered tree - either Element or Text.
#[derive(Debug, Clone)]
pub enum Node {
    Element(Box<Element>),
    Text(Text),
}

impl Node {
    /// Create a text node.
    pub fn text(content: impl Into<String>) -> Self {
        Node::Text(Text::new(content))
    }

    #[inline]
    pub fn is_element(&self) -> bool {
        matches!(self, Node::Element(_))
    }

    #[inline]
    pub fn is_text(&self) -> bool {
        matches!(self, Node::Text(_))
    }

    #[inline]
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(e) => Some(e),
            _ => None,
        }
    }

    #[inline]
    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(e) => Some(e),
            _ => None,
        }
    }

    #[inline]
    pub fn as_text(&self) -> Option<&Text> {
        match self {
            Node::Text(t) => Some(t),
            _ => None,
        }
    }

    /// Tag name for elements, `None` for text.
    pub fn tag(&self) -> Option<&str> {
        self.as_element().map(|e| e.tag.as_str())
    }

    /// Exact deep equality: tag, attribute set, text and children.
    pub fn is_equal_node(&self, other: &Node) -> bool {
        match (self, other) {
            (Node::Text(a), Node::Text(b)) => a.content == b.content,
            (Node::Element(a), Node::Element(b)) => a.is_equal_node(b),
            _ => false,
        }
    }

    /// Same node type and, for elements, the same tag.
    pub fn same_shape(&self, other: &Node) -> bool {
        match (self, other) {
            (Node::Text(_), Node::Text(_)) => true,
            (Node::Element(a), Node::Element(b)) => a.tag == b.tag,
            _ => false,
        }
    }
}

impl From<Element> for Node {
    fn from(elem: Element) -> Self {
        Node::Element(Box::new(elem))
    }
}

impl From<Text> for Node {
    fn from(text: Text) -> Self {
        Node::Text(text)
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.is_equal_node(other)
    }
}

/// Type alias for children collection.
pub type Children = SmallVec<[Node; 8]>;
