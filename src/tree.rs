//! OrderedTree: a read-only annotated view of a rendered subtree.
//!
//! Wrapping computes, once per node, everything the edit-distance engine
//! asks for repeatedly: classification, subtree size, a content
//! fingerprint and an identity tag. Each node also carries the memo of
//! its diffs against other nodes, keyed by their [`TreeId`].
//!
//! Trees are built fresh for every reconciliation pass and dropped at the
//! end of it, which discards all memoized results with them.

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::algo::{Cost, TreeDiff, element_fingerprint, text_fingerprint, tree_diff};
use crate::attr::AttrsExt;
use crate::error::ReconcileResult;
use crate::families::{MathFamily, MediaFamily, NodeKind, math_equal};
use crate::id::{IdAllocator, TreeId};
use crate::node::{Element, Node, Text};

// =============================================================================
// NodeRef
// =============================================================================

/// Borrowed rendered node. The live or staged tree owns it.
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Element(&'a Element),
    Text(&'a Text),
}

impl<'a> NodeRef<'a> {
    pub fn as_element(self) -> Option<&'a Element> {
        match self {
            NodeRef::Element(e) => Some(e),
            NodeRef::Text(_) => None,
        }
    }

    fn is_equal_node(self, other: NodeRef<'_>) -> bool {
        match (self, other) {
            (NodeRef::Element(a), NodeRef::Element(b)) => a.is_equal_node(b),
            (NodeRef::Text(a), NodeRef::Text(b)) => a.content == b.content,
            _ => false,
        }
    }
}

impl<'a> From<&'a Node> for NodeRef<'a> {
    fn from(node: &'a Node) -> Self {
        match node {
            Node::Element(e) => NodeRef::Element(e),
            Node::Text(t) => NodeRef::Text(t),
        }
    }
}

// =============================================================================
// OrderedTree
// =============================================================================

/// Annotated wrapper of one rendered node and its descendants.
pub struct OrderedTree<'a> {
    node: NodeRef<'a>,
    id: TreeId,
    kind: NodeKind,
    size: usize,
    fingerprint: u64,
    children: Vec<OrderedTree<'a>>,
    pub(crate) cache: RefCell<FxHashMap<TreeId, Rc<TreeDiff>>>,
}

impl<'a> OrderedTree<'a> {
    /// Wrap `root` and its whole subtree.
    pub fn new(root: &'a Element, ids: &mut IdAllocator) -> Self {
        Self::wrap(NodeRef::Element(root), ids)
    }

    pub fn from_node(node: &'a Node, ids: &mut IdAllocator) -> Self {
        Self::wrap(node.into(), ids)
    }

    fn wrap(node: NodeRef<'a>, ids: &mut IdAllocator) -> Self {
        let id = ids.next_id();
        let (kind, children, fingerprint) = match node {
            NodeRef::Text(text) => (NodeKind::Text, Vec::new(), text_fingerprint(&text.content)),
            NodeRef::Element(elem) => {
                let children: Vec<_> = elem
                    .children
                    .iter()
                    .map(|child| Self::from_node(child, ids))
                    .collect();
                let fingerprint = element_fingerprint(
                    &elem.tag,
                    &elem.attrs,
                    children.iter().map(|c| c.fingerprint),
                );
                (NodeKind::of_element(&elem.tag, &elem.attrs), children, fingerprint)
            }
        };
        let size = children.iter().map(|c| c.size).sum::<usize>().max(1);

        Self {
            node,
            id,
            kind,
            size,
            fingerprint,
            children,
            cache: RefCell::new(FxHashMap::default()),
        }
    }

    #[inline]
    pub fn id(&self) -> TreeId {
        self.id
    }

    #[inline]
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Number of leaves below this node, never zero.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    #[inline]
    pub fn node(&self) -> NodeRef<'a> {
        self.node
    }

    #[inline]
    pub fn children(&self) -> &[OrderedTree<'a>] {
        &self.children
    }

    pub fn as_element(&self) -> Option<&'a Element> {
        self.node.as_element()
    }

    pub fn tag(&self) -> Option<&'a str> {
        self.as_element().map(|e| e.tag.as_str())
    }

    pub fn class(&self) -> Option<&'a str> {
        self.as_element().and_then(|e| e.class())
    }

    /// Number of memoized diffs held by this node.
    pub fn cached_diffs(&self) -> usize {
        self.cache.borrow().len()
    }

    /// Exact deep equality, or two math containers with the same payload.
    pub fn equal_to(&self, other: &OrderedTree<'_>) -> bool {
        if self.fingerprint == other.fingerprint && self.node.is_equal_node(other.node) {
            return true;
        }
        if self.kind == NodeKind::Math && other.kind == NodeKind::Math {
            if let (Some(a), Some(b)) = (self.as_element(), other.as_element()) {
                return math_equal(a, b);
            }
        }
        false
    }

    /// Whether this pair must never be patched in place.
    ///
    /// True for text nodes, differing tag or class, and for math, editor
    /// and anchor nodes. Media nodes may be patched only while they point
    /// at the same resource.
    pub fn cannot_replace_with(&self, other: &OrderedTree<'_>) -> bool {
        let (Some(a), Some(b)) = (self.as_element(), other.as_element()) else {
            return true;
        };
        if a.tag != b.tag || a.attrs.get_attr("class") != b.attrs.get_attr("class") {
            return true;
        }
        if self.kind.is_opaque() {
            return true;
        }
        self.kind == NodeKind::Media && MediaFamily::resource(a) != MediaFamily::resource(b)
    }

    /// Edit distance from this node to `other`, memoized on this node.
    ///
    /// See [`tree_diff`].
    pub fn diff(&self, other: &OrderedTree<'_>, bound: Cost) -> ReconcileResult<Rc<TreeDiff>> {
        tree_diff(self, other, bound)
    }

    /// Whether this is a math container with a readable payload.
    pub fn has_math_payload(&self) -> bool {
        self.as_element().and_then(MathFamily::payload).is_some()
    }
}

impl std::fmt::Debug for OrderedTree<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderedTree")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("tag", &self.tag())
            .field("size", &self.size)
            .field("children", &self.children.len())
            .finish()
    }
}
