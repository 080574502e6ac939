//! Element type - rendered HTML elements
//!
//! The core building block of the rendered tree.

use crate::attr::{AttrKey, AttrValue, Attrs, AttrsExt, Tag};

use super::{Children, Node, NodePath, Text};

// =============================================================================
// Element
// =============================================================================

/// HTML element with attributes and children
#[derive(Debug, Clone)]
pub struct Element {
    /// HTML tag name (lowercase)
    pub tag: Tag,
    /// Element attributes
    pub attrs: Attrs,
    /// Child nodes
    pub children: Children,
}

impl Element {
    pub fn new(tag: impl Into<Tag>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Attrs::new(),
            children: Children::new(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Builder
    // ─────────────────────────────────────────────────────────────────────────

    /// Add an attribute (builder).
    pub fn attr(mut self, name: impl Into<AttrKey>, value: impl Into<AttrValue>) -> Self {
        self.attrs.set_attr(name, value);
        self
    }

    pub fn with_id(self, id: impl Into<AttrValue>) -> Self {
        self.attr("id", id)
    }

    pub fn with_class(self, class: impl Into<AttrValue>) -> Self {
        self.attr("class", class)
    }

    /// Append a child element (builder).
    pub fn child(mut self, elem: Element) -> Self {
        self.push_elem(elem);
        self
    }

    /// Append a text child (builder).
    pub fn text(mut self, content: impl Into<String>) -> Self {
        self.push_text(content);
        self
    }

    /// Append several children (builder).
    pub fn children(mut self, nodes: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(nodes);
        self
    }

    pub fn push_elem(&mut self, elem: Element) {
        self.children.push(Node::Element(Box::new(elem)));
    }

    pub fn push_text(&mut self, content: impl Into<String>) {
        self.children.push(Node::Text(Text::new(content)));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Attribute access
    // ─────────────────────────────────────────────────────────────────────────

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs.get_attr(name)
    }

    pub fn set_attr(&mut self, name: impl Into<AttrKey>, value: impl Into<AttrValue>) {
        self.attrs.set_attr(name, value);
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.has_attr(name)
    }

    pub fn id(&self) -> Option<&str> {
        self.get_attr("id")
    }

    pub fn class(&self) -> Option<&str> {
        self.get_attr("class")
    }

    pub fn has_class(&self, token: &str) -> bool {
        self.attrs.has_class(token)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Structure
    // ─────────────────────────────────────────────────────────────────────────

    /// Number of direct children (all node types)
    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Exact deep equality: tag, attribute set, text and children.
    pub fn is_equal_node(&self, other: &Element) -> bool {
        self.tag == other.tag
            && self.attrs.same_set(&other.attrs)
            && self.children.len() == other.children.len()
            && self
                .children
                .iter()
                .zip(other.children.iter())
                .all(|(a, b)| a.is_equal_node(b))
    }

    /// Node at `path` below this element. The empty path has no node.
    pub fn descendant(&self, path: &NodePath) -> Option<&Node> {
        let (&first, rest) = path.split_first()?;
        let mut node = self.children.get(first)?;
        for &index in rest {
            node = node.as_element()?.children.get(index)?;
        }
        Some(node)
    }

    /// Mutable node at `path` below this element.
    pub fn descendant_mut(&mut self, path: &NodePath) -> Option<&mut Node> {
        let (&first, rest) = path.split_first()?;
        let mut node = self.children.get_mut(first)?;
        for &index in rest {
            node = node.as_element_mut()?.children.get_mut(index)?;
        }
        Some(node)
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self) -> String {
        let mut result = String::new();
        self.collect_text(&mut result);
        result
    }

    fn collect_text(&self, buf: &mut String) {
        for child in &self.children {
            match child {
                Node::Text(t) => buf.push_str(&t.content),
                Node::Element(e) => e.collect_text(buf),
            }
        }
    }

    /// Replace all children with a single text node.
    pub fn set_text_content(&mut self, content: impl Into<String>) {
        self.children.clear();
        self.push_text(content);
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        self.is_equal_node(other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_basics() {
        let elem = Element::new("div");
        assert_eq!(elem.tag, "div");
        assert!(elem.is_empty());
        assert_eq!(elem.len(), 0);
    }

    #[test]
    fn test_descendant_lookup() {
        let root = Element::new("body")
            .child(Element::new("p").text("one"))
            .child(Element::new("ul").child(Element::new("li").text("two")));

        let path = NodePath::from_indices([1, 0, 0]);
        let node = root.descendant(&path).and_then(Node::as_text);
        assert_eq!(node.map(|t| t.content.as_str()), Some("two"));

        assert!(root.descendant(&NodePath::root()).is_none());
        assert!(root.descendant(&NodePath::from_indices([5])).is_none());
        assert!(root.descendant(&NodePath::from_indices([0, 0, 0])).is_none());
    }

    #[test]
    fn test_descendant_mut_edits_in_place() {
        let mut root = Element::new("body").child(Element::new("p").text("old"));
        if let Some(Node::Element(p)) = root.descendant_mut(&NodePath::from_indices([0])) {
            p.set_text_content("new");
        }
        assert_eq!(root.text_content(), "new");
    }
}
