//! HTML serialization of rendered trees.
//!
//! Hosts use this to ship the live tree, or a freshly inserted subtree, to
//! the preview surface. Text inside `<script>` and `<style>` is emitted
//! raw, so math payloads survive a round trip through the surface.

use crate::attr::Attrs;
use crate::node::{Element, Node};

// =============================================================================
// Rendering
// =============================================================================

/// Render an element and its subtree to HTML.
pub fn to_html(elem: &Element) -> String {
    let mut output = String::new();
    render_element(elem, &mut output);
    output
}

/// Render a single node to HTML.
pub fn node_to_html(node: &Node) -> String {
    let mut output = String::new();
    render_node(node, false, &mut output);
    output
}

/// Render only the children of `elem` (its inner HTML).
pub fn inner_html(elem: &Element) -> String {
    let mut output = String::new();
    render_children(elem, &mut output);
    output
}

fn render_element(elem: &Element, output: &mut String) {
    output.push('<');
    output.push_str(&elem.tag);
    render_attrs(&elem.attrs, output);

    // Void elements
    if is_void_element(&elem.tag) {
        output.push_str(" />");
        return;
    }

    output.push('>');
    render_children(elem, output);
    output.push_str("</");
    output.push_str(&elem.tag);
    output.push('>');
}

fn render_children(elem: &Element, output: &mut String) {
    let raw = is_raw_text_element(&elem.tag);
    for child in &elem.children {
        render_node(child, raw, output);
    }
}

fn render_node(node: &Node, raw: bool, output: &mut String) {
    match node {
        Node::Element(elem) => render_element(elem, output),
        Node::Text(text) if raw => output.push_str(&text.content),
        Node::Text(text) => escape_html_into(&text.content, output),
    }
}

fn render_attrs(attrs: &Attrs, output: &mut String) {
    for (name, value) in attrs.iter() {
        output.push(' ');
        output.push_str(name);
        output.push_str("=\"");
        escape_attr_into(value, output);
        output.push('"');
    }
}

/// Escape HTML special characters.
fn escape_html_into(s: &str, output: &mut String) {
    for c in s.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            _ => output.push(c),
        }
    }
}

/// Escape attribute value special characters.
fn escape_attr_into(s: &str, output: &mut String) {
    for c in s.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '"' => output.push_str("&quot;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            _ => output.push(c),
        }
    }
}

/// Check if element is a void element (self-closing).
fn is_void_element(tag: &str) -> bool {
    matches!(
        tag,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

fn is_raw_text_element(tag: &str) -> bool {
    matches!(tag, "script" | "style")
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_simple_element() {
        let elem = Element::new("div").with_class("note").text("a < b");
        assert_eq!(to_html(&elem), r#"<div class="note">a &lt; b</div>"#);
    }

    #[test]
    fn test_void_elements() {
        let elem = Element::new("p").child(Element::new("img").attr("src", "a.png")).child(Element::new("br"));
        assert_eq!(to_html(&elem), r#"<p><img src="a.png" /><br /></p>"#);
    }

    #[test]
    fn test_script_text_is_raw() {
        let elem = Element::new("span")
            .with_class("math")
            .child(Element::new("script").attr("type", "math/tex").text("a<b && c"));
        assert_eq!(
            inner_html(&elem),
            r#"<script type="math/tex">a<b && c</script>"#
        );
        assert_eq!(node_to_html(&Node::text("a<b")), "a&lt;b");
    }

    #[test]
    fn test_escape_attr() {
        let elem = Element::new("a").attr("title", "say \"hi\" & go");
        assert_eq!(to_html(&elem), r#"<a title="say &quot;hi&quot; &amp; go"></a>"#);
    }
}
