//! Math family: rendered formula containers.
//!
//! A math container is an element whose class list contains `math`. It
//! holds one `<script>` child carrying the raw TeX payload (its `type`
//! attribute tells inline from display mode). The typesetter appends
//! presentational markup next to the script, so two containers are
//! compared by payload only.

use std::borrow::Cow;

use crate::attr::{Attrs, AttrsExt};
use crate::node::{Element, Node};

use super::{Family, NodeKind};

/// Class token marking a math container.
pub const MATH_CLASS: &str = "math";

/// Tag of the payload child.
pub const PAYLOAD_TAG: &str = "script";

/// Tag prefix of markup injected by the typesetter.
const TYPESET_PREFIX: &str = "mjx-";

pub struct MathFamily;

impl Family for MathFamily {
    const NAME: &'static str = "math";
    const KIND: NodeKind = NodeKind::Math;

    fn identify(_tag: &str, attrs: &Attrs) -> bool {
        attrs.has_class(MATH_CLASS)
    }
}

/// Raw payload of a math container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MathPayload<'a> {
    /// The script `type` attribute, e.g. `math/tex; mode=display`.
    pub mode: Option<&'a str>,
    pub source: Cow<'a, str>,
}

impl MathFamily {
    pub fn is_math(elem: &Element) -> bool {
        Self::identify(&elem.tag, &elem.attrs)
    }

    /// Index of the payload script among the container's children.
    pub fn payload_index(elem: &Element) -> Option<usize> {
        elem.children
            .iter()
            .position(|child| child.tag() == Some(PAYLOAD_TAG))
    }

    /// The payload of `elem`, or `None` when it is not a math container
    /// or has no script child.
    pub fn payload(elem: &Element) -> Option<MathPayload<'_>> {
        if !Self::is_math(elem) {
            return None;
        }
        let script = elem.children.get(Self::payload_index(elem)?)?.as_element()?;
        let source = match script.children.as_slice() {
            [] => Cow::Borrowed(""),
            [Node::Text(text)] => Cow::Borrowed(text.content.as_str()),
            _ => Cow::Owned(script.text_content()),
        };
        Some(MathPayload {
            mode: script.get_attr("type"),
            source,
        })
    }

    /// Replace the payload text of `elem` in place, leaving typeset
    /// siblings untouched. Returns `false` when there is no payload.
    pub fn set_source(elem: &mut Element, source: &str) -> bool {
        let Some(index) = Self::payload_index(elem) else {
            return false;
        };
        match elem.children.get_mut(index).and_then(Node::as_element_mut) {
            Some(script) => {
                script.set_text_content(source);
                true
            }
            None => false,
        }
    }

    /// Whether `tag` is markup the typesetter injects.
    pub fn is_typesetter_internal(tag: &str) -> bool {
        tag.starts_with(TYPESET_PREFIX)
    }
}

/// Two math containers with the same tag and payload are the same formula.
pub fn math_equal(a: &Element, b: &Element) -> bool {
    if a.tag != b.tag {
        return false;
    }
    match (MathFamily::payload(a), MathFamily::payload(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn formula(source: &str) -> Element {
        Element::new("span")
            .with_class("math")
            .child(Element::new("script").attr("type", "math/tex").text(source))
    }

    #[test]
    fn test_payload_extraction() {
        let elem = formula("x^2");
        let payload = MathFamily::payload(&elem);
        assert_eq!(
            payload,
            Some(MathPayload {
                mode: Some("math/tex"),
                source: Cow::Borrowed("x^2"),
            })
        );
        assert!(MathFamily::payload(&Element::new("span")).is_none());
    }

    #[test]
    fn test_typeset_markup_is_ignored() {
        let plain = formula("x^2");
        let typeset = formula("x^2").child(Element::new("svg").child(Element::new("path")));
        assert!(math_equal(&plain, &typeset));
        assert!(!plain.is_equal_node(&typeset));
        assert!(!math_equal(&plain, &formula("x^3")));
    }

    #[test]
    fn test_container_tag_matters() {
        let span = formula("x^2");
        let mut div = formula("x^2");
        div.tag = "div".into();
        assert!(MathFamily::payload(&div).is_some());
        assert!(!math_equal(&span, &div));
    }

    #[test]
    fn test_display_mode_matters() {
        let inline = formula("x");
        let display = Element::new("span")
            .with_class("math")
            .child(Element::new("script").attr("type", "math/tex; mode=display").text("x"));
        assert!(!math_equal(&inline, &display));
    }

    #[test]
    fn test_set_source_keeps_siblings() {
        let mut elem = formula("a").child(Element::new("svg"));
        assert!(MathFamily::set_source(&mut elem, "b"));
        assert_eq!(elem.len(), 2);
        assert_eq!(
            MathFamily::payload(&elem).map(|p| p.source.into_owned()),
            Some("b".to_string())
        );
        assert!(!MathFamily::set_source(&mut Element::new("span"), "b"));
    }

    #[test]
    fn test_typesetter_internal_tags() {
        assert!(MathFamily::is_typesetter_internal("mjx-container"));
        assert!(!MathFamily::is_typesetter_internal("svg"));
    }
}
