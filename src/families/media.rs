//! Media family: `<img>`, `<video>`, `<audio>`, etc.
//!
//! Media elements may be patched in place only while they point at the
//! same resource; swapping the resource of a live element flickers.

use crate::attr::{Attrs, AttrsExt};
use crate::node::Element;

use super::{Family, NodeKind};

pub struct MediaFamily;

impl Family for MediaFamily {
    const NAME: &'static str = "media";
    const KIND: NodeKind = NodeKind::Media;

    fn identify(tag: &str, _attrs: &Attrs) -> bool {
        matches!(
            tag,
            "img" | "video" | "audio" | "source" | "track" | "picture" | "canvas" | "embed" | "object" | "iframe"
        )
    }
}

impl MediaFamily {
    /// The resource an element displays: `src`, then `data`, then `srcset`.
    pub fn resource(elem: &Element) -> Option<&str> {
        Self::resource_of(&elem.attrs)
    }

    pub fn resource_of(attrs: &Attrs) -> Option<&str> {
        attrs
            .get_attr("src")
            .or_else(|| attrs.get_attr("data"))
            .or_else(|| attrs.get_attr("srcset"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_lookup_order() {
        let img = Element::new("img").attr("srcset", "b.png 2x").attr("src", "a.png");
        assert_eq!(MediaFamily::resource(&img), Some("a.png"));

        let object = Element::new("object").attr("data", "doc.pdf");
        assert_eq!(MediaFamily::resource(&object), Some("doc.pdf"));

        assert_eq!(MediaFamily::resource(&Element::new("video")), None);
    }

    #[test]
    fn test_identify() {
        assert!(MediaFamily::identify("img", &Attrs::new()));
        assert!(MediaFamily::identify("iframe", &Attrs::new()));
        assert!(!MediaFamily::identify("div", &Attrs::new()));
    }
}
