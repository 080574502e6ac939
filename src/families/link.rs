//! Link family: `<a>` anchors.
//!
//! Anchors are never patched in place: a recycled anchor keeps focus and
//! visited state that belong to the old target.

use crate::attr::Attrs;

use super::{Family, NodeKind};

pub struct LinkFamily;

impl Family for LinkFamily {
    const NAME: &'static str = "link";
    const KIND: NodeKind = NodeKind::Anchor;

    fn identify(tag: &str, _attrs: &Attrs) -> bool {
        tag == "a"
    }
}
