//! Editor family: embedded stateful editor hosts.
//!
//! The preview embeds live editor widgets for code blocks. They carry
//! cursor, selection and highlighting state that a patch would destroy,
//! so they are always replaced whole.

use crate::attr::{Attrs, AttrsExt};

use super::{Family, NodeKind};

/// Tag and class marking an editor host.
pub const EDITOR_TAG: &str = "atom-text-editor";

pub struct EditorFamily;

impl Family for EditorFamily {
    const NAME: &'static str = "editor";
    const KIND: NodeKind = NodeKind::Editor;

    fn identify(tag: &str, attrs: &Attrs) -> bool {
        tag == EDITOR_TAG || attrs.has_class(EDITOR_TAG)
    }
}
