//! Keyed/positional morphing patcher.
//!
//! For every child list:
//!
//! 1. Old children with an identity key are indexed by key
//! 2. A keyed new child takes the old child with its key
//! 3. An unkeyed new child takes the next unkeyed old child of the same
//!    shape, scanning forward
//! 4. Anything unmatched is cloned from the staged tree
//!
//! Matched pairs are morphed recursively; old children left over are
//! dropped. Keys are only looked up among siblings, so nodes never move
//! between parents.

use std::mem;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::attr::AttrsExt;
use crate::error::PatchError;
use crate::id::NodeKey;
use crate::node::{Children, Element, Node, NodePath};

use super::{PatchHooks, PatchOutcome, Side, TreePatcher, UpdateAction};

/// Default [`TreePatcher`].
#[derive(Debug, Default, Clone, Copy)]
pub struct MorphPatcher;

impl MorphPatcher {
    pub fn new() -> Self {
        Self
    }
}

impl TreePatcher for MorphPatcher {
    fn patch(
        &mut self,
        old: &mut Element,
        new: &Element,
        children_only: bool,
        hooks: &mut dyn PatchHooks,
    ) -> Result<PatchOutcome, PatchError> {
        let root = NodePath::root();
        let mut morph = Morph {
            hooks,
            out: PatchOutcome::default(),
        };
        if !children_only {
            if old.tag != new.tag {
                return Err(PatchError::StructuralMismatch { path: root });
            }
            morph.sync_attrs(old, new, &root);
        }
        morph.children(old, new, &root, &root)?;
        Ok(morph.out)
    }
}

struct Morph<'h> {
    hooks: &'h mut dyn PatchHooks,
    out: PatchOutcome,
}

impl Morph<'_> {
    fn sync_attrs(&mut self, old: &mut Element, new: &Element, path: &NodePath) {
        if !old.attrs.same_set(&new.attrs) {
            old.attrs.clone_from(&new.attrs);
            self.out.updated.push(path.clone());
        }
    }

    /// Keys of one side's child list, rejecting duplicates.
    fn child_keys(&self, side: Side, parent: &NodePath, len: usize) -> Result<Vec<Option<NodeKey>>, PatchError> {
        let mut seen = FxHashSet::default();
        let mut keys = Vec::with_capacity(len);
        for index in 0..len {
            let path = parent.child(index);
            let key = self.hooks.node_key(side, &path).map(NodeKey::from);
            if let Some(key) = &key {
                if !seen.insert(key.clone()) {
                    return Err(PatchError::DuplicateKey {
                        key: key.to_string(),
                        path,
                    });
                }
            }
            keys.push(key);
        }
        Ok(keys)
    }

    fn children(
        &mut self,
        old: &mut Element,
        new: &Element,
        old_path: &NodePath,
        new_path: &NodePath,
    ) -> Result<(), PatchError> {
        let old_keys = self.child_keys(Side::Old, old_path, old.children.len())?;
        let new_keys = self.child_keys(Side::New, new_path, new.children.len())?;

        let by_key: FxHashMap<&NodeKey, usize> = old_keys
            .iter()
            .enumerate()
            .filter_map(|(index, key)| key.as_ref().map(|key| (key, index)))
            .collect();

        let mut pool: Vec<Option<Node>> = mem::take(&mut old.children).into_iter().map(Some).collect();
        let mut result = Children::with_capacity(new.children.len());
        let mut cursor = 0;

        for (index, new_child) in new.children.iter().enumerate() {
            let child_path = new_path.child(index);

            let found = match &new_keys[index] {
                Some(key) => match by_key.get(key) {
                    Some(&at) => {
                        let node = pool[at].take();
                        if node.as_ref().is_some_and(|n| !n.same_shape(new_child)) {
                            return Err(PatchError::StructuralMismatch { path: child_path });
                        }
                        node.map(|n| (at, n))
                    }
                    None => None,
                },
                None => {
                    let hit = (cursor..pool.len()).find(|&at| {
                        old_keys[at].is_none()
                            && pool[at].as_ref().is_some_and(|n| n.same_shape(new_child))
                    });
                    match hit {
                        Some(at) => {
                            cursor = at + 1;
                            pool[at].take().map(|n| (at, n))
                        }
                        None => None,
                    }
                }
            };

            match found {
                Some((at, mut node)) => {
                    self.node(&mut node, new_child, &old_path.child(at), &child_path)?;
                    result.push(node);
                }
                None => {
                    result.push(new_child.clone());
                    self.out.inserted.push(child_path);
                }
            }
        }

        self.out.removed += pool.iter().filter(|n| n.is_some()).count();
        old.children = result;
        Ok(())
    }

    fn node(
        &mut self,
        old: &mut Node,
        new: &Node,
        old_path: &NodePath,
        new_path: &NodePath,
    ) -> Result<(), PatchError> {
        if self.hooks.before_update(old, new, new_path) == UpdateAction::Skip {
            return Ok(());
        }
        match (old, new) {
            (Node::Text(a), Node::Text(b)) => {
                if a.content != b.content {
                    a.content.clone_from(&b.content);
                    self.out.updated.push(new_path.clone());
                }
                Ok(())
            }
            (Node::Element(a), Node::Element(b)) if a.tag == b.tag => {
                self.sync_attrs(a, b, new_path);
                self.children(a, b, old_path, new_path)
            }
            _ => Err(PatchError::StructuralMismatch {
                path: new_path.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::NoHooks;

    fn list(items: &[&str]) -> Element {
        let mut ul = Element::new("ul");
        for item in items {
            ul.push_elem(Element::new("li").text(*item));
        }
        ul
    }

    /// Hooks keyed by explicit path tables.
    #[derive(Default)]
    struct Keys {
        old: FxHashMap<NodePath, &'static str>,
        new: FxHashMap<NodePath, &'static str>,
        skip_all: bool,
    }

    impl PatchHooks for Keys {
        fn before_update(&mut self, _old: &mut Node, _new: &Node, _path: &NodePath) -> UpdateAction {
            if self.skip_all {
                UpdateAction::Skip
            } else {
                UpdateAction::Update
            }
        }

        fn node_key(&self, side: Side, path: &NodePath) -> Option<&str> {
            let table = match side {
                Side::Old => &self.old,
                Side::New => &self.new,
            };
            table.get(path).copied()
        }
    }

    fn path(indices: &[usize]) -> NodePath {
        NodePath::from_indices(indices.iter().copied())
    }

    #[test]
    fn test_positional_morph() {
        let mut live = list(&["a", "b"]);
        let staged = list(&["a", "c", "d"]);
        let out = MorphPatcher.patch(&mut live, &staged, true, &mut NoHooks).expect("patch");

        assert_eq!(live, staged);
        assert_eq!(out.updated, vec![path(&[1, 0])]);
        assert_eq!(out.inserted, vec![path(&[2])]);
        assert_eq!(out.removed, 0);
    }

    #[test]
    fn test_forward_scan_drops_mismatched_nodes() {
        let mut live = Element::new("div").child(Element::new("p").text("x")).child(list(&["a"]));
        let staged = Element::new("div").child(list(&["a"]));
        let out = MorphPatcher.patch(&mut live, &staged, true, &mut NoHooks).expect("patch");

        assert_eq!(live, staged);
        assert!(out.inserted.is_empty());
        assert_eq!(out.removed, 1);
    }

    #[test]
    fn test_identical_trees_patch_nothing() {
        let mut live = list(&["a", "b"]);
        let staged = live.clone();
        let out = MorphPatcher.patch(&mut live, &staged, false, &mut NoHooks).expect("patch");
        assert!(out.is_empty());
    }

    #[test]
    fn test_keyed_reorder() {
        let mut live = list(&["a", "b"]);
        let staged = list(&["b", "a"]);
        let mut keys = Keys::default();
        keys.old.insert(path(&[0]), "k1");
        keys.old.insert(path(&[1]), "k2");
        keys.new.insert(path(&[0]), "k2");
        keys.new.insert(path(&[1]), "k1");

        let out = MorphPatcher.patch(&mut live, &staged, true, &mut keys).expect("patch");
        assert_eq!(live, staged);
        assert!(out.is_empty());
    }

    #[test]
    fn test_unknown_key_inserts_clone() {
        let mut live = list(&["a"]);
        let staged = list(&["a"]);
        let mut keys = Keys::default();
        keys.new.insert(path(&[0]), "fresh");

        let out = MorphPatcher.patch(&mut live, &staged, true, &mut keys).expect("patch");
        assert_eq!(out.inserted, vec![path(&[0])]);
        assert_eq!(out.removed, 1);
    }

    #[test]
    fn test_duplicate_keys_are_rejected() {
        let mut live = list(&["a", "b"]);
        let staged = list(&["a", "b"]);
        let mut keys = Keys::default();
        keys.old.insert(path(&[0]), "k");
        keys.old.insert(path(&[1]), "k");

        let err = MorphPatcher.patch(&mut live, &staged, true, &mut keys).unwrap_err();
        assert_eq!(
            err,
            PatchError::DuplicateKey {
                key: "k".to_string(),
                path: path(&[1]),
            }
        );
        assert_eq!(live, list(&["a", "b"]));
    }

    #[test]
    fn test_keyed_shape_mismatch_is_an_error() {
        let mut live = Element::new("div").child(Element::new("p"));
        let staged = Element::new("div").child(Element::new("h1"));
        let mut keys = Keys::default();
        keys.old.insert(path(&[0]), "k");
        keys.new.insert(path(&[0]), "k");

        let err = MorphPatcher.patch(&mut live, &staged, true, &mut keys).unwrap_err();
        assert_eq!(err, PatchError::StructuralMismatch { path: path(&[0]) });
    }

    #[test]
    fn test_skip_leaves_matched_nodes_alone() {
        let mut live = list(&["a"]);
        let staged = list(&["b"]);
        let mut keys = Keys {
            skip_all: true,
            ..Keys::default()
        };
        let out = MorphPatcher.patch(&mut live, &staged, true, &mut keys).expect("patch");
        assert_eq!(live, list(&["a"]));
        assert!(out.is_empty());
    }

    #[test]
    fn test_root_attributes() {
        let mut live = Element::new("body").attr("class", "old").child(Element::new("p"));
        let staged = Element::new("body").attr("class", "new").child(Element::new("p"));

        let out = MorphPatcher.patch(&mut live, &staged, true, &mut NoHooks).expect("patch");
        assert!(out.is_empty());
        assert_eq!(live.class(), Some("old"));

        let out = MorphPatcher.patch(&mut live, &staged, false, &mut NoHooks).expect("patch");
        assert_eq!(out.updated, vec![NodePath::root()]);
        assert_eq!(live, staged);
    }

    #[test]
    fn test_root_tag_mismatch() {
        let mut live = Element::new("body");
        let staged = Element::new("main");
        assert!(MorphPatcher.patch(&mut live, &staged, false, &mut NoHooks).is_err());
        assert!(MorphPatcher.patch(&mut live, &staged, true, &mut NoHooks).is_ok());
    }
}
