//! Node-identity maps for the patcher.
//!
//! A map pairs a live node path with a staged node path under one fresh
//! key. The patcher reuses keyed live nodes for the staged node with the
//! same key and matches everything else by position and shape.

use rustc_hash::FxHashMap;

use crate::algo::diff_by;
use crate::families::{MathFamily, NodeKind};
use crate::id::{IdAllocator, NodeKey};
use crate::node::NodePath;
use crate::patch::Side;
use crate::tree::OrderedTree;

/// Keys shared by corresponding live and staged nodes.
#[derive(Debug, Clone, Default)]
pub struct IdentityMap {
    old: FxHashMap<NodePath, NodeKey>,
    new: FxHashMap<NodePath, NodeKey>,
}

impl IdentityMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Give `old` and `new` the same key.
    pub fn pair(&mut self, old: NodePath, new: NodePath, key: NodeKey) {
        self.old.insert(old, key.clone());
        self.new.insert(new, key);
    }

    pub fn key(&self, side: Side, path: &NodePath) -> Option<&str> {
        let table = match side {
            Side::Old => &self.old,
            Side::New => &self.new,
        };
        table.get(path).map(NodeKey::as_str)
    }

    /// Number of keyed pairs.
    pub fn len(&self) -> usize {
        self.new.len()
    }

    pub fn is_empty(&self) -> bool {
        self.new.is_empty()
    }

    /// Lockstep structural prematching.
    ///
    /// Child lists of equal length are paired by position: equal pairs are
    /// keyed, elements with the same tag are walked further. Lists of
    /// different length key each staged child with the next equal live
    /// child, in order.
    pub fn heuristic(old: &OrderedTree<'_>, new: &OrderedTree<'_>, ids: &mut IdAllocator) -> Self {
        let mut map = Self::new();
        map.prematch(old, new, &NodePath::root(), &NodePath::root(), ids);
        map
    }

    fn prematch(
        &mut self,
        old: &OrderedTree<'_>,
        new: &OrderedTree<'_>,
        old_path: &NodePath,
        new_path: &NodePath,
        ids: &mut IdAllocator,
    ) {
        let (a, b) = (old.children(), new.children());

        if a.len() == b.len() {
            for (index, (x, y)) in a.iter().zip(b).enumerate() {
                let (xp, yp) = (old_path.child(index), new_path.child(index));
                if x.equal_to(y) {
                    self.pair(xp, yp, ids.next_key());
                } else if x.tag().is_some() && x.tag() == y.tag() && x.kind() != NodeKind::Math {
                    self.prematch(x, y, &xp, &yp, ids);
                }
            }
            return;
        }

        let mut cursor = 0;
        for (j, y) in b.iter().enumerate() {
            if let Some(offset) = a[cursor..].iter().position(|x| x.equal_to(y)) {
                let i = cursor + offset;
                self.pair(old_path.child(i), new_path.child(j), ids.next_key());
                cursor = i + 1;
            }
        }
    }

    /// Sequence diff over the visible nodes of both trees.
    ///
    /// Both trees are flattened in document order without the root. Math
    /// containers are kept whole and typesetter markup is left out, so
    /// typesetting never disturbs the matching.
    pub fn myers(old: &OrderedTree<'_>, new: &OrderedTree<'_>, ids: &mut IdAllocator) -> Self {
        let mut old_nodes = Vec::new();
        let mut new_nodes = Vec::new();
        flatten(old, &NodePath::root(), &mut old_nodes);
        flatten(new, &NodePath::root(), &mut new_nodes);

        let mut map = Self::new();
        diff_by(
            &old_nodes,
            &new_nodes,
            |(_, x), (_, y)| x.equal_to(y),
            |i, j| {
                map.pair(old_nodes[i].0.clone(), new_nodes[j].0.clone(), ids.next_key());
            },
        );
        map
    }
}

/// Visible descendants of `tree` in pre-order, with their paths.
fn flatten<'t, 'a>(tree: &'t OrderedTree<'a>, path: &NodePath, out: &mut Vec<(NodePath, &'t OrderedTree<'a>)>) {
    for (index, child) in tree.children().iter().enumerate() {
        if child.tag().is_some_and(MathFamily::is_typesetter_internal) {
            continue;
        }
        let child_path = path.child(index);
        out.push((child_path.clone(), child));
        if child.kind() != NodeKind::Math {
            flatten(child, &child_path, out);
        }
    }
}
