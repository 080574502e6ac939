//! Applying reconciliation results to the live tree.
//!
//! Two appliers share one outcome type:
//!
//! - [`TreePatcher`]: a keyed/positional morph of the live tree into the
//!   staged tree, steered by [`PatchHooks`]. [`MorphPatcher`] is the
//!   default; hosts may plug their own.
//! - [`apply_script`]: replays an [`EditScript`](crate::algo::EditScript)
//!   from the edit-distance engine.
//!
//! All recorded paths are in staged-tree coordinates, which are the live
//! coordinates once the patch is complete.

mod morph;
mod script;

pub use morph::MorphPatcher;
pub use script::apply_script;

use crate::error::PatchError;
use crate::node::{Element, Node, NodePath};

/// Which tree a node path refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// The live tree, before patching.
    Old,
    /// The staged tree.
    New,
}

/// Decision of [`PatchHooks::before_update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateAction {
    /// Morph the old node into the new one.
    Update,
    /// Leave the old node as the hook left it.
    Skip,
}

/// Callbacks a patcher consults while morphing.
pub trait PatchHooks {
    /// Called before a matched pair is morphed. `path` is the staged path.
    /// The hook may edit `old` itself and return [`UpdateAction::Skip`].
    fn before_update(&mut self, old: &mut Node, new: &Node, path: &NodePath) -> UpdateAction;

    /// Identity key of the node at `path` on `side`. `None` means the
    /// patcher matches it by position and shape.
    fn node_key(&self, side: Side, path: &NodePath) -> Option<&str>;
}

/// Hooks that never skip and never key.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHooks;

impl PatchHooks for NoHooks {
    fn before_update(&mut self, _old: &mut Node, _new: &Node, _path: &NodePath) -> UpdateAction {
        UpdateAction::Update
    }

    fn node_key(&self, _side: Side, _path: &NodePath) -> Option<&str> {
        None
    }
}

/// Generic tree-patching primitive.
pub trait TreePatcher {
    /// Morph `old` into `new`. With `children_only`, the root's own tag and
    /// attributes are left alone.
    fn patch(
        &mut self,
        old: &mut Element,
        new: &Element,
        children_only: bool,
        hooks: &mut dyn PatchHooks,
    ) -> Result<PatchOutcome, PatchError>;
}

/// What a patch changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchOutcome {
    /// Freshly inserted subtrees.
    pub inserted: Vec<NodePath>,
    /// Nodes whose text or attributes were rewritten in place.
    pub updated: Vec<NodePath>,
    /// Number of live subtrees dropped.
    pub removed: usize,
}

impl PatchOutcome {
    /// Total structural and in-place edits.
    pub fn edits(&self) -> usize {
        self.inserted.len() + self.updated.len() + self.removed
    }

    pub fn is_empty(&self) -> bool {
        self.edits() == 0
    }
}
