//! Reconciliation driver.
//!
//! [`Reconciler`] turns the live preview tree into a freshly rendered
//! staged tree with as few mutations as it can, then hands every inserted
//! or re-rendered node to the math [`Typesetter`] in one batch.
//!
//! # Strategies
//!
//! - [`Engine::Patcher`]: build an [`IdentityMap`] with the configured
//!   [`DiffMethod`] and let a [`TreePatcher`] morph the tree
//! - [`Engine::EditDistance`]: compute a bounded edit script and replay it
//!
//! Both paths treat math containers specially: containers with the same
//! payload are left untouched, and a changed payload is rewritten in place
//! without rebuilding the typeset markup around it.
//!
//! # Failure
//!
//! Any patch or script error replaces the live children with a copy of
//! the staged children. The preview is never left half patched.

mod identity;
mod queue;

pub use identity::IdentityMap;
pub use queue::{Submission, UpdateQueue};

#[cfg(feature = "async")]
pub use queue::{PreviewSession, UpdateStatus};

use std::rc::Rc;

use crate::config::{DiffMethod, Engine, ReconcileConfig};
use crate::error::ReconcileResult;
use crate::families::MathFamily;
use crate::id::IdAllocator;
use crate::node::{Element, Node, NodePath};
use crate::patch::{MorphPatcher, PatchHooks, PatchOutcome, Side, TreePatcher, UpdateAction, apply_script};
use crate::tree::OrderedTree;

// =============================================================================
// Typesetter
// =============================================================================

/// External math typesetting collaborator.
pub trait Typesetter {
    /// Typeset the nodes at `targets` below `root`.
    ///
    /// Called at most once per reconciliation, with every target of that
    /// pass.
    fn typeset(&mut self, root: &mut Element, targets: &[NodePath]) -> impl Future<Output = ()>;
}

/// A typesetter that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTypesetter;

impl Typesetter for NoopTypesetter {
    #[inline]
    async fn typeset(&mut self, _root: &mut Element, _targets: &[NodePath]) {}
}

// =============================================================================
// ReconcileOutcome
// =============================================================================

/// What one reconciliation did to the live tree.
///
/// Paths are in staged-tree coordinates, i.e. live coordinates after the
/// patch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    /// Freshly inserted subtrees.
    pub inserted: Vec<NodePath>,
    /// Math containers whose payload was rewritten in place.
    pub retypeset: Vec<NodePath>,
    /// Number of live subtrees dropped.
    pub removed: usize,
    /// Last touched location in document order, for scroll sync.
    pub last_changed: Option<NodePath>,
    /// The live content was replaced wholesale after an error.
    pub fell_back: bool,
    /// Total edits applied.
    pub edits: usize,
}

impl ReconcileOutcome {
    fn from_patch(patch: PatchOutcome, retypeset: Vec<NodePath>) -> Self {
        let last_changed = patch
            .inserted
            .iter()
            .chain(&patch.updated)
            .chain(&retypeset)
            .max()
            .cloned();
        Self {
            edits: patch.edits() + retypeset.len(),
            inserted: patch.inserted,
            retypeset,
            removed: patch.removed,
            last_changed,
            fell_back: false,
        }
    }

    /// Nodes the typesetter should render, in document order.
    pub fn typeset_targets(&self) -> Vec<NodePath> {
        let mut targets: Vec<_> = self.inserted.iter().chain(&self.retypeset).cloned().collect();
        targets.sort();
        targets.dedup();
        targets
    }

    /// Nothing changed.
    pub fn is_unchanged(&self) -> bool {
        self.edits == 0 && !self.fell_back
    }
}

// =============================================================================
// Reconciler
// =============================================================================

/// Keeps a live tree in sync with freshly rendered content.
///
/// Owns the allocator for node identity tags, so tags stay unique for the
/// reconciler's lifetime. Trees, identity maps and diff caches live for
/// one call only.
pub struct Reconciler<P = MorphPatcher> {
    config: ReconcileConfig,
    ids: IdAllocator,
    patcher: P,
}

impl Reconciler {
    pub fn new(config: ReconcileConfig) -> Self {
        Self::with_patcher(config, MorphPatcher)
    }
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new(ReconcileConfig::default())
    }
}

/// Result of one strategy run, before it becomes an outcome.
struct Pass {
    patch: PatchOutcome,
    retypeset: Vec<NodePath>,
}

impl<P: TreePatcher> Reconciler<P> {
    pub fn with_patcher(config: ReconcileConfig, patcher: P) -> Self {
        Self {
            config,
            ids: IdAllocator::new(),
            patcher,
        }
    }

    pub fn config(&self) -> &ReconcileConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: ReconcileConfig) {
        self.config = config;
    }

    /// Number of identity tags issued so far.
    pub fn ids_issued(&self) -> u64 {
        self.ids.issued()
    }

    /// Patch `live` so its children match `staged`'s.
    ///
    /// The root element itself is left alone. Never fails: on error the
    /// live children are replaced with a copy of the staged children and
    /// the outcome is marked [`fell_back`](ReconcileOutcome::fell_back).
    pub fn reconcile(&mut self, live: &mut Element, staged: &Element) -> ReconcileOutcome {
        tracing::debug!(
            engine = ?self.config.engine,
            method = %self.config.diff_method,
            live = live.len(),
            staged = staged.len(),
            "reconciling"
        );

        let result = match self.config.engine {
            Engine::EditDistance => self.run_edit_distance(live, staged),
            Engine::Patcher => self.run_patcher(live, staged),
        };

        let outcome = settle(live, staged, result);

        tracing::debug!(
            inserted = outcome.inserted.len(),
            retypeset = outcome.retypeset.len(),
            removed = outcome.removed,
            edits = outcome.edits,
            fell_back = outcome.fell_back,
            "reconciled"
        );
        outcome
    }

    /// [`reconcile`](Self::reconcile), then typeset the result.
    ///
    /// With `render_math` set and at least one target, the typesetter is
    /// awaited once with all targets.
    pub async fn reconcile_and_typeset<T: Typesetter>(
        &mut self,
        live: &mut Element,
        staged: &Element,
        typesetter: &mut T,
    ) -> ReconcileOutcome {
        let outcome = self.reconcile(live, staged);
        if self.config.render_math {
            let targets = outcome.typeset_targets();
            if !targets.is_empty() {
                tracing::debug!(targets = targets.len(), "typesetting");
                typesetter.typeset(live, &targets).await;
            }
        }
        outcome
    }

    fn run_edit_distance(&mut self, live: &mut Element, staged: &Element) -> ReconcileResult<Pass> {
        let script = {
            let old = OrderedTree::new(live, &mut self.ids);
            let new = OrderedTree::new(staged, &mut self.ids);
            let diff = old.diff(&new, self.config.max_cost)?;
            tracing::trace!(
                cost = diff.cost,
                ops = diff.script.op_count(),
                "edit script"
            );
            if diff.is_infinite() {
                None
            } else {
                Some(Rc::clone(&diff.script))
            }
        };

        let patch = match script {
            Some(script) => apply_script(live, staged, &script, true)?,
            None => {
                tracing::debug!(bound = self.config.max_cost, "over budget, replacing content");
                replace_children(live, staged)
            }
        };
        Ok(Pass {
            patch,
            retypeset: Vec::new(),
        })
    }

    fn run_patcher(&mut self, live: &mut Element, staged: &Element) -> ReconcileResult<Pass> {
        let map = self.identity_map(live, staged);
        let mut hooks = DriverHooks {
            map: map.as_ref(),
            retypeset: Vec::new(),
        };
        let patch = self.patcher.patch(live, staged, true, &mut hooks)?;
        Ok(Pass {
            patch,
            retypeset: hooks.retypeset,
        })
    }

    fn identity_map(&mut self, live: &Element, staged: &Element) -> Option<IdentityMap> {
        let build: fn(&OrderedTree<'_>, &OrderedTree<'_>, &mut IdAllocator) -> IdentityMap =
            match self.config.diff_method {
                DiffMethod::None => return None,
                DiffMethod::Heuristic => IdentityMap::heuristic,
                DiffMethod::Myers => IdentityMap::myers,
            };
        let old = OrderedTree::new(live, &mut self.ids);
        let new = OrderedTree::new(staged, &mut self.ids);
        let map = build(&old, &new, &mut self.ids);
        tracing::debug!(pairs = map.len(), "identity map");
        Some(map)
    }
}

/// Turn a strategy result into an outcome, replacing the live children
/// when the strategy failed.
fn settle(live: &mut Element, staged: &Element, result: ReconcileResult<Pass>) -> ReconcileOutcome {
    match result {
        Ok(pass) => ReconcileOutcome::from_patch(pass.patch, pass.retypeset),
        Err(error) => {
            tracing::warn!(%error, "reconciliation failed, replacing preview content");
            ReconcileOutcome {
                fell_back: true,
                ..ReconcileOutcome::from_patch(replace_children(live, staged), Vec::new())
            }
        }
    }
}

/// Wholesale replacement of the live children.
fn replace_children(live: &mut Element, staged: &Element) -> PatchOutcome {
    let removed = live.children.len();
    live.children.clone_from(&staged.children);
    PatchOutcome {
        inserted: (0..staged.children.len()).map(|i| NodePath::root().child(i)).collect(),
        updated: Vec::new(),
        removed,
    }
}

// =============================================================================
// Patch hooks
// =============================================================================

struct DriverHooks<'m> {
    map: Option<&'m IdentityMap>,
    retypeset: Vec<NodePath>,
}

impl PatchHooks for DriverHooks<'_> {
    fn before_update(&mut self, old: &mut Node, new: &Node, path: &NodePath) -> UpdateAction {
        if old.is_equal_node(new) {
            return UpdateAction::Skip;
        }
        let (Node::Element(old), Node::Element(new)) = (old, new) else {
            return UpdateAction::Update;
        };
        if !MathFamily::is_math(old) || !MathFamily::is_math(new) {
            return UpdateAction::Update;
        }
        let Some(target) = MathFamily::payload(new) else {
            return UpdateAction::Update;
        };

        let changed = match MathFamily::payload(old) {
            Some(current) if current.mode == target.mode => current.source != target.source,
            _ => {
                // Mode or payload shape changed: rebuild the container.
                self.retypeset.push(path.clone());
                return UpdateAction::Update;
            }
        };
        if changed && MathFamily::set_source(old, &target.source) {
            self.retypeset.push(path.clone());
        }
        UpdateAction::Skip
    }

    fn node_key(&self, side: Side, path: &NodePath) -> Option<&str> {
        self.map.and_then(|map| map.key(side, path))
    }
}
