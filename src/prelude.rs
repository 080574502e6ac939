//! Prelude module for common imports.
//!
//! ```
//! use preview_vdom::prelude::*;
//! ```

// Node types
pub use crate::node::{Children, Element, Node, NodePath, Text};

// Attributes
pub use crate::attr::{AttrKey, AttrValue, Attrs, AttrsExt, Tag};

// Identity
pub use crate::id::{IdAllocator, NodeKey, TreeId};

// Families
pub use crate::families::{
    EditorFamily, Family, LinkFamily, MathFamily, MathPayload, MediaFamily, NodeKind, math_equal,
};

// Tree
pub use crate::tree::{NodeRef, OrderedTree};

// Algorithms
pub use crate::algo::{
    Cost, DEFAULT_MAX_COST, EditOp, EditScript, INFINITE, StableHasher, TreeDiff, diff_by,
    matches_by, tree_diff,
};

// Patching
pub use crate::patch::{
    MorphPatcher, NoHooks, PatchHooks, PatchOutcome, Side, TreePatcher, UpdateAction,
    apply_script,
};

// Driver
pub use crate::reconcile::{
    IdentityMap, NoopTypesetter, ReconcileOutcome, Reconciler, Submission, Typesetter,
    UpdateQueue,
};

#[cfg(feature = "async")]
pub use crate::reconcile::{PreviewSession, UpdateStatus};

// Config
pub use crate::config::{DiffMethod, Engine, ReconcileConfig};

// Error
pub use crate::error::{PatchError, ReconcileError, ReconcileResult};

// Render
pub use crate::render::{inner_html, node_to_html, to_html};
