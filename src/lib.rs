//! preview-vdom - Incremental tree reconciliation for live preview panes
//!
//! ## Core Concepts
//!
//! A preview host renders Markdown or LaTeX into a fresh *staged* tree on
//! every edit. The [`Reconciler`] transforms the *live* tree (the one on
//! screen) into the staged content with as few mutations as it can, so
//! typeset math, embedded editors and media survive untouched.
//!
//! Two engines are available:
//!
//! - **Patcher**: a morphing patcher driven by a node-identity map that is
//!   built either positionally (`heuristic`) or from a linear-space Myers
//!   diff over flattened node lists (`myers`).
//! - **EditDistance**: a bounded, memoized ordered-tree edit distance whose
//!   edit script is replayed on the live tree.
//!
//! ## Modules
//! - `node`: Element/Text/Node/NodePath types
//! - `families`: node classification (math, editor, link, media)
//! - `tree`: `OrderedTree`, the immutable diffing wrapper
//! - `algo`: tree edit distance, Myers diff, fingerprints
//! - `patch`: the morphing patcher and edit-script application
//! - `reconcile`: the driver, identity maps and update queue
//! - `config`: strategy selection
//! - `render`: HTML serialization
//!
//! ## Usage
//!
//! ```
//! use preview_vdom::prelude::*;
//!
//! let mut live = Element::new("div").child(Element::new("p").text("one"));
//! let staged = Element::new("div")
//!     .child(Element::new("p").text("one"))
//!     .child(Element::new("p").text("two"));
//!
//! let mut reconciler = Reconciler::new(ReconcileConfig::default());
//! let outcome = reconciler.reconcile(&mut live, &staged);
//!
//! assert!(live.is_equal_node(&staged));
//! assert_eq!(outcome.last_changed, Some(NodePath::from_indices([1])));
//! ```

// =============================================================================
// Core modules
// =============================================================================

/// Node types: Element, Node, Text, NodePath
pub mod node;

/// Node classification
pub mod families;

/// Attribute types
pub mod attr;

/// Identity tags for diffing
pub mod id;

/// Immutable tree wrapper used by the edit-distance engine
pub mod tree;

/// Algorithms: tree edit distance, myers, hashing
pub mod algo;

/// Patchers: morphing and edit-script application
pub mod patch;

/// Reconciliation driver
pub mod reconcile;

/// Strategy configuration
pub mod config;

/// Error types
pub mod error;

/// HTML rendering
pub mod render;

/// Prelude for common imports
pub mod prelude;

// =============================================================================
// Re-exports
// =============================================================================

// Node types
pub use node::{Children, Element, Node, NodePath, Text};

// Families
pub use families::{Family, NodeKind};

// Tree
pub use tree::OrderedTree;

// Attribute types
pub use attr::{AttrKey, AttrValue, Attrs, AttrsExt, Tag};

// Identity
pub use id::{IdAllocator, NodeKey, TreeId};

// Algorithms
pub use algo::{Cost, EditOp, EditScript, StableHasher, TreeDiff, INFINITE};

// Patching
pub use patch::{MorphPatcher, PatchHooks, PatchOutcome, TreePatcher};

// Driver
pub use reconcile::{ReconcileOutcome, Reconciler, Typesetter};

#[cfg(feature = "async")]
pub use reconcile::{PreviewSession, UpdateStatus};

// Config
pub use config::{DiffMethod, Engine, ReconcileConfig};

// Error types
pub use error::{PatchError, ReconcileError, ReconcileResult};
