//! Error types for preview reconciliation.
//!
//! Only patch failures are expected at runtime; the driver recovers from
//! them by replacing the live content wholesale. An invalid edit script is
//! a programming error and is surfaced the same way so the preview never
//! stays half patched.

use thiserror::Error;

use crate::node::NodePath;

/// Errors raised by a [`TreePatcher`](crate::patch::TreePatcher).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PatchError {
    /// Two siblings on one side share an identity key.
    #[error("duplicate node key `{key}` at {path}")]
    DuplicateKey { key: String, path: NodePath },

    /// A keyed pair, or an op target, has a different node type or tag.
    #[error("structural mismatch at {path}")]
    StructuralMismatch { path: NodePath },

    /// An edit op points past the end of a child list.
    #[error("edit out of range at {path}: {detail}")]
    OutOfRange { path: NodePath, detail: String },
}

/// Errors that can occur while reconciling two trees.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReconcileError {
    /// Edit-script reconstruction hit a malformed table.
    #[error("invalid edit script: {0}")]
    InvalidScript(String),

    #[error("patch failed: {0}")]
    Patch(#[from] PatchError),

    /// A diff-method setting other than `none`, `heuristic` or `myers`.
    #[error("unknown diff method `{0}`")]
    UnknownDiffMethod(String),
}

/// Result type alias for reconciliation operations.
pub type ReconcileResult<T> = Result<T, ReconcileError>;

impl ReconcileError {
    pub fn invalid_script(msg: impl Into<String>) -> Self {
        Self::InvalidScript(msg.into())
    }
}

impl PatchError {
    pub fn out_of_range(path: &NodePath, detail: impl Into<String>) -> Self {
        Self::OutOfRange {
            path: path.clone(),
            detail: detail.into(),
        }
    }
}
