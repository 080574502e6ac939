//! Algorithm implementations for reconciliation.
//!
//! - `edit`: bounded tree edit distance producing edit scripts
//! - `myers`: linear-space Myers diff for node matching
//! - `hash`: Stable hashing utilities

mod edit;
mod hash;
mod myers;

pub use edit::{Cost, DEFAULT_MAX_COST, EditOp, EditScript, INFINITE, TreeDiff, tree_diff};
pub use hash::{StableHasher, element_fingerprint, text_fingerprint};
pub use myers::{diff_by, matches_by};
