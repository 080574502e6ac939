//! Replaying edit scripts on the live tree.

use crate::algo::{EditOp, EditScript};
use crate::error::PatchError;
use crate::node::{Element, Node, NodePath};

use super::PatchOutcome;

/// Apply `script`, computed between `live` and `staged`, to `live`.
///
/// Ops run in script order. With `children_only`, an attribute change on
/// the root itself is ignored.
pub fn apply_script(
    live: &mut Element,
    staged: &Element,
    script: &EditScript,
    children_only: bool,
) -> Result<PatchOutcome, PatchError> {
    let mut out = PatchOutcome::default();
    let root = NodePath::root();
    if script.attrs_changed && !children_only {
        live.attrs.clone_from(&staged.attrs);
        out.updated.push(root.clone());
    }
    apply_ops(live, staged, script, &root, &mut out)?;
    Ok(out)
}

fn apply_ops(
    live: &mut Element,
    staged: &Element,
    script: &EditScript,
    path: &NodePath,
    out: &mut PatchOutcome,
) -> Result<(), PatchError> {
    for op in &script.ops {
        match op {
            &EditOp::Delete { at } => {
                if at >= live.children.len() {
                    return Err(PatchError::out_of_range(
                        path,
                        format!("delete at {at} of {}", live.children.len()),
                    ));
                }
                live.children.remove(at);
                out.removed += 1;
            }
            &EditOp::Insert { other, at } => {
                let node = staged.children.get(other).ok_or_else(|| {
                    PatchError::out_of_range(path, format!("no staged child {other}"))
                })?;
                if at > live.children.len() {
                    return Err(PatchError::out_of_range(
                        path,
                        format!("insert at {at} of {}", live.children.len()),
                    ));
                }
                live.children.insert(at, node.clone());
                out.inserted.push(path.child(other));
            }
            EditOp::Recurse { old, other, script } => {
                let child_path = path.child(*other);
                let mismatch = || PatchError::StructuralMismatch {
                    path: child_path.clone(),
                };
                let target = staged
                    .children
                    .get(*other)
                    .and_then(Node::as_element)
                    .ok_or_else(mismatch)?;
                let node = live
                    .children
                    .get_mut(*old)
                    .and_then(Node::as_element_mut)
                    .ok_or_else(mismatch)?;
                if node.tag != target.tag {
                    return Err(mismatch());
                }
                if script.attrs_changed {
                    node.attrs.clone_from(&target.attrs);
                    out.updated.push(child_path.clone());
                }
                apply_ops(node, target, script, &child_path, out)?;
            }
        }
    }
    Ok(())
}
