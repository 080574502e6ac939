//! Tree edit distance over ordered child sequences.
//!
//! Transforms the children of one node into the children of another with
//! three operations: delete a subtree (cost = its size), insert a subtree
//! (cost = its size), or recurse into a compatible pair (cost = the nested
//! distance). The metric is bounded: any partial cost reaching the bound
//! is pruned, and a total at or above it is reported as [`INFINITE`],
//! telling the caller to replace wholesale.
//!
//! # Algorithm
//!
//! 1. Equal pairs cost 0, pairs that cannot be patched cost infinity
//! 2. Memo lookup by the other node's [`TreeId`](crate::id::TreeId)
//! 3. Skip the common prefix of equal children
//! 4. Fill a sparse DP table top-down from the bottom-right cell
//! 5. Walk the chosen predecessors back to build the script
//!
//! A recursive match cheaper than replacing both subtrees outright
//! (`sub + 1 < size_old + size_new`) is taken without looking at the delete
//! and insert alternatives. This keeps large, mostly matching documents
//! fast at the price of strict minimality.
//!
//! # Op ordering
//!
//! Ops are emitted from the end of the child list towards the start. Each
//! op refers to positions in the live list as it stands when that op is
//! applied, and never disturbs the positions of the ops that follow.

use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::attr::AttrsExt;
use crate::error::{ReconcileError, ReconcileResult};
use crate::tree::OrderedTree;

/// Edit cost. [`INFINITE`] means "replace wholesale".
pub type Cost = usize;

/// The infinite cost sentinel.
pub const INFINITE: Cost = Cost::MAX;

/// Default cost bound for one reconciliation.
pub const DEFAULT_MAX_COST: Cost = 100_000;

// =============================================================================
// Public Types
// =============================================================================

/// One edit on a live child list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOp {
    /// Remove the live child at `at`.
    Delete { at: usize },
    /// Clone staged child `other` and splice it in at `at`.
    Insert { other: usize, at: usize },
    /// Reconcile live child `old` with staged child `other` using `script`.
    Recurse {
        old: usize,
        other: usize,
        script: Rc<EditScript>,
    },
}

/// Edits turning one node into another.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditScript {
    pub ops: Vec<EditOp>,
    /// The node's own attributes differ and must be copied from the staged
    /// node.
    pub attrs_changed: bool,
}

impl EditScript {
    /// No ops and no attribute change.
    pub fn is_trivial(&self) -> bool {
        self.ops.is_empty() && !self.attrs_changed
    }

    /// Number of ops, nested scripts included.
    pub fn op_count(&self) -> usize {
        self.ops
            .iter()
            .map(|op| match op {
                EditOp::Recurse { script, .. } => 1 + script.op_count(),
                _ => 1,
            })
            .sum()
    }
}

/// Result of diffing one node pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeDiff {
    pub cost: Cost,
    pub script: Rc<EditScript>,
}

impl TreeDiff {
    /// Zero cost, empty script.
    pub fn equal() -> Self {
        Self {
            cost: 0,
            script: Rc::default(),
        }
    }

    /// Infinite cost, no script.
    pub fn infinite() -> Self {
        Self {
            cost: INFINITE,
            script: Rc::default(),
        }
    }

    #[inline]
    pub fn is_infinite(&self) -> bool {
        self.cost == INFINITE
    }
}

// =============================================================================
// Entry Point
// =============================================================================

/// Diff `old` against `new` under the cost bound `bound`.
///
/// Results other than the equal and incompatible short-circuits are
/// memoized on `old`, keyed by `new`'s id, regardless of the bound they
/// were computed with.
pub fn tree_diff(
    old: &OrderedTree<'_>,
    new: &OrderedTree<'_>,
    bound: Cost,
) -> ReconcileResult<Rc<TreeDiff>> {
    if old.equal_to(new) {
        return Ok(Rc::new(TreeDiff::equal()));
    }
    if old.cannot_replace_with(new) {
        return Ok(Rc::new(TreeDiff::infinite()));
    }
    if let Some(hit) = old.cache.borrow().get(&new.id()) {
        return Ok(Rc::clone(hit));
    }
    if bound == 0 {
        return Ok(Rc::new(TreeDiff::infinite()));
    }

    let result = Rc::new(children_diff(old, new, bound)?);
    old.cache.borrow_mut().insert(new.id(), Rc::clone(&result));
    Ok(result)
}

fn children_diff(
    old: &OrderedTree<'_>,
    new: &OrderedTree<'_>,
    bound: Cost,
) -> ReconcileResult<TreeDiff> {
    let (a, b) = (old.children(), new.children());
    let offset = a
        .iter()
        .zip(b)
        .take_while(|(x, y)| x.equal_to(y))
        .count();

    let mut table = Table::new(&a[offset..], &b[offset..]);
    let total = table.score(table.old.len(), table.new.len(), bound)?;
    if total >= bound {
        return Ok(TreeDiff::infinite());
    }

    let ops = table.reconstruct(offset)?;
    let attrs_changed = match (old.as_element(), new.as_element()) {
        (Some(x), Some(y)) => !x.attrs.same_set(&y.attrs),
        _ => false,
    };
    tracing::trace!(cost = total, ops = ops.len(), offset, "child diff");

    Ok(TreeDiff {
        cost: total,
        script: Rc::new(EditScript { ops, attrs_changed }),
    })
}

// =============================================================================
// DP Table
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Match,
    Delete,
    Insert,
}

/// A computed interior cell.
struct Cell {
    cost: Cost,
    /// Bound the cell was computed under; an infinite cost is only final
    /// for bounds up to this one.
    bound: Cost,
    step: Step,
    sub: Option<Rc<TreeDiff>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Enter,
    AfterMatch,
    AfterDelete,
    AfterInsert,
}

/// A pending `score(i, j, max)` evaluation.
struct Frame {
    i: usize,
    j: usize,
    max: Cost,
    stage: Stage,
    sub: Option<Rc<TreeDiff>>,
    sub_cost: Cost,
    val: Cost,
    step: Step,
}

impl Frame {
    fn new(i: usize, j: usize, max: Cost) -> Self {
        Self {
            i,
            j,
            max,
            stage: Stage::Enter,
            sub: None,
            sub_cost: INFINITE,
            val: INFINITE,
            step: Step::Match,
        }
    }
}

enum Next {
    /// Evaluate a predecessor cell first.
    Push(Frame),
    /// The alternative is out of budget; resume with an infinite result.
    Skip,
    /// Known without computing; pop and return.
    Return(Cost),
    /// All alternatives done; store the cell, pop and return.
    Finish,
}

struct Table<'t, 'a, 'b> {
    old: &'t [OrderedTree<'a>],
    new: &'t [OrderedTree<'b>],
    /// `deletes[i]`: cost of deleting the first `i` old children.
    deletes: Vec<Cost>,
    /// `inserts[j]`: cost of inserting the first `j` new children.
    inserts: Vec<Cost>,
    cells: FxHashMap<(usize, usize), Cell>,
}

fn running_sizes(trees: &[OrderedTree<'_>]) -> Vec<Cost> {
    let mut sums = Vec::with_capacity(trees.len() + 1);
    let mut total: Cost = 0;
    sums.push(total);
    for tree in trees {
        total = total.saturating_add(tree.size());
        sums.push(total);
    }
    sums
}

impl<'t, 'a, 'b> Table<'t, 'a, 'b> {
    fn new(old: &'t [OrderedTree<'a>], new: &'t [OrderedTree<'b>]) -> Self {
        Self {
            old,
            new,
            deletes: running_sizes(old),
            inserts: running_sizes(new),
            cells: FxHashMap::default(),
        }
    }

    /// Border cells and cells whose result under `max` is already known.
    fn lookup(&self, i: usize, j: usize, max: Cost) -> Option<Cost> {
        if max == 0 {
            return Some(INFINITE);
        }
        let border = if j == 0 {
            Some(self.deletes[i])
        } else if i == 0 {
            Some(self.inserts[j])
        } else {
            None
        };
        if let Some(cost) = border {
            return Some(if cost < max { cost } else { INFINITE });
        }

        let cell = self.cells.get(&(i, j))?;
        if cell.cost != INFINITE {
            Some(if cell.cost < max { cell.cost } else { INFINITE })
        } else if cell.bound >= max {
            Some(INFINITE)
        } else {
            None
        }
    }

    fn store(&mut self, frame: Frame) -> Cost {
        let cost = if frame.val >= frame.max {
            INFINITE
        } else {
            frame.val
        };
        self.cells.insert(
            (frame.i, frame.j),
            Cell {
                cost,
                bound: frame.max,
                step: frame.step,
                sub: frame.sub,
            },
        );
        cost
    }

    /// Cheapest way to turn the first `i` old children into the first `j`
    /// new children, or [`INFINITE`] if that reaches `max`.
    ///
    /// Runs on an explicit stack: long child lists would otherwise recurse
    /// once per cell along the table diagonal.
    fn score(&mut self, i: usize, j: usize, max: Cost) -> ReconcileResult<Cost> {
        let mut stack = vec![Frame::new(i, j, max)];
        let mut ret = INFINITE;

        while let Some(top) = stack.len().checked_sub(1) {
            let frame = &mut stack[top];
            let next = match frame.stage {
                Stage::Enter => match self.lookup(frame.i, frame.j, frame.max) {
                    Some(known) => Next::Return(known),
                    None => {
                        let sub = tree_diff(
                            &self.old[frame.i - 1],
                            &self.new[frame.j - 1],
                            frame.max,
                        )?;
                        frame.sub_cost = sub.cost;
                        frame.sub = Some(sub);
                        frame.stage = Stage::AfterMatch;
                        if frame.sub_cost < frame.max {
                            Next::Push(Frame::new(
                                frame.i - 1,
                                frame.j - 1,
                                frame.max - frame.sub_cost,
                            ))
                        } else {
                            Next::Skip
                        }
                    }
                },
                Stage::AfterMatch => {
                    frame.val = ret.saturating_add(frame.sub_cost);
                    frame.step = Step::Match;
                    let old_size = self.old[frame.i - 1].size();
                    let new_size = self.new[frame.j - 1].size();
                    if frame.sub_cost.saturating_add(1) < old_size + new_size {
                        Next::Finish
                    } else {
                        frame.stage = Stage::AfterDelete;
                        let limit = frame.val.min(frame.max);
                        if old_size < limit {
                            Next::Push(Frame::new(frame.i - 1, frame.j, limit - old_size))
                        } else {
                            Next::Skip
                        }
                    }
                }
                Stage::AfterDelete => {
                    let cost = ret.saturating_add(self.old[frame.i - 1].size());
                    if cost < frame.val {
                        frame.val = cost;
                        frame.step = Step::Delete;
                    }
                    frame.stage = Stage::AfterInsert;
                    let new_size = self.new[frame.j - 1].size();
                    let limit = frame.val.min(frame.max);
                    if new_size < limit {
                        Next::Push(Frame::new(frame.i, frame.j - 1, limit - new_size))
                    } else {
                        Next::Skip
                    }
                }
                Stage::AfterInsert => {
                    let cost = ret.saturating_add(self.new[frame.j - 1].size());
                    if cost < frame.val {
                        frame.val = cost;
                        frame.step = Step::Insert;
                    }
                    Next::Finish
                }
            };

            match next {
                Next::Push(child) => stack.push(child),
                Next::Skip => ret = INFINITE,
                Next::Return(cost) => {
                    stack.pop();
                    ret = cost;
                }
                Next::Finish => {
                    if let Some(frame) = stack.pop() {
                        ret = self.store(frame);
                    }
                }
            }
        }

        Ok(ret)
    }

    /// Walk predecessors back from the bottom-right cell.
    fn reconstruct(&self, offset: usize) -> ReconcileResult<Vec<EditOp>> {
        let (mut i, mut j) = (self.old.len(), self.new.len());
        let mut ops = Vec::new();

        while i > 0 || j > 0 {
            let step = if i == 0 {
                Step::Insert
            } else if j == 0 {
                Step::Delete
            } else {
                let cell = self
                    .cells
                    .get(&(i, j))
                    .filter(|cell| cell.cost != INFINITE)
                    .ok_or_else(|| {
                        ReconcileError::invalid_script(format!("no predecessor for cell ({i}, {j})"))
                    })?;
                if cell.step == Step::Match {
                    let sub = cell.sub.as_ref().ok_or_else(|| {
                        ReconcileError::invalid_script(format!("match without subdiff at ({i}, {j})"))
                    })?;
                    if !sub.script.is_trivial() {
                        ops.push(EditOp::Recurse {
                            old: offset + i - 1,
                            other: offset + j - 1,
                            script: Rc::clone(&sub.script),
                        });
                    }
                }
                cell.step
            };

            match step {
                Step::Match => {
                    i -= 1;
                    j -= 1;
                }
                Step::Delete => {
                    ops.push(EditOp::Delete { at: offset + i - 1 });
                    i -= 1;
                }
                Step::Insert => {
                    ops.push(EditOp::Insert {
                        other: offset + j - 1,
                        at: offset + i,
                    });
                    j -= 1;
                }
            }
        }

        Ok(ops)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::IdAllocator;
    use crate::node::Element;

    fn list(items: &[&str]) -> Element {
        let mut ul = Element::new("ul");
        for item in items {
            ul.push_elem(Element::new("li").text(*item));
        }
        ul
    }

    fn run(old: &Element, new: &Element, bound: Cost) -> TreeDiff {
        let mut ids = IdAllocator::new();
        let a = OrderedTree::new(old, &mut ids);
        let b = OrderedTree::new(new, &mut ids);
        let result = tree_diff(&a, &b, bound).expect("diff");
        (*result).clone()
    }

    /// Cost of a script recomputed from the sizes of the nodes it touches.
    fn script_cost(old: &OrderedTree<'_>, new: &OrderedTree<'_>, script: &EditScript) -> Cost {
        script
            .ops
            .iter()
            .map(|op| match op {
                EditOp::Delete { at } => old.children()[*at].size(),
                EditOp::Insert { other, .. } => new.children()[*other].size(),
                EditOp::Recurse { old: o, other, script } => {
                    script_cost(&old.children()[*o], &new.children()[*other], script)
                }
            })
            .sum()
    }

    #[test]
    fn test_append_is_single_insert() {
        let result = run(&list(&["a", "b"]), &list(&["a", "b", "c"]), DEFAULT_MAX_COST);
        assert_eq!(result.cost, 1);
        assert_eq!(result.script.ops, vec![EditOp::Insert { other: 2, at: 2 }]);
    }

    #[test]
    fn test_changed_text_is_delete_then_insert() {
        let old = Element::new("p").text("X");
        let new = Element::new("p").text("Y");
        let result = run(&old, &new, DEFAULT_MAX_COST);
        assert_eq!(result.cost, 2);
        assert_eq!(
            result.script.ops,
            vec![EditOp::Delete { at: 0 }, EditOp::Insert { other: 0, at: 0 }]
        );
    }

    #[test]
    fn test_identical_trees_cost_nothing() {
        let tree = Element::new("div")
            .child(list(&["a", "b"]))
            .child(Element::new("p").text("x"));
        for bound in [0, 1, DEFAULT_MAX_COST, INFINITE] {
            let result = run(&tree, &tree.clone(), bound);
            assert_eq!(result.cost, 0);
            assert!(result.script.is_trivial());
        }
    }

    #[test]
    fn test_incompatible_roots_are_infinite() {
        let old = Element::new("ul").child(Element::new("li"));
        let new = Element::new("ol").child(Element::new("li"));
        for bound in [0, 5, INFINITE] {
            assert!(run(&old, &new, bound).is_infinite());
        }
        let old = Element::new("a").attr("href", "#x").text("1");
        let new = Element::new("a").attr("href", "#x").text("2");
        assert!(run(&old, &new, INFINITE).is_infinite());
    }

    #[test]
    fn test_zero_bound_is_infinite() {
        let result = run(&list(&["a"]), &list(&["a", "b"]), 0);
        assert!(result.is_infinite());
    }

    #[test]
    fn test_bound_prunes() {
        let old = Element::new("p").text("X");
        let new = Element::new("p").text("Y");
        assert!(run(&old, &new, 2).is_infinite());
        assert_eq!(run(&old, &new, 3).cost, 2);
    }

    fn para(texts: &str) -> Element {
        let mut p = Element::new("p");
        for c in texts.chars() {
            p.push_text(c.to_string());
        }
        p
    }

    #[test]
    fn test_unbounded_never_worse_over_text_runs() {
        // Text children only: every pair is equal or incompatible, so no
        // match is ever forced at a finite nested cost.
        let cases = [
            ("abcd", "bxde"),
            ("aaab", "ab"),
            ("xyz", "zyx"),
            ("abcabba", "cbabac"),
            ("a", ""),
        ];
        for (old, new) in cases {
            let (old, new) = (para(old), para(new));
            let unbounded = run(&old, &new, INFINITE).cost;
            assert!(unbounded < INFINITE);
            for bound in [1, 2, 3, 4, 6, 8, DEFAULT_MAX_COST] {
                assert!(unbounded <= run(&old, &new, bound).cost, "bound {bound}");
            }
        }
    }

    #[test]
    fn test_forced_match_can_cost_more_than_a_bounded_diff() {
        let items: Vec<String> = (1..=10).map(|i| format!("t{i}")).collect();
        let mut long = Element::new("p");
        for item in &items {
            long.push_text(item.as_str());
        }
        let old = Element::new("div")
            .child(long.clone().text("u"))
            .child(Element::new("p").text("t1").text("v1").text("v2").text("v3"));
        let new = Element::new("div").child(long);

        // Unbounded, the second paragraph is forced onto the staged one.
        assert_eq!(run(&old, &new, INFINITE).cost, 23);
        assert_eq!(run(&old, &new, DEFAULT_MAX_COST).cost, 23);

        // Under 10 that match is out of budget; deleting it is cheaper.
        let bounded = run(&old, &new, 10);
        assert_eq!(bounded.cost, 5);
        assert_eq!(bounded.script.ops[0], EditOp::Delete { at: 1 });
    }

    #[test]
    fn test_reconstruct_without_scores_is_invalid() {
        let (old, new) = (list(&["a"]), list(&["b"]));
        let mut ids = IdAllocator::new();
        let a = OrderedTree::new(&old, &mut ids);
        let b = OrderedTree::new(&new, &mut ids);
        let table = Table::new(a.children(), b.children());
        assert!(matches!(
            table.reconstruct(0),
            Err(ReconcileError::InvalidScript(_))
        ));
    }

    #[test]
    fn test_forced_match_recurses() {
        let old = Element::new("div").child(Element::new("p").text("a").text("b").text("c"));
        let new = Element::new("div").child(Element::new("p").text("a").text("b").text("d"));
        let result = run(&old, &new, DEFAULT_MAX_COST);
        assert_eq!(result.cost, 2);

        let inner = EditScript {
            ops: vec![EditOp::Delete { at: 2 }, EditOp::Insert { other: 2, at: 2 }],
            attrs_changed: false,
        };
        assert_eq!(
            result.script.ops,
            vec![EditOp::Recurse {
                old: 0,
                other: 0,
                script: Rc::new(inner),
            }]
        );
        assert_eq!(result.script.op_count(), 3);
    }

    #[test]
    fn test_attribute_change_is_recorded() {
        let old = Element::new("div").child(Element::new("p").attr("title", "a").text("x"));
        let new = Element::new("div").child(Element::new("p").attr("title", "b").text("x"));
        let result = run(&old, &new, DEFAULT_MAX_COST);
        assert_eq!(result.cost, 0);
        let [EditOp::Recurse { script, .. }] = result.script.ops.as_slice() else {
            panic!("expected a single recurse, got {:?}", result.script.ops);
        };
        assert!(script.attrs_changed);
        assert!(script.ops.is_empty());
    }

    #[test]
    fn test_cost_matches_script() {
        let cases = [
            (list(&["a", "b", "c"]), list(&["b", "c", "d"])),
            (list(&["a"]), list(&[])),
            (list(&[]), list(&["a", "b"])),
            (
                Element::new("div").child(list(&["a", "b"])).child(Element::new("p").text("q")),
                Element::new("div").child(Element::new("p").text("q")).child(list(&["a", "x"])),
            ),
            (
                Element::new("div")
                    .child(Element::new("section").child(list(&["1", "2", "3"])))
                    .text("tail"),
                Element::new("div")
                    .child(Element::new("section").child(list(&["1", "3"])))
                    .text("tail!"),
            ),
        ];

        for (old, new) in &cases {
            let mut ids = IdAllocator::new();
            let a = OrderedTree::new(old, &mut ids);
            let b = OrderedTree::new(new, &mut ids);
            let result = tree_diff(&a, &b, DEFAULT_MAX_COST).expect("diff");
            assert!(!result.is_infinite());
            assert_eq!(script_cost(&a, &b, &result.script), result.cost);
        }
    }

    #[test]
    fn test_results_are_memoized() {
        let (old, new) = (list(&["a", "b"]), list(&["a", "c"]));
        let mut ids = IdAllocator::new();
        let a = OrderedTree::new(&old, &mut ids);
        let b = OrderedTree::new(&new, &mut ids);

        let first = tree_diff(&a, &b, DEFAULT_MAX_COST).expect("diff");
        let second = tree_diff(&a, &b, 1).expect("diff");
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(a.cached_diffs(), 1);
    }

    #[test]
    fn test_large_equal_prefix() {
        let items: Vec<String> = (0..10_000).map(|i| format!("item {i}")).collect();
        let refs: Vec<&str> = items.iter().map(String::as_str).collect();
        let old = list(&refs);

        assert_eq!(run(&old, &old.clone(), DEFAULT_MAX_COST).cost, 0);

        let mut new = old.clone();
        new.push_elem(Element::new("li").text("extra"));
        let result = run(&old, &new, DEFAULT_MAX_COST);
        assert_eq!(result.cost, 1);
        assert_eq!(
            result.script.ops,
            vec![EditOp::Insert { other: 10_000, at: 10_000 }]
        );
    }

    #[test]
    fn test_large_nested_tree_with_one_change() {
        let mut old = Element::new("ul");
        for section in 0..100 {
            let items: Vec<String> = (0..100).map(|i| format!("{section}.{i}")).collect();
            let refs: Vec<&str> = items.iter().map(String::as_str).collect();
            old.push_elem(Element::new("li").child(list(&refs)));
        }
        let mut new = old.clone();
        if let Some(last) = new.children.last_mut().and_then(|n| n.as_element_mut()) {
            if let Some(inner) = last.children[0].as_element_mut() {
                inner.children[99] = Element::new("li").text("changed").into();
            }
        }

        let result = run(&old, &new, DEFAULT_MAX_COST);
        assert_eq!(result.cost, 2);
        assert_eq!(result.script.op_count(), 5);
    }
}
