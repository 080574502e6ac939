//! Myers' O(ND) sequence diff in linear space.
//!
//! Finds a longest common subsequence between two slices under a caller
//! predicate and reports every matched pair to a sink. Used to match
//! nodes across flattened document traversals.
//!
//! # Algorithm
//!
//! Divide and conquer on the "middle snake" (Myers 1986, section 4b):
//!
//! 1. Strip the common prefix and suffix
//! 2. Run the forward and backward searches until they overlap
//! 3. Split at the overlapping snake and recurse on both halves
//!
//! Two `V` vectors of `O(N + M)` are allocated once and reused by every
//! level of the recursion.
//!
//! # Complexity
//!
//! - Time: O((N + M) * D) where D is the edit distance
//! - Space: O(N + M)

use std::ops::{Index, IndexMut, Range};

/// Report every matched pair of `old` and `new` under `eq` to `sink`.
///
/// Pairs arrive in strictly increasing order on both sides. An empty
/// input on either side never calls `sink`.
pub fn diff_by<A, B, E, S>(old: &[A], new: &[B], mut eq: E, mut sink: S)
where
    E: FnMut(&A, &B) -> bool,
    S: FnMut(usize, usize),
{
    if old.is_empty() || new.is_empty() {
        return;
    }
    let d_max = max_d(old.len(), new.len());
    let mut vf = V::new(d_max);
    let mut vb = V::new(d_max);
    conquer(
        old,
        0..old.len(),
        new,
        0..new.len(),
        &mut vf,
        &mut vb,
        &mut eq,
        &mut sink,
    );
}

/// Matched `(old, new)` index pairs, in order.
pub fn matches_by<A, B>(old: &[A], new: &[B], eq: impl FnMut(&A, &B) -> bool) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    diff_by(old, new, eq, |i, j| pairs.push((i, j)));
    pairs
}

// =============================================================================
// Internals
// =============================================================================

/// Furthest-reaching x per diagonal `k`, indexed by `k` in `-d_max..d_max`.
struct V {
    offset: isize,
    v: Vec<usize>,
}

impl V {
    fn new(d_max: usize) -> Self {
        Self {
            offset: d_max as isize,
            v: vec![0; 2 * d_max],
        }
    }
}

impl Index<isize> for V {
    type Output = usize;

    fn index(&self, k: isize) -> &usize {
        &self.v[(k + self.offset) as usize]
    }
}

impl IndexMut<isize> for V {
    fn index_mut(&mut self, k: isize) -> &mut usize {
        &mut self.v[(k + self.offset) as usize]
    }
}

fn max_d(n: usize, m: usize) -> usize {
    (n + m + 1) / 2 + 1
}

fn common_prefix_len<A, B, E>(old: &[A], old_range: Range<usize>, new: &[B], new_range: Range<usize>, eq: &mut E) -> usize
where
    E: FnMut(&A, &B) -> bool,
{
    old_range
        .zip(new_range)
        .take_while(|&(i, j)| eq(&old[i], &new[j]))
        .count()
}

fn common_suffix_len<A, B, E>(old: &[A], old_range: Range<usize>, new: &[B], new_range: Range<usize>, eq: &mut E) -> usize
where
    E: FnMut(&A, &B) -> bool,
{
    old_range
        .rev()
        .zip(new_range.rev())
        .take_while(|&(i, j)| eq(&old[i], &new[j]))
        .count()
}

/// Start of the middle snake in absolute coordinates.
fn find_middle_snake<A, B, E>(
    old: &[A],
    old_range: Range<usize>,
    new: &[B],
    new_range: Range<usize>,
    vf: &mut V,
    vb: &mut V,
    eq: &mut E,
) -> Option<(usize, usize)>
where
    E: FnMut(&A, &B) -> bool,
{
    let n = old_range.len();
    let m = new_range.len();
    let delta = n as isize - m as isize;
    let odd = delta & 1 == 1;

    vf[1] = 0;
    vb[1] = 0;

    let d_max = max_d(n, m) as isize;
    for d in 0..d_max {
        // Forward: extend paths from the top-left corner.
        for k in (-d..=d).rev().step_by(2) {
            let mut x = if k == -d || (k != d && vf[k - 1] < vf[k + 1]) {
                vf[k + 1]
            } else {
                vf[k - 1] + 1
            };
            let y = (x as isize - k) as usize;
            let (x0, y0) = (x, y);
            if x < n && y < m {
                x += common_prefix_len(
                    old,
                    old_range.start + x..old_range.end,
                    new,
                    new_range.start + y..new_range.end,
                    eq,
                );
            }
            vf[k] = x;
            if odd && (k - delta).abs() <= d - 1 && vf[k] + vb[-(k - delta)] >= n {
                return Some((old_range.start + x0, new_range.start + y0));
            }
        }

        // Backward: extend paths from the bottom-right corner.
        for k in (-d..=d).rev().step_by(2) {
            let mut x = if k == -d || (k != d && vb[k - 1] < vb[k + 1]) {
                vb[k + 1]
            } else {
                vb[k - 1] + 1
            };
            let mut y = (x as isize - k) as usize;
            if x < n && y < m {
                let advance = common_suffix_len(
                    old,
                    old_range.start..old_range.start + n - x,
                    new,
                    new_range.start..new_range.start + m - y,
                    eq,
                );
                x += advance;
                y += advance;
            }
            vb[k] = x;
            if !odd && (k - delta).abs() <= d && vb[k] + vf[-(k - delta)] >= n {
                return Some((old_range.start + n - x, new_range.start + m - y));
            }
        }
    }

    None
}

#[allow(clippy::too_many_arguments)]
fn conquer<A, B, E, S>(
    old: &[A],
    mut old_range: Range<usize>,
    new: &[B],
    mut new_range: Range<usize>,
    vf: &mut V,
    vb: &mut V,
    eq: &mut E,
    sink: &mut S,
) where
    E: FnMut(&A, &B) -> bool,
    S: FnMut(usize, usize),
{
    let prefix = common_prefix_len(old, old_range.clone(), new, new_range.clone(), eq);
    for step in 0..prefix {
        sink(old_range.start + step, new_range.start + step);
    }
    old_range.start += prefix;
    new_range.start += prefix;

    let suffix = common_suffix_len(old, old_range.clone(), new, new_range.clone(), eq);
    old_range.end -= suffix;
    new_range.end -= suffix;

    if !old_range.is_empty() && !new_range.is_empty() {
        if let Some((x, y)) = find_middle_snake(old, old_range.clone(), new, new_range.clone(), vf, vb, eq) {
            conquer(old, old_range.start..x, new, new_range.start..y, vf, vb, eq, sink);
            conquer(old, x..old_range.end, new, y..new_range.end, vf, vb, eq, sink);
        }
    }

    for step in 0..suffix {
        sink(old_range.end + step, new_range.end + step);
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn matches(old: &str, new: &str) -> Vec<(usize, usize)> {
        let (a, b): (Vec<char>, Vec<char>) = (old.chars().collect(), new.chars().collect());
        matches_by(&a, &b, |x, y| x == y)
    }

    /// Reference LCS length by quadratic DP.
    fn lcs_len(old: &[char], new: &[char]) -> usize {
        let mut dp = vec![vec![0usize; new.len() + 1]; old.len() + 1];
        for i in 0..old.len() {
            for j in 0..new.len() {
                dp[i + 1][j + 1] = if old[i] == new[j] {
                    dp[i][j] + 1
                } else {
                    dp[i][j + 1].max(dp[i + 1][j])
                };
            }
        }
        dp[old.len()][new.len()]
    }

    fn assert_valid(old: &str, new: &str) {
        let (a, b): (Vec<char>, Vec<char>) = (old.chars().collect(), new.chars().collect());
        let pairs = matches_by(&a, &b, |x, y| x == y);
        for &(i, j) in &pairs {
            assert_eq!(a[i], b[j]);
        }
        for w in pairs.windows(2) {
            assert!(w[0].0 < w[1].0 && w[0].1 < w[1].1, "{pairs:?}");
        }
        assert_eq!(pairs.len(), lcs_len(&a, &b), "{old} vs {new}");
    }

    #[test]
    fn test_empty_sequences() {
        let mut calls = 0;
        diff_by::<u8, u8, _, _>(&[], &[1, 2], |a, b| a == b, |_, _| calls += 1);
        diff_by::<u8, u8, _, _>(&[1, 2], &[], |a, b| a == b, |_, _| calls += 1);
        diff_by::<u8, u8, _, _>(&[], &[], |a, b| a == b, |_, _| calls += 1);
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_no_changes() {
        assert_eq!(matches("abc", "abc"), vec![(0, 0), (1, 1), (2, 2)]);
    }

    #[test]
    fn test_single_insert() {
        assert_eq!(matches("ac", "abc"), vec![(0, 0), (1, 2)]);
    }

    #[test]
    fn test_single_delete() {
        assert_eq!(matches("abc", "ac"), vec![(0, 0), (2, 1)]);
    }

    #[test]
    fn test_nothing_in_common() {
        assert!(matches("abc", "xyz").is_empty());
    }

    #[test]
    fn test_classic_example() {
        assert_eq!(
            matches("abcabba", "cbabac"),
            vec![(2, 0), (4, 1), (5, 3), (6, 4)]
        );
    }

    #[test]
    fn test_matches_are_longest_common_subsequence() {
        let cases = [
            ("abcabba", "cbabac"),
            ("aaaa", "aa"),
            ("abab", "baba"),
            ("xaxbxc", "abc"),
            ("kitten", "sitting"),
            ("abcdefgh", "hgfedcba"),
            ("a", "b"),
            ("abcbdab", "bdcaba"),
        ];
        for (old, new) in cases {
            assert_valid(old, new);
            assert_valid(new, old);
        }
    }

    #[test]
    fn test_custom_predicate_across_types() {
        let old = ["one", "two", "three"];
        let new = [3usize, 5, 4];
        let pairs = matches_by(&old, &new, |a, b| a.len() == *b);
        assert_eq!(pairs, vec![(0, 0), (2, 1)]);
    }

    #[test]
    fn test_long_sequences() {
        let old: Vec<u32> = (0..5_000).collect();
        let new: Vec<u32> = (0..5_000).filter(|n| n % 7 != 0).chain([9_999]).collect();
        let pairs = matches_by(&old, &new, |a, b| a == b);
        assert_eq!(pairs.len(), new.len() - 1);
    }
}
