//    This file is part of doctree.
//
//    doctree is free software: you can redistribute it and/or modify
//    it under the terms of the GNU General Public License as published by
//    the Free Software Foundation, either version 3 of the License, or
//    (at your option) any later version.
//
//    doctree is distributed in the hope that it will be useful,
//    but WITHOUT ANY WARRANTY; without even the implied warranty of
//    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//    GNU General Public License for more details.
//
//    You should have received a copy of the GNU General Public License
//    along with doctree.  If not, see <https://www.gnu.org/licenses/>.

//! Synthetic ordering keys for the incremental cache's element index.
//!
//! A buffer position is a bad index key: every edit shifts every key after
//! it. [`Key`] instead holds a sequence of levels, compared lexicographically,
//! with [`generate`] able to manufacture a fresh key strictly between any two
//! existing ones without touching either — the index never renumbers.

use std::cmp::Ordering;

/// The implicit value an exhausted upper bound carries at any level.
const LEVEL_MAX: u64 = u64::MAX;

/// A synthetic ordering key: a non-empty sequence of integer levels,
/// compared lexicographically. A key that is a strict prefix of another
/// sorts before it, matching the "missing levels read as zero" rule used
/// when generating new keys.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Key(Vec<u64>);

impl Key {
    /// The key for an element's first-seen parse: its `begin` position.
    /// Callers pass `begin + 1` instead for an element that is the first
    /// row of a table or first item of a list, so the parent always sorts
    /// strictly before its first child.
    pub fn natural(position: usize) -> Key {
        Key(vec![position as u64])
    }

    fn level(&self, i: usize) -> Option<u64> {
        self.0.get(i).copied()
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let parts: Vec<String> = self.0.iter().map(u64::to_string).collect();
        write!(f, "{}", parts.join("."))
    }
}

/// Generates a key `K` with `lower < K < upper`.
///
/// Walks both keys level by level. At the first level where they differ,
/// a gap of more than one is split at the midpoint and the walk stops; a
/// gap of exactly one commits to `lower`'s value and opens a fresh level
/// below it, unbounded above, so the result still sits strictly under
/// `upper`. Missing levels in `lower` read as `0`; missing levels in
/// `upper` read as [`LEVEL_MAX`].
///
/// Panics if `lower >= upper`: the synchronizer never asks for a key
/// between two keys that aren't already in order.
pub fn generate(lower: &Key, upper: &Key) -> Key {
    assert!(lower < upper, "generate requires lower < upper");

    let mut out = Vec::new();
    let mut i = 0;
    let mut bounded = true;

    loop {
        let l = lower.level(i).unwrap_or(0);
        let u = if bounded {
            upper.level(i).unwrap_or(LEVEL_MAX)
        } else {
            LEVEL_MAX
        };

        match u.cmp(&l) {
            Ordering::Equal => {
                out.push(l);
                i += 1;
            }
            Ordering::Greater if u - l > 1 => {
                out.push(l + (u - l) / 2);
                break;
            }
            Ordering::Greater => {
                // Gap of exactly one: commit to `l` here and descend one
                // more level, now unbounded above.
                out.push(l);
                i += 1;
                bounded = false;
            }
            Ordering::Less => unreachable!("lower < upper was asserted above"),
        }
    }

    Key(out)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn natural_keys_order_by_position() {
        assert!(Key::natural(3) < Key::natural(10));
    }

    #[test]
    fn generate_splits_a_wide_gap() {
        let lower = Key::natural(10);
        let upper = Key::natural(20);
        let mid = generate(&lower, &upper);
        assert!(lower < mid && mid < upper);
        assert_eq!(mid, Key(vec![15]));
    }

    #[test]
    fn generate_descends_when_adjacent() {
        let lower = Key::natural(10);
        let upper = Key::natural(11);
        let mid = generate(&lower, &upper);
        assert!(lower < mid && mid < upper);
        assert_eq!(mid, Key(vec![10, LEVEL_MAX / 2]));
    }

    #[test]
    fn repeated_generation_between_adjacent_keys_keeps_converging() {
        let lower = Key::natural(10);
        let mut upper = Key::natural(11);
        for _ in 0..8 {
            let mid = generate(&lower, &upper);
            assert!(lower < mid && mid < upper);
            upper = mid;
        }
    }

    #[test]
    fn generate_handles_multi_level_lower() {
        let lower = Key(vec![5, LEVEL_MAX]);
        let upper = Key::natural(6);
        let mid = generate(&lower, &upper);
        assert!(lower < mid && mid < upper);
    }
}
