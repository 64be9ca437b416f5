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

//! Incremental cache: an ordered index of parsed elements kept current by a
//! resumable synchronizer, plus the point queries built on top of it.
//!
//! A [`Cache`] owns the tree it indexes. Editors drive it through
//! [`Cache::before_change`]/[`Cache::after_change`] around each edit and
//! [`Cache::element_at`]/[`Cache::context_at`] to answer position queries;
//! internally it defers to [`sync::Synchronizer`] to keep the index caught
//! up without ever re-parsing more of the buffer than an edit touched.

pub mod index;
pub mod key;
pub mod query;
pub mod sync;

use std::time::{Duration, Instant};

use crate::environment::Environment;
use crate::error::SyncError;
use crate::kind::Kind;
use crate::node::{NodeId, Tree};
use crate::parser::{ParseGranularity, Parser};

pub use index::{ElementIndex, ObjectCacheEntry};
pub use key::Key;
pub use query::Context;
pub use sync::{Sensitivity, StepOutcome, Synchronizer, DEFAULT_SYNC_DURATION};

/// Whether the cache should be consulted or maintained at all. The cache
/// only pays for itself on a buffer that is actually being edited
/// incrementally under this markup; a one-shot `parse` + `interpret` never
/// needs one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Active {
    Enabled,
    Disabled,
}

/// Owns a parsed tree, its ordered element index, and the synchronizer
/// that keeps both current as edits arrive. One instance per open buffer.
pub struct Cache<'a> {
    tree: Tree<'a>,
    index: ElementIndex,
    sync: Synchronizer,
    environment: Environment,
    active: Active,
    pending_sensitivity: Option<Sensitivity>,
}

impl<'a> Cache<'a> {
    /// Parses `buffer` in full and indexes every element it produces.
    pub fn build(buffer: &'a str, environment: Environment, active: Active) -> Cache<'a> {
        let mut parser = Parser::new(buffer, ParseGranularity::Object, environment.clone());
        let root = parser.parse_buffer();
        let tree = parser.tree;

        let mut index = ElementIndex::new();
        if active == Active::Enabled {
            index_elements(&tree, root, false, &mut index);
        }

        Cache {
            tree,
            index,
            sync: Synchronizer::new(),
            environment,
            active,
            pending_sensitivity: None,
        }
    }

    pub fn tree(&self) -> &Tree<'a> {
        &self.tree
    }

    pub fn is_active(&self) -> bool {
        self.active == Active::Enabled
    }

    /// Before-change observer: call with the range about to be replaced.
    /// Stashes the sensitivity signal [`after_change`](Self::after_change)
    /// needs to decide how far to widen the edit.
    pub fn before_change(&mut self, buffer: &str, beg: usize, end: usize) {
        if !self.is_active() {
            return;
        }
        self.pending_sensitivity = Some(sync::observe_before_change(
            &self.environment,
            buffer,
            beg,
            end,
        ));
    }

    /// After-change notification: call with the post-edit buffer, the
    /// edited range, and `offset = inserted_length - deleted_length`.
    /// Expands the region per the stashed sensitivity signal and submits
    /// one synchronization request.
    pub fn after_change(&mut self, buffer: &'a str, beg: usize, end: usize, offset: isize) {
        if !self.is_active() {
            return;
        }
        let sensitivity = self
            .pending_sensitivity
            .take()
            .unwrap_or(Sensitivity::OutlineAffecting);
        let (expanded_beg, expanded_end) = sync::expand_after_change(
            &mut self.tree,
            &self.index,
            buffer,
            &self.environment,
            beg,
            end,
            offset,
            sensitivity,
        );
        self.sync.submit(&self.index, expanded_beg, expanded_end, offset);
    }

    /// Runs queued synchronization work until the queue drains, `budget`
    /// elapses, or `should_yield` reports the host has pending input.
    /// Returns immediately with [`StepOutcome::Idle`] if the cache isn't
    /// active or nothing is pending.
    pub fn sync_yielding(
        &mut self,
        budget: Duration,
        should_yield: &dyn Fn() -> bool,
    ) -> Result<StepOutcome, SyncError> {
        if !self.is_active() {
            return Ok(StepOutcome::Idle);
        }
        let deadline = Instant::now() + budget;
        self.sync
            .step(&mut self.tree, &mut self.index, deadline, should_yield)
    }

    /// [`Self::sync_yielding`] with a `should_yield` that never fires, for
    /// callers with no input-pending probe of their own.
    pub fn sync(&mut self, budget: Duration) -> Result<StepOutcome, SyncError> {
        self.sync_yielding(budget, &|| false)
    }

    /// Synchronizes up to the default budget and answers `element_at`.
    pub fn element_at(&mut self, buffer_len: usize, pos: usize) -> Option<NodeId> {
        if self.is_active() {
            let _ = self.sync(DEFAULT_SYNC_DURATION);
        }
        query::element_at(&self.tree, &self.index, buffer_len, pos)
    }

    /// Synchronizes up to the default budget and answers `context_at`.
    pub fn context_at(&mut self, buffer_len: usize, pos: usize) -> Option<Context> {
        if self.is_active() {
            let _ = self.sync(DEFAULT_SYNC_DURATION);
        }
        query::context_at(&self.tree, &mut self.index, buffer_len, pos)
    }
}

/// Indexes `id` and everything beneath it. `is_first_sortable_child` is set
/// for the first row of a table or first item of a list, so its key sorts
/// strictly after its parent's rather than colliding with it (both would
/// otherwise share `begin`).
pub(crate) fn index_elements(tree: &Tree, id: NodeId, is_first_sortable_child: bool, index: &mut ElementIndex) {
    if let Some(node) = tree.get(id) {
        let kind = node.data.kind();
        if kind.is_element() {
            let key_position = if is_first_sortable_child {
                node.location.start + 1
            } else {
                node.location.start
            };
            index.insert(Key::natural(key_position), id, node.location.start);
        }
        let parent_sorts_children = matches!(kind, Kind::Table | Kind::PlainList);
        for (i, &child) in node.children.iter().enumerate() {
            index_elements(tree, child, parent_sorts_children && i == 0, index);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::environment::Environment;

    #[test]
    fn build_indexes_every_element() {
        let input = "* Heading\nbody text\n\nmore text\n";
        let cache = Cache::build(input, Environment::default(), Active::Enabled);
        assert!(cache.index.len() >= 3); // Headline, Section, 2 paragraphs
    }

    #[test]
    fn element_at_and_context_at_round_trip_a_simple_document() {
        let input = "* Heading\nbody text\n";
        let mut cache = Cache::build(input, Environment::default(), Active::Enabled);
        let pos = input.find("body").unwrap();
        let element = cache.element_at(input.len(), pos).unwrap();
        assert_eq!(cache.tree().get(element).unwrap().data.kind(), Kind::Paragraph);

        let ctx = cache.context_at(input.len(), pos).unwrap();
        assert_eq!(ctx.element, element);
    }

    #[test]
    fn disabled_cache_never_populates_the_index() {
        let input = "* Heading\nbody text\n";
        let cache = Cache::build(input, Environment::default(), Active::Disabled);
        assert!(cache.index.is_empty());
    }

    #[test]
    fn index_keys_are_monotonic_in_element_begin() {
        let input = "* One\nbody one\n* Two\nbody two\n- a\n- b\n";
        let cache = Cache::build(input, Environment::default(), Active::Enabled);
        let mut entries: Vec<(Key, usize)> = cache
            .index
            .from(&Key::natural(0))
            .map(|(k, e)| (k.clone(), e.begin))
            .collect();
        entries.sort_by(|a, b| a.1.cmp(&b.1));
        for pair in entries.windows(2) {
            let (earlier_key, earlier_begin) = &pair[0];
            let (later_key, later_begin) = &pair[1];
            if earlier_begin < later_begin {
                assert!(
                    earlier_key < later_key,
                    "key for begin {} should sort before key for begin {}",
                    earlier_begin,
                    later_begin
                );
            }
        }
    }

    /// S6: interrupting the synchronizer at an arbitrarily tight budget and
    /// resuming it repeatedly must land on the same final answers as
    /// running the same edit to completion in one call.
    #[test]
    fn interrupted_sync_converges_to_the_same_result_as_one_shot_sync() {
        let before = "para one\n\npara two\n\npara three\n";
        let after = "para one, now longer\n\npara two\n\npara three\n";
        let insertion = ", now longer";
        let beg = "para one".len();
        let offset = after.len() as isize - before.len() as isize;
        assert_eq!(offset, insertion.len() as isize);

        let mut one_shot = Cache::build(before, Environment::default(), Active::Enabled);
        one_shot.before_change(before, beg, beg);
        one_shot.after_change(after, beg, beg + insertion.len(), offset);
        one_shot.sync(Duration::from_secs(1)).unwrap();

        let mut resumed = Cache::build(before, Environment::default(), Active::Enabled);
        resumed.before_change(before, beg, beg);
        resumed.after_change(after, beg, beg + insertion.len(), offset);
        // Repeated small-budget calls must reach the same fixed point as
        // the single generous-budget call above, however many times the
        // deadline forces a call to stash progress and return early.
        let mut calls = 0;
        loop {
            calls += 1;
            assert!(calls < 1000, "sync never reached Idle across repeated partial calls");
            match resumed.sync(Duration::from_millis(1)).unwrap() {
                StepOutcome::Idle => break,
                StepOutcome::Incomplete | StepOutcome::Progressed => continue,
            }
        }

        for pos in [0usize, 8, after.len() - 1, after.find("para three").unwrap()] {
            let one_shot_hit = one_shot.element_at(after.len(), pos);
            let resumed_hit = resumed.element_at(after.len(), pos);
            match (one_shot_hit, resumed_hit) {
                (Some(a), Some(b)) => {
                    assert_eq!(
                        one_shot.tree().get(a).unwrap().location,
                        resumed.tree().get(b).unwrap().location,
                        "one-shot and resumed sync disagree at position {}",
                        pos
                    );
                }
                (none_a, none_b) => assert_eq!(none_a.is_some(), none_b.is_some()),
            }
        }
    }
}
