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

//! The synchronizer: keeps the element index and its tree current as the
//! buffer is edited, without ever re-parsing more than the edited region
//! plus whatever the edit's context forces it to widen into.
//!
//! Work is split into three phases run in order per request (prune,
//! locate the re-parent point, shift and re-parent); each phase yields
//! between elements so a caller on a UI thread can bound how long one
//! call to [`Synchronizer::step`] runs.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::cache::index::ElementIndex;
use crate::cache::key::Key;
use crate::environment::Environment;
use crate::error::SyncError;
use crate::kind::Kind;
use crate::node::{Interval, NodeId, Tree};

/// Default wall-clock slice a single [`Synchronizer::step`] call is allowed
/// before it suspends and stashes its place in the head request.
pub const DEFAULT_SYNC_DURATION: Duration = Duration::from_millis(40);

/// How sensitive a changed region is to the outline structure around it,
/// decided by [`observe_before_change`] and consulted by
/// [`expand_after_change`] to pick how far to widen the edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sensitivity {
    /// Nothing in or around the change looks like a structural line.
    None,
    /// The change touches only the interior of a single line's text.
    LineOnly,
    /// The change touches an outline prefix, or a block/drawer/latex-env
    /// open or close line — the surrounding headline may need re-finding.
    OutlineAffecting,
}

/// One step of the three-phase synchronization a request goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Remove stale entries from the index.
    Prune,
    /// Parse just enough past the edit to find the surviving parent.
    Reparent,
    /// Shift and re-parent the untouched tail of the index.
    Shift,
}

/// A pending edit, queued until the synchronizer has caught the index up
/// to it. Mirrors the record shape used by the index and query layers:
/// `next_key` is where the current phase resumes scanning, `end_pos` and
/// `offset` describe the edited region, `parent` is filled in by
/// [`Phase::Reparent`].
#[derive(Debug, Clone)]
pub struct EditRequest {
    pub next_key: Option<Key>,
    pub beg: usize,
    pub end_pos: usize,
    pub offset: isize,
    pub parent: Option<NodeId>,
    pub phase: Phase,
}

/// Outcome of one [`Synchronizer::step`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// No requests were pending; nothing happened.
    Idle,
    /// At least one request made progress; more may remain queued.
    Progressed,
    /// The deadline elapsed mid-request; state was stashed for next time.
    Incomplete,
}

/// Scans `[beg, end)` plus the line containing each endpoint for lines
/// that carry outline or container-boundary syntax.
pub fn observe_before_change(
    environment: &Environment,
    buffer: &str,
    beg: usize,
    end: usize,
) -> Sensitivity {
    let line_start = |pos: usize| buffer[..pos].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let line_end = |pos: usize| buffer[pos..].find('\n').map(|i| pos + i).unwrap_or(buffer.len());

    let scan_from = line_start(beg);
    let scan_to = line_end(end.max(beg));

    let mut any_sensitive = false;
    let mut pos = scan_from;
    while pos < scan_to {
        let this_line_end = line_end(pos);
        let line = &buffer[pos..this_line_end];
        if environment.headline_short.is_match(line)
            || environment.drawer_begin.is_match(line)
            || environment.drawer_end.is_match(line)
            || environment.block_begin.is_match(line)
            || environment.dynamic_block_begin.is_match(line)
            || environment.dynamic_block_end.is_match(line)
            || environment.latex_begin_environment.is_match(line)
        {
            return Sensitivity::OutlineAffecting;
        }
        if !line.is_empty() {
            any_sensitive = true;
        }
        pos = this_line_end + 1;
    }

    if any_sensitive {
        Sensitivity::LineOnly
    } else {
        Sensitivity::None
    }
}

/// `center-block`/`drawer`/`dynamic-block`/`inlinetask`/`property-drawer`/
/// `quote-block`/`special-block`: containers whose own boundary lines are
/// unambiguous enough that an edit fully inside them never needs to widen
/// out looking for an enclosing headline — the container absorbs it.
fn is_robust_container(kind: Kind) -> bool {
    matches!(
        kind,
        Kind::CenterBlock
            | Kind::Drawer
            | Kind::DynamicBlock
            | Kind::InlineTask
            | Kind::PropertyDrawer
            | Kind::QuoteBlock
            | Kind::SpecialBlock
    )
}

/// Finds the innermost robust container enclosing `[beg, end)`, working
/// against the still-pre-edit tree. `end` is translated back by `offset` to
/// compare against the tree's (not yet shifted) coordinates.
fn find_enclosing_robust_container(
    tree: &Tree,
    index: &ElementIndex,
    buffer_len: usize,
    offset: isize,
    beg: usize,
    end: usize,
) -> Option<(NodeId, Interval)> {
    let pre_edit_len = (buffer_len as isize - offset).max(0) as usize;
    let pre_edit_end = ((end as isize - offset).max(beg as isize)) as usize;
    let mut current = crate::cache::query::element_at(tree, index, pre_edit_len, beg)?;
    loop {
        let node = tree.get(current)?;
        if is_robust_container(node.data.kind()) {
            if let Some(content) = node.content_location {
                if content.start <= beg && pre_edit_end <= content.end {
                    return Some((current, content));
                }
            }
        }
        current = node.parent?;
    }
}

/// Widens `[beg, end)` per the sensitivity signal and produces the single
/// request the change is submitted as. When the edit falls entirely inside
/// a robust container, the container's own `end`/`contents-end` are shifted
/// immediately and the request is narrowed to the container's interior
/// instead of being widened to the enclosing headline.
pub fn expand_after_change(
    tree: &mut Tree,
    index: &ElementIndex,
    buffer: &str,
    environment: &Environment,
    beg: usize,
    end: usize,
    offset: isize,
    sensitivity: Sensitivity,
) -> (usize, usize) {
    let line_start = |pos: usize| buffer[..pos].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let line_end = |pos: usize| buffer[pos..].find('\n').map(|i| pos + i).unwrap_or(buffer.len());

    if let Some((container, content)) =
        find_enclosing_robust_container(tree, index, buffer.len(), offset, beg, end)
    {
        if let Some(slot) = tree.get_mut(container) {
            let shift = |p: usize| (p as isize + offset).max(0) as usize;
            slot.location.end = shift(slot.location.end);
            if let Some(cl) = slot.content_location.as_mut() {
                cl.end = shift(cl.end);
            }
        }
        let narrowed_beg = line_start(beg).max(content.start);
        let narrowed_end = line_end(end.max(beg)).min((content.end as isize + offset).max(0) as usize);
        return (narrowed_beg, narrowed_end);
    }

    match sensitivity {
        Sensitivity::OutlineAffecting => {
            let mut prev_heading = line_start(beg);
            while prev_heading > 0 {
                let candidate = line_start(prev_heading - 1);
                let candidate_end = line_end(candidate);
                if environment.headline_short.is_match(&buffer[candidate..candidate_end]) {
                    prev_heading = candidate;
                    break;
                }
                if candidate == 0 {
                    prev_heading = 0;
                    break;
                }
                prev_heading = candidate;
            }
            let mut next_heading = buffer.len();
            let mut pos = line_end(end.max(beg)) + 1;
            while pos < buffer.len() {
                let this_end = line_end(pos);
                if environment.headline_short.is_match(&buffer[pos..this_end]) {
                    next_heading = pos;
                    break;
                }
                pos = this_end + 1;
            }
            (prev_heading, next_heading)
        }
        Sensitivity::LineOnly | Sensitivity::None => {
            (line_start(beg), line_end(end.max(beg)))
        }
    }
}

/// Drives the index and cache from one consistent snapshot to the next as
/// edits arrive. Single-threaded, cooperative: [`step`](Self::step) yields
/// between elements and returns as soon as its deadline elapses, never
/// blocking past it.
pub struct Synchronizer {
    queue: VecDeque<EditRequest>,
}

impl Synchronizer {
    pub fn new() -> Synchronizer {
        Synchronizer {
            queue: VecDeque::new(),
        }
    }

    pub fn is_idle(&self) -> bool {
        self.queue.is_empty()
    }

    /// Submits one already-expanded edit region. Merges into the tail
    /// request when one is queued, per the merge rule: `beg` takes the
    /// lower of the two (a later edit starting earlier than the queued one
    /// must not leave stale entries between the two `beg`s unpruned),
    /// offsets accumulate, `end` advances to the new request's end, and
    /// phase carries forward rather than resetting to `Prune`.
    pub fn submit(&mut self, index: &ElementIndex, beg: usize, end: usize, offset: isize) {
        if let Some(tail) = self.queue.back_mut() {
            tail.beg = tail.beg.min(beg);
            tail.end_pos = end;
            tail.offset += offset;
            return;
        }
        let next_key = index
            .floor(&Key::natural(beg))
            .map(|(k, _)| k.clone())
            .or_else(|| index.first_key().cloned());
        self.queue.push_back(EditRequest {
            next_key,
            beg,
            end_pos: end,
            offset,
            parent: None,
            phase: Phase::Prune,
        });
    }

    /// Runs queued requests until the queue drains, `deadline` passes, or
    /// `should_yield` reports an editor input-pending condition. The idle
    /// timer and the input-pending probe are both the host's concern; this
    /// collapses to the one callback plus the one deadline.
    pub fn step(
        &mut self,
        tree: &mut Tree,
        index: &mut ElementIndex,
        deadline: Instant,
        should_yield: &dyn Fn() -> bool,
    ) -> Result<StepOutcome, SyncError> {
        if self.queue.is_empty() {
            return Ok(StepOutcome::Idle);
        }

        let mut progressed = false;
        while let Some(mut request) = self.queue.pop_front() {
            loop {
                if Instant::now() >= deadline || should_yield() {
                    self.queue.push_front(request);
                    return Ok(StepOutcome::Incomplete);
                }
                match request.phase {
                    Phase::Prune => {
                        if !self.run_prune(&mut request, index, deadline, should_yield)? {
                            self.queue.push_front(request);
                            return Ok(StepOutcome::Incomplete);
                        }
                        request.phase = Phase::Reparent;
                        progressed = true;
                    }
                    Phase::Reparent => {
                        self.run_reparent(&mut request, tree, index)?;
                        request.phase = Phase::Shift;
                        progressed = true;
                    }
                    Phase::Shift => {
                        let done = self.run_shift(&mut request, tree, index, deadline, should_yield)?;
                        progressed = true;
                        if done {
                            break;
                        } else {
                            self.queue.push_front(request);
                            return Ok(StepOutcome::Incomplete);
                        }
                    }
                }
            }
        }
        Ok(if progressed {
            StepOutcome::Progressed
        } else {
            StepOutcome::Idle
        })
    }

    /// Phase 0: removes every indexed element whose `begin` falls in
    /// `[beg, end]`. Checks the deadline before each candidate so a caller
    /// on a tight budget can interrupt mid-scan; on interruption the resume
    /// key is stashed in `request.next_key` and `false` is returned.
    fn run_prune(
        &self,
        request: &mut EditRequest,
        index: &mut ElementIndex,
        deadline: Instant,
        should_yield: &dyn Fn() -> bool,
    ) -> Result<bool, SyncError> {
        let mut cursor = request.next_key.clone().or_else(|| index.first_key().cloned());

        loop {
            let key = match cursor {
                Some(k) => k,
                None => {
                    request.next_key = index.floor(&Key::natural(request.beg)).map(|(k, _)| k.clone());
                    return Ok(true);
                }
            };
            if Instant::now() >= deadline || should_yield() {
                request.next_key = Some(key);
                return Ok(false);
            }

            let begin = match index.get(&key) {
                Some(entry) => entry.begin,
                None => {
                    cursor = index.next_after(&key).map(|(k, _)| k.clone());
                    continue;
                }
            };
            if begin > request.end_pos {
                request.next_key = index.floor(&Key::natural(request.beg)).map(|(k, _)| k.clone());
                return Ok(true);
            }
            if begin >= request.beg {
                let next = index.next_after(&key).map(|(k, _)| k.clone());
                index.remove(&key);
                cursor = next;
            } else {
                cursor = index.next_after(&key).map(|(k, _)| k.clone());
            }
        }
    }

    /// Phase 1: locates, in the still-unshifted tree, the element that
    /// encloses the edit's end boundary — the element whose contents the
    /// next surviving index entry will be re-parented under once phase 2
    /// shifts it into place. Falls back to the document root when the
    /// edit sits past everything currently indexed (an append at the
    /// buffer's end). If prune removed the anchor's own index entry (it
    /// sat inside the edited region), mints it a fresh key so phase 2 has
    /// somewhere to record it.
    fn run_reparent(
        &self,
        request: &mut EditRequest,
        tree: &Tree,
        index: &mut ElementIndex,
    ) -> Result<(), SyncError> {
        let root = tree.root();
        let mut current = root;
        loop {
            let next = tree
                .children_of(current)
                .iter()
                .copied()
                .find(|&child| {
                    tree.get(child)
                        .map(|n| n.location.start <= request.end_pos && request.end_pos < n.location.end)
                        .unwrap_or(false)
                });
            match next {
                Some(child) if tree.get(child).map(|n| n.data.kind().is_greater_element()).unwrap_or(false) => {
                    current = child;
                }
                _ => break,
            }
        }
        if current != root {
            if let Some(begin) = tree.get(current).map(|n| n.location.start) {
                index.ensure_key(current, begin);
            }
        }
        request.parent = Some(current);
        Ok(())
    }

    /// Phase 2: walks the index from the request's resume key toward the
    /// next queued request's key (or the end of the index), shifting each
    /// entry's position-bearing fields — tree location/content and cached
    /// object-scan progress alike — by `offset`, and re-pointing `parent`
    /// at the nearest ancestor whose shifted range still encloses it.
    /// Checks the deadline before each entry and returns `false`, with the
    /// resume key stashed in `request.next_key`, if it was hit mid-walk.
    fn run_shift(
        &self,
        request: &mut EditRequest,
        tree: &mut Tree,
        index: &mut ElementIndex,
        deadline: Instant,
        should_yield: &dyn Fn() -> bool,
    ) -> Result<bool, SyncError> {
        let boundary = self
            .queue
            .front()
            .and_then(|next| next.next_key.clone())
            .or_else(|| index.last_key().cloned());

        let start = request
            .next_key
            .clone()
            .or_else(|| index.first_key().cloned());
        let start = match start {
            Some(k) => k,
            None => return Ok(true),
        };

        let keys: Vec<Key> = match &boundary {
            Some(b) => index.range(&start, b).map(|(k, _)| k.clone()).collect(),
            None => index.from(&start).map(|(k, _)| k.clone()).collect(),
        };

        let root = tree.root();
        let anchor = request.parent.unwrap_or(root);

        for key in keys {
            if Instant::now() >= deadline || should_yield() {
                request.next_key = Some(key);
                return Ok(false);
            }

            let entry = match index.get(&key) {
                Some(e) => *e,
                None => continue,
            };
            let original_parent = tree.get(entry.node).and_then(|n| n.parent);

            let shifted = match tree.get_mut(entry.node) {
                Some(slot) => {
                    let shift = |p: usize| (p as isize + request.offset).max(0) as usize;
                    slot.location.start = shift(slot.location.start);
                    slot.location.end = shift(slot.location.end);
                    if let Some(content) = slot.content_location.as_mut() {
                        content.start = shift(content.start);
                        content.end = shift(content.end);
                    }
                    slot.location
                }
                None => continue,
            };
            index.shift_object_cache(entry.node, request.offset);

            let new_parent = find_enclosing_ancestor(tree, root, original_parent, shifted, anchor);
            if let Some(slot) = tree.get_mut(entry.node) {
                slot.parent = Some(new_parent);
            }
        }
        request.next_key = None;
        Ok(true)
    }
}

/// Walks up from `original_parent` looking for the nearest ancestor whose
/// (already-shifted, if this pass reached it earlier) span still encloses
/// `shifted`. The document root always "encloses" — its own `location`
/// field is never meaningfully populated — so a chain that reaches it
/// unbroken returns it, which is just the ordinary case of an element whose
/// true parent is the document itself. `fallback` (the phase 1 anchor) is
/// only used if the chain breaks on a freed node, which shouldn't happen in
/// practice.
fn find_enclosing_ancestor(
    tree: &Tree,
    root: NodeId,
    original_parent: Option<NodeId>,
    shifted: Interval,
    fallback: NodeId,
) -> NodeId {
    let mut candidate = original_parent;
    while let Some(p) = candidate {
        if p == root {
            return p;
        }
        match tree.get(p) {
            Some(node) if node.location.start <= shifted.start && shifted.end <= node.location.end => {
                return p;
            }
            Some(node) => candidate = node.parent,
            None => return fallback,
        }
    }
    fallback
}

impl Default for Synchronizer {
    fn default() -> Self {
        Synchronizer::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::cache::index::ElementIndex;

    #[test]
    fn submit_merges_into_a_pending_request() {
        let index = ElementIndex::new();
        let mut sync = Synchronizer::new();
        sync.submit(&index, 10, 20, 2);
        sync.submit(&index, 20, 25, -1);
        assert_eq!(sync.queue.len(), 1);
        let req = &sync.queue[0];
        assert_eq!(req.end_pos, 25);
        assert_eq!(req.offset, 1);
        assert_eq!(req.beg, 10);
    }

    #[test]
    fn submit_merge_lowers_beg_when_the_new_edit_starts_earlier() {
        let index = ElementIndex::new();
        let mut sync = Synchronizer::new();
        sync.submit(&index, 30, 40, 0);
        sync.submit(&index, 5, 12, 0);
        assert_eq!(sync.queue.len(), 1);
        assert_eq!(sync.queue[0].beg, 5);
        assert_eq!(sync.queue[0].end_pos, 12);
    }

    #[test]
    fn observe_before_change_flags_headline_lines() {
        let env = Environment::default();
        let buffer = "text\n* Heading\nmore\n";
        let sensitivity = observe_before_change(&env, buffer, 5, 14);
        assert_eq!(sensitivity, Sensitivity::OutlineAffecting);
    }

    #[test]
    fn observe_before_change_is_none_for_untouched_blank_region() {
        let env = Environment::default();
        let buffer = "one\n\n\ntwo\n";
        let sensitivity = observe_before_change(&env, buffer, 4, 6);
        assert_eq!(sensitivity, Sensitivity::None);
    }

    fn parse_and_index<'a>(
        input: &'a str,
    ) -> (Tree<'a>, ElementIndex) {
        use crate::parser::{ParseGranularity, Parser};
        let mut parser = Parser::new(input, ParseGranularity::Object, Environment::default());
        let root = parser.parse_buffer();
        let tree = parser.tree;
        let mut index = ElementIndex::new();
        crate::cache::index_elements(&tree, root, false, &mut index);
        (tree, index)
    }

    fn find_kind(tree: &Tree, id: NodeId, kind: Kind) -> Option<NodeId> {
        let node = tree.get(id)?;
        if node.data.kind() == kind {
            return Some(id);
        }
        for &child in &node.children {
            if let Some(found) = find_kind(tree, child, kind) {
                return Some(found);
            }
        }
        None
    }

    #[test]
    fn expand_after_change_narrows_to_a_drawer_instead_of_widening_to_a_headline() {
        let before = "* Heading\n:LOGBOOK:\nentry one\n:END:\n";
        let (mut tree, index) = parse_and_index(before);
        let drawer = find_kind(&tree, tree.root(), Kind::Drawer).unwrap();
        let drawer_end_before = tree.get(drawer).unwrap().location.end;

        // Insert a character inside "entry one", well clear of both the
        // drawer's own boundary lines and the headline above it.
        let beg = before.find("entry").unwrap() + 5;
        let after_len_delta: isize = 1;
        let env = Environment::default();
        let (expanded_beg, expanded_end) = expand_after_change(
            &mut tree,
            &index,
            before, // only line boundaries are read from this; content past `beg` is irrelevant here
            &env,
            beg,
            beg + 1,
            after_len_delta,
            Sensitivity::LineOnly,
        );

        // Narrowed to the line inside the drawer, not widened out to the headline.
        assert!(expanded_beg >= "* Heading\n:LOGBOOK:\n".len());
        assert!(expanded_end <= drawer_end_before + after_len_delta as usize);

        // The drawer's own end was shifted immediately.
        assert_eq!(tree.get(drawer).unwrap().location.end, drawer_end_before + 1);
    }

    #[test]
    fn find_enclosing_ancestor_keeps_a_deep_descendant_off_the_phase_one_anchor() {
        let input = "* Heading\nbody text\n\nmore text\n";
        let (tree, index) = parse_and_index(input);
        let root = tree.root();

        let headline = find_kind(&tree, root, Kind::Headline).unwrap();
        let section = find_kind(&tree, root, Kind::Section).unwrap();
        let paragraph = find_kind(&tree, root, Kind::Paragraph).unwrap();
        let _ = index;

        // The paragraph's real parent (the section) still encloses it after
        // the shift; a far-away, unrelated node must not be substituted in.
        let shifted = tree.get(paragraph).unwrap().location;
        let unrelated_anchor = headline;
        let resolved = find_enclosing_ancestor(&tree, root, Some(section), shifted, unrelated_anchor);
        assert_eq!(resolved, section);
    }

    #[test]
    fn find_enclosing_ancestor_falls_back_when_the_stored_parent_is_stale() {
        let input = "* Heading\nbody text\n";
        let (tree, _index) = parse_and_index(input);
        let root = tree.root();
        let paragraph = find_kind(&tree, root, Kind::Paragraph).unwrap();

        // A bogus "shifted" span the stored parent's (unshifted) location
        // could never enclose, simulating a parent pruned out from under it.
        let bogus = Interval::new(usize::MAX - 1, usize::MAX);
        let anchor = root;
        let resolved = find_enclosing_ancestor(&tree, root, Some(paragraph), bogus, anchor);
        assert_eq!(resolved, root);
    }

    #[test]
    fn run_prune_yields_mid_scan_under_a_tight_deadline() {
        let input = "p1\n\np2\n\np3\n\np4\n\np5\n";
        let (_tree, mut index) = parse_and_index(input);
        let sync = Synchronizer::new();
        let mut request = EditRequest {
            next_key: None,
            beg: 0,
            end_pos: input.len(),
            offset: 0,
            parent: None,
            phase: Phase::Prune,
        };

        let already_elapsed = Instant::now() - Duration::from_secs(1);
        let done = sync
            .run_prune(&mut request, &mut index, already_elapsed, &|| false)
            .unwrap();
        assert!(!done, "a deadline already in the past must force an immediate yield");
        assert!(request.next_key.is_some());
        // Nothing was pruned yet since the very first check already yielded.
        assert_eq!(index.len(), 5);
    }
}
