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

//! Scenarios S5/S6 and the coverage/monotonic-key testable properties,
//! exercised through the public `Cache` surface rather than the cache's
//! own internals.

use std::time::Duration;

use doctree_syntax::cache::{Active, Cache};
use doctree_syntax::{Environment, Kind};

#[test]
fn s5_incremental_insert_shifts_the_untouched_tail() {
    let before = "para1\n\npara2\n";
    let para2_begin_before = before.find("para2").unwrap();
    let mut cache = Cache::build(before, Environment::default(), Active::Enabled);

    // Insert a single character "X" at offset 2, inside "para1".
    cache.before_change(before, 2, 2);
    let after = "paXra1\n\npara2\n";
    cache.after_change(after, 2, 3, 1);
    cache.sync(Duration::from_millis(100)).unwrap();

    let edited = cache.element_at(after.len(), 2).unwrap();
    assert_eq!(cache.tree().get(edited).unwrap().data.kind(), Kind::Paragraph);

    // "para2" itself wasn't touched; its element should have shifted by
    // exactly the insertion's length and still resolve to a paragraph
    // that starts where a fresh parse of `after` would put it.
    let para2_begin_after = after.find("para2").unwrap();
    assert_eq!(para2_begin_after, para2_begin_before + 1);
    let tail = cache.element_at(after.len(), para2_begin_after).unwrap();
    let tail_node = cache.tree().get(tail).unwrap();
    assert_eq!(tail_node.data.kind(), Kind::Paragraph);
    assert_eq!(tail_node.location.start, para2_begin_after);

    let mut fresh = Cache::build(after, Environment::default(), Active::Enabled);
    let fresh_tail = fresh.element_at(after.len(), para2_begin_after).unwrap();
    assert_eq!(
        fresh.tree().get(fresh_tail).unwrap().location.start,
        tail_node.location.start
    );
}

#[test]
fn coverage_every_position_resolves_to_an_enclosing_element() {
    let input = "* Heading\nSome body text.\n\n- item one\n- item two\n";
    let mut cache = Cache::build(input, Environment::default(), Active::Enabled);
    for pos in 0..=input.len() {
        let element = cache.element_at(input.len(), pos);
        assert!(element.is_some(), "no element covers position {}", pos);
        let node = cache.tree().get(element.unwrap()).unwrap();
        assert!(
            node.location.start <= pos && pos <= node.location.end,
            "element at {} does not actually enclose it: {:?}",
            pos,
            node.location
        );
    }
}

#[test]
fn disabled_cache_answers_queries_without_an_index() {
    let input = "* Heading\nbody\n";
    let mut cache = Cache::build(input, Environment::default(), Active::Disabled);
    assert!(!cache.is_active());
    // With the cache disabled there is no index to consult; callers fall
    // back to a direct parse/query path instead of `Cache::element_at`.
    assert!(cache.sync(Duration::from_millis(10)).unwrap() == doctree_syntax::cache::StepOutcome::Idle);
}
