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

//! Parse/interpret round-trip and the literal scenarios from the testable
//! properties list: a tree interpreted back to text reparses to a
//! structurally equal tree.

use doctree_syntax::{interpret::interpret, Environment, Kind};
use doctree_testing::{parse, walk};

fn kinds(tree: &doctree_syntax::Tree<'_>, root: doctree_syntax::NodeId) -> Vec<Kind> {
    let mut ids = Vec::new();
    walk(tree, root, &mut ids);
    ids.into_iter()
        .map(|id| tree.get(id).unwrap().data.kind())
        .collect()
}

fn assert_round_trips(input: &str) {
    let (tree, root) = parse(input);
    let env = Environment::default();
    let rendered = interpret(&tree, &env, root);

    let (tree2, root2) = parse(&rendered);
    assert_eq!(
        kinds(&tree, root),
        kinds(&tree2, root2),
        "re-parsing the interpreted output of {:?} produced a different shape",
        input
    );
}

#[test]
fn s1_paragraph_round_trip() {
    let input = "Hello *world*.\n";
    let (tree, root) = parse(input);
    let mut ids = Vec::new();
    walk(&tree, root, &mut ids);
    let found: Vec<Kind> = ids.iter().map(|&id| tree.get(id).unwrap().data.kind()).collect();
    assert!(found.contains(&Kind::Paragraph));
    assert!(found.contains(&Kind::Bold));

    assert_round_trips(input);
}

#[test]
fn s2_unclosed_block_falls_back_to_paragraph() {
    let input = "#+BEGIN_SRC\nfoo\n";
    let (tree, root) = parse(input);
    let mut ids = Vec::new();
    walk(&tree, root, &mut ids);
    let paragraph = ids
        .iter()
        .find(|&&id| tree.get(id).unwrap().data.kind() == Kind::Paragraph)
        .expect("unclosed block must fall back to a paragraph, never an error");
    let node = tree.get(*paragraph).unwrap();
    assert_eq!(node.location.start, 0);
    assert_eq!(node.location.end, input.len());
}

#[test]
fn s3_nested_list_structure() {
    let input = "- a\n- b\n  - c\n";
    let (tree, root) = parse(input);
    let mut ids = Vec::new();
    walk(&tree, root, &mut ids);
    let lists: Vec<_> = ids
        .iter()
        .filter(|&&id| tree.get(id).unwrap().data.kind() == Kind::PlainList)
        .collect();
    assert_eq!(lists.len(), 2, "expected an outer list and one nested list");

    assert_round_trips(input);
}

#[test]
fn s4_headline_with_tags_and_planning_round_trips_with_tag_separator() {
    let input = "* TODO Task :work:\nSCHEDULED: <2024-01-02 Tue>\n";
    let (tree, root) = parse(input);
    let mut ids = Vec::new();
    walk(&tree, root, &mut ids);
    let headline = ids
        .iter()
        .find(|&&id| tree.get(id).unwrap().data.kind() == Kind::Headline)
        .unwrap();
    let env = Environment::default();
    let rendered = interpret(&tree, &env, tree.root());
    let headline_line = rendered.lines().next().unwrap();
    assert!(headline_line.contains(" :work:"));
    let _ = headline;
}

#[test]
fn idempotence_of_interpret_on_normalized_trees() {
    let input = "* Heading\nSome body text with *bold* and /italic/.\n";
    let (tree, root) = parse(input);
    let env = Environment::default();
    let once = interpret(&tree, &env, root);
    let (tree2, root2) = parse(&once);
    let twice = interpret(&tree2, &env, root2);
    assert_eq!(once, twice);
}
