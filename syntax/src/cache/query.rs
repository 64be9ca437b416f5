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

//! Point queries against the cached tree: "what element is at this
//! position" and "what object, if any, is at this position".

use crate::cache::index::ElementIndex;
use crate::cache::key::Key;
use crate::kind::Kind;
use crate::node::{NodeId, Tree};

/// Finds or populates the element's top-level object children through the
/// index's object sub-cache instead of re-deriving them from the tree on
/// every call. Because this parser's object lexer runs eagerly at parse
/// time rather than being driven lazily per query, "populating" here just
/// records the already-parsed children once and marks the entry complete; a
/// lazier lexer would instead grow `scanned_to` incrementally across calls.
fn cached_object_children(tree: &Tree, index: &mut ElementIndex, element: NodeId) -> Vec<NodeId> {
    if let Some(cached) = index.object_cache(element) {
        if cached.complete {
            return cached.objects.clone();
        }
    }
    let objects = tree.children_of(element).to_vec();
    let scanned_to = tree
        .get(element)
        .and_then(|n| n.content_location)
        .map(|c| c.end)
        .unwrap_or(0);
    let entry = index.object_cache_mut(element);
    entry.objects = objects.clone();
    entry.scanned_to = scanned_to;
    entry.complete = true;
    objects
}

/// Finds the innermost element enclosing `pos`, descending through greater
/// elements as long as `pos` stays within their contents.
///
/// Starts from the index's floor entry rather than the tree root, so the
/// walk only has to cross however many levels separate the indexed
/// checkpoint from the true innermost element, not the whole tree depth
/// from the document node.
pub fn element_at(tree: &Tree, index: &ElementIndex, buffer_len: usize, pos: usize) -> Option<NodeId> {
    let pos = pos.min(buffer_len);
    // Nothing indexed at or before `pos` (empty or not-yet-built index):
    // no element to report.
    let (_, entry) = index.floor(&Key::natural(pos))?;

    let mut current = entry.node;
    loop {
        let node = tree.get(current)?;
        let kind = node.data.kind();
        if !kind.is_greater_element() {
            break;
        }
        let content = match node.content_location {
            Some(c) => c,
            None => break,
        };
        let inside_contents = pos >= content.start && pos < content.end;
        let at_buffer_end = pos == buffer_len && pos == content.end;
        if !inside_contents && !at_buffer_end {
            break;
        }
        let next = tree
            .children_of(current)
            .iter()
            .rev()
            .copied()
            .find(|&child| {
                tree.get(child)
                    .map(|n| n.location.start <= pos)
                    .unwrap_or(false)
            });
        match next {
            Some(child) => current = child,
            None => break,
        }
    }
    Some(current)
}

/// The sub-range of an element's own span that may contain objects, given
/// its kind: a headline/inlinetask's title, an item's tag, a keyword's
/// value, or the element's whole contents for the markup-bearing leaf
/// elements. Elements with no object-bearing region return `None`.
fn object_bearing_kind(kind: Kind) -> bool {
    matches!(
        kind,
        Kind::Headline
            | Kind::InlineTask
            | Kind::Item
            | Kind::Keyword
            | Kind::Paragraph
            | Kind::VerseBlock
            | Kind::TableRow
            | Kind::Planning
    )
}

/// Result of [`context_at`]: the enclosing element, and — if `pos` falls
/// within an already-parsed object rather than bare text — the innermost
/// such object.
#[derive(Debug, Clone, Copy)]
pub struct Context {
    pub element: NodeId,
    pub object: Option<NodeId>,
}

/// Narrows `element_at(pos)` down to the object (if any) at `pos`.
///
/// Consults the per-element [`crate::cache::index::ObjectCacheEntry`] for
/// the element's top-level objects (see [`cached_object_children`]) rather
/// than re-walking the tree's children on every call, then descends further
/// into recursive objects (bold, links, …) directly off the tree, since
/// those aren't independently cached.
pub fn context_at(tree: &Tree, index: &mut ElementIndex, buffer_len: usize, pos: usize) -> Option<Context> {
    let element = element_at(tree, index, buffer_len, pos)?;
    let kind = tree.get(element)?.data.kind();
    if !object_bearing_kind(kind) {
        return Some(Context {
            element,
            object: None,
        });
    }

    let mut siblings = cached_object_children(tree, index, element);
    loop {
        let candidate = siblings.iter().copied().find(|&child| {
            tree.get(child)
                .map(|n| n.location.start <= pos && pos < n.location.end)
                .unwrap_or(false)
        });
        match candidate {
            Some(child) if tree.get(child).map(|n| n.data.kind().is_recursive_object()).unwrap_or(false) => {
                siblings = tree.children_of(child).to_vec();
            }
            Some(child) => {
                return Some(Context {
                    element,
                    object: Some(child),
                });
            }
            None => {
                return Some(Context {
                    element,
                    object: None,
                });
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::cache::index::ElementIndex;
    use crate::environment::Environment;
    use crate::parser::{ParseGranularity, Parser};

    fn indexed_parse(input: &str) -> (Tree<'_>, ElementIndex) {
        let mut parser = Parser::new(input, ParseGranularity::Object, Environment::default());
        let root = parser.parse_buffer();
        let tree = parser.tree;
        let mut index = ElementIndex::new();
        crate::cache::index_elements(&tree, root, false, &mut index);
        (tree, index)
    }

    #[test]
    fn element_at_descends_into_a_headline_section() {
        let input = "* Heading\nbody text\n";
        let (tree, index) = indexed_parse(input);
        let found = element_at(&tree, &index, input.len(), 12).unwrap();
        assert_eq!(tree.get(found).unwrap().data.kind(), Kind::Paragraph);
    }

    #[test]
    fn context_at_finds_bold_inside_a_paragraph() {
        let input = "plain *bold* plain\n";
        let (tree, mut index) = indexed_parse(input);
        let pos = input.find("bold").unwrap();
        let ctx = context_at(&tree, &mut index, input.len(), pos).unwrap();
        let object = ctx.object.unwrap();
        assert_eq!(tree.get(object).unwrap().data.kind(), Kind::PlainText);
    }

    #[test]
    fn context_at_populates_the_object_sub_cache_on_first_use() {
        let input = "plain *bold* plain\n";
        let (tree, mut index) = indexed_parse(input);
        let pos = input.find("bold").unwrap();
        let element = element_at(&tree, &index, input.len(), pos).unwrap();
        assert!(index.object_cache(element).is_none());

        context_at(&tree, &mut index, input.len(), pos).unwrap();
        let cached = index.object_cache(element).unwrap();
        assert!(cached.complete);
        assert!(!cached.objects.is_empty());
    }
}
