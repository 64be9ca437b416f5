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

//! Cross-crate test fixtures shared by `tests/`: a handful of small helpers
//! that every integration test would otherwise duplicate.

use doctree_syntax::{Environment, ParseGranularity, Parser, Tree};

/// Parses `input` at object granularity with the default `Environment`,
/// the configuration every scenario test starts from unless it says
/// otherwise.
pub fn parse(input: &str) -> (Tree<'_>, doctree_syntax::NodeId) {
    let mut parser = Parser::new(input, ParseGranularity::Object, Environment::default());
    let root = parser.parse_buffer();
    (parser.tree, root)
}

/// Walks every node reachable from `id` and returns it depth-first,
/// `id` included. Used by the round-trip and parent-consistency checks,
/// which both want to inspect the whole tree rather than one node.
pub fn walk(tree: &Tree<'_>, id: doctree_syntax::NodeId, out: &mut Vec<doctree_syntax::NodeId>) {
    out.push(id);
    if let Some(node) = tree.get(id) {
        for &child in &node.children {
            walk(tree, child, out);
        }
    }
}
