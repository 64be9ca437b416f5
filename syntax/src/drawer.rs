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

//! Drawers: `:NAME:` ... `:END:`, a generic container for anything that
//! isn't a property drawer (those get their own element kind, parsed in
//! `headline.rs`, since only they may directly follow a planning line).

use crate::affiliated::Affiliated;
use crate::node::{Interval, NodeData, NodeId};
use crate::parser::Parser;

#[derive(Debug)]
pub struct DrawerData<'a> {
    pub drawer_name: &'a str,
}

/// Parses a drawer starting at `at`. `at` must already satisfy
/// `environment.drawer_begin`.
pub fn drawer_parser<'a>(
    parser: &mut Parser<'a>,
    at: usize,
    limit: usize,
    affiliated: Vec<Affiliated>,
) -> NodeId {
    let header_end = parser.line_end(at);
    let name = parser
        .capturing_at(at, &parser.environment.drawer_begin.clone())
        .map(|c| c.get(1).unwrap().as_str())
        .unwrap_or("");

    let mut cursor = parser.next_line_start(header_end);
    while cursor < limit {
        let line_end = parser.line_end(cursor);
        if parser.environment.drawer_end.is_match(&parser.input[cursor..line_end]) {
            break;
        }
        cursor = parser.next_line_start(line_end);
    }
    let content_end = cursor.min(limit);
    let after_end = if cursor < limit {
        parser.next_line_start(parser.line_end(cursor))
    } else {
        cursor
    };

    let (end, post_blank) = parser.end_with_post_blank(after_end);
    let content_start = parser.next_line_start(header_end);
    let has_content = content_start < content_end;

    parser.tree.insert(
        NodeData::Drawer(Box::new(DrawerData { drawer_name: name })),
        Interval::new(at, end),
        if has_content {
            Some(Interval::new(content_start, content_end))
        } else {
            None
        },
        post_blank,
        affiliated,
    )
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::environment::Environment;
    use crate::parser::ParseGranularity;

    #[test]
    fn drawer_name_is_captured() {
        let input = ":LOGBOOK:\nsome note\n:END:\n";
        let mut parser = Parser::new(input, ParseGranularity::Element, Environment::default());
        let id = drawer_parser(&mut parser, 0, input.len(), Vec::new());
        match &parser.tree.get(id).unwrap().data {
            NodeData::Drawer(d) => assert_eq!(d.drawer_name, "LOGBOOK"),
            other => panic!("expected Drawer, got {:?}", other),
        }
    }
}
