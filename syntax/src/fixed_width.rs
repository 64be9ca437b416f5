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

//! Fixed Width Areas
//!
//! A "fixed-width line" starts with a colon character followed by a
//! whitespace or an end of line. Fixed width areas can contain any number
//! of consecutive fixed-width lines.

use crate::affiliated::Affiliated;
use crate::node::{Interval, NodeData, NodeId};
use crate::parser::Parser;

#[derive(Debug)]
pub struct FixedWidthData<'a> {
    pub value: &'a str,
}

/// Parses every consecutive fixed-width line starting at `at`. `at` must
/// already satisfy `environment.fixed_width`.
pub fn fixed_width_parser<'a>(
    parser: &mut Parser<'a>,
    at: usize,
    limit: usize,
    affiliated: Vec<Affiliated>,
) -> NodeId {
    let mut cursor = at;
    while cursor < limit {
        let line_end = parser.line_end(cursor);
        if !parser.environment.fixed_width.is_match(&parser.input[cursor..line_end]) {
            break;
        }
        cursor = parser.next_line_start(line_end);
    }
    let content_end = cursor;

    let (end, post_blank) = parser.end_with_post_blank(content_end);
    parser.tree.insert(
        NodeData::FixedWidth(Box::new(FixedWidthData {
            value: &parser.input[at..content_end],
        })),
        Interval::new(at, end),
        None,
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
    fn consecutive_lines_are_merged() {
        let input = ": line one\n: line two\nnot fixed\n";
        let mut parser = Parser::new(input, ParseGranularity::Element, Environment::default());
        let id = fixed_width_parser(&mut parser, 0, input.len(), Vec::new());
        match &parser.tree.get(id).unwrap().data {
            NodeData::FixedWidth(d) => assert_eq!(d.value, ": line one\n: line two\n"),
            other => panic!("expected FixedWidth, got {:?}", other),
        }
    }
}
