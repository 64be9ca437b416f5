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

//! Sections and paragraphs, the two catch-all elements every other parser
//! falls back to. A section is whatever sits between a headline (or the
//! start of the buffer) and its first child headline; a paragraph is a run
//! of non-blank lines that no other element claimed.

use crate::node::{Interval, NodeData, NodeId};
use crate::parser::Parser;

/// Parses a section spanning `[pos, limit)`. Sections have no header line
/// of their own, so their content starts right at `pos`.
pub fn section_parser<'a>(parser: &mut Parser<'a>, pos: usize, limit: usize) -> NodeId {
    let mut end = limit;
    let mut blank_lines = 0;
    while end > pos && parser.is_blank_line(parser.line_start(end.saturating_sub(1))) {
        end = parser.line_start(end.saturating_sub(1));
        blank_lines += 1;
    }
    let content = if pos < end { Some(Interval::new(pos, end)) } else { None };
    parser.tree.insert(
        NodeData::Section,
        Interval::new(pos, limit),
        content,
        blank_lines,
        Vec::new(),
    )
}

/// Parses a paragraph starting at `pos`. Its content runs until a blank
/// line, a line starting a new element at `is_bol`, or `limit`.
pub fn paragraph_parser<'a>(parser: &mut Parser<'a>, pos: usize, limit: usize) -> NodeId {
    let mut cursor = parser.next_line_start(parser.line_end(pos));
    while cursor < limit {
        if parser.is_blank_line(cursor) {
            break;
        }
        cursor = parser.next_line_start(parser.line_end(cursor));
    }
    let content_end = cursor.min(limit);

    let (end, post_blank) = parser.end_with_post_blank(content_end);
    parser.tree.insert(
        NodeData::Paragraph,
        Interval::new(pos, end),
        Some(Interval::new(pos, content_end)),
        post_blank,
        Vec::new(),
    )
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::environment::Environment;
    use crate::parser::ParseGranularity;

    #[test]
    fn paragraph_stops_at_blank_line() {
        let input = "one line\nanother line\n\nnext paragraph\n";
        let mut parser = Parser::new(input, ParseGranularity::Element, Environment::default());
        let id = paragraph_parser(&mut parser, 0, input.len());
        let loc = parser.tree.get(id).unwrap().location;
        assert_eq!(&input[loc.start..loc.end], "one line\nanother line\n\n");
    }

    #[test]
    fn section_spans_up_to_trailing_blank_lines() {
        let input = "text here\n\n";
        let mut parser = Parser::new(input, ParseGranularity::Element, Environment::default());
        let id = section_parser(&mut parser, 0, input.len());
        let node = parser.tree.get(id).unwrap();
        assert_eq!(node.content_location.unwrap().end, 10);
        assert_eq!(node.post_blank, 1);
    }
}
