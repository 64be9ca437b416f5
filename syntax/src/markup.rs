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

//! Comment lines: `# text` (or a bare `#`) at the start of a line. Several
//! consecutive comment lines merge into a single `Comment` element.

use crate::affiliated::Affiliated;
use crate::node::{Interval, NodeData, NodeId};
use crate::parser::Parser;

#[derive(Debug)]
pub struct CommentData<'a> {
    pub value: &'a str,
}

/// Parses every consecutive comment line starting at `at`. `at` must
/// already satisfy `environment.comment_line`.
pub fn comment_parser<'a>(
    parser: &mut Parser<'a>,
    at: usize,
    limit: usize,
    affiliated: Vec<Affiliated>,
) -> NodeId {
    let mut cursor = at;
    while cursor < limit {
        let line_end = parser.line_end(cursor);
        if !parser.environment.comment_line.is_match(&parser.input[cursor..line_end]) {
            break;
        }
        cursor = parser.next_line_start(line_end);
    }
    let content_end = cursor;

    let (end, post_blank) = parser.end_with_post_blank(content_end);
    parser.tree.insert(
        NodeData::Comment(Box::new(CommentData {
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
    fn consecutive_comment_lines_merge() {
        let input = "# one\n# two\nnot a comment\n";
        let mut parser = Parser::new(input, ParseGranularity::Element, Environment::default());
        let id = comment_parser(&mut parser, 0, input.len(), Vec::new());
        match &parser.tree.get(id).unwrap().data {
            NodeData::Comment(d) => assert_eq!(d.value, "# one\n# two\n"),
            other => panic!("expected Comment, got {:?}", other),
        }
    }
}
