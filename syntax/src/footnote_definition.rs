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

//! `[fn:LABEL] definition text...` footnote definitions. A greater element:
//! ends before the next footnote definition or headline at the same or a
//! lesser indentation, or two consecutive blank lines.

use crate::affiliated::Affiliated;
use crate::node::{Interval, NodeData, NodeId};
use crate::parser::Parser;

#[derive(Debug)]
pub struct FootnoteDefinitionData<'a> {
    pub label: &'a str,
}

/// Parses a footnote definition starting at `at`. `at` must already
/// satisfy `environment.footnote_definition`.
pub fn footnote_definition_parser<'a>(
    parser: &mut Parser<'a>,
    at: usize,
    limit: usize,
    affiliated: Vec<Affiliated>,
) -> NodeId {
    let header_end = parser.line_end(at);
    let label = parser
        .capturing_at(at, &parser.environment.footnote_definition.clone())
        .map(|c| c.get(1).unwrap().as_str())
        .unwrap_or("");

    let mut cursor = parser.next_line_start(header_end);
    let mut blank_run = 0;
    while cursor < limit {
        let line_end = parser.line_end(cursor);
        let line = &parser.input[cursor..line_end];
        if parser.is_blank_line(cursor) {
            blank_run += 1;
            if blank_run >= 2 {
                break;
            }
        } else {
            blank_run = 0;
            if parser.is_bol(cursor)
                && (parser.environment.footnote_definition.is_match(line) || parser.on_headline(cursor))
            {
                break;
            }
        }
        cursor = parser.next_line_start(line_end);
    }
    let content_end = cursor.min(limit);

    let (end, post_blank) = parser.end_with_post_blank(content_end);
    let content_start = parser.next_line_start(header_end);
    let has_content = content_start < content_end;
    parser.tree.insert(
        NodeData::FootnoteDefinition(Box::new(FootnoteDefinitionData { label })),
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
    fn label_is_captured() {
        let input = "[fn:1] the note\n";
        let mut parser = Parser::new(input, ParseGranularity::Element, Environment::default());
        let id = footnote_definition_parser(&mut parser, 0, input.len(), Vec::new());
        match &parser.tree.get(id).unwrap().data {
            NodeData::FootnoteDefinition(d) => assert_eq!(d.label, "1"),
            other => panic!("expected FootnoteDefinition, got {:?}", other),
        }
    }

    #[test]
    fn stops_before_next_definition() {
        let input = "[fn:1] one\n[fn:2] two\n";
        let mut parser = Parser::new(input, ParseGranularity::Element, Environment::default());
        let id = footnote_definition_parser(&mut parser, 0, input.len(), Vec::new());
        let loc = parser.tree.get(id).unwrap().location;
        assert_eq!(&input[loc.start..loc.end], "[fn:1] one\n");
    }
}
