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

//! `#+BEGIN_NAME ... #+END_NAME` blocks and `#+BEGIN: NAME ... #+END:`
//! dynamic blocks.
//!
//! `CENTER`, `COMMENT`, `EXAMPLE`, `EXPORT`, `QUOTE`, `SRC` and `VERSE` are
//! the block names the grammar treats specially; anything else becomes a
//! generic `SpecialBlock` carrying its own name.

use crate::affiliated::Affiliated;
use crate::node::{Interval, NodeData, NodeId};
use crate::parser::Parser;

#[derive(Debug)]
pub struct DynamicBlockData<'a> {
    pub block_name: &'a str,
    pub parameters: Option<&'a str>,
}

#[derive(Debug)]
pub struct CommentBlockData<'a> {
    pub value: &'a str,
}

#[derive(Debug)]
pub struct ExampleBlockData<'a> {
    pub switches: Option<&'a str>,
    pub value: &'a str,
}

#[derive(Debug)]
pub struct ExportBlockData<'a> {
    pub backend: &'a str,
    pub value: &'a str,
}

#[derive(Debug)]
pub struct SpecialBlockData<'a> {
    pub block_type: &'a str,
}

#[derive(Debug)]
pub struct SrcBlockData<'a> {
    pub language: Option<&'a str>,
    pub parameters: Option<&'a str>,
    pub value: &'a str,
}

/// Finds the header line's parameters and the body's `[start, end)`, i.e.
/// everything up to (but not including) the matching `#+END_NAME` line,
/// plus the position right after that end line.
fn block_body<'a>(parser: &Parser<'a>, at: usize, limit: usize, name: &str) -> (Option<&'a str>, usize, usize) {
    let header_end = parser.line_end(at);
    let parameters = parser
        .capturing_at(at, &parser.environment.block_begin.clone())
        .and_then(|c| c.get(2))
        .map(|m| m.as_str());

    let end_re = parser.environment.block_end_for(name);
    let mut cursor = parser.next_line_start(header_end);
    while cursor < limit {
        let line_end = parser.line_end(cursor);
        if end_re.is_match(&parser.input[cursor..line_end]) {
            break;
        }
        cursor = parser.next_line_start(line_end);
    }
    let content_end = cursor.min(limit);
    let after = if cursor < limit {
        parser.next_line_start(parser.line_end(cursor))
    } else {
        cursor
    };
    (parameters, content_end, after)
}

/// Dispatches on the block's uppercased name. `at` points at the
/// `#+BEGIN_...` line itself.
pub fn block_parser<'a>(
    parser: &mut Parser<'a>,
    at: usize,
    limit: usize,
    affiliated: Vec<Affiliated>,
    name: &str,
) -> NodeId {
    let content_start = parser.next_line_start(parser.line_end(at));
    let (parameters, content_end, after) = block_body(parser, at, limit, name);
    let value = &parser.input[content_start.min(content_end)..content_end];
    let (end, post_blank) = parser.end_with_post_blank(after);
    let location = Interval::new(at, end);

    match name {
        "CENTER" => parser.tree.insert(
            NodeData::CenterBlock,
            location,
            Some(Interval::new(content_start, content_end)),
            post_blank,
            affiliated,
        ),
        "QUOTE" => parser.tree.insert(
            NodeData::QuoteBlock,
            location,
            Some(Interval::new(content_start, content_end)),
            post_blank,
            affiliated,
        ),
        "VERSE" => parser.tree.insert(
            NodeData::VerseBlock,
            location,
            Some(Interval::new(content_start, content_end)),
            post_blank,
            affiliated,
        ),
        "COMMENT" => parser.tree.insert(
            NodeData::CommentBlock(Box::new(CommentBlockData { value })),
            location,
            None,
            post_blank,
            affiliated,
        ),
        "EXAMPLE" => parser.tree.insert(
            NodeData::ExampleBlock(Box::new(ExampleBlockData {
                switches: parameters,
                value,
            })),
            location,
            None,
            post_blank,
            affiliated,
        ),
        "EXPORT" => parser.tree.insert(
            NodeData::ExportBlock(Box::new(ExportBlockData {
                backend: parameters.map(|p| p.trim()).unwrap_or(""),
                value,
            })),
            location,
            None,
            post_blank,
            affiliated,
        ),
        "SRC" => {
            let (language, rest) = match parameters {
                Some(p) => {
                    let p = p.trim_start();
                    match p.find(char::is_whitespace) {
                        Some(i) => (Some(&p[..i]), Some(p[i..].trim_start())),
                        None if !p.is_empty() => (Some(p), None),
                        None => (None, None),
                    }
                }
                None => (None, None),
            };
            parser.tree.insert(
                NodeData::SrcBlock(Box::new(SrcBlockData {
                    language,
                    parameters: rest.filter(|s| !s.is_empty()),
                    value,
                })),
                location,
                None,
                post_blank,
                affiliated,
            )
        }
        other => parser.tree.insert(
            NodeData::SpecialBlock(Box::new(SpecialBlockData { block_type: other })),
            location,
            Some(Interval::new(content_start, content_end)),
            post_blank,
            affiliated,
        ),
    }
}

/// Parses a `#+BEGIN: NAME PARAMS ... #+END:` dynamic block.
pub fn dynamic_block_parser<'a>(
    parser: &mut Parser<'a>,
    at: usize,
    limit: usize,
    affiliated: Vec<Affiliated>,
) -> NodeId {
    let header_end = parser.line_end(at);
    let cap = parser.capturing_at(at, &parser.environment.dynamic_block_begin.clone());
    let block_name = cap.as_ref().and_then(|c| c.get(1)).map(|m| m.as_str()).unwrap_or("");
    let parameters = cap.as_ref().and_then(|c| c.get(2)).map(|m| m.as_str());

    let mut cursor = parser.next_line_start(header_end);
    while cursor < limit {
        let line_end = parser.line_end(cursor);
        if parser.environment.dynamic_block_end.is_match(&parser.input[cursor..line_end]) {
            break;
        }
        cursor = parser.next_line_start(line_end);
    }
    let content_end = cursor.min(limit);
    let after = if cursor < limit {
        parser.next_line_start(parser.line_end(cursor))
    } else {
        cursor
    };

    let (end, post_blank) = parser.end_with_post_blank(after);
    let content_start = parser.next_line_start(header_end);
    parser.tree.insert(
        NodeData::DynamicBlock(Box::new(DynamicBlockData {
            block_name,
            parameters,
        })),
        Interval::new(at, end),
        Some(Interval::new(content_start, content_end)),
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
    fn src_block_splits_language_and_parameters() {
        let input = "#+BEGIN_SRC rust :results silent\nfn main() {}\n#+END_SRC\n";
        let mut parser = Parser::new(input, ParseGranularity::Element, Environment::default());
        let id = block_parser(&mut parser, 0, input.len(), Vec::new(), "SRC");
        match &parser.tree.get(id).unwrap().data {
            NodeData::SrcBlock(d) => {
                assert_eq!(d.language, Some("rust"));
                assert_eq!(d.parameters, Some(":results silent"));
                assert_eq!(d.value, "fn main() {}\n");
            }
            other => panic!("expected SrcBlock, got {:?}", other),
        }
    }

    #[test]
    fn unknown_name_becomes_special_block() {
        let input = "#+BEGIN_NOTE\ntext\n#+END_NOTE\n";
        let mut parser = Parser::new(input, ParseGranularity::Element, Environment::default());
        let id = block_parser(&mut parser, 0, input.len(), Vec::new(), "NOTE");
        match &parser.tree.get(id).unwrap().data {
            NodeData::SpecialBlock(d) => assert_eq!(d.block_type, "NOTE"),
            other => panic!("expected SpecialBlock, got {:?}", other),
        }
    }

    #[test]
    fn dynamic_block_name_is_captured() {
        let input = "#+BEGIN: clocktable :scope subtree\n\n#+END:\n";
        let mut parser = Parser::new(input, ParseGranularity::Element, Environment::default());
        let id = dynamic_block_parser(&mut parser, 0, input.len(), Vec::new());
        match &parser.tree.get(id).unwrap().data {
            NodeData::DynamicBlock(d) => assert_eq!(d.block_name, "clocktable"),
            other => panic!("expected DynamicBlock, got {:?}", other),
        }
    }
}
