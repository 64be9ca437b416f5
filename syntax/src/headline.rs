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

//! Headlines and Sections
//! https://orgmode.org/worg/dev/org-syntax.html#Headlines_and_Sections
//!
//! A headline is `STARS KEYWORD PRIORITY TITLE TAGS`. STARS is one or more
//! `*` at column 0 followed by a space or end of line; its count is the
//! headline's level. KEYWORD is a TODO keyword; PRIORITY a `[#A]`-style
//! cookie; TAGS a colon-delimited list at the end of the line. If the
//! first word of the title is `COMMENT` the headline is commented; if its
//! title is exactly `Footnotes` it is the document's footnote section; if
//! `ARCHIVE` is one of its tags it is archived.
//!
//! A headline directly contains one optional section followed by any
//! number of deeper headlines. Only a headline (or the top of the
//! document) can contain a section.

use crate::environment::Environment;
use crate::node::{Interval, NodeData, NodeId};
use crate::objects::TimestampData;
use crate::parser::Parser;
use doctree_buffer::view::BufferView;
use std::borrow::Cow;

const ORG_FOOTNOTE_SECTION: &str = "Footnotes";

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Priority(pub char);

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Tag<'a>(pub Cow<'a, str>);

impl<'a> Tag<'a> {
    pub fn new(s: &'a str) -> Tag<'a> {
        Tag(Cow::from(s))
    }
}

macro_rules! tag {
    ($s:literal) => {
        Tag::new($s)
    };
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct TodoKeyword<'a>(pub Cow<'a, str>);

impl<'a> TodoKeyword<'a> {
    pub fn is_done(&self, environment: &Environment) -> bool {
        environment
            .config
            .done_keywords
            .iter()
            .any(|k| k == self.0.as_ref())
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TodoType {
    Todo,
    Done,
}

#[derive(Debug)]
pub struct NodePropertyData<'a> {
    pub key: Cow<'a, str>,
    pub value: Cow<'a, str>,
}

#[derive(Debug)]
pub struct HeadlineData<'a> {
    pub archivedp: bool,
    pub closed: Option<TimestampData<'a>>,
    pub commentedp: bool,
    pub deadline: Option<TimestampData<'a>>,
    pub footnote_section_p: bool,
    pub level: usize,
    pub pre_blank: usize,
    pub priority: Option<Priority>,
    pub scheduled: Option<TimestampData<'a>>,
    pub tags: Vec<Tag<'a>>,
    pub raw_value: &'a str,
    pub todo_keyword: Option<TodoKeyword<'a>>,
    pub todo_type: Option<TodoType>,
}

#[derive(Debug)]
pub struct InlineTaskData<'a> {
    pub level: usize,
    pub priority: Option<Priority>,
    pub tags: Vec<Tag<'a>>,
    pub raw_value: &'a str,
    pub todo_keyword: Option<TodoKeyword<'a>>,
    pub todo_type: Option<TodoType>,
}

/// Finds the first line starting at `from` whose stars count is `<=
/// level`, i.e. where the current subtree ends. Returns `input.len()` if
/// none is found before `limit`.
fn end_of_subtree<'a>(parser: &Parser<'a>, from: usize, level: usize, limit: usize) -> usize {
    let mut pos = parser.next_line_start(parser.line_end(from));
    while pos < limit {
        let line_end = parser.line_end(pos);
        let line = &parser.input[pos..line_end];
        let stars = line.bytes().take_while(|&b| b == b'*').count();
        if stars > 0 && stars <= level && line.as_bytes().get(stars).map_or(true, |&b| b == b' ' || b == b'\t') {
            return pos;
        }
        pos = parser.next_line_start(line_end);
    }
    limit
}

fn parse_todo_keyword<'a>(parser: &Parser<'a>, rest: &'a str) -> Option<(&'a str, usize)> {
    let word_end = rest.find(|c: char| c.is_whitespace()).unwrap_or(rest.len());
    let word = &rest[..word_end];
    let known = parser
        .environment
        .config
        .todo_keywords
        .iter()
        .chain(parser.environment.config.done_keywords.iter())
        .any(|k| k == word);
    if known && word_end < rest.len() {
        Some((word, word_end + 1))
    } else if known {
        Some((word, word_end))
    } else {
        None
    }
}

/// Parses a headline starting at `pos`. Assumes `pos` is at the first `*`.
pub fn headline_parser<'a>(parser: &mut Parser<'a>, pos: usize, limit: usize) -> NodeId {
    let line_end = parser.line_end(pos);
    let line = &parser.input[pos..line_end];

    let level = line.bytes().take_while(|&b| b == b'*').count();
    let mut cursor = level;
    while line.as_bytes().get(cursor) == Some(&b' ') || line.as_bytes().get(cursor) == Some(&b'\t') {
        cursor += 1;
    }

    let todo_keyword = parse_todo_keyword(parser, &line[cursor..]).map(|(w, consumed)| {
        cursor += consumed;
        TodoKeyword(Cow::Borrowed(w))
    });
    let todo_type = todo_keyword
        .as_ref()
        .map(|k| if k.is_done(&parser.environment) { TodoType::Done } else { TodoType::Todo });

    let priority = parser
        .environment
        .priority
        .captures(&line[cursor..])
        .filter(|c| c.get(0).unwrap().start() == 0)
        .map(|c| {
            let whole = c.get(0).unwrap();
            let letter = c.get(1).unwrap().as_str().chars().next().unwrap();
            cursor += whole.end();
            Priority(letter)
        });

    let commentedp = parser
        .environment
        .comment_headline
        .find(&line[cursor..])
        .filter(|m| m.start() == 0)
        .map(|m| {
            cursor += m.end();
            true
        })
        .unwrap_or(false);

    let title_start = pos + cursor;
    let rest = &line[cursor..];
    let tags: Vec<Tag> = parser
        .environment
        .tags
        .captures(rest)
        .map(|c| {
            c.get(1)
                .unwrap()
                .as_str()
                .trim_matches(':')
                .split(':')
                .filter(|s| !s.is_empty())
                .map(|s| Tag(Cow::Borrowed(s)))
                .collect()
        })
        .unwrap_or_default();

    let title_end_in_line = parser
        .environment
        .tags
        .find(rest)
        .map(|m| m.start())
        .unwrap_or(rest.len());
    let raw_value = rest[..title_end_in_line].trim();

    let archivedp = tags.contains(&tag!("ARCHIVE"));
    let footnote_section_p = raw_value == ORG_FOOTNOTE_SECTION;

    let subtree_end = end_of_subtree(parser, pos, level, limit).min(limit);

    let mut body_start = parser.next_line_start(line_end);
    let mut deadline = None;
    let mut scheduled = None;
    let mut closed = None;
    if body_start < subtree_end && parser.looking_at(body_start, &parser.environment.planning_line.clone()).is_some() {
        let planning_id = crate::planning::planning_parser(parser, body_start, subtree_end);
        if let NodeData::Planning(p) = &parser.tree.get(planning_id).unwrap().data {
            deadline = p.deadline;
            scheduled = p.scheduled;
            closed = p.closed;
        }
        body_start = parser.tree.get(planning_id).unwrap().location.end;
        parser.tree.free_slot(planning_id);
    }

    let pre_blank = parser
        .view
        .count_lines(line_end, body_start)
        .saturating_sub(if body_start > line_end { 1 } else { 0 });
    let content_start = body_start.min(subtree_end);
    let has_content = content_start < subtree_end;

    let data = HeadlineData {
        archivedp,
        closed,
        commentedp,
        deadline,
        footnote_section_p,
        level,
        pre_blank,
        priority,
        scheduled,
        tags,
        raw_value,
        todo_keyword,
        todo_type,
    };

    let (end, post_blank) = parser.end_with_post_blank(subtree_end);
    let _ = title_start;

    parser.tree.insert(
        NodeData::Headline(Box::new(data)),
        Interval::new(pos, end),
        if has_content {
            Some(Interval::new(content_start, subtree_end))
        } else {
            None
        },
        post_blank,
        Vec::new(),
    )
}

/// Parses the property drawer immediately following a headline's planning
/// line, if any (`:PROPERTIES: ... :END:`).
pub fn property_drawer_parser<'a>(parser: &mut Parser<'a>, pos: usize, limit: usize) -> NodeId {
    let mut cursor = parser.next_line_start(parser.line_end(pos));
    let mut properties = Vec::new();
    while cursor < limit {
        let line_end = parser.line_end(cursor);
        let line = &parser.input[cursor..line_end];
        if parser.environment.property_drawer_end.is_match(line) {
            cursor = parser.next_line_start(line_end);
            break;
        }
        if let Some(c) = parser.environment.node_property.captures(line) {
            properties.push((
                c.get(1).unwrap().as_str(),
                c.get(2).map(|m| m.as_str()).unwrap_or(""),
            ));
        }
        cursor = parser.next_line_start(line_end);
    }
    let _ = properties;
    let (end, post_blank) = parser.end_with_post_blank(cursor);
    parser.tree.insert(
        NodeData::PropertyDrawer,
        Interval::new(pos, end),
        Some(Interval::new(parser.next_line_start(parser.line_end(pos)), cursor)),
        post_blank,
        Vec::new(),
    )
}

/// Parses one `:KEY: value` line inside a property drawer.
pub fn node_property_parser<'a>(parser: &mut Parser<'a>, pos: usize, limit: usize) -> NodeId {
    let line_end = parser.line_end(pos).min(limit);
    let line = &parser.input[pos..line_end];
    let (key, value) = parser
        .environment
        .node_property
        .captures(line)
        .map(|c| (c.get(1).unwrap().as_str(), c.get(2).map(|m| m.as_str()).unwrap_or("")))
        .unwrap_or(("", ""));

    let (end, post_blank) = parser.end_with_post_blank(parser.next_line_start(line_end));
    parser.tree.insert(
        NodeData::NodeProperty(Box::new(NodePropertyData {
            key: Cow::Borrowed(key),
            value: Cow::Borrowed(value),
        })),
        Interval::new(pos, end),
        None,
        post_blank,
        Vec::new(),
    )
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::environment::Environment;
    use crate::parser::ParseGranularity;

    fn parser_for(input: &str) -> Parser {
        Parser::new(input, ParseGranularity::Element, Environment::default())
    }

    #[test]
    fn parses_level_and_title() {
        let input = "*** TODO [#A] Some e-mail :tag:a2%:\nbody\n";
        let mut parser = parser_for(input);
        let id = headline_parser(&mut parser, 0, input.len());
        match &parser.tree.get(id).unwrap().data {
            NodeData::Headline(h) => {
                assert_eq!(h.level, 3);
                assert_eq!(h.raw_value, "Some e-mail");
                assert_eq!(h.priority, Some(Priority('A')));
                assert_eq!(h.todo_type, Some(TodoType::Todo));
                assert_eq!(h.tags.len(), 2);
            }
            other => panic!("expected Headline, got {:?}", other),
        }
    }

    #[test]
    fn bare_star_is_a_level_one_headline() {
        let input = "*\n";
        let mut parser = parser_for(input);
        let id = headline_parser(&mut parser, 0, input.len());
        match &parser.tree.get(id).unwrap().data {
            NodeData::Headline(h) => assert_eq!(h.level, 1),
            other => panic!("expected Headline, got {:?}", other),
        }
    }

    #[test]
    fn archive_tag_marks_archived() {
        let input = "* Done task :ARCHIVE:\n";
        let mut parser = parser_for(input);
        let id = headline_parser(&mut parser, 0, input.len());
        match &parser.tree.get(id).unwrap().data {
            NodeData::Headline(h) => assert!(h.archivedp),
            other => panic!("expected Headline, got {:?}", other),
        }
    }

    #[test]
    fn subtree_end_stops_at_sibling_headline() {
        let input = "* One\nbody one\n* Two\nbody two\n";
        let mut parser = parser_for(input);
        let id = headline_parser(&mut parser, 0, input.len());
        let loc = parser.tree.get(id).unwrap().location;
        assert_eq!(&input[loc.start..loc.end], "* One\nbody one\n");
    }
}
