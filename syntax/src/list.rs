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

//!  Plain Lists and Items
//! https://orgmode.org/worg/dev/org-syntax.html#Plain_Lists_and_Items
//!
//!  Items are defined by a line starting with the following pattern: "BULLET
//! COUNTER-SET CHECK-BOX TAG", in which only BULLET is mandatory.
//!
//!  BULLET is either an asterisk, a hyphen, a plus sign character or follows
//! either the pattern "COUNTER." or "COUNTER)". In any case, BULLET is
//! followed by a whitespace character or line ending.
//!
//!  CHECK-BOX is either a single whitespace character, a "X" character or a
//! hyphen, enclosed within square brackets.
//!
//!  TAG follows "TAG-TEXT ::" pattern, where TAG-TEXT can contain any
//! character but a new line.
//!
//!  An item ends before the next item at the same indentation, the first
//! line less indented than its starting line, or two consecutive empty
//! lines. A plain list is a set of consecutive items of the same
//! indentation; it can only directly contain items.
//!
//!  If the first item in a plain list has a counter in its bullet, the
//! plain list is "ordered". If it has a tag, it is "descriptive". Otherwise
//! it is "unordered". The three kinds are mutually exclusive.

use crate::affiliated::Affiliated;
use crate::node::{Interval, NodeData, NodeId};
use crate::parser::Parser;
use regex::Regex;
use std::borrow::Cow;
use std::rc::Rc;

lazy_static! {
    /// Bullet, optional counter, optional checkbox, optional descriptive
    /// tag, each captured in its own group.
    pub static ref REGEX_ITEM: Regex = Regex::new(
        r"^[ \t]*(?:([-+*])|(?:([0-9]+|[A-Za-z])([.)])))(?:[ \t]+|$)(?:\[@(?:start:)?([0-9]+|[A-Za-z])\][ \t]*)?(?:(\[[ X-]\])(?:[ \t]+|$))?(?:(.*?)[ \t]+::(?:[ \t]+|$))?"
    ).unwrap();
}

/// One item's boundaries within its enclosing list, as computed by
/// [`list_struct`] before any item is actually parsed — items further down
/// the list can reference earlier siblings' positions without re-scanning.
#[derive(Debug, Clone)]
pub struct ListItemMeta {
    pub begin: usize,
    pub indent: usize,
}

/// A plain list's layout: every item's start position and indentation,
/// computed once so `item_parser` doesn't have to rediscover where the next
/// sibling begins.
#[derive(Debug, Clone, Default)]
pub struct ListStruct {
    pub items: Vec<ListItemMeta>,
    pub end: usize,
}

impl ListStruct {
    /// The item beginning strictly after `pos`, if any.
    fn next_after(&self, pos: usize) -> Option<usize> {
        self.items.iter().map(|i| i.begin).find(|&b| b > pos)
    }
}

#[derive(Debug)]
pub struct ItemData<'a> {
    pub bullet: Cow<'a, str>,
    pub checkbox: Option<CheckBox>,
    pub counter: Option<usize>,
    pub pre_blank: usize,
    pub raw_tag: Option<&'a str>,
}

#[derive(Debug)]
pub struct PlainListData {
    pub structure: ListStruct,
    pub kind: ListKind,
}

impl PlainListData {
    pub fn structure_handle(&self) -> ListStruct {
        self.structure.clone()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Descriptive,
    Ordered,
    Unordered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckBox {
    On,
    Off,
    Trans,
}

fn indent_of(line: &str) -> usize {
    line.bytes().take_while(|&b| b == b' ' || b == b'\t').count()
}

fn counter_of(raw: &str) -> Option<usize> {
    raw.parse().ok()
}

/// Computes the layout of the plain list starting at `at`: every item's
/// position and indentation, stopping at the first line that dedents past
/// the first item, two consecutive blank lines, or `limit`.
pub fn list_struct<'a>(parser: &Parser<'a>, at: usize, limit: usize) -> ListStruct {
    let base_indent = indent_of(&parser.input[at..parser.line_end(at)]);
    let mut items = Vec::new();
    let mut pos = at;
    let mut blank_run = 0;

    while pos < limit {
        let line_end = parser.line_end(pos);
        let line = &parser.input[pos..line_end];
        if parser.is_blank_line(pos) {
            blank_run += 1;
            if blank_run >= 2 {
                break;
            }
            pos = parser.next_line_start(line_end);
            continue;
        }
        blank_run = 0;
        let indent = indent_of(line);
        if indent < base_indent {
            break;
        }
        if indent == base_indent {
            if REGEX_ITEM.find(line).map(|m| m.start()).is_none() {
                break;
            }
            items.push(ListItemMeta { begin: pos, indent });
        }
        pos = parser.next_line_start(line_end);
    }

    ListStruct { items, end: pos }
}

/// Parses one item. Falls back to a plain paragraph when `at` isn't itself
/// the start of a bulleted line — happens for an item's own continuation
/// lines, parsed under `ParserMode::Item` alongside fresh siblings.
pub fn item_parser<'a>(
    parser: &mut Parser<'a>,
    at: usize,
    limit: usize,
    structure: Option<Rc<ListStruct>>,
) -> NodeId {
    let line_end = parser.line_end(at);
    let line = &parser.input[at..line_end];

    let m = match REGEX_ITEM.captures(line) {
        Some(c) if c.get(0).unwrap().start() == 0 => c,
        _ => return crate::paragraph::paragraph_parser(parser, at, limit),
    };

    let bullet_end = m.get(0).unwrap().end();
    let bullet = m
        .get(1)
        .or_else(|| m.get(2))
        .map(|g| g.as_str())
        .unwrap_or("-");
    let counter = m
        .get(4)
        .or_else(|| m.get(2))
        .and_then(|g| counter_of(g.as_str()));
    let checkbox = m.get(5).map(|g| match g.as_str() {
        "[X]" => CheckBox::On,
        "[-]" => CheckBox::Trans,
        _ => CheckBox::Off,
    });
    let raw_tag = m.get(6).map(|g| g.as_str());

    let item_end = structure
        .as_deref()
        .and_then(|s| s.next_after(at))
        .unwrap_or(limit)
        .min(limit);

    let content_start = at + bullet_end;
    let pre_blank = if parser.is_blank_line(content_start.min(line_end)) { 1 } else { 0 };
    let (end, post_blank) = parser.end_with_post_blank(item_end);
    let has_content = content_start < item_end;

    parser.tree.insert(
        NodeData::Item(Box::new(ItemData {
            bullet: Cow::Borrowed(bullet),
            checkbox,
            counter,
            pre_blank,
            raw_tag,
        })),
        Interval::new(at, end),
        if has_content {
            Some(Interval::new(content_start, item_end))
        } else {
            None
        },
        post_blank,
        Vec::new(),
    )
}

/// Parses the whole plain list at `at`, using `structure` (already computed
/// by [`list_struct`]) to find where its last item ends.
pub fn plain_list_parser<'a>(
    parser: &mut Parser<'a>,
    at: usize,
    limit: usize,
    affiliated: Vec<Affiliated>,
    structure: Rc<ListStruct>,
) -> NodeId {
    let first_line_end = parser.line_end(at);
    let first_line = &parser.input[at..first_line_end];
    let m = REGEX_ITEM.captures(first_line);
    let kind = match m {
        Some(c) if c.get(6).is_some() => ListKind::Descriptive,
        Some(c) if c.get(2).is_some() => ListKind::Ordered,
        _ => ListKind::Unordered,
    };

    let content_end = structure.end.min(limit);
    let (end, post_blank) = parser.end_with_post_blank(content_end);

    parser.tree.insert(
        NodeData::PlainList(Box::new(PlainListData {
            structure: (*structure).clone(),
            kind,
        })),
        Interval::new(at, end),
        Some(Interval::new(at, content_end)),
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
    fn list_struct_collects_three_items() {
        let input = "- one\n- two\n- three\n";
        let parser = Parser::new(input, ParseGranularity::Element, Environment::default());
        let structure = list_struct(&parser, 0, input.len());
        assert_eq!(structure.items.len(), 3);
    }

    #[test]
    fn ordered_bullet_yields_ordered_kind() {
        let input = "1. one\n2. two\n";
        let mut parser = Parser::new(input, ParseGranularity::Element, Environment::default());
        let structure = Rc::new(list_struct(&parser, 0, input.len()));
        let id = plain_list_parser(&mut parser, 0, input.len(), Vec::new(), structure);
        match &parser.tree.get(id).unwrap().data {
            NodeData::PlainList(d) => assert_eq!(d.kind, ListKind::Ordered),
            other => panic!("expected PlainList, got {:?}", other),
        }
    }

    #[test]
    fn checkbox_is_recognized() {
        let input = "- [X] done\n";
        let mut parser = Parser::new(input, ParseGranularity::Element, Environment::default());
        let id = item_parser(&mut parser, 0, input.len(), None);
        match &parser.tree.get(id).unwrap().data {
            NodeData::Item(d) => assert_eq!(d.checkbox, Some(CheckBox::On)),
            other => panic!("expected Item, got {:?}", other),
        }
    }
}
