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

//! The top-level driver: turns a buffer into a tree by repeatedly finding
//! "the next element" (`current_element`) and recursing into whatever it
//! contains (`parse_elements`), switching `ParserMode` the way the upstream
//! grammar does so headline-adjacent constructs (planning lines, property
//! drawers) are only tried where they are legal.

use doctree_buffer::view::{BufferView, StrBufferView};
use regex::{Captures, Match, Regex};
use std::rc::Rc;
use tracing::trace;

use crate::environment::Environment;
use crate::kind::Kind;
use crate::list::ListStruct;
use crate::node::{Interval, NodeData, NodeId, Tree};

/// Determines how deeply a parse recurses.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ParseGranularity {
    /// Only parse headlines.
    Headline,
    /// Don't recurse into greater elements except headlines and sections.
    GreaterElement,
    /// Parse everything but objects and plain text.
    Element,
    /// Parse the complete buffer (default).
    Object,
}

/// Prioritizes some recognizers over others depending on what immediately
/// precedes the cursor (a headline, a property drawer, a list item...).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ParserMode {
    FirstSection,
    Section,
    Planning,
    Item,
    NodeProperty,
    TableRow,
    PropertyDrawer,
}

pub struct Parser<'a> {
    pub input: &'a str,
    pub view: StrBufferView<'a>,
    pub granularity: ParseGranularity,
    pub environment: Environment,
    pub tree: Tree<'a>,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str, granularity: ParseGranularity, environment: Environment) -> Parser<'a> {
        Parser {
            input,
            view: StrBufferView::new(input),
            granularity,
            environment,
            tree: Tree::new(),
        }
    }

    /// Position right after the line containing `pos` (i.e. right before
    /// the newline, or `input.len()` on the last line).
    pub fn line_end(&self, pos: usize) -> usize {
        self.input[pos..]
            .find('\n')
            .map(|o| pos + o)
            .unwrap_or_else(|| self.input.len())
    }

    /// Start of the line directly following the one containing `pos`.
    pub fn next_line_start(&self, pos: usize) -> usize {
        let end = self.line_end(pos);
        (end + 1).min(self.input.len())
    }

    pub fn line_start(&self, pos: usize) -> usize {
        self.input[..pos].rfind('\n').map(|o| o + 1).unwrap_or(0)
    }

    pub fn is_bol(&self, pos: usize) -> bool {
        pos == 0 || self.input.as_bytes().get(pos - 1) == Some(&b'\n')
    }

    pub fn is_blank_line(&self, pos: usize) -> bool {
        let end = self.line_end(pos);
        self.environment.empty_line.is_match(&self.input[pos..end])
    }

    /// Starting from `first_line`, the start of the line right after an
    /// element's last non-blank line, consumes any following blank lines
    /// and reports the new end and how many blank lines were absorbed —
    /// the element's `post_blank`.
    pub fn end_with_post_blank(&self, first_line: usize) -> (usize, usize) {
        let mut pos = first_line;
        let mut count = 0;
        while pos < self.input.len() && self.is_blank_line(pos) {
            count += 1;
            let next = self.next_line_start(pos);
            if next == pos {
                break;
            }
            pos = next;
        }
        (pos, count)
    }

    /// Anchored match of `re` against the remainder of the current line.
    pub fn looking_at(&self, pos: usize, re: &Regex) -> Option<Match<'a>> {
        let end = self.line_end(pos);
        re.find(&self.input[pos..end])
            .filter(|m| m.start() == 0)
    }

    pub fn capturing_at(&self, pos: usize, re: &Regex) -> Option<Captures<'a>> {
        let end = self.line_end(pos);
        re.captures(&self.input[pos..end])
            .filter(|c| c.get(0).unwrap().start() == 0)
    }

    pub(crate) fn on_headline(&self, pos: usize) -> bool {
        self.is_bol(pos) && self.looking_at(pos, &self.environment.headline_short).is_some()
    }

    pub(crate) fn next_headline(&self, from: usize) -> Option<usize> {
        let mut pos = self.next_line_start(self.line_end(from));
        while pos < self.input.len() {
            if self.on_headline(pos) {
                return Some(pos);
            }
            pos = self.next_line_start(self.line_end(pos));
        }
        None
    }

    /// Mirrors `org-element--next-mode`: the mode a greater element's
    /// contents (`is_parent = true`) or its immediate successor
    /// (`is_parent = false`) should be parsed under.
    fn next_mode(kind: Kind, is_parent: bool) -> Option<ParserMode> {
        use Kind::*;
        if is_parent {
            match kind {
                Headline => Some(ParserMode::Section),
                InlineTask => Some(ParserMode::Planning),
                PlainList => Some(ParserMode::Item),
                PropertyDrawer => Some(ParserMode::NodeProperty),
                Section => Some(ParserMode::Planning),
                Table => Some(ParserMode::TableRow),
                _ => None,
            }
        } else {
            match kind {
                Item => Some(ParserMode::Item),
                NodeProperty => Some(ParserMode::NodeProperty),
                Planning => Some(ParserMode::PropertyDrawer),
                TableRow => Some(ParserMode::TableRow),
                _ => None,
            }
        }
    }

    /// Parses the whole buffer and returns the id of the (already-inserted)
    /// document root.
    pub fn parse_buffer(&mut self) -> NodeId {
        let root = self.tree.root();
        let mut pos = 0;
        while pos < self.input.len() && self.input.as_bytes()[pos].is_ascii_whitespace() {
            pos += 1;
        }
        let end = self.input.len();
        let children = self.parse_elements(pos, end, ParserMode::FirstSection, None);
        for child in children {
            crate::tree::adopt(&mut self.tree, root, child).unwrap();
        }
        root
    }

    /// Parses every element between `beg` and `end`, recursing into greater
    /// elements' contents and, at `Object` granularity, into paragraph-like
    /// elements' inline objects.
    pub fn parse_elements(
        &mut self,
        beg: usize,
        end: usize,
        mut mode: ParserMode,
        structure: Option<Rc<ListStruct>>,
    ) -> Vec<NodeId> {
        let mut pos = beg;
        if self.granularity == ParseGranularity::Headline && !self.on_headline(pos) {
            if let Some(next) = self.next_headline(pos) {
                pos = next;
            } else {
                return Vec::new();
            }
        }

        let mut elements = Vec::new();
        while pos < end {
            let structure_arg = structure.clone();
            let id = self.current_element(pos, end, mode, structure_arg);
            let (location, content_location, kind) = {
                let node = self.tree.get(id).unwrap();
                (node.location, node.content_location, node.data.kind())
            };
            trace!(?kind, start = location.start, end = location.end, "parsed element");
            pos = location.end.max(pos + 1);

            if let Some(content) = content_location {
                if kind.is_greater_element() {
                    let recurse = kind == Kind::Headline
                        || self.granularity == ParseGranularity::Element
                        || self.granularity == ParseGranularity::Object
                        || (kind == Kind::Section
                            && self.granularity == ParseGranularity::GreaterElement);
                    if recurse {
                        let child_structure = match &self.tree.get(id).unwrap().data {
                            NodeData::PlainList(d) => Some(Rc::new((**d).structure_handle())),
                            _ => None,
                        };
                        let new_mode = Self::next_mode(kind, true).unwrap_or(mode);
                        let children = self.parse_elements(
                            content.start,
                            content.end,
                            new_mode,
                            child_structure,
                        );
                        for child in children {
                            crate::tree::adopt(&mut self.tree, id, child).unwrap();
                        }
                    }
                } else if self.granularity == ParseGranularity::Object {
                    crate::objects::parse_objects(self, id, content.start, content.end, kind);
                }
            }

            if let Some(m) = Self::next_mode(kind, false) {
                mode = m;
            }
            elements.push(id);
        }
        elements
    }

    /// Parses a single element starting at `pos`, deciding its kind by the
    /// same priority order the upstream grammar uses.
    fn current_element(
        &mut self,
        pos: usize,
        limit: usize,
        mode: ParserMode,
        structure: Option<Rc<ListStruct>>,
    ) -> NodeId {
        use ParserMode::*;

        if mode == Item {
            return crate::list::item_parser(self, pos, limit, structure);
        }
        if mode == TableRow {
            return crate::table::table_row_parser(self, pos, limit);
        }
        if mode == NodeProperty {
            return crate::headline::node_property_parser(self, pos, limit);
        }
        if self.on_headline(pos) {
            return crate::headline::headline_parser(self, pos, limit);
        }
        if mode == Section {
            return crate::paragraph::section_parser(self, pos, limit);
        }
        if mode == FirstSection {
            let lim = self.next_headline(pos).unwrap_or(limit);
            return crate::paragraph::section_parser(self, pos, lim);
        }

        let prev_line = self.line_start(pos).checked_sub(1);
        let prev_is_headline = prev_line.map(|p| self.on_headline(self.line_start(p))).unwrap_or(false);
        if mode == Planning
            && prev_is_headline
            && self.looking_at(pos, &self.environment.planning_line.clone()).is_some()
        {
            return crate::planning::planning_parser(self, pos, limit);
        }

        if (mode == Planning || mode == PropertyDrawer)
            && self.looking_at(pos, &self.environment.property_drawer_begin.clone()).is_some()
        {
            return crate::headline::property_drawer_parser(self, pos, limit);
        }

        if !self.is_bol(pos) {
            return crate::paragraph::paragraph_parser(self, pos, limit);
        }

        if self.looking_at(pos, &self.environment.clock_line.clone()).is_some() {
            return crate::planning::clock_line_parser(self, pos, limit);
        }

        let (aff_start, affiliated) = crate::affiliated::collect_affiliated_keywords(self, pos, limit);

        if self.looking_at(aff_start, &self.environment.latex_begin_environment.clone()).is_some() {
            return crate::latex::latex_environment_parser(self, aff_start, limit, affiliated);
        }

        if self.looking_at(aff_start, &self.environment.drawer_begin.clone()).is_some() {
            return crate::drawer::drawer_parser(self, aff_start, limit, affiliated);
        }

        if self.looking_at(aff_start, &self.environment.fixed_width.clone()).is_some() {
            return crate::fixed_width::fixed_width_parser(self, aff_start, limit, affiliated);
        }

        if self.looking_at(aff_start, &self.environment.comment_line.clone()).is_some() {
            return crate::markup::comment_parser(self, aff_start, limit, affiliated);
        }

        if let Some(cap) = self.capturing_at(aff_start, &self.environment.block_begin.clone()) {
            let name = cap.get(1).unwrap().as_str().to_ascii_uppercase();
            return crate::blocks::block_parser(self, aff_start, limit, affiliated, &name);
        }

        if self.looking_at(aff_start, &self.environment.babel_call.clone()).is_some() {
            return crate::babel::babel_call_parser(self, aff_start, limit, affiliated);
        }

        if self.looking_at(aff_start, &self.environment.dynamic_block_begin.clone()).is_some() {
            return crate::blocks::dynamic_block_parser(self, aff_start, limit, affiliated);
        }

        if self.looking_at(aff_start, &self.environment.keyword.clone()).is_some() {
            return crate::keyword::keyword_parser(self, aff_start, limit, affiliated);
        }

        if self.looking_at(aff_start, &self.environment.footnote_definition.clone()).is_some() {
            return crate::footnote_definition::footnote_definition_parser(
                self, aff_start, limit, affiliated,
            );
        }

        if self.looking_at(aff_start, &self.environment.diary_sexp.clone()).is_some() {
            return crate::planning::diary_sexp_parser(self, aff_start, limit);
        }

        if self.looking_at(aff_start, &self.environment.table_row.clone()).is_some() {
            return crate::table::table_parser(self, aff_start, limit, affiliated);
        }

        if self.looking_at(aff_start, &self.environment.item_bullet.clone()).is_some() {
            let s = structure.unwrap_or_else(|| Rc::new(crate::list::list_struct(self, aff_start, limit)));
            return crate::list::plain_list_parser(self, aff_start, limit, affiliated, s);
        }

        crate::paragraph::paragraph_parser(self, aff_start, limit)
    }
}

pub(crate) fn make_interval(start: usize, end: usize) -> Interval {
    Interval::new(start, end)
}
