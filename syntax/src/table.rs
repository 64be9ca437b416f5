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

//! Org-syntax tables: consecutive lines starting with `|`. A rule row
//! (`|---+---|`) separates header from body but is otherwise just another
//! row. `TableRowData::value` keeps the row's raw text so interpretation
//! stays a verbatim round-trip; a standard row's cells are additionally
//! split out as `TableCell` children (object-lexed per `Kind::TableCell`'s
//! restrictions) so position queries can descend into one.

use crate::affiliated::Affiliated;
use crate::kind::Kind;
use crate::node::{Interval, NodeData, NodeId};
use crate::parser::Parser;

#[derive(Debug)]
pub struct TableData<'a> {
    /// `#+TBLFM:` formula line trailing the table, if any.
    pub tblfm: Option<&'a str>,
}

#[derive(Debug)]
pub struct TableRowData<'a> {
    pub kind: TableRowType,
    pub value: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableRowType {
    Standard,
    Rule,
}

/// Parses one row. `at` must already satisfy `environment.table_row`.
pub fn table_row_parser<'a>(parser: &mut Parser<'a>, at: usize, limit: usize) -> NodeId {
    let line_end = parser.line_end(at).min(limit);
    let kind = if parser.environment.table_hline.is_match(&parser.input[at..line_end]) {
        TableRowType::Rule
    } else {
        TableRowType::Standard
    };

    let value = &parser.input[at..line_end];
    let (end, post_blank) = parser.end_with_post_blank(parser.next_line_start(line_end));
    let row = parser.tree.insert(
        NodeData::TableRow(Box::new(TableRowData { kind, value })),
        Interval::new(at, end),
        None,
        post_blank,
        Vec::new(),
    );
    if kind == TableRowType::Standard && parser.granularity == crate::parser::ParseGranularity::Object {
        split_cells(parser, row, at, line_end);
    }
    row
}

/// Splits a standard row's text at its `|` delimiters into `TableCell`
/// children, each object-lexed over its trimmed interior. A row missing its
/// closing `|` simply drops whatever trails the last delimiter, same as a
/// cell with no closing bound.
fn split_cells<'a>(parser: &mut Parser<'a>, row: NodeId, line_start: usize, line_end: usize) {
    let bars: Vec<usize> = parser.input[line_start..line_end]
        .match_indices('|')
        .map(|(i, _)| line_start + i)
        .collect();
    for pair in bars.windows(2) {
        let (cell_start, cell_end) = (pair[0] + 1, pair[1]);
        let interior = &parser.input[cell_start..cell_end];
        let trimmed_start = interior
            .find(|c: char| !c.is_whitespace())
            .map(|i| cell_start + i)
            .unwrap_or(cell_end);
        let trimmed_end = interior
            .rfind(|c: char| !c.is_whitespace())
            .map(|i| cell_start + i + 1)
            .unwrap_or(trimmed_start);
        let cell = parser.tree.insert(
            NodeData::TableCell,
            Interval::new(cell_start, cell_end),
            Some(Interval::new(trimmed_start, trimmed_end)),
            0,
            Vec::new(),
        );
        crate::objects::parse_objects(parser, cell, trimmed_start, trimmed_end, Kind::TableCell);
        crate::tree::adopt(&mut parser.tree, row, cell).unwrap();
    }
}

/// Parses the whole table starting at `at`: every consecutive line matching
/// `environment.table_row`, plus a trailing `#+TBLFM:` line if present.
pub fn table_parser<'a>(
    parser: &mut Parser<'a>,
    at: usize,
    limit: usize,
    affiliated: Vec<Affiliated>,
) -> NodeId {
    let mut pos = at;
    while pos < limit {
        let line_end = parser.line_end(pos);
        if !parser.environment.table_row.is_match(&parser.input[pos..line_end]) {
            break;
        }
        pos = parser.next_line_start(line_end);
    }
    let content_end = pos;

    let tblfm_re = regex::Regex::new(r"(?i)^[ \t]*#\+TBLFM:[ \t]*(.*)$").unwrap();
    let mut tblfm = None;
    if pos < limit {
        let line_end = parser.line_end(pos);
        if let Some(c) = tblfm_re.captures(&parser.input[pos..line_end]) {
            tblfm = Some(c.get(1).unwrap().as_str());
            pos = parser.next_line_start(line_end);
        }
    }

    let (end, post_blank) = parser.end_with_post_blank(pos);
    parser.tree.insert(
        NodeData::Table(Box::new(TableData { tblfm })),
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
    fn table_spans_every_row() {
        let input = "| a | b |\n|---+---|\n| c | d |\n";
        let mut parser = Parser::new(input, ParseGranularity::Element, Environment::default());
        let id = table_parser(&mut parser, 0, input.len(), Vec::new());
        let loc = parser.tree.get(id).unwrap().location;
        assert_eq!(&input[loc.start..loc.end], input);
    }

    #[test]
    fn rule_row_is_distinguished_from_standard() {
        let input = "|---+---|\n";
        let mut parser = Parser::new(input, ParseGranularity::Element, Environment::default());
        let id = table_row_parser(&mut parser, 0, input.len());
        match &parser.tree.get(id).unwrap().data {
            NodeData::TableRow(r) => assert_eq!(r.kind, TableRowType::Rule),
            other => panic!("expected TableRow, got {:?}", other),
        }
    }

    #[test]
    fn standard_row_splits_into_table_cells() {
        use crate::kind::Kind;

        let input = "| a | *b* |\n";
        let mut parser = Parser::new(input, ParseGranularity::Object, Environment::default());
        let id = table_row_parser(&mut parser, 0, input.len());
        let cells = parser.tree.children_of(id).to_vec();
        assert_eq!(cells.len(), 2);
        assert_eq!(parser.tree.get(cells[0]).unwrap().data.kind(), Kind::TableCell);
        assert_eq!(&input[parser.tree.get(cells[0]).unwrap().content_location.unwrap().start
            ..parser.tree.get(cells[0]).unwrap().content_location.unwrap().end], "a");

        // The second cell's markup was itself object-lexed.
        let second_children = parser.tree.children_of(cells[1]);
        assert!(second_children
            .iter()
            .any(|&c| parser.tree.get(c).unwrap().data.kind() == Kind::Bold));
    }

    #[test]
    fn rule_row_has_no_cells() {
        let input = "|---+---|\n";
        let mut parser = Parser::new(input, ParseGranularity::Object, Environment::default());
        let id = table_row_parser(&mut parser, 0, input.len());
        assert!(parser.tree.children_of(id).is_empty());
    }
}
