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

//! `#+KEY: VALUE` keyword lines that didn't get claimed as affiliated
//! keywords for the element below them (either because they are orphaned,
//! or because the key isn't one of `org-element-affiliated-keywords`).

use crate::affiliated::Affiliated;
use crate::node::{Interval, NodeData, NodeId};
use crate::parser::Parser;

#[derive(Debug)]
pub struct KeywordData<'a> {
    pub key: &'a str,
    pub value: &'a str,
}

/// Parses a keyword at `at`. `at` must already satisfy
/// `environment.keyword`.
pub fn keyword_parser<'a>(
    parser: &mut Parser<'a>,
    at: usize,
    limit: usize,
    affiliated: Vec<Affiliated>,
) -> NodeId {
    let line_end = parser.line_end(at).min(limit);
    let (key, value) = parser
        .capturing_at(at, &parser.environment.keyword.clone())
        .map(|c| (c.get(1).unwrap().as_str(), c.get(2).map(|m| m.as_str()).unwrap_or("")))
        .unwrap_or(("", ""));

    let (end, post_blank) = parser.end_with_post_blank(parser.next_line_start(line_end));
    parser.tree.insert(
        NodeData::Keyword(Box::new(KeywordData {
            key,
            value,
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
    fn key_and_value_are_split() {
        let input = "#+TITLE: My Document\n";
        let mut parser = Parser::new(input, ParseGranularity::Element, Environment::default());
        let id = keyword_parser(&mut parser, 0, input.len(), Vec::new());
        match &parser.tree.get(id).unwrap().data {
            NodeData::Keyword(d) => {
                assert_eq!(d.key.to_ascii_uppercase(), "TITLE");
                assert_eq!(d.value, "My Document");
            }
            other => panic!("expected Keyword, got {:?}", other),
        }
    }
}
