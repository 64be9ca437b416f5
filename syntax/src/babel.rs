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

//! `#+CALL: name(args)` babel calls — the element-level counterpart of
//! `call_name(args)` inline babel calls parsed in `objects.rs`.

use crate::affiliated::Affiliated;
use crate::node::{Interval, NodeData, NodeId};
use crate::parser::Parser;

#[derive(Debug)]
pub struct BabelCallData<'a> {
    pub value: &'a str,
}

/// Parses a babel call at `at`. `at` must already satisfy
/// `environment.babel_call`.
pub fn babel_call_parser<'a>(
    parser: &mut Parser<'a>,
    at: usize,
    limit: usize,
    affiliated: Vec<Affiliated>,
) -> NodeId {
    let line_end = parser.line_end(at).min(limit);
    let value = parser
        .capturing_at(at, &parser.environment.babel_call.clone())
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .unwrap_or("");

    let (end, post_blank) = parser.end_with_post_blank(parser.next_line_start(line_end));
    parser.tree.insert(
        NodeData::BabelCall(Box::new(BabelCallData { value })),
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
    fn call_value_is_captured() {
        let input = "#+CALL: my-block(x=1)\n";
        let mut parser = Parser::new(input, ParseGranularity::Element, Environment::default());
        let id = babel_call_parser(&mut parser, 0, input.len(), Vec::new());
        match &parser.tree.get(id).unwrap().data {
            NodeData::BabelCall(d) => assert_eq!(d.value, "my-block(x=1)"),
            other => panic!("expected BabelCall, got {:?}", other),
        }
    }
}
