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

//! LaTeX Environments
//!
//! Pattern for LaTeX environments is:
//!
//!   \begin{NAME} CONTENTS \end{NAME}
//!
//! NAME is constituted of alpha-numeric or asterisk characters. CONTENTS
//! can contain anything but the "\end{NAME}" string.
//!
//! `LatexFragment` is the inline-object counterpart (`$...$`, `\(...\)`,
//! `\[...\]`); its data struct is defined here too since both share the
//! same `value` shape, but it is produced by the object lexer in
//! `objects.rs`, not by this module's element parser.

use crate::affiliated::Affiliated;
use crate::node::{Interval, NodeData, NodeId};
use crate::parser::Parser;
use regex::Regex;

#[derive(Debug)]
pub struct LatexEnvironmentData<'a> {
    pub value: &'a str,
}

#[derive(Debug)]
pub struct LatexFragmentData<'a> {
    pub value: &'a str,
}

/// Parses a LaTeX environment starting at `at`. `at` must already satisfy
/// `environment.latex_begin_environment`.
pub fn latex_environment_parser<'a>(
    parser: &mut Parser<'a>,
    at: usize,
    limit: usize,
    affiliated: Vec<Affiliated>,
) -> NodeId {
    let name = parser
        .capturing_at(at, &parser.environment.latex_begin_environment.clone())
        .map(|c| c.get(1).unwrap().as_str().to_string())
        .unwrap_or_default();
    let end_re = Regex::new(&format!(r"^[ \t]*\\end\{{{}\}}[ \t]*$", regex::escape(&name))).unwrap();

    let mut cursor = parser.next_line_start(parser.line_end(at));
    while cursor < limit {
        let line_end = parser.line_end(cursor);
        if end_re.is_match(&parser.input[cursor..line_end]) {
            cursor = parser.next_line_start(line_end);
            break;
        }
        cursor = parser.next_line_start(line_end);
    }
    let content_end = cursor.min(limit);

    let (end, post_blank) = parser.end_with_post_blank(content_end);
    parser.tree.insert(
        NodeData::LatexEnvironment(Box::new(LatexEnvironmentData {
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
    fn environment_value_spans_begin_to_end() {
        let input = "\\begin{equation}\nx = y\n\\end{equation}\n";
        let mut parser = Parser::new(input, ParseGranularity::Element, Environment::default());
        let id = latex_environment_parser(&mut parser, 0, input.len(), Vec::new());
        match &parser.tree.get(id).unwrap().data {
            NodeData::LatexEnvironment(d) => {
                assert!(d.value.starts_with("\\begin{equation}"));
                assert!(d.value.ends_with("\\end{equation}"));
            }
            other => panic!("expected LatexEnvironment, got {:?}", other),
        }
    }
}
