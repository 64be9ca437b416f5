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

//! Compiled configuration shared by every recognizer.
//!
//! The recognizers used to reach for file-scoped `lazy_static!` regexes.
//! That works as long as the grammar constants never vary, but a couple of
//! them do (the outline prefix character, the tags column, the set of TODO
//! keywords) and threading them through a global forces every caller onto
//! one fixed choice. `Environment` compiles the same fixtures once, at
//! parser construction, and hands out `&Regex` the same way the globals did.

use regex::Regex;

/// Knobs a caller may want to change; `Environment::new` fills in the same
/// defaults the recognizers used to hardcode.
#[derive(Debug, Clone)]
pub struct Config {
    pub todo_keywords: Vec<String>,
    pub done_keywords: Vec<String>,
    pub tags_column: usize,
    pub archive_tag: String,
    pub use_sub_superscripts: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            todo_keywords: vec!["TODO".to_string()],
            done_keywords: vec!["DONE".to_string()],
            tags_column: 77,
            archive_tag: "ARCHIVE".to_string(),
            use_sub_superscripts: true,
        }
    }
}

/// Precompiled regex fixtures and the [`Config`] they were built from.
///
/// One `Environment` is built per parse (or per synchronizer instance) and
/// borrowed by every recognizer function for the lifetime of that parse.
#[derive(Clone)]
pub struct Environment {
    pub config: Config,

    pub headline_short: Regex,
    pub headline_multiline: Regex,
    pub todo_keyword: Regex,
    pub priority: Regex,
    pub comment_headline: Regex,
    pub tags: Regex,
    pub planning_line: Regex,
    pub property_drawer_begin: Regex,
    pub property_drawer_end: Regex,
    pub node_property: Regex,
    pub clock_line: Regex,
    pub drawer_begin: Regex,
    pub drawer_end: Regex,
    pub block_begin: Regex,
    pub block_end_fmt: String,
    pub dynamic_block_begin: Regex,
    pub dynamic_block_end: Regex,
    pub item_bullet: Regex,
    pub table_row: Regex,
    pub table_hline: Regex,
    pub fixed_width: Regex,
    pub footnote_definition: Regex,
    pub babel_call: Regex,
    pub diary_sexp: Regex,
    pub affiliated_keyword: Regex,
    pub keyword: Regex,
    pub latex_begin_environment: Regex,
    pub comment_line: Regex,
    pub empty_line: Regex,
}

impl Environment {
    pub fn new(config: Config) -> Environment {
        let todo_alt = config.todo_keywords.join("|");
        let done_alt = config.done_keywords.join("|");
        let todo_keyword = Regex::new(&format!(r"^({}|{})(?:\s|$)", todo_alt, done_alt)).unwrap();

        Environment {
            headline_short: Regex::new(r"^(\*+)(?:\s|$)").unwrap(),
            headline_multiline: Regex::new(r"(?m)^\*+\s").unwrap(),
            priority: Regex::new(r"^\[#([A-Z0-9])\]\s*").unwrap(),
            comment_headline: Regex::new(r"^COMMENT(?:\s|$)").unwrap(),
            tags: Regex::new(r"\s+(:[[:alnum:]_@#%:]+:)\s*$").unwrap(),
            planning_line: Regex::new(
                r"^\s*(?:(?:DEADLINE|SCHEDULED|CLOSED):\s*[<\[][^>\]]+[>\]]\s*)+$",
            )
            .unwrap(),
            property_drawer_begin: Regex::new(r"^[ \t]*:PROPERTIES:[ \t]*$").unwrap(),
            property_drawer_end: Regex::new(r"^[ \t]*:END:[ \t]*$").unwrap(),
            node_property: Regex::new(r"^[ \t]*:([[:alnum:]_+-]+):[ \t]*(.*?)[ \t]*$").unwrap(),
            clock_line: Regex::new(r"^[ \t]*CLOCK:").unwrap(),
            drawer_begin: Regex::new(r"^[ \t]*:([[:word:]-]+):[ \t]*$").unwrap(),
            drawer_end: Regex::new(r"^[ \t]*:END:[ \t]*$").unwrap(),
            block_begin: Regex::new(r"(?i)^[ \t]*#\+BEGIN_(\S+)(?:\s+(.*))?$").unwrap(),
            block_end_fmt: r"(?i)^[ \t]*#\+END_{}[ \t]*$".to_string(),
            dynamic_block_begin: Regex::new(r"(?i)^[ \t]*#\+BEGIN:\s+(\S+)(?:\s+(.*))?$").unwrap(),
            dynamic_block_end: Regex::new(r"(?i)^[ \t]*#\+END:[ \t]*$").unwrap(),
            item_bullet: Regex::new(
                r"^[ \t]*(([-+*])|(\d+)([.)]))(?:[ \t]+(\[[ X-]\]))?(?:[ \t]+|$)",
            )
            .unwrap(),
            table_row: Regex::new(r"^[ \t]*\|").unwrap(),
            table_hline: Regex::new(r"^[ \t]*\|[-+]+\|?[ \t]*$").unwrap(),
            fixed_width: Regex::new(r"^[ \t]*:(?:\s(.*)|$)").unwrap(),
            footnote_definition: Regex::new(r"^\[fn:([-_[:word:]]+)\]").unwrap(),
            babel_call: Regex::new(r"(?i)^[ \t]*#\+CALL:\s*(.*)$").unwrap(),
            diary_sexp: Regex::new(r"^%%\(").unwrap(),
            affiliated_keyword: Regex::new(
                r"(?i)^[ \t]*#\+(?:(CAPTION|HEADER|NAME|PLOT|RESULTS?)(\[.*\])?|([[:word:]-]+)):[ \t]*",
            )
            .unwrap(),
            keyword: Regex::new(r"(?i)^[ \t]*#\+([[:word:]-]+):[ \t]*(.*)$").unwrap(),
            latex_begin_environment: Regex::new(r"^[ \t]*\\begin\{([[:word:]*]+)\}").unwrap(),
            comment_line: Regex::new(r"^[ \t]*#(?:\s(.*)|$)").unwrap(),
            empty_line: Regex::new(r"^[ \t]*$").unwrap(),
            config,
            todo_keyword,
        }
    }

    pub fn block_end_for(&self, name: &str) -> Regex {
        Regex::new(&format!(
            r"(?i)^[ \t]*#\+END_{}[ \t]*$",
            regex::escape(name)
        ))
        .unwrap()
    }
}

impl Default for Environment {
    fn default() -> Self {
        Environment::new(Config::default())
    }
}
