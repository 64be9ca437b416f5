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

//! Affiliated Keywords
//! https://orgmode.org/worg/dev/org-syntax.html#Affiliated_keywords
//!
//! With the exception of inlinetasks, items, planning, clocks, node
//! properties and table rows, every other element type can carry
//! attributes: one or more keyword lines directly above it, no blank line
//! allowed, of the form
//!
//!   #+KEY: VALUE              - regular
//!   #+KEY[OPTIONAL]: VALUE    - dual
//!   #+ATTR_BACKEND: VALUE     - export attribute
//!
//! `CAPTION` and `RESULTS` are the only keys that take the optional dual
//! value; `CAPTION` and `HEADER` are the only keys allowed more than once.

use crate::kind::Kind;
use crate::parser::Parser;
use regex::Regex;

lazy_static! {
    /// Dual keywords captured in groups 1/2, regular keywords in group 3,
    /// export attributes in group 4.
    ///
    /// elisp: `org-element--affiliated-re`
    pub static ref REGEX_AFFILIATED: Regex = Regex::new(
            &format!(
               r"[ \t]{}|{}|{}[ \t]*",
               r"*#\+(?:((?:CAPTION|RESULTS))(?:\[(.*)\])?",
               r"((?:DATA|HEADERS?|LABEL|NAME|PLOT|RES(?:NAME|ULT)|(?:S(?:OURC|RCNAM)|TBLNAM)E))",
               r"(ATTR_[-_A-Za-z0-9]+)):")
        ).unwrap();
}

#[derive(Debug, Clone)]
pub struct Affiliated {
    /// Canonical key, after translation (e.g. `LABEL` becomes `NAME`).
    pub key: String,
    pub value: String,
    /// The dual/optional value, e.g. the `hash-string` in
    /// `#+RESULTS[hash-string]: some-source`.
    pub dual_value: Option<String>,
}

/// `org-element-affiliated-keywords` plus the translation/multiplicity/
/// dual-ness tables that key each of its members.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Caption,
    Data,
    Header,
    Headers,
    Label,
    Name,
    Plot,
    Resname,
    Result,
    Results,
    Source,
    Srcname,
    Tblname,
    /// `ATTR_<backend>`, the backend name carried separately.
    Attribute,
}

impl Keyword {
    pub fn parse(raw: &str) -> Option<Keyword> {
        use Keyword::*;
        Some(match raw.to_ascii_uppercase().as_str() {
            "CAPTION" => Caption,
            "DATA" => Data,
            "HEADER" => Header,
            "HEADERS" => Headers,
            "LABEL" => Label,
            "NAME" => Name,
            "PLOT" => Plot,
            "RESNAME" => Resname,
            "RESULT" => Result,
            "RESULTS" => Results,
            "SOURCE" => Source,
            "SRCNAME" => Srcname,
            "TBLNAME" => Tblname,
            s if s.starts_with("ATTR_") => Attribute,
            _ => return None,
        })
    }

    /// elisp: `org-element-keyword-translation-alist`
    pub fn translate(self) -> Keyword {
        use Keyword::*;
        match self {
            Data | Label | Resname | Source | Srcname | Tblname => Name,
            Result => Results,
            Headers => Header,
            other => other,
        }
    }

    /// elisp: `org-element-multiple-keywords`
    pub fn is_multiple_allowed(self) -> bool {
        matches!(self, Keyword::Caption | Keyword::Header | Keyword::Attribute)
    }

    /// elisp: `org-element-parsed-keywords`
    pub fn can_contain_objects(self) -> bool {
        matches!(self, Keyword::Caption)
    }

    /// elisp: `org-element-dual-keywords`
    pub fn is_dual(self) -> bool {
        matches!(self, Keyword::Caption | Keyword::Results)
    }
}

/// Collects every affiliated keyword line directly above `pos`, returning
/// the position just past them (where the affiliated element itself
/// starts) and the keywords collected. If the lines turn out to be
/// orphaned (followed only by blank content), `pos` is returned unchanged
/// and the caller falls back to treating them as plain keywords.
///
/// elisp: `org-element--collect-affiliated-keywords`
pub fn collect_affiliated_keywords<'a>(
    parser: &mut Parser<'a>,
    pos: usize,
    limit: usize,
) -> (usize, Vec<Affiliated>) {
    if !parser.is_bol(pos) {
        return (pos, Vec::new());
    }

    let origin = pos;
    let mut cursor = pos;
    let mut output: Vec<Affiliated> = Vec::new();

    while cursor < limit {
        let line_end = parser.line_end(cursor);
        let line = &parser.input[cursor..line_end];
        let m = match REGEX_AFFILIATED.captures(line) {
            Some(c) if c.get(0).unwrap().start() == 0 => c,
            _ => break,
        };

        let raw_key = m
            .get(1)
            .or_else(|| m.get(3))
            .or_else(|| m.get(4))
            .unwrap()
            .as_str();
        let canonical = Keyword::parse(raw_key).map(|k| k.translate());
        let key_name = canonical
            .map(|k| format!("{:?}", k).to_ascii_uppercase())
            .unwrap_or_else(|| raw_key.to_ascii_uppercase());

        let value_start = cursor + m.get(0).unwrap().end();
        let value = line[m.get(0).unwrap().end()..].trim().to_string();
        let dual_value = m.get(2).map(|g| g.as_str().to_string());
        let _ = value_start;

        let multiple = canonical.map(|k| k.is_multiple_allowed()).unwrap_or(raw_key.starts_with("ATTR_"));
        if multiple {
            output.push(Affiliated {
                key: key_name,
                value,
                dual_value,
            });
        } else {
            output.retain(|a| a.key != key_name);
            output.push(Affiliated {
                key: key_name,
                value,
                dual_value,
            });
        }

        cursor = parser.next_line_start(line_end);
    }

    if cursor == origin {
        return (origin, Vec::new());
    }

    // Orphaned affiliated keywords followed by nothing parseable: rewind.
    if cursor < limit && parser.environment.empty_line.is_match(
        &parser.input[cursor..parser.line_end(cursor)],
    ) {
        return (origin, Vec::new());
    }

    (cursor, output)
}

/// Which object kinds a `Keyword` value may contain, i.e.
/// `Kind::Keyword.can_contain(..)`, exposed here since affiliated keywords
/// share the same restriction.
pub fn keyword_object_restriction(candidate: Kind) -> bool {
    Kind::Keyword.can_contain(candidate)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::environment::Environment;

    #[test]
    fn test_re() {
        let expected = r"[ \t]*#\+(?:((?:CAPTION|RESULTS))(?:\[(.*)\])?|((?:DATA|HEADERS?|LABEL|NAME|PLOT|RES(?:NAME|ULT)|(?:S(?:OURC|RCNAM)|TBLNAM)E))|(ATTR_[-_A-Za-z0-9]+)):[ \t]*";
        assert_eq!(expected, REGEX_AFFILIATED.as_str());
    }

    #[test]
    fn affiliated_re() {
        let dual_full = r"#+CAPTION[GIT]: doctree";
        let cap = REGEX_AFFILIATED.captures(dual_full).unwrap();
        assert_eq!("CAPTION", cap.get(1).unwrap().as_str());
        assert_eq!("GIT", cap.get(2).unwrap().as_str());
        assert_eq!(None, cap.get(3));
        assert_eq!(None, cap.get(4));

        let single = r"#+RESNAME: someresult";
        let cap = REGEX_AFFILIATED.captures(single).unwrap();
        assert_eq!("RESNAME", cap.get(3).unwrap().as_str());

        let attr = r"#+ATTR_HTML: :file filename.ext";
        let cap = REGEX_AFFILIATED.captures(attr).unwrap();
        assert_eq!("ATTR_HTML", cap.get(4).unwrap().as_str());
    }

    #[test]
    fn collects_a_single_name_keyword() {
        let input = "#+NAME: my-table\n| a | b |\n";
        let mut parser = Parser::new(
            input,
            crate::parser::ParseGranularity::Element,
            Environment::default(),
        );
        let (pos, kws) = collect_affiliated_keywords(&mut parser, 0, input.len());
        assert_eq!(kws.len(), 1);
        assert_eq!(kws[0].key, "NAME");
        assert_eq!(kws[0].value, "my-table");
        assert_eq!(&input[pos..pos + 1], "|");
    }

    #[test]
    fn translates_label_into_name() {
        assert_eq!(Keyword::Label.translate(), Keyword::Name);
        assert_eq!(Keyword::Result.translate(), Keyword::Results);
    }
}
