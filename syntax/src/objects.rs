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

//! Object-level (inline) lexer and the data payloads it produces.
//!
//! Unlike element parsing, which works line by line, objects are found by
//! scanning for the next character that could possibly start one (`next
//! candidate`) and then trying each object recognizer anchored at that
//! position, in priority order, keeping the first match. Anything between
//! two recognized objects (or before the first / after the last) becomes a
//! `PlainText` run.

use crate::kind::Kind;
use crate::node::{Interval, NodeData, NodeId};
use crate::parser::Parser;
use regex::Regex;
use std::borrow::Cow;

#[derive(Debug)]
pub struct CodeData<'a> {
    pub value: &'a str,
}

#[derive(Debug)]
pub struct EntityData<'a> {
    pub name: &'a str,
    pub use_brackets_p: bool,
}

#[derive(Debug)]
pub struct ExportSnippetData<'a> {
    pub back_end: &'a str,
    pub value: &'a str,
}

#[derive(Debug)]
pub struct FootnoteReferenceData<'a> {
    pub label: Option<&'a str>,
    pub definition_inline: bool,
}

#[derive(Debug)]
pub struct InlineBabelCallData<'a> {
    pub call: &'a str,
    pub inside_header: Option<&'a str>,
    pub arguments: Option<&'a str>,
    pub end_header: Option<&'a str>,
    pub value: &'a str,
}

#[derive(Debug)]
pub struct InlineSrcBlockData<'a> {
    pub language: &'a str,
    pub parameters: Option<&'a str>,
    pub value: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkFormat {
    Plain,
    Angle,
    Bracket,
}

#[derive(Debug)]
pub struct LinkData<'a> {
    pub format: LinkFormat,
    pub path: &'a str,
    pub raw_link: &'a str,
    pub description: Option<Cow<'a, str>>,
}

#[derive(Debug)]
pub struct MacroData<'a> {
    pub args: Vec<&'a str>,
    pub key: &'a str,
    pub value: &'a str,
}

#[derive(Debug)]
pub struct RadioTargetData<'a> {
    pub raw_value: &'a str,
}

#[derive(Debug)]
pub struct StatisticsCookieData<'a> {
    pub value: &'a str,
}

#[derive(Debug)]
pub struct SubscriptData {
    pub use_brackets_p: bool,
}

#[derive(Debug)]
pub struct SuperscriptData {
    pub use_brackets_p: bool,
}

#[derive(Debug)]
pub struct TargetData<'a> {
    pub value: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampKind {
    Active,
    ActiveRange,
    Diary,
    Inactive,
    InactiveRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimestampData<'a> {
    pub raw_value: &'a str,
    pub kind: TimestampKind,
    pub year_start: u32,
    pub month_start: u32,
    pub day_start: u32,
    pub hour_start: Option<u32>,
    pub minute_start: Option<u32>,
    pub year_end: u32,
    pub month_end: u32,
    pub day_end: u32,
    pub hour_end: Option<u32>,
    pub minute_end: Option<u32>,
}

#[derive(Debug)]
pub struct VerbatimData<'a> {
    pub value: &'a str,
}

lazy_static! {
    static ref RE_ENTITY: Regex =
        Regex::new(r"^\\([[:alpha:]]+)(\{\}|(?:[^[:alpha:]]|$))").unwrap();
    static ref RE_EXPORT_SNIPPET: Regex = Regex::new(r"^@@([-[:word:]]+):(.*?)@@").unwrap();
    static ref RE_FOOTNOTE_REF: Regex = Regex::new(r"^\[fn:([-_[:word:]]*)(:(.*?))?\]").unwrap();
    static ref RE_INLINE_BABEL: Regex =
        Regex::new(r"^call_([^()\[\]{}\s]+)(\[(.*?)\])?\((.*?)\)(\[(.*?)\])?").unwrap();
    static ref RE_INLINE_SRC: Regex =
        Regex::new(r"^src_([^\[{\s]+)(\[(.*?)\])?\{(.*?)\}").unwrap();
    static ref RE_LINK_BRACKET: Regex = Regex::new(r"^\[\[([^]\[]+)\](?:\[([^]]*)\])?\]").unwrap();
    static ref RE_LINK_ANGLE: Regex = Regex::new(r"^<([a-zA-Z][a-zA-Z0-9+.-]*:[^>\n]*)>").unwrap();
    static ref RE_LINK_PLAIN: Regex =
        Regex::new(r"^([a-zA-Z][a-zA-Z0-9+.-]*):(?://)?[^\s()\[\]<>]+[^\s()\[\]<>.,;:!?'\x22]")
            .unwrap();
    static ref RE_MACRO: Regex =
        Regex::new(r"^\{\{\{([[:alpha:]][-[:word:]]*)\(([^}]*)\)?\}\}\}").unwrap();
    static ref RE_RADIO_TARGET: Regex = Regex::new(r"^<<<([^<>\n]+)>>>").unwrap();
    static ref RE_TARGET: Regex = Regex::new(r"^<<([^<>\n]+)>>").unwrap();
    static ref RE_STATISTICS_COOKIE: Regex =
        Regex::new(r"^\[(\d*%|\d*/\d*)\]").unwrap();
    static ref RE_TIMESTAMP: Regex = Regex::new(
        r"^[<\[](\d{4})-(\d{2})-(\d{2})[^>\]\n]*?(?:(\d{1,2}):(\d{2}))?\][>\]]?|^[<\[](\d{4})-(\d{2})-(\d{2})[^>\]\n]*?(?:(\d{1,2}):(\d{2}))?[>\]](?:--[<\[](\d{4})-(\d{2})-(\d{2})[^>\]\n]*?(?:(\d{1,2}):(\d{2}))?[>\]])?"
    ).unwrap();
    static ref RE_VERBATIM: Regex = Regex::new(r"^=([^\s=].*?[^\s=]|[^\s=])=").unwrap();
    static ref RE_CODE: Regex = Regex::new(r"^~([^\s~].*?[^\s~]|[^\s~])~").unwrap();
    static ref RE_BOLD: Regex = Regex::new(r"^\*([^\s*].*?[^\s*]|[^\s*])\*").unwrap();
    static ref RE_ITALIC: Regex = Regex::new(r"^/([^\s/].*?[^\s/]|[^\s/])/").unwrap();
    static ref RE_UNDERLINE: Regex = Regex::new(r"^_([^\s_].*?[^\s_]|[^\s_])_").unwrap();
    static ref RE_STRIKE_THROUGH: Regex = Regex::new(r"^\+([^\s+].*?[^\s+]|[^\s+])\+").unwrap();
    static ref RE_LINE_BREAK: Regex = Regex::new(r"^\\\\[ \t]*$").unwrap();
    static ref RE_LATEX_FRAGMENT: Regex =
        Regex::new(r"^\$\$.+?\$\$|^\$[^\s$].*?[^\s$]\$|^\\\[.+?\\\]|^\\\(.+?\\\)").unwrap();
    static ref RE_SUB_SUPER: Regex =
        Regex::new(r"^([_^])(\{[^{}]*\}|\([^()]*\)|[+-]?[[:word:]]*[[:alnum:]])").unwrap();
    static ref RE_CANDIDATE: Regex =
        Regex::new(r"[\\\[<*/_+~=$@{^]").unwrap();
}

/// Which object kinds `restriction` allows, consulted before a recognizer is
/// even attempted so `can_contain` stays the single source of truth.
fn allowed(restriction: Kind, candidate: Kind) -> bool {
    restriction.can_contain(candidate)
}

/// Parses every object between `beg` and `end`, constrained by what
/// `restriction` (the enclosing element or object kind) can contain, and
/// appends them as children of `parent`.
pub fn parse_objects<'a>(
    parser: &mut Parser<'a>,
    parent: NodeId,
    beg: usize,
    end: usize,
    restriction: Kind,
) {
    let mut pos = beg;
    let mut text_start = beg;

    while pos < end {
        let text = &parser.input[pos..end];
        let candidate_offset = RE_CANDIDATE.find(text).map(|m| m.start());
        let candidate_offset = match candidate_offset {
            Some(o) => o,
            None => break,
        };
        let try_at = pos + candidate_offset;

        if let Some((node_id, consumed)) = try_recognizers(parser, try_at, end, restriction) {
            if try_at > text_start {
                emit_plain_text(parser, parent, text_start, try_at);
            }
            crate::tree::adopt(&mut parser.tree, parent, node_id).unwrap();
            pos = try_at + consumed;
            text_start = pos;
        } else {
            pos = try_at + 1;
        }
    }

    if text_start < end {
        emit_plain_text(parser, parent, text_start, end);
    }
}

fn emit_plain_text<'a>(parser: &mut Parser<'a>, parent: NodeId, beg: usize, end: usize) {
    let text = &parser.input[beg..end];
    let id = parser.tree.insert(
        NodeData::PlainText(text),
        Interval::new(beg, end),
        None,
        0,
        Vec::new(),
    );
    crate::tree::adopt(&mut parser.tree, parent, id).unwrap();
}

/// Tries every object recognizer, in the priority order `org-element`
/// itself uses, returning the first match's node and how many bytes (from
/// `at`) it consumed, post-blank included.
fn try_recognizers<'a>(
    parser: &mut Parser<'a>,
    at: usize,
    end: usize,
    restriction: Kind,
) -> Option<(NodeId, usize)> {
    let text = &parser.input[at..end];

    if allowed(restriction, Kind::FootnoteReference) {
        if let Some(c) = RE_FOOTNOTE_REF.captures(text) {
            let whole = c.get(0).unwrap();
            let label = c.get(1).filter(|m| !m.as_str().is_empty()).map(|m| m.as_str());
            let data = FootnoteReferenceData {
                label,
                definition_inline: c.get(2).is_some(),
            };
            return Some(insert(
                parser,
                NodeData::FootnoteReference(Box::new(data)),
                at,
                whole.end(),
            ));
        }
    }

    if allowed(restriction, Kind::LatexFragment) {
        if let Some(m) = RE_LATEX_FRAGMENT.find(text) {
            let data = crate::latex::LatexFragmentData { value: m.as_str() };
            return Some(insert(
                parser,
                NodeData::LatexFragment(Box::new(data)),
                at,
                m.end(),
            ));
        }
    }

    if allowed(restriction, Kind::InlineSrcBlock) {
        if let Some(c) = RE_INLINE_SRC.captures(text) {
            let whole = c.get(0).unwrap();
            let data = InlineSrcBlockData {
                language: c.get(1).unwrap().as_str(),
                parameters: c.get(3).map(|m| m.as_str()),
                value: c.get(4).unwrap().as_str(),
            };
            return Some(insert(
                parser,
                NodeData::InlineSrcBlock(Box::new(data)),
                at,
                whole.end(),
            ));
        }
    }

    if allowed(restriction, Kind::InlineBabelCall) {
        if let Some(c) = RE_INLINE_BABEL.captures(text) {
            let whole = c.get(0).unwrap();
            let data = InlineBabelCallData {
                call: c.get(1).unwrap().as_str(),
                inside_header: c.get(3).map(|m| m.as_str()),
                arguments: c.get(4).map(|m| m.as_str()),
                end_header: c.get(6).map(|m| m.as_str()),
                value: whole.as_str(),
            };
            return Some(insert(
                parser,
                NodeData::InlineBabelCall(Box::new(data)),
                at,
                whole.end(),
            ));
        }
    }

    if allowed(restriction, Kind::RadioTarget) {
        if let Some(c) = RE_RADIO_TARGET.captures(text) {
            let whole = c.get(0).unwrap();
            let data = RadioTargetData {
                raw_value: c.get(1).unwrap().as_str(),
            };
            return Some(insert(
                parser,
                NodeData::RadioTarget(Box::new(data)),
                at,
                whole.end(),
            ));
        }
    }

    if allowed(restriction, Kind::Target) {
        if let Some(c) = RE_TARGET.captures(text) {
            let whole = c.get(0).unwrap();
            let data = TargetData {
                value: c.get(1).unwrap().as_str(),
            };
            return Some(insert(parser, NodeData::Target(Box::new(data)), at, whole.end()));
        }
    }

    if allowed(restriction, Kind::Link) {
        if let Some(c) = RE_LINK_BRACKET.captures(text) {
            let whole = c.get(0).unwrap();
            let data = LinkData {
                format: LinkFormat::Bracket,
                path: c.get(1).unwrap().as_str(),
                raw_link: c.get(1).unwrap().as_str(),
                description: c.get(2).map(|m| Cow::Borrowed(m.as_str())),
            };
            return Some(insert(parser, NodeData::Link(Box::new(data)), at, whole.end()));
        }
        if let Some(c) = RE_LINK_ANGLE.captures(text) {
            let whole = c.get(0).unwrap();
            let data = LinkData {
                format: LinkFormat::Angle,
                path: c.get(1).unwrap().as_str(),
                raw_link: c.get(1).unwrap().as_str(),
                description: None,
            };
            return Some(insert(parser, NodeData::Link(Box::new(data)), at, whole.end()));
        }
        if let Some(m) = RE_LINK_PLAIN.find(text) {
            let data = LinkData {
                format: LinkFormat::Plain,
                path: m.as_str(),
                raw_link: m.as_str(),
                description: None,
            };
            return Some(insert(parser, NodeData::Link(Box::new(data)), at, m.end()));
        }
    }

    if allowed(restriction, Kind::Macro) {
        if let Some(c) = RE_MACRO.captures(text) {
            let whole = c.get(0).unwrap();
            let key = c.get(1).unwrap().as_str();
            let args: Vec<&str> = c
                .get(2)
                .map(|m| m.as_str().split(',').map(|s| s.trim()).collect())
                .unwrap_or_default();
            let data = MacroData {
                args,
                key,
                value: whole.as_str(),
            };
            return Some(insert(parser, NodeData::Macro(Box::new(data)), at, whole.end()));
        }
    }

    if allowed(restriction, Kind::StatisticsCookie) {
        if let Some(m) = RE_STATISTICS_COOKIE.find(text) {
            let data = StatisticsCookieData { value: m.as_str() };
            return Some(insert(
                parser,
                NodeData::StatisticsCookie(Box::new(data)),
                at,
                m.end(),
            ));
        }
    }

    if allowed(restriction, Kind::Timestamp) {
        if let Some(m) = RE_TIMESTAMP.find(text) {
            if let Some(data) = parse_timestamp_str(m.as_str()) {
                return Some(insert(parser, NodeData::Timestamp(Box::new(data)), at, m.end()));
            }
        }
    }

    if allowed(restriction, Kind::ExportSnippet) {
        if let Some(c) = RE_EXPORT_SNIPPET.captures(text) {
            let whole = c.get(0).unwrap();
            let data = ExportSnippetData {
                back_end: c.get(1).unwrap().as_str(),
                value: c.get(2).unwrap().as_str(),
            };
            return Some(insert(
                parser,
                NodeData::ExportSnippet(Box::new(data)),
                at,
                whole.end(),
            ));
        }
    }

    if allowed(restriction, Kind::Entity) {
        if let Some(c) = RE_ENTITY.captures(text) {
            let whole = c.get(0).unwrap();
            let brackets = c.get(2).map(|m| m.as_str() == "{}").unwrap_or(false);
            let consumed = c.get(1).unwrap().end() + if brackets { 2 } else { 0 };
            let data = EntityData {
                name: c.get(1).unwrap().as_str(),
                use_brackets_p: brackets,
            };
            let _ = whole;
            return Some(insert(parser, NodeData::Entity(Box::new(data)), at, consumed));
        }
    }

    if allowed(restriction, Kind::Verbatim) {
        if let Some(c) = RE_VERBATIM.captures(text) {
            let whole = c.get(0).unwrap();
            let data = VerbatimData {
                value: c.get(1).unwrap().as_str(),
            };
            return Some(insert(parser, NodeData::Verbatim(Box::new(data)), at, whole.end()));
        }
    }

    if allowed(restriction, Kind::Code) {
        if let Some(c) = RE_CODE.captures(text) {
            let whole = c.get(0).unwrap();
            let data = CodeData {
                value: c.get(1).unwrap().as_str(),
            };
            return Some(insert(parser, NodeData::Code(Box::new(data)), at, whole.end()));
        }
    }

    if allowed(restriction, Kind::LineBreak) {
        if RE_LINE_BREAK.is_match(text) {
            let m = RE_LINE_BREAK.find(text).unwrap();
            return Some(insert(parser, NodeData::LineBreak, at, m.end()));
        }
    }

    if allowed(restriction, Kind::Subscript) || allowed(restriction, Kind::Superscript) {
        if let Some(c) = RE_SUB_SUPER.captures(text) {
            let marker = c.get(1).unwrap().as_str();
            let whole = c.get(0).unwrap();
            let brackets = c.get(2).unwrap().as_str().starts_with('{');
            if marker == "_" && allowed(restriction, Kind::Subscript) {
                let data = SubscriptData {
                    use_brackets_p: brackets,
                };
                return Some(insert(
                    parser,
                    NodeData::Subscript(Box::new(data)),
                    at,
                    whole.end(),
                ));
            } else if marker == "^" && allowed(restriction, Kind::Superscript) {
                let data = SuperscriptData {
                    use_brackets_p: brackets,
                };
                return Some(insert(
                    parser,
                    NodeData::Superscript(Box::new(data)),
                    at,
                    whole.end(),
                ));
            }
        }
    }

    // Recursive markup: recognize the delimiters here, then re-enter
    // `parse_objects` over the captured span so nested markup is found.
    for (re, kind) in [
        (&*RE_BOLD, Kind::Bold),
        (&*RE_ITALIC, Kind::Italic),
        (&*RE_UNDERLINE, Kind::Underline),
        (&*RE_STRIKE_THROUGH, Kind::StrikeThrough),
    ] {
        if allowed(restriction, kind) {
            if let Some(c) = re.captures(text) {
                let whole = c.get(0).unwrap();
                let inner = c.get(1).unwrap();
                let inner_beg = at + inner.start();
                let inner_end = at + inner.end();
                let data = match kind {
                    Kind::Bold => NodeData::Bold,
                    Kind::Italic => NodeData::Italic,
                    Kind::Underline => NodeData::Underline,
                    Kind::StrikeThrough => NodeData::StrikeThrough,
                    _ => unreachable!(),
                };
                let (id, _) = insert(parser, data, at, whole.end());
                parse_objects(parser, id, inner_beg, inner_end, kind);
                return Some((id, whole.end()));
            }
        }
    }

    None
}

fn insert<'a>(parser: &mut Parser<'a>, data: NodeData<'a>, at: usize, consumed: usize) -> (NodeId, usize) {
    let id = parser.tree.insert(
        data,
        Interval::new(at, at + consumed),
        None,
        0,
        Vec::new(),
    );
    (id, consumed)
}

pub fn parse_timestamp_str(raw: &str) -> Option<TimestampData> {
    let c = RE_TIMESTAMP.captures(raw)?;
    let active = raw.starts_with('<');
    if let (Some(y), Some(mo), Some(d)) = (c.get(1), c.get(2), c.get(3)) {
        let year = y.as_str().parse().ok()?;
        let month = mo.as_str().parse().ok()?;
        let day = d.as_str().parse().ok()?;
        let hour = c.get(4).and_then(|m| m.as_str().parse().ok());
        let minute = c.get(5).and_then(|m| m.as_str().parse().ok());
        return Some(TimestampData {
            raw_value: raw,
            kind: if active {
                TimestampKind::Active
            } else {
                TimestampKind::Inactive
            },
            year_start: year,
            month_start: month,
            day_start: day,
            hour_start: hour,
            minute_start: minute,
            year_end: year,
            month_end: month,
            day_end: day,
            hour_end: hour,
            minute_end: minute,
        });
    }

    let year = c.get(6)?.as_str().parse().ok()?;
    let month = c.get(7)?.as_str().parse().ok()?;
    let day = c.get(8)?.as_str().parse().ok()?;
    let hour = c.get(9).and_then(|m| m.as_str().parse().ok());
    let minute = c.get(10).and_then(|m| m.as_str().parse().ok());
    let (year_end, month_end, day_end, hour_end, minute_end, kind) =
        if let (Some(ye), Some(me), Some(de)) = (c.get(11), c.get(12), c.get(13)) {
            (
                ye.as_str().parse().ok()?,
                me.as_str().parse().ok()?,
                de.as_str().parse().ok()?,
                c.get(14).and_then(|m| m.as_str().parse().ok()),
                c.get(15).and_then(|m| m.as_str().parse().ok()),
                if active {
                    TimestampKind::ActiveRange
                } else {
                    TimestampKind::InactiveRange
                },
            )
        } else {
            (
                year,
                month,
                day,
                hour,
                minute,
                if active {
                    TimestampKind::Active
                } else {
                    TimestampKind::Inactive
                },
            )
        };

    Some(TimestampData {
        raw_value: raw,
        kind,
        year_start: year,
        month_start: month,
        day_start: day,
        hour_start: hour,
        minute_start: minute,
        year_end,
        month_end,
        day_end,
        hour_end,
        minute_end,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::environment::Environment;
    use crate::parser::{ParseGranularity, Parser};

    fn parser_for(input: &str) -> Parser {
        Parser::new(input, ParseGranularity::Object, Environment::default())
    }

    #[test]
    fn plain_text_with_no_markup_is_one_run() {
        let mut parser = parser_for("just words");
        let root = parser.tree.root();
        parse_objects(&mut parser, root, 0, 10, Kind::Paragraph);
        let children = parser.tree.children_of(root).to_vec();
        assert_eq!(children.len(), 1);
        assert!(matches!(
            parser.tree.get(children[0]).unwrap().data,
            NodeData::PlainText("just words")
        ));
    }

    #[test]
    fn bold_is_recognized_and_recurses() {
        let mut parser = parser_for("a *bold* b");
        let root = parser.tree.root();
        parse_objects(&mut parser, root, 0, 10, Kind::Paragraph);
        let children = parser.tree.children_of(root).to_vec();
        assert_eq!(children.len(), 3);
        assert!(matches!(parser.tree.get(children[1]).unwrap().data, NodeData::Bold));
    }

    #[test]
    fn entity_without_brackets() {
        let mut parser = parser_for(r"\alpha is a letter");
        let root = parser.tree.root();
        parse_objects(&mut parser, root, 0, parser.input.len(), Kind::Paragraph);
        let children = parser.tree.children_of(root).to_vec();
        match &parser.tree.get(children[0]).unwrap().data {
            NodeData::Entity(e) => assert_eq!(e.name, "alpha"),
            other => panic!("expected Entity, got {:?}", other),
        }
    }

    #[test]
    fn link_plain_is_recognized() {
        let mut parser = parser_for("see https://example.com/x today");
        let root = parser.tree.root();
        parse_objects(&mut parser, root, 0, parser.input.len(), Kind::Paragraph);
        let children = parser.tree.children_of(root).to_vec();
        assert!(children.iter().any(|&id| matches!(
            parser.tree.get(id).unwrap().data,
            NodeData::Link(_)
        )));
    }
}
