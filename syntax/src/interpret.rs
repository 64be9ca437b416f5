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

//! Converts a parsed tree back to markup text. Every kind gets a small
//! formatter that receives the node and its already-interpreted contents;
//! `interpret(tree, environment, id)` on the document root round-trips the
//! buffer `parse` produced it from, modulo whitespace the parser itself
//! treats as insignificant.

use crate::environment::Environment;
use crate::node::{NodeData, NodeId, Tree};
use crate::objects::{LinkFormat, TimestampKind};
use std::fmt::Write;

/// Interprets `id` and every one of its descendants back into markup text.
pub fn interpret(tree: &Tree, environment: &Environment, id: NodeId) -> String {
    let mut out = String::new();
    write_node(tree, environment, id, &mut out);
    out
}

fn write_affiliated(tree: &Tree, id: NodeId, out: &mut String) {
    let Some(node) = tree.get(id) else { return };
    for kw in &node.affiliated {
        out.push_str("#+");
        out.push_str(&kw.key);
        if let Some(dual) = &kw.dual_value {
            let _ = write!(out, "[{}]", dual);
        }
        out.push_str(": ");
        out.push_str(&kw.value);
        out.push('\n');
    }
}

fn contents(tree: &Tree, environment: &Environment, id: NodeId) -> String {
    let mut out = String::new();
    for &child in tree.children_of(id) {
        write_node(tree, environment, child, &mut out);
    }
    out
}

fn blank_lines(n: usize) -> String {
    "\n".repeat(n)
}

fn blank_spaces(n: usize) -> String {
    " ".repeat(n)
}

fn write_timestamp(ts: &crate::objects::TimestampData, out: &mut String) {
    let (open, close) = match ts.kind {
        TimestampKind::Active | TimestampKind::ActiveRange => ('<', '>'),
        TimestampKind::Diary | TimestampKind::Inactive | TimestampKind::InactiveRange => ('[', ']'),
    };
    let fmt_date = |y: u32, mo: u32, d: u32, h: Option<u32>, mi: Option<u32>, out: &mut String| {
        let _ = write!(out, "{:04}-{:02}-{:02}", y, mo, d);
        if let (Some(h), Some(mi)) = (h, mi) {
            let _ = write!(out, " {:02}:{:02}", h, mi);
        }
    };
    out.push(open);
    fmt_date(ts.year_start, ts.month_start, ts.day_start, ts.hour_start, ts.minute_start, out);
    out.push(close);
    if matches!(ts.kind, TimestampKind::ActiveRange | TimestampKind::InactiveRange) {
        out.push_str("--");
        out.push(open);
        fmt_date(ts.year_end, ts.month_end, ts.day_end, ts.hour_end, ts.minute_end, out);
        out.push(close);
    }
}

/// Aligns a headline's tag string to `environment.config.tags_column`,
/// always leaving at least one separating space.
fn pad_to_tags_column(line_len: usize, column: usize) -> usize {
    column.saturating_sub(line_len).max(1)
}

fn write_node(tree: &Tree, environment: &Environment, id: NodeId, out: &mut String) {
    let Some(node) = tree.get(id) else { return };
    let post_blank = node.post_blank;

    match &node.data {
        NodeData::Document => out.push_str(&contents(tree, environment, id)),

        NodeData::BabelCall(d) => {
            write_affiliated(tree, id, out);
            let _ = write!(out, "#+CALL: {}\n{}", d.value, blank_lines(post_blank));
        }
        NodeData::CenterBlock => {
            write_affiliated(tree, id, out);
            let _ = write!(
                out,
                "#+BEGIN_CENTER\n{}#+END_CENTER\n{}",
                contents(tree, environment, id),
                blank_lines(post_blank)
            );
        }
        NodeData::Clock(d) => {
            out.push_str("CLOCK: ");
            write_timestamp(&d.value, out);
            if let Some(duration) = d.duration {
                let _ = write!(out, " => {}", duration);
            }
            out.push('\n');
            out.push_str(&blank_lines(post_blank));
        }
        NodeData::Comment(d) => {
            write_affiliated(tree, id, out);
            out.push_str(d.value);
            out.push_str(&blank_lines(post_blank));
        }
        NodeData::CommentBlock(d) => {
            write_affiliated(tree, id, out);
            let _ = write!(
                out,
                "#+BEGIN_COMMENT\n{}#+END_COMMENT\n{}",
                d.value,
                blank_lines(post_blank)
            );
        }
        NodeData::DiarySexp(d) => {
            out.push_str(d.value);
            out.push('\n');
            out.push_str(&blank_lines(post_blank));
        }
        NodeData::Drawer(d) => {
            write_affiliated(tree, id, out);
            let _ = write!(
                out,
                ":{}:\n{}:END:\n{}",
                d.drawer_name,
                contents(tree, environment, id),
                blank_lines(post_blank)
            );
        }
        NodeData::DynamicBlock(d) => {
            write_affiliated(tree, id, out);
            out.push_str("#+BEGIN: ");
            out.push_str(d.block_name);
            if let Some(p) = d.parameters {
                out.push(' ');
                out.push_str(p);
            }
            let _ = write!(
                out,
                "\n{}#+END:\n{}",
                contents(tree, environment, id),
                blank_lines(post_blank)
            );
        }
        NodeData::ExampleBlock(d) => {
            write_affiliated(tree, id, out);
            out.push_str("#+BEGIN_EXAMPLE");
            if let Some(s) = d.switches {
                out.push(' ');
                out.push_str(s);
            }
            let _ = write!(out, "\n{}#+END_EXAMPLE\n{}", d.value, blank_lines(post_blank));
        }
        NodeData::ExportBlock(d) => {
            write_affiliated(tree, id, out);
            let _ = write!(
                out,
                "#+BEGIN_EXPORT {}\n{}#+END_EXPORT\n{}",
                d.backend,
                d.value,
                blank_lines(post_blank)
            );
        }
        NodeData::FixedWidth(d) => {
            write_affiliated(tree, id, out);
            out.push_str(d.value);
            out.push_str(&blank_lines(post_blank));
        }
        NodeData::FootnoteDefinition(d) => {
            write_affiliated(tree, id, out);
            let _ = write!(
                out,
                "[fn:{}] {}{}",
                d.label,
                contents(tree, environment, id),
                blank_lines(post_blank)
            );
        }
        NodeData::Headline(d) => {
            let stars = "*".repeat(d.level);
            let mut line = stars;
            if let Some(kw) = &d.todo_keyword {
                let _ = write!(line, " {}", kw.0);
            }
            if let Some(p) = d.priority {
                let _ = write!(line, " [#{}]", p.0);
            }
            line.push(' ');
            if d.commentedp {
                line.push_str("COMMENT ");
            }
            line.push_str(d.raw_value);
            if !d.tags.is_empty() {
                let tag_str = format!(":{}:", d.tags.iter().map(|t| t.0.as_ref()).collect::<Vec<_>>().join(":"));
                let pad = pad_to_tags_column(line.len(), environment.config.tags_column);
                let _ = write!(line, "{}{}", blank_spaces(pad), tag_str);
            }
            out.push_str(&line);
            out.push('\n');
            let has_planning = d.deadline.is_some() || d.scheduled.is_some() || d.closed.is_some();
            if has_planning {
                let mut planning = Vec::new();
                if let Some(ts) = &d.scheduled {
                    let mut s = String::from("SCHEDULED: ");
                    write_timestamp(ts, &mut s);
                    planning.push(s);
                }
                if let Some(ts) = &d.deadline {
                    let mut s = String::from("DEADLINE: ");
                    write_timestamp(ts, &mut s);
                    planning.push(s);
                }
                if let Some(ts) = &d.closed {
                    let mut s = String::from("CLOSED: ");
                    write_timestamp(ts, &mut s);
                    planning.push(s);
                }
                out.push_str(&planning.join(" "));
                out.push('\n');
                // `pre_blank` counts the planning line itself plus any blank
                // lines it absorbed as its own post-blank.
                out.push_str(&blank_lines(d.pre_blank.saturating_sub(1)));
            } else {
                out.push_str(&blank_lines(d.pre_blank));
            }
            out.push_str(&contents(tree, environment, id));
            out.push_str(&blank_lines(post_blank));
        }
        NodeData::HorizontalRule => {
            write_affiliated(tree, id, out);
            out.push_str("-----\n");
            out.push_str(&blank_lines(post_blank));
        }
        NodeData::InlineTask(d) => {
            let stars = "*".repeat(d.level);
            let mut line = stars;
            if let Some(kw) = &d.todo_keyword {
                let _ = write!(line, " {}", kw.0);
            }
            if let Some(p) = d.priority {
                let _ = write!(line, " [#{}]", p.0);
            }
            line.push(' ');
            line.push_str(d.raw_value);
            if !d.tags.is_empty() {
                let tag_str = format!(":{}:", d.tags.iter().map(|t| t.0.as_ref()).collect::<Vec<_>>().join(":"));
                let _ = write!(line, " {}", tag_str);
            }
            out.push_str(&line);
            out.push('\n');
            out.push_str(&contents(tree, environment, id));
            out.push_str(&blank_lines(post_blank));
        }
        NodeData::Item(d) => {
            let ordered = d.bullet.chars().next().map_or(false, |c| c.is_ascii_alphanumeric());
            out.push_str(&d.bullet);
            if ordered {
                out.push('.');
            }
            out.push(' ');
            if let Some(c) = d.counter {
                let _ = write!(out, "[@{}] ", c);
            }
            if let Some(cb) = d.checkbox {
                let mark = match cb {
                    crate::list::CheckBox::On => "X",
                    crate::list::CheckBox::Off => " ",
                    crate::list::CheckBox::Trans => "-",
                };
                let _ = write!(out, "[{}] ", mark);
            }
            if let Some(tag) = d.raw_tag {
                let _ = write!(out, "{} :: ", tag);
            }
            // The item's first content line (possibly blank) is reproduced
            // by its own children, not re-derived from `pre_blank` here.
            out.push_str(&contents(tree, environment, id));
            out.push_str(&blank_lines(post_blank));
        }
        NodeData::Keyword(d) => {
            write_affiliated(tree, id, out);
            let _ = write!(out, "#+{}: {}\n{}", d.key, d.value, blank_lines(post_blank));
        }
        NodeData::LatexEnvironment(d) => {
            write_affiliated(tree, id, out);
            out.push_str(d.value);
            out.push_str(&blank_lines(post_blank));
        }
        NodeData::NodeProperty(d) => {
            let _ = write!(out, ":{}: {}\n{}", d.key, d.value, blank_lines(post_blank));
        }
        NodeData::Paragraph => {
            out.push_str(&contents(tree, environment, id));
            out.push_str(&blank_lines(post_blank));
        }
        NodeData::PlainList(_) => {
            out.push_str(&contents(tree, environment, id));
            out.push_str(&blank_lines(post_blank));
        }
        NodeData::Planning(d) => {
            let mut parts = Vec::new();
            if let Some(ts) = &d.scheduled {
                let mut s = String::from("SCHEDULED: ");
                write_timestamp(ts, &mut s);
                parts.push(s);
            }
            if let Some(ts) = &d.deadline {
                let mut s = String::from("DEADLINE: ");
                write_timestamp(ts, &mut s);
                parts.push(s);
            }
            if let Some(ts) = &d.closed {
                let mut s = String::from("CLOSED: ");
                write_timestamp(ts, &mut s);
                parts.push(s);
            }
            out.push_str(&parts.join(" "));
            out.push('\n');
            out.push_str(&blank_lines(post_blank));
        }
        NodeData::PropertyDrawer => {
            let _ = write!(
                out,
                ":PROPERTIES:\n{}:END:\n{}",
                contents(tree, environment, id),
                blank_lines(post_blank)
            );
        }
        NodeData::QuoteBlock => {
            write_affiliated(tree, id, out);
            let _ = write!(
                out,
                "#+BEGIN_QUOTE\n{}#+END_QUOTE\n{}",
                contents(tree, environment, id),
                blank_lines(post_blank)
            );
        }
        NodeData::Section => {
            out.push_str(&contents(tree, environment, id));
            out.push_str(&blank_lines(post_blank));
        }
        NodeData::SpecialBlock(d) => {
            write_affiliated(tree, id, out);
            let _ = write!(
                out,
                "#+BEGIN_{}\n{}#+END_{}\n{}",
                d.block_type,
                contents(tree, environment, id),
                d.block_type,
                blank_lines(post_blank)
            );
        }
        NodeData::SrcBlock(d) => {
            write_affiliated(tree, id, out);
            out.push_str("#+BEGIN_SRC");
            if let Some(lang) = d.language {
                out.push(' ');
                out.push_str(lang);
            }
            if let Some(p) = d.parameters {
                out.push(' ');
                out.push_str(p);
            }
            let _ = write!(out, "\n{}#+END_SRC\n{}", d.value, blank_lines(post_blank));
        }
        NodeData::Table(d) => {
            write_affiliated(tree, id, out);
            out.push_str(&contents(tree, environment, id));
            if let Some(tblfm) = d.tblfm {
                let _ = write!(out, "#+TBLFM: {}\n", tblfm);
            }
            out.push_str(&blank_lines(post_blank));
        }
        NodeData::TableRow(d) => {
            out.push_str(d.value);
            out.push('\n');
            out.push_str(&blank_lines(post_blank));
        }
        NodeData::VerseBlock => {
            write_affiliated(tree, id, out);
            let _ = write!(
                out,
                "#+BEGIN_VERSE\n{}#+END_VERSE\n{}",
                contents(tree, environment, id),
                blank_lines(post_blank)
            );
        }

        NodeData::Bold => {
            let _ = write!(out, "*{}*{}", contents(tree, environment, id), blank_spaces(post_blank));
        }
        NodeData::Code(d) => {
            let _ = write!(out, "~{}~{}", d.value, blank_spaces(post_blank));
        }
        NodeData::Entity(d) => {
            out.push('\\');
            out.push_str(d.name);
            if d.use_brackets_p {
                out.push_str("{}");
            }
            out.push_str(&blank_spaces(post_blank));
        }
        NodeData::ExportSnippet(d) => {
            let _ = write!(out, "@@{}:{}@@{}", d.back_end, d.value, blank_spaces(post_blank));
        }
        NodeData::FootnoteReference(d) => {
            out.push_str("[fn:");
            if let Some(label) = d.label {
                out.push_str(label);
            }
            if d.definition_inline {
                out.push(':');
                out.push_str(&contents(tree, environment, id));
            }
            out.push(']');
            out.push_str(&blank_spaces(post_blank));
        }
        NodeData::InlineBabelCall(d) => {
            out.push_str(d.value);
            out.push_str(&blank_spaces(post_blank));
        }
        NodeData::InlineSrcBlock(d) => {
            out.push_str("src_");
            out.push_str(d.language);
            if let Some(p) = d.parameters {
                let _ = write!(out, "[{}]", p);
            }
            let _ = write!(out, "{{{}}}{}", d.value, blank_spaces(post_blank));
        }
        NodeData::Italic => {
            let _ = write!(out, "/{}/{}", contents(tree, environment, id), blank_spaces(post_blank));
        }
        NodeData::LineBreak => out.push_str(&format!("\\\\\n{}", blank_spaces(post_blank))),
        NodeData::LatexFragment(d) => {
            out.push_str(d.value);
            out.push_str(&blank_spaces(post_blank));
        }
        NodeData::Link(d) => {
            match d.format {
                LinkFormat::Plain => out.push_str(d.raw_link),
                LinkFormat::Angle => {
                    let _ = write!(out, "<{}>", d.raw_link);
                }
                LinkFormat::Bracket => {
                    out.push_str("[[");
                    out.push_str(d.path);
                    out.push(']');
                    if let Some(desc) = &d.description {
                        let _ = write!(out, "[{}]", desc);
                    }
                    out.push(']');
                }
            }
            out.push_str(&blank_spaces(post_blank));
        }
        NodeData::Macro(d) => {
            out.push_str(d.value);
            out.push_str(&blank_spaces(post_blank));
        }
        NodeData::RadioTarget(d) => {
            let _ = write!(out, "<<<{}>>>{}", d.raw_value, blank_spaces(post_blank));
        }
        NodeData::StatisticsCookie(d) => {
            out.push_str(d.value);
            out.push_str(&blank_spaces(post_blank));
        }
        NodeData::StrikeThrough => {
            let _ = write!(out, "+{}+{}", contents(tree, environment, id), blank_spaces(post_blank));
        }
        NodeData::Subscript(d) => {
            out.push('_');
            if d.use_brackets_p {
                out.push('{');
                out.push_str(&contents(tree, environment, id));
                out.push('}');
            } else {
                out.push_str(&contents(tree, environment, id));
            }
            out.push_str(&blank_spaces(post_blank));
        }
        NodeData::Superscript(d) => {
            out.push('^');
            if d.use_brackets_p {
                out.push('{');
                out.push_str(&contents(tree, environment, id));
                out.push('}');
            } else {
                out.push_str(&contents(tree, environment, id));
            }
            out.push_str(&blank_spaces(post_blank));
        }
        NodeData::TableCell => {
            let _ = write!(out, "{} |", contents(tree, environment, id));
        }
        NodeData::Target(d) => {
            let _ = write!(out, "<<{}>>{}", d.value, blank_spaces(post_blank));
        }
        NodeData::Timestamp(d) => {
            write_timestamp(d, out);
            out.push_str(&blank_spaces(post_blank));
        }
        NodeData::Underline => {
            let _ = write!(out, "_{}_{}", contents(tree, environment, id), blank_spaces(post_blank));
        }
        NodeData::Verbatim(d) => {
            let _ = write!(out, "={}={}", d.value, blank_spaces(post_blank));
        }

        NodeData::PlainText(text) => out.push_str(text),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::parser::{ParseGranularity, Parser};

    fn round_trip(input: &str) -> String {
        let mut parser = Parser::new(input, ParseGranularity::Object, Environment::default());
        let root = parser.parse_buffer();
        interpret(&parser.tree, &parser.environment, root)
    }

    #[test]
    fn paragraph_with_bold_round_trips() {
        let input = "Hello *world*.\n";
        assert_eq!(round_trip(input), input);
    }

    #[test]
    fn keyword_round_trips() {
        let input = "#+TITLE: My Document\n";
        assert_eq!(round_trip(input), input);
    }

    #[test]
    fn fixed_width_round_trips() {
        let input = ": a line\n: another\n";
        assert_eq!(round_trip(input), input);
    }
}
