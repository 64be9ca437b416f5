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

//! `planning`, `clock` and `diary-sexp` elements: the small, single-line
//! elements that can open a section right under a headline.

use crate::node::{Interval, NodeData, NodeId};
use crate::objects::{parse_timestamp_str, TimestampData, TimestampKind};
use crate::parser::Parser;

#[derive(Debug)]
pub struct PlanningData<'a> {
    pub closed: Option<TimestampData<'a>>,
    pub deadline: Option<TimestampData<'a>>,
    pub scheduled: Option<TimestampData<'a>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockStatus {
    Running,
    Closed,
}

#[derive(Debug)]
pub struct ClockData<'a> {
    pub duration: Option<&'a str>,
    pub status: ClockStatus,
    pub value: TimestampData<'a>,
}

#[derive(Debug)]
pub struct DiarySexpData<'a> {
    pub value: &'a str,
}

/// Parses a `planning` line: one or more of `DEADLINE:`/`SCHEDULED:`/
/// `CLOSED:` keyword-timestamp pairs on the same line. `at` must already
/// satisfy `environment.planning_line`.
pub fn planning_parser<'a>(parser: &mut Parser<'a>, at: usize, limit: usize) -> NodeId {
    let line_end = parser.line_end(at).min(limit);
    let line = &parser.input[at..line_end];

    let mut closed = None;
    let mut deadline = None;
    let mut scheduled = None;

    for (keyword, slot) in [
        ("CLOSED", &mut closed),
        ("DEADLINE", &mut deadline),
        ("SCHEDULED", &mut scheduled),
    ] {
        if let Some(kw_pos) = line.find(keyword) {
            let after_colon = kw_pos + keyword.len() + 1; // skip ':'
            if after_colon <= line.len() {
                let rest = line[after_colon..].trim_start();
                if let Some(end) = rest.find(|c| c == '>' || c == ']') {
                    let stamp = &rest[..=end];
                    *slot = parse_timestamp_str(stamp);
                }
            }
        }
    }

    let (end, post_blank) = parser.end_with_post_blank(parser.next_line_start(line_end));
    parser.tree.insert(
        NodeData::Planning(Box::new(PlanningData {
            closed,
            deadline,
            scheduled,
        })),
        Interval::new(at, end),
        None,
        post_blank,
        Vec::new(),
    )
}

/// Parses a `CLOCK:` line.
pub fn clock_line_parser<'a>(parser: &mut Parser<'a>, at: usize, limit: usize) -> NodeId {
    let line_end = parser.line_end(at).min(limit);
    let line = &parser.input[at..line_end];

    let status = if line.contains("-->") || line.contains("=>") {
        ClockStatus::Closed
    } else {
        ClockStatus::Running
    };

    let stamp_start = line.find(['<', '['].as_ref()).unwrap_or(0);
    let stamp_end = line[stamp_start..]
        .find(|c| c == '>' || c == ']')
        .map(|i| stamp_start + i + 1)
        .unwrap_or(line.len());
    let stamp = &line[stamp_start..stamp_end];
    let value = parse_timestamp_str(stamp).unwrap_or(TimestampData {
        raw_value: stamp,
        kind: TimestampKind::Inactive,
        year_start: 0,
        month_start: 0,
        day_start: 0,
        hour_start: None,
        minute_start: None,
        year_end: 0,
        month_end: 0,
        day_end: 0,
        hour_end: None,
        minute_end: None,
    });

    let duration = if status == ClockStatus::Closed {
        line.rsplit("=>").next().map(|s| s.trim())
    } else {
        None
    };

    let (end, post_blank) = parser.end_with_post_blank(parser.next_line_start(line_end));
    parser.tree.insert(
        NodeData::Clock(Box::new(ClockData {
            duration,
            status,
            value,
        })),
        Interval::new(at, end),
        None,
        post_blank,
        Vec::new(),
    )
}

/// Parses a `%%(...)` diary sexp line.
pub fn diary_sexp_parser<'a>(parser: &mut Parser<'a>, at: usize, limit: usize) -> NodeId {
    let line_end = parser.line_end(at).min(limit);
    let (end, post_blank) = parser.end_with_post_blank(parser.next_line_start(line_end));
    parser.tree.insert(
        NodeData::DiarySexp(Box::new(DiarySexpData {
            value: &parser.input[at..line_end],
        })),
        Interval::new(at, end),
        None,
        post_blank,
        Vec::new(),
    )
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::environment::Environment;
    use crate::parser::ParseGranularity;

    #[test]
    fn planning_line_picks_up_deadline() {
        let input = "DEADLINE: <2021-01-01 Fri>\n";
        let mut parser = Parser::new(input, ParseGranularity::Element, Environment::default());
        let id = planning_parser(&mut parser, 0, input.len());
        match &parser.tree.get(id).unwrap().data {
            NodeData::Planning(p) => assert!(p.deadline.is_some()),
            other => panic!("expected Planning, got {:?}", other),
        }
    }

    #[test]
    fn clock_line_running_has_no_duration() {
        let input = "CLOCK: [2021-01-01 Fri 10:00]\n";
        let mut parser = Parser::new(input, ParseGranularity::Element, Environment::default());
        let id = clock_line_parser(&mut parser, 0, input.len());
        match &parser.tree.get(id).unwrap().data {
            NodeData::Clock(c) => {
                assert_eq!(c.status, ClockStatus::Running);
                assert!(c.duration.is_none());
            }
            other => panic!("expected Clock, got {:?}", other),
        }
    }
}
