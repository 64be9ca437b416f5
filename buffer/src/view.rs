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

use crate::cursor::{LexemeCursor, MetricCursor};
use crate::emacs::EmacsCursor;
use crate::search::SearchCursor;
use crate::{Char, Cursor, Interval, Line};
use regex::Regex;

/// Everything the core parser needs from the hosting text buffer, gathered
/// behind one trait so the parser never touches an editor API directly.
///
/// A `narrow_to` / `with_wide_buffer` pair stands in for the elisp notion of
/// narrowing: the accessible region is restricted, all positions passed in
/// and handed back are still absolute, and `with_wide_buffer` always restores
/// the prior narrowing on every exit path, including panics that unwind
/// through it.
pub trait BufferView {
    fn char_at(&self, pos: usize) -> Option<char>;
    fn substring(&self, beg: usize, end: usize) -> &str;
    fn regex_search(&self, re: &Regex, from: usize, limit: Option<usize>) -> Option<Interval>;
    fn line_start_of(&self, pos: usize) -> usize;
    fn line_end_of(&self, pos: usize) -> usize;
    fn count_lines(&self, beg: usize, end: usize) -> usize;
    fn position_min(&self) -> usize;
    fn position_max(&self) -> usize;

    fn narrow_to(&mut self, beg: usize, end: usize);
    fn widen(&mut self);
}

/// A `&str`-backed implementation of [`BufferView`], layered on the same
/// `Cursor`/`Metric`/`Lexeme` machinery used by the recognizers themselves.
pub struct StrBufferView<'a> {
    data: &'a str,
    narrow: Interval,
    stack: Vec<Interval>,
}

impl<'a> StrBufferView<'a> {
    pub fn new(data: &'a str) -> Self {
        StrBufferView {
            data,
            narrow: Interval::new(0, data.len()),
            stack: Vec::new(),
        }
    }

    fn cursor_at(&self, pos: usize) -> Cursor<'a> {
        Cursor::new(self.data, pos)
    }
}

impl<'a> BufferView for StrBufferView<'a> {
    fn char_at(&self, pos: usize) -> Option<char> {
        if pos < self.narrow.start || pos >= self.narrow.end {
            return None;
        }
        let mut cursor = self.cursor_at(pos);
        cursor.get_lnext::<Char>()
    }

    fn substring(&self, beg: usize, end: usize) -> &str {
        let beg = beg.max(self.narrow.start);
        let end = end.min(self.narrow.end);
        &self.data[beg..end]
    }

    fn regex_search(&self, re: &Regex, from: usize, limit: Option<usize>) -> Option<Interval> {
        let mut cursor = self.cursor_at(from.max(self.narrow.start));
        let bound = limit.unwrap_or(self.narrow.end).min(self.narrow.end);
        cursor.re_search_forward(re, Some(bound))
    }

    fn line_start_of(&self, pos: usize) -> usize {
        let mut cursor = self.cursor_at(pos);
        cursor.goto_line_begin().max(self.narrow.start)
    }

    fn line_end_of(&self, pos: usize) -> usize {
        let mut cursor = self.cursor_at(pos);
        cursor.line_end_position(None).min(self.narrow.end)
    }

    fn count_lines(&self, beg: usize, end: usize) -> usize {
        if beg >= end {
            return 0;
        }
        let mut cursor = self.cursor_at(beg);
        let mut n = 0;
        while let Some(p) = cursor.mnext::<Line>() {
            if p > end {
                break;
            }
            n += 1;
        }
        n
    }

    fn position_min(&self) -> usize {
        self.narrow.start
    }

    fn position_max(&self) -> usize {
        self.narrow.end
    }

    fn narrow_to(&mut self, beg: usize, end: usize) {
        self.stack.push(self.narrow);
        self.narrow = Interval::new(beg, end);
    }

    fn widen(&mut self) {
        if let Some(prev) = self.stack.pop() {
            self.narrow = prev;
        } else {
            self.narrow = Interval::new(0, self.data.len());
        }
    }
}

/// Runs `f` with the buffer widened to its full extent, then restores
/// whatever narrowing was previously in effect.
pub fn with_wide_buffer<'a, R>(
    view: &mut StrBufferView<'a>,
    f: impl FnOnce(&mut StrBufferView<'a>) -> R,
) -> R {
    let saved = view.narrow;
    let saved_stack_len = view.stack.len();
    view.narrow = Interval::new(0, view.data.len());
    let result = f(view);
    view.stack.truncate(saved_stack_len);
    view.narrow = saved;
    result
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn narrow_and_widen_round_trips() {
        let mut view = StrBufferView::new("hello world");
        assert_eq!(view.position_max(), 11);
        view.narrow_to(0, 5);
        assert_eq!(view.position_max(), 5);
        assert_eq!(view.substring(0, 5), "hello");
        view.widen();
        assert_eq!(view.position_max(), 11);
    }

    #[test]
    fn with_wide_buffer_restores_narrowing() {
        let mut view = StrBufferView::new("hello world");
        view.narrow_to(0, 5);
        let seen_max = with_wide_buffer(&mut view, |v| v.position_max());
        assert_eq!(seen_max, 11);
        assert_eq!(view.position_max(), 5);
    }

    #[test]
    fn count_lines_counts_newlines_in_range() {
        let view = StrBufferView::new("a\nb\nc\n");
        assert_eq!(view.count_lines(0, 6), 3);
        assert_eq!(view.count_lines(0, 0), 0);
    }
}
