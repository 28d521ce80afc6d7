// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Paragraph formatting.
//!
//! Every paragraph of the document has a [`ParaPortion`] holding its lines
//! and portions. Portions are invalidated by edits and rebuilt lazily, one
//! whole paragraph at a time. Positions of lines within a paragraph are
//! relative to the paragraph; [`ParaPortion::top`] places the paragraph in
//! the document.

mod columns;
mod format;
mod idle;
mod neutral_break;

use alloc::vec::Vec;
use core::ops::Range;

use crate::analysis::ScriptType;

pub use columns::{balance_columns, ColumnBalance};
#[cfg(feature = "std")]
pub use idle::SystemClock;
pub use idle::{Clock, FormatProgress};

pub(crate) use format::{format_paragraph, FormatContext};
pub(crate) use idle::IdleFormatter;
pub(crate) use neutral_break::neutral_break;

/// The kind of a [`TextPortion`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PortionKind {
    /// Plain text.
    Text,
    /// A tab feature, stretched to the next tab stop.
    Tab,
    /// A field placeholder, measured by its value.
    Field,
    /// A manual line break.
    LineBreak,
    /// A soft hyphen at a line end, drawn as a hyphen.
    Hyphenator,
}

/// A run of characters of one kind, script, font and BiDi level within a
/// line.
#[derive(Clone, Debug, PartialEq)]
pub struct TextPortion {
    pub(crate) kind: PortionKind,
    pub(crate) len: usize,
    pub(crate) width: f32,
    pub(crate) level: u8,
    pub(crate) script: ScriptType,
}

impl TextPortion {
    /// Kind of the portion.
    pub fn kind(&self) -> PortionKind {
        self.kind
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` for the zero length portion of an empty line.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Advance width.
    pub fn width(&self) -> f32 {
        self.width
    }

    /// BiDi embedding level.
    pub fn level(&self) -> u8 {
        self.level
    }

    /// Returns `true` if the portion runs right to left.
    pub fn is_rtl(&self) -> bool {
        self.level & 1 != 0
    }

    /// Script type of the portion.
    pub fn script(&self) -> ScriptType {
        self.script
    }
}

/// Why a line ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LineEnd {
    /// The line was wrapped to fit the width.
    Wrapped,
    /// The line ends with a manual line break.
    Manual,
    /// Last line of the paragraph.
    Paragraph,
}

/// One formatted line.
#[derive(Clone, Debug, PartialEq)]
pub struct EditLine {
    pub(crate) start: usize,
    pub(crate) end: usize,
    /// Range into [`ParaPortion::portions`].
    pub(crate) portions: Range<usize>,
    pub(crate) ascent: f32,
    pub(crate) height: f32,
    /// Left edge of the visual line, relative to the paper.
    pub(crate) start_x: f32,
    /// Advance of the line without trailing whitespace.
    pub(crate) width: f32,
    /// Advance of trailing whitespace.
    pub(crate) trailing: f32,
    /// Offset of each character of the line.
    pub(crate) char_offsets: Vec<usize>,
    /// Cumulative logical advance before each character, plus the total.
    pub(crate) char_x: Vec<f32>,
    /// Top of the line relative to the first line of the paragraph.
    pub(crate) top: f32,
    pub(crate) end_reason: LineEnd,
}

impl EditLine {
    /// Byte range of the line within its paragraph.
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Start offset.
    pub fn start(&self) -> usize {
        self.start
    }

    /// End offset.
    pub fn end(&self) -> usize {
        self.end
    }

    /// Distance from the line top to the baseline.
    pub fn ascent(&self) -> f32 {
        self.ascent
    }

    /// Line height, including line spacing.
    pub fn height(&self) -> f32 {
        self.height
    }

    /// Horizontal position of the visual start of the line.
    pub fn start_x(&self) -> f32 {
        self.start_x
    }

    /// Advance of the line, excluding trailing whitespace.
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Top of the line relative to the paragraph's first line.
    pub fn top(&self) -> f32 {
        self.top
    }

    /// Why the line ended.
    pub fn end_reason(&self) -> LineEnd {
        self.end_reason
    }

    /// Cumulative logical advances: entry `i` is the advance before the
    /// `i`th character of the line, the last entry the total.
    pub fn char_x(&self) -> &[f32] {
        &self.char_x
    }

    /// Index into [`Self::char_x`] of the character at `offset`.
    pub(crate) fn char_index(&self, offset: usize) -> usize {
        self.char_offsets.partition_point(|&o| o < offset)
    }

    /// Logical advance from the line start to `offset`.
    pub(crate) fn x_at(&self, offset: usize) -> f32 {
        self.char_x[self.char_index(offset).min(self.char_x.len() - 1)]
    }

    /// Returns `true` when a position at the line end belongs to the next
    /// line instead.
    pub(crate) fn is_wrapped(&self) -> bool {
        self.end_reason == LineEnd::Wrapped
    }
}

/// Formatting state of one paragraph.
#[derive(Clone, Debug)]
pub struct ParaPortion {
    pub(crate) lines: Vec<EditLine>,
    pub(crate) portions: Vec<TextPortion>,
    /// Lowest offset changed since the last format, or `None` when valid.
    pub(crate) invalid: Option<usize>,
    pub(crate) visible: bool,
    pub(crate) rtl: bool,
    pub(crate) lines_height: f32,
    pub(crate) upper_space: f32,
    pub(crate) lower_space: f32,
    /// Extra space the first line asks for under proportional spacing.
    pub(crate) spacing_extra: f32,
    /// Space above the first line after collapsing with the previous
    /// paragraph.
    pub(crate) first_line_offset: f32,
    pub(crate) height: f32,
    pub(crate) top: f32,
    /// Widest line including indents.
    pub(crate) max_width: f32,
}

impl Default for ParaPortion {
    fn default() -> Self {
        Self::new()
    }
}

impl ParaPortion {
    pub(crate) fn new() -> Self {
        Self {
            lines: Vec::new(),
            portions: Vec::new(),
            invalid: Some(0),
            visible: true,
            rtl: false,
            lines_height: 0.0,
            upper_space: 0.0,
            lower_space: 0.0,
            spacing_extra: 0.0,
            first_line_offset: 0.0,
            height: 0.0,
            top: 0.0,
            max_width: 0.0,
        }
    }

    /// The formatted lines, in logical order.
    pub fn lines(&self) -> &[EditLine] {
        &self.lines
    }

    /// All portions of the paragraph, in logical order.
    pub fn portions(&self) -> &[TextPortion] {
        &self.portions
    }

    /// Portions of `line`.
    pub fn line_portions(&self, line: &EditLine) -> &[TextPortion] {
        &self.portions[line.portions.clone()]
    }

    /// Height of the paragraph including paragraph spacing.
    pub fn height(&self) -> f32 {
        self.height
    }

    /// Top of the paragraph in the document.
    pub fn top(&self) -> f32 {
        self.top
    }

    /// Space between [`Self::top`] and the first line.
    pub fn first_line_offset(&self) -> f32 {
        self.first_line_offset
    }

    /// Returns `true` if the paragraph is shown.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Returns `true` if the paragraph is laid out right to left.
    pub fn is_rtl(&self) -> bool {
        self.rtl
    }

    /// Returns `true` if the lines reflect the current text.
    pub fn is_valid(&self) -> bool {
        self.invalid.is_none()
    }

    /// Document position of the top of `line`.
    pub(crate) fn line_top(&self, line: &EditLine) -> f32 {
        self.top + self.first_line_offset + line.top
    }

    pub(crate) fn mark_invalid(&mut self, offset: usize) {
        self.invalid = Some(self.invalid.map_or(offset, |o| o.min(offset)));
    }

    /// Index of the line holding `offset`.
    ///
    /// An offset at the end of a wrapped line is also the start of the next
    /// line; `at_line_end` selects the earlier line in that case.
    pub(crate) fn line_index(&self, offset: usize, at_line_end: bool) -> usize {
        let count = self.lines.len();
        for (i, line) in self.lines.iter().enumerate() {
            if offset < line.end || i + 1 == count {
                return i;
            }
            // A manual break sits inside its line, so the end offset of a
            // manually broken line always starts the next one.
            if offset == line.end && line.is_wrapped() && at_line_end {
                return i;
            }
        }
        0
    }
}

/// Assigns paragraph positions and returns the total text height.
///
/// Without summation, the lower space of a paragraph and the upper space of
/// the next visible one collapse to the larger of the two. The upper space is
/// raised to the extra space proportional line spacing asks for above the
/// first line.
pub(crate) fn position_paragraphs(portions: &mut [ParaPortion], summation: bool) -> f32 {
    let mut y = 0.0;
    let mut prev_lower: Option<f32> = None;
    for para in portions {
        para.top = y;
        if !para.visible {
            para.first_line_offset = 0.0;
            para.height = 0.0;
            continue;
        }
        let upper = para.upper_space.max(para.spacing_extra);
        para.first_line_offset = match prev_lower {
            Some(lower) if !summation => upper - lower.min(upper),
            _ => upper,
        };
        para.height = para.first_line_offset + para.lines_height + para.lower_space;
        prev_lower = Some(para.lower_space);
        y += para.height;
    }
    y
}
