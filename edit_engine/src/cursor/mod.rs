// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cursor movement and hit testing.
//!
//! A [`Navigator`] answers position queries over formatted paragraphs. It
//! never changes the document. Geometry is in layout coordinates: x grows
//! along the line, y grows from the first paragraph down, before any
//! rotation for vertical text.

mod visual;

use alloc::{vec, vec::Vec};

#[cfg(feature = "libm")]
#[allow(unused_imports, reason = "only needed where core lacks the method")]
use core_maths::CoreFloat;

use peniko::kurbo::{Point, Rect};

use crate::analysis::{BreakService, WordSegment};
use crate::config::EngineConfig;
use crate::document::{EditDoc, EditPaM, EditSelection};
use crate::layout::{EditLine, LineEnd, ParaPortion};

pub(crate) use visual::{visual_units, VisualUnit};

/// Line extremity requests for [`Navigator::position_to_rect`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CursorFlags {
    /// Place the caret at the visual start of its line.
    pub start_of_line: bool,
    /// Place the caret at the visual end of its line. An offset at the end
    /// of a wrapped line then refers to that line rather than the next.
    pub end_of_line: bool,
}

/// Step size of character movement.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum CursorGranularity {
    /// One character, except that variation selectors stay with their base.
    Character,
    /// One grapheme cluster.
    #[default]
    Cell,
}

fn is_variation_selector(c: char) -> bool {
    matches!(c, '\u{FE00}'..='\u{FE0F}' | '\u{E0100}'..='\u{E01EF}')
}

/// Position queries over a formatted document.
#[derive(Clone, Copy)]
pub struct Navigator<'a> {
    doc: &'a EditDoc,
    portions: &'a [ParaPortion],
    breaks: &'a dyn BreakService,
    config: &'a EngineConfig,
}

impl core::fmt::Debug for Navigator<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Navigator")
            .field("paragraphs", &self.portions.len())
            .finish_non_exhaustive()
    }
}

impl<'a> Navigator<'a> {
    pub(crate) fn new(
        doc: &'a EditDoc,
        portions: &'a [ParaPortion],
        breaks: &'a dyn BreakService,
        config: &'a EngineConfig,
    ) -> Self {
        debug_assert!(
            portions.iter().all(ParaPortion::is_valid),
            "navigation needs formatted paragraphs"
        );
        Self {
            doc,
            portions,
            breaks,
            config,
        }
    }

    fn locate(&self, pam: EditPaM) -> (usize, usize) {
        self.doc.resolve(pam).unwrap_or((0, 0))
    }

    fn text(&self, para: usize) -> &'a str {
        self.doc.node(para).map_or("", |n| n.text())
    }

    fn pam(&self, para: usize, offset: usize) -> EditPaM {
        self.doc.pam(para, offset)
    }

    fn prev_visible(&self, para: usize) -> Option<usize> {
        (0..para).rev().find(|&p| self.portions.get(p).is_some_and(|pp| pp.visible))
    }

    fn next_visible(&self, para: usize) -> Option<usize> {
        (para + 1..self.portions.len()).find(|&p| self.portions[p].visible)
    }

    fn boundaries(&self, para: usize, granularity: CursorGranularity) -> Vec<usize> {
        let text = self.text(para);
        match granularity {
            CursorGranularity::Cell => self.breaks.graphemes(text),
            CursorGranularity::Character => text
                .char_indices()
                .filter(|&(_, c)| !is_variation_selector(c))
                .map(|(i, _)| i)
                .chain(core::iter::once(text.len()))
                .collect(),
        }
    }

    fn words(&self, para: usize) -> Vec<WordSegment> {
        let text = self.text(para);
        self.breaks.words(text).unwrap_or_else(|| {
            log::warn!("word boundaries unavailable, treating the paragraph as one word");
            vec![WordSegment {
                range: 0..text.len(),
                is_word: true,
            }]
        })
    }

    fn line(&self, para: usize, index: usize) -> Option<(&'a ParaPortion, &'a EditLine)> {
        let portion = self.portions.get(para)?;
        Some((portion, portion.lines.get(index)?))
    }

    fn units(&self, para: usize, line: usize) -> Vec<VisualUnit> {
        match self.line(para, line) {
            Some((portion, line)) => {
                visual_units(portion, line, &self.boundaries(para, CursorGranularity::Cell))
            }
            None => Vec::new(),
        }
    }

    fn line_index(&self, para: usize, offset: usize, at_line_end: bool) -> usize {
        self.portions
            .get(para)
            .map_or(0, |p| p.line_index(offset, at_line_end))
    }

    /// Caret x of `offset` on a line, preferring the unit of `level` where
    /// the offset touches two runs.
    fn unit_caret_x(line: &EditLine, units: &[VisualUnit], offset: usize, level: u8) -> f32 {
        let mut matched = None;
        let mut leading = None;
        let mut trailing = None;
        for unit in units {
            if unit.start == offset {
                let x = unit.leading_x();
                if unit.level == level {
                    matched.get_or_insert(x);
                }
                leading.get_or_insert(x);
            }
            if unit.end == offset {
                let x = unit.trailing_x();
                if unit.level == level {
                    matched.get_or_insert(x);
                }
                trailing.get_or_insert(x);
            }
        }
        matched.or(leading).or(trailing).unwrap_or(line.start_x)
    }

    /// Horizontal caret position of `pam`.
    pub fn caret_x(&self, pam: EditPaM, level: Option<u8>, at_line_end: bool) -> f32 {
        let (para, offset) = self.locate(pam);
        let index = self.line_index(para, offset, at_line_end);
        let Some((portion, line)) = self.line(para, index) else {
            return 0.0;
        };
        let units = self.units(para, index);
        Self::unit_caret_x(line, &units, offset, level.unwrap_or(u8::from(portion.rtl)))
    }

    // --- logical movement ---

    /// Next caret stop in logical order, crossing into the next visible
    /// paragraph at the end.
    pub fn logical_right(&self, pam: EditPaM, granularity: CursorGranularity) -> EditPaM {
        let (para, offset) = self.locate(pam);
        let len = self.text(para).len();
        if offset >= len {
            return match self.next_visible(para) {
                Some(next) => self.pam(next, 0),
                None => self.pam(para, len),
            };
        }
        let next = self
            .boundaries(para, granularity)
            .into_iter()
            .find(|&b| b > offset)
            .unwrap_or(len);
        self.pam(para, next)
    }

    /// Previous caret stop in logical order, crossing into the previous
    /// visible paragraph at the start.
    pub fn logical_left(&self, pam: EditPaM, granularity: CursorGranularity) -> EditPaM {
        let (para, offset) = self.locate(pam);
        if offset == 0 {
            return match self.prev_visible(para) {
                Some(prev) => self.doc.para_end(prev),
                None => self.pam(para, 0),
            };
        }
        let prev = self
            .boundaries(para, granularity)
            .into_iter()
            .rev()
            .find(|&b| b < offset)
            .unwrap_or(0);
        self.pam(para, prev)
    }

    // --- visual movement ---

    /// Moves one unit to the left on screen. Returns the new position and
    /// the BiDi level the caret is attached to.
    pub fn visual_left(&self, pam: EditPaM, level: Option<u8>, overwrite: bool) -> (EditPaM, u8) {
        self.visual_move(pam, level, true, overwrite)
    }

    /// Moves one unit to the right on screen.
    pub fn visual_right(&self, pam: EditPaM, level: Option<u8>, overwrite: bool) -> (EditPaM, u8) {
        self.visual_move(pam, level, false, overwrite)
    }

    fn visual_move(
        &self,
        pam: EditPaM,
        level: Option<u8>,
        to_left: bool,
        overwrite: bool,
    ) -> (EditPaM, u8) {
        let (para, offset) = self.locate(pam);
        let index = self.line_index(para, offset, false);
        let Some((portion, line)) = self.line(para, index) else {
            return (pam, 0);
        };
        let level = level.unwrap_or(u8::from(portion.rtl));
        let units = self.units(para, index);

        if overwrite {
            // The block caret covers the unit after the offset; step whole
            // units so it stays on the glyph it covers.
            if let Some(j) = units.iter().position(|u| u.start == offset) {
                let target = if to_left {
                    j.checked_sub(1)
                } else {
                    Some(j + 1).filter(|&t| t < units.len())
                };
                if let Some(t) = target {
                    return (self.pam(para, units[t].start), units[t].level);
                }
            }
        }

        let x = Self::unit_caret_x(line, &units, offset, level);
        let slot = (0..=units.len())
            .filter(|&k| {
                let left = units.get(k).map(VisualUnit::left_offset);
                let right = k.checked_sub(1).map(|r| units[r].right_offset());
                left == Some(offset) || right == Some(offset)
            })
            .min_by(|&a, &b| {
                let xa = slot_x(&units, a, line.start_x);
                let xb = slot_x(&units, b, line.start_x);
                (xa - x).abs().total_cmp(&(xb - x).abs())
            });
        match slot {
            Some(k) if to_left && k > 0 => {
                let unit = &units[k - 1];
                (self.pam(para, unit.left_offset()), unit.level)
            }
            Some(k) if !to_left && k < units.len() => {
                let unit = &units[k];
                (self.pam(para, unit.right_offset()), unit.level)
            }
            _ => self
                .adjacent_line_edge(para, index, to_left)
                .unwrap_or((pam, level)),
        }
    }

    /// The visual extremity of the line next to `line` in the direction of
    /// travel: moving left lands on the right end of the adjacent line.
    fn adjacent_line_edge(&self, para: usize, line: usize, to_left: bool) -> Option<(EditPaM, u8)> {
        let rtl = self.portions.get(para)?.rtl;
        let forward = to_left == rtl;
        let (tp, tl) = if forward {
            self.next_line(para, line)?
        } else {
            self.prev_line(para, line)?
        };
        let (portion, target) = self.line(tp, tl)?;
        let units = self.units(tp, tl);
        let unit = if to_left { units.last() } else { units.first() };
        let Some(unit) = unit else {
            return Some((self.pam(tp, target.start), u8::from(portion.rtl)));
        };
        let mut offset = if to_left {
            unit.right_offset()
        } else {
            unit.left_offset()
        };
        if offset == target.end && target.end_reason != LineEnd::Paragraph {
            // That offset already belongs to the following line.
            offset = if to_left {
                unit.left_offset()
            } else {
                unit.right_offset()
            };
        }
        Some((self.pam(tp, offset), unit.level))
    }

    fn next_line(&self, para: usize, line: usize) -> Option<(usize, usize)> {
        let portion = self.portions.get(para)?;
        if line + 1 < portion.lines.len() {
            return Some((para, line + 1));
        }
        self.next_visible(para).map(|p| (p, 0))
    }

    fn prev_line(&self, para: usize, line: usize) -> Option<(usize, usize)> {
        if line > 0 {
            return Some((para, line - 1));
        }
        let prev = self.prev_visible(para)?;
        Some((prev, self.portions[prev].lines.len().saturating_sub(1)))
    }

    // --- vertical movement ---

    /// Moves to the line above, keeping the remembered horizontal position.
    /// Returns the new position and the horizontal position to remember.
    pub fn up(&self, pam: EditPaM, travel_x: Option<f32>, at_line_end: bool) -> (EditPaM, f32) {
        self.vertical(pam, travel_x, at_line_end, false)
    }

    /// Moves to the line below, keeping the remembered horizontal position.
    pub fn down(&self, pam: EditPaM, travel_x: Option<f32>, at_line_end: bool) -> (EditPaM, f32) {
        self.vertical(pam, travel_x, at_line_end, true)
    }

    fn vertical(
        &self,
        pam: EditPaM,
        travel_x: Option<f32>,
        at_line_end: bool,
        down: bool,
    ) -> (EditPaM, f32) {
        let (para, offset) = self.locate(pam);
        let index = self.line_index(para, offset, at_line_end);
        let x = travel_x.unwrap_or_else(|| self.caret_x(pam, None, at_line_end));
        let Some((_, line)) = self.line(para, index) else {
            return (pam, x);
        };
        let target = if down {
            self.next_line(para, index)
        } else {
            self.prev_line(para, index)
        };
        let Some((tp, tl)) = target else {
            return (pam, x);
        };
        // Leaving a wrapped line, nudge right so a caret at the wrap point
        // does not snap back onto the line edge.
        let bias = if line.is_wrapped() { 1.0 } else { 0.0 };
        (self.pam(tp, self.hit_line(tp, tl, x + bias)), x)
    }

    // --- line, paragraph and document ends ---

    /// Logical start of the line holding `pam`.
    pub fn line_start(&self, pam: EditPaM, at_line_end: bool) -> EditPaM {
        let (para, offset) = self.locate(pam);
        let index = self.line_index(para, offset, at_line_end);
        match self.line(para, index) {
            Some((_, line)) => self.pam(para, line.start),
            None => pam,
        }
    }

    /// Logical end of the line holding `pam`.
    ///
    /// Returns the position and whether it is the end of a wrapped line,
    /// which has to be shown on that line rather than at the start of the
    /// next.
    pub fn line_end(&self, pam: EditPaM, at_line_end: bool) -> (EditPaM, bool) {
        let (para, offset) = self.locate(pam);
        let index = self.line_index(para, offset, at_line_end);
        let Some((_, line)) = self.line(para, index) else {
            return (pam, false);
        };
        match line.end_reason {
            LineEnd::Paragraph => (self.pam(para, line.end), false),
            LineEnd::Manual => {
                let before_break = self
                    .doc
                    .node(para)
                    .map_or(line.end, |n| n.prev_char_boundary(line.end));
                (self.pam(para, before_break), false)
            }
            LineEnd::Wrapped => (self.pam(para, line.end), true),
        }
    }

    /// Start of the paragraph holding `pam`.
    pub fn para_start(&self, pam: EditPaM) -> EditPaM {
        let (para, _) = self.locate(pam);
        self.pam(para, 0)
    }

    /// End of the paragraph holding `pam`.
    pub fn para_end(&self, pam: EditPaM) -> EditPaM {
        let (para, _) = self.locate(pam);
        self.doc.para_end(para)
    }

    /// Start of the first visible paragraph.
    pub fn doc_start(&self) -> EditPaM {
        let first = (0..self.portions.len())
            .find(|&p| self.portions[p].visible)
            .unwrap_or(0);
        self.pam(first, 0)
    }

    /// End of the last visible paragraph.
    pub fn doc_end(&self) -> EditPaM {
        let last = (0..self.portions.len())
            .rev()
            .find(|&p| self.portions[p].visible)
            .unwrap_or(self.doc.len() - 1);
        self.doc.para_end(last)
    }

    // --- words and sentences ---

    /// Start of the previous word. At the start of a word this is the start
    /// of the word before it; at the paragraph start, the end of the
    /// previous visible paragraph.
    pub fn word_left(&self, pam: EditPaM) -> EditPaM {
        let (para, offset) = self.locate(pam);
        if offset == 0 {
            return self.logical_left(pam, CursorGranularity::Cell);
        }
        let start = self
            .words(para)
            .into_iter()
            .rev()
            .find(|w| w.is_word && w.range.start < offset)
            .map_or(0, |w| w.range.start);
        self.pam(para, start)
    }

    /// Start of the next word, or the paragraph end after the last word. At
    /// the paragraph end, the start of the next visible paragraph.
    pub fn word_right(&self, pam: EditPaM) -> EditPaM {
        let (para, offset) = self.locate(pam);
        let len = self.text(para).len();
        if offset >= len {
            return self.logical_right(pam, CursorGranularity::Cell);
        }
        let start = self
            .words(para)
            .into_iter()
            .find(|w| w.is_word && w.range.start > offset)
            .map_or(len, |w| w.range.start);
        self.pam(para, start)
    }

    /// The word touching `offset`: the one containing it, or else the one
    /// ending at it.
    fn word_at(&self, para: usize, offset: usize) -> Option<WordSegment> {
        let words = self.words(para);
        let containing = words
            .iter()
            .find(|w| w.range.contains(&offset))
            .filter(|w| w.is_word);
        containing
            .or_else(|| words.iter().find(|w| w.is_word && w.range.end == offset))
            .cloned()
    }

    /// Start of the word touching `pam`, or `pam` itself outside words.
    pub fn start_of_word(&self, pam: EditPaM) -> EditPaM {
        let (para, offset) = self.locate(pam);
        match self.word_at(para, offset) {
            Some(word) => self.pam(para, word.range.start),
            None => self.pam(para, offset),
        }
    }

    /// End of the word touching `pam`, or `pam` itself outside words.
    pub fn end_of_word(&self, pam: EditPaM) -> EditPaM {
        let (para, offset) = self.locate(pam);
        match self.word_at(para, offset) {
            Some(word) => self.pam(para, word.range.end),
            None => self.pam(para, offset),
        }
    }

    /// Selects the word touching `pam`. Returns a caret outside words.
    pub fn select_word(&self, pam: EditPaM) -> EditSelection {
        let (para, offset) = self.locate(pam);
        match self.word_at(para, offset) {
            Some(word) => {
                EditSelection::new(self.pam(para, word.range.start), self.pam(para, word.range.end))
            }
            None => EditSelection::caret(self.pam(para, offset)),
        }
    }

    /// Selects the sentence holding `pam`.
    pub fn select_sentence(&self, pam: EditPaM) -> EditSelection {
        let (para, offset) = self.locate(pam);
        let bounds = self.breaks.sentences(self.text(para));
        let end_index = bounds
            .iter()
            .position(|&b| b > offset)
            .unwrap_or(bounds.len().saturating_sub(1));
        let end = bounds.get(end_index).copied().unwrap_or(offset);
        let start = end_index
            .checked_sub(1)
            .and_then(|i| bounds.get(i))
            .copied()
            .unwrap_or(0);
        EditSelection::new(self.pam(para, start), self.pam(para, end))
    }

    // --- hit testing ---

    /// Offset on line `line` of paragraph `para` closest to `x`.
    ///
    /// Never returns the end of a line that continues on the next one.
    fn hit_line(&self, para: usize, line_index: usize, x: f32) -> usize {
        let Some((_, line)) = self.line(para, line_index) else {
            return 0;
        };
        let units = self.units(para, line_index);
        let (Some(first), Some(last)) = (units.first(), units.last()) else {
            return line.start;
        };
        let offset = if x <= first.x0 {
            first.left_offset()
        } else if x >= last.x1 {
            last.right_offset()
        } else {
            let unit = units.iter().find(|u| x < u.x1).unwrap_or(last);
            if !self.config.smart_hit_test {
                unit.start
            } else if x < (unit.x0 + unit.x1) * 0.5 {
                unit.left_offset()
            } else {
                unit.right_offset()
            }
        };
        if offset == line.end && line.end_reason != LineEnd::Paragraph {
            return self
                .boundaries(para, CursorGranularity::Cell)
                .into_iter()
                .rev()
                .find(|&b| b < line.end)
                .unwrap_or(line.start)
                .max(line.start);
        }
        offset
    }

    /// Position closest to `point`.
    pub fn hit_test(&self, point: Point) -> EditPaM {
        let (x, y) = (point.x as f32, point.y as f32);
        let visible: Vec<usize> = (0..self.portions.len())
            .filter(|&p| self.portions[p].visible)
            .collect();
        let Some(&last) = visible.last() else {
            return self.doc.start_pam();
        };
        let para = visible
            .iter()
            .copied()
            .find(|&p| y < self.portions[p].top + self.portions[p].height)
            .unwrap_or(last);
        let portion = &self.portions[para];
        let line = portion
            .lines
            .iter()
            .position(|l| y < portion.line_top(l) + l.height)
            .unwrap_or(portion.lines.len().saturating_sub(1));
        self.pam(para, self.hit_line(para, line, x))
    }

    /// Caret rectangle of `pam`: a zero width rectangle spanning its line.
    pub fn position_to_rect(&self, pam: EditPaM, flags: CursorFlags, level: Option<u8>) -> Rect {
        let (para, offset) = self.locate(pam);
        let index = self.line_index(para, offset, flags.end_of_line);
        let Some((portion, line)) = self.line(para, index) else {
            return Rect::ZERO;
        };
        let content_left = if portion.rtl {
            line.start_x + line.trailing
        } else {
            line.start_x
        };
        let content_right = content_left + line.width;
        let x = if flags.start_of_line {
            if portion.rtl {
                content_right
            } else {
                content_left
            }
        } else if flags.end_of_line && offset == line.end {
            if portion.rtl {
                content_left
            } else {
                content_right
            }
        } else {
            let units = self.units(para, index);
            Self::unit_caret_x(line, &units, offset, level.unwrap_or(u8::from(portion.rtl)))
        };
        let top = portion.line_top(line);
        Rect::new(
            f64::from(x),
            f64::from(top),
            f64::from(x),
            f64::from(top + line.height),
        )
    }

    /// Rectangle covering the unit after `pam`, as drawn by an overwrite
    /// caret. Falls back to the caret rectangle at the paragraph end.
    pub fn unit_rect(&self, pam: EditPaM) -> Rect {
        let (para, offset) = self.locate(pam);
        let index = self.line_index(para, offset, false);
        let caret = self.position_to_rect(pam, CursorFlags::default(), None);
        match self.units(para, index).iter().find(|u| u.start == offset) {
            Some(unit) => Rect::new(f64::from(unit.x0), caret.y0, f64::from(unit.x1), caret.y1),
            None => caret,
        }
    }

    /// Moves a page up or down: the caret is moved by a fraction of
    /// `visible_height` and the position under it is hit tested again.
    pub fn page_move(&self, pam: EditPaM, visible_height: f32, down: bool) -> EditPaM {
        let rect = self.position_to_rect(pam, CursorFlags::default(), None);
        let delta = f64::from(visible_height * self.config.page_move_factor);
        let total = self
            .portions
            .last()
            .map_or(0.0, |p| f64::from(p.top + p.height));
        let y = if down {
            rect.center().y + delta
        } else {
            rect.center().y - delta
        };
        self.hit_test(Point::new(rect.x0, y.clamp(0.0, (total - 0.5).max(0.0))))
    }
}

fn slot_x(units: &[VisualUnit], slot: usize, start_x: f32) -> f32 {
    match units.get(slot) {
        Some(unit) => unit.x0,
        None => units.last().map_or(start_x, |u| u.x1),
    }
}
