// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Visual ordering of the units of a line.

use alloc::vec::Vec;

use unicode_bidi::{BidiInfo, Level};

use crate::layout::{EditLine, ParaPortion};

/// A caret stop: a grapheme cluster (or character) with its horizontal
/// extent.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct VisualUnit {
    pub(crate) start: usize,
    pub(crate) end: usize,
    pub(crate) x0: f32,
    pub(crate) x1: f32,
    pub(crate) level: u8,
}

impl VisualUnit {
    pub(crate) fn is_rtl(&self) -> bool {
        self.level & 1 != 0
    }

    /// Logical offset at the left edge of the unit.
    pub(crate) fn left_offset(&self) -> usize {
        if self.is_rtl() {
            self.end
        } else {
            self.start
        }
    }

    /// Logical offset at the right edge of the unit.
    pub(crate) fn right_offset(&self) -> usize {
        if self.is_rtl() {
            self.start
        } else {
            self.end
        }
    }

    /// Caret position for a caret sitting before the unit in logical order.
    pub(crate) fn leading_x(&self) -> f32 {
        if self.is_rtl() {
            self.x1
        } else {
            self.x0
        }
    }

    /// Caret position for a caret sitting after the unit in logical order.
    pub(crate) fn trailing_x(&self) -> f32 {
        if self.is_rtl() {
            self.x0
        } else {
            self.x1
        }
    }
}

/// Splits `line` into units at `boundaries` and returns them left to right.
///
/// Portions are reordered by their BiDi levels; units inside a right to left
/// portion run from its right edge.
pub(crate) fn visual_units(para: &ParaPortion, line: &EditLine, boundaries: &[usize]) -> Vec<VisualUnit> {
    let portions = para.line_portions(line);
    if portions.iter().all(|p| p.is_empty()) {
        return Vec::new();
    }
    let levels: Vec<Level> = portions
        .iter()
        .map(|p| Level::new(p.level()).unwrap_or_else(|_| Level::ltr()))
        .collect();
    let order = BidiInfo::reorder_visual(&levels);

    let mut starts = Vec::with_capacity(portions.len());
    let mut offset = line.start;
    for portion in portions {
        starts.push(offset);
        offset += portion.len();
    }

    let mut units = Vec::new();
    let mut x = line.start_x;
    for index in order {
        let portion = &portions[index];
        if portion.is_empty() {
            continue;
        }
        let start = starts[index];
        let end = start + portion.len();
        let base = line.x_at(start);
        let width = line.x_at(end) - base;
        let lo = boundaries.partition_point(|&b| b <= start);
        let hi = boundaries.partition_point(|&b| b < end);
        let mut cuts = Vec::with_capacity(hi.saturating_sub(lo) + 2);
        cuts.push(start);
        cuts.extend_from_slice(&boundaries[lo..hi.max(lo)]);
        cuts.push(end);
        let first = units.len();
        for w in cuts.windows(2) {
            let a = line.x_at(w[0]) - base;
            let b = line.x_at(w[1]) - base;
            let (x0, x1) = if portion.is_rtl() {
                (x + width - b, x + width - a)
            } else {
                (x + a, x + b)
            };
            units.push(VisualUnit {
                start: w[0],
                end: w[1],
                x0,
                x1,
                level: portion.level(),
            });
        }
        if portion.is_rtl() {
            units[first..].reverse();
        }
        x += width;
    }
    units
}
