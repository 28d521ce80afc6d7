// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::vec::Vec;
use core::ops::Range;

/// Heights are compared with this tolerance so rounding noise does not push
/// a line into the next column.
const EPSILON: f32 = 1e-3;

/// Result of [`balance_columns`].
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnBalance {
    /// Height of the tallest column.
    pub height: f32,
    /// Line range of each column. Trailing columns may be empty.
    pub columns: Vec<Range<usize>>,
}

/// Distributes lines of the given heights over `columns` columns of equal
/// height, as short as possible but at least `min_height` tall as a target.
///
/// Columns are filled greedily against a target height. When lines are left
/// over, the target grows by the smallest amount that lets some column take
/// one more line, so the target never decreases and the loop ends once it
/// reaches the total height.
pub fn balance_columns(heights: &[f32], columns: usize, min_height: f32) -> ColumnBalance {
    let columns = columns.max(1);
    let mut target = min_height.max(0.0);
    loop {
        let mut ranges = Vec::with_capacity(columns);
        let mut tallest: f32 = 0.0;
        let mut increment = f32::INFINITY;
        let mut start = 0;
        for _ in 0..columns {
            let mut used = 0.0;
            let mut end = start;
            while end < heights.len() && used + heights[end] <= target + EPSILON {
                used += heights[end];
                end += 1;
            }
            if end < heights.len() {
                increment = increment.min(used + heights[end] - target);
            }
            tallest = tallest.max(used);
            ranges.push(start..end);
            start = end;
        }
        if start >= heights.len() {
            return ColumnBalance {
                height: tallest,
                columns: ranges,
            };
        }
        target += increment.max(EPSILON);
    }
}
