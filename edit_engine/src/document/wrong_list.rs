// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::vec::Vec;
use core::ops::Range;

/// Misspelled ranges of a paragraph, plus the range that needs rechecking.
///
/// The engine keeps the list aligned with text edits; the host's spell
/// checker fills it and clears the invalid range after checking.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WrongList {
    ranges: Vec<Range<usize>>,
    invalid: Option<Range<usize>>,
}

impl WrongList {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Misspelled ranges in order.
    pub fn ranges(&self) -> &[Range<usize>] {
        &self.ranges
    }

    /// The range that changed since the last check.
    pub fn invalid_range(&self) -> Option<Range<usize>> {
        self.invalid.clone()
    }

    /// Returns `true` if the character at `offset` is marked wrong.
    pub fn is_wrong(&self, offset: usize) -> bool {
        self.ranges.iter().any(|r| r.contains(&offset))
    }

    /// Marks `range` as misspelled.
    pub fn mark_wrong(&mut self, range: Range<usize>) {
        if range.is_empty() {
            return;
        }
        let pos = self.ranges.partition_point(|r| r.start < range.start);
        self.ranges.insert(pos, range);
    }

    /// Clears the recheck range.
    pub fn clear_invalid(&mut self) {
        self.invalid = None;
    }

    /// Extends the recheck range to include `range`.
    pub fn mark_invalid(&mut self, range: Range<usize>) {
        self.invalid = Some(match self.invalid.take() {
            Some(r) => r.start.min(range.start)..r.end.max(range.end),
            None => range,
        });
    }

    pub(crate) fn text_inserted(&mut self, pos: usize, len: usize) {
        for r in &mut self.ranges {
            if r.start >= pos {
                r.start += len;
                r.end += len;
            } else if r.end >= pos {
                r.end += len;
            }
        }
        if let Some(r) = &mut self.invalid {
            if r.start >= pos {
                r.start += len;
            }
            if r.end >= pos {
                r.end += len;
            }
        }
        self.mark_invalid(pos..pos + len);
    }

    pub(crate) fn text_removed(&mut self, start: usize, end: usize) {
        let len = end - start;
        let collapse = |r: &mut Range<usize>| {
            if r.start >= end {
                r.start -= len;
                r.end -= len;
            } else if r.end > start {
                r.start = r.start.min(start);
                r.end = if r.end >= end { r.end - len } else { start };
            }
        };
        self.ranges.retain_mut(|r| {
            collapse(r);
            !r.is_empty()
        });
        if let Some(r) = &mut self.invalid {
            collapse(r);
        }
        self.mark_invalid(start..start);
    }

    pub(crate) fn split_off(&mut self, pos: usize) -> Self {
        let mut right = Self::new();
        self.ranges.retain_mut(|r| {
            if r.start >= pos {
                right.ranges.push(r.start - pos..r.end - pos);
                false
            } else {
                if r.end > pos {
                    right.ranges.push(0..r.end - pos);
                    r.end = pos;
                }
                true
            }
        });
        right.ranges.sort_by_key(|r| r.start);
        self.mark_invalid(pos..pos);
        right.mark_invalid(0..0);
        right
    }

    pub(crate) fn append(&mut self, other: Self, offset: usize) {
        for r in other.ranges {
            let r = r.start + offset..r.end + offset;
            match self.ranges.last_mut() {
                Some(last) if last.end == r.start && r.start == offset => last.end = r.end,
                _ => self.ranges.push(r),
            }
        }
        if let Some(r) = other.invalid {
            self.mark_invalid(r.start + offset..r.end + offset);
        }
        self.mark_invalid(offset..offset);
    }
}
