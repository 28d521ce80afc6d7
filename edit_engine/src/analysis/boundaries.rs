// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::vec::Vec;
use core::fmt;
use core::ops::Range;

use icu_segmenter::options::{LineBreakOptions, SentenceBreakInvariantOptions, WordBreakInvariantOptions};
use icu_segmenter::{
    GraphemeClusterSegmenter, GraphemeClusterSegmenterBorrowed, LineSegmenter,
    LineSegmenterBorrowed, SentenceSegmenter, SentenceSegmenterBorrowed, WordSegmenter,
    WordSegmenterBorrowed,
};

/// A word segment: either a word or the run between two words.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WordSegment {
    /// Byte range of the segment.
    pub range: Range<usize>,
    /// `false` for whitespace runs.
    pub is_word: bool,
}

/// Text boundary analysis.
///
/// All offsets are byte offsets into the analysed text. Boundary lists
/// include `0` and `text.len()`.
pub trait BreakService {
    /// Grapheme cluster boundaries.
    fn graphemes(&self, text: &str) -> Vec<usize>;

    /// Word segments covering the text, or `None` when word analysis is
    /// unavailable. Callers then treat the whole paragraph as one word.
    fn words(&self, text: &str) -> Option<Vec<WordSegment>>;

    /// Sentence boundaries.
    fn sentences(&self, text: &str) -> Vec<usize>;

    /// Offsets where a line may break, excluding `0` and `text.len()`.
    fn line_breaks(&self, text: &str) -> Vec<usize>;
}

/// [`BreakService`] backed by the ICU4X segmenters and their compiled data.
pub struct IcuBreakService {
    grapheme: GraphemeClusterSegmenterBorrowed<'static>,
    word: WordSegmenterBorrowed<'static>,
    sentence: SentenceSegmenterBorrowed<'static>,
    line: LineSegmenterBorrowed<'static>,
}

impl fmt::Debug for IcuBreakService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IcuBreakService").finish_non_exhaustive()
    }
}

impl Default for IcuBreakService {
    fn default() -> Self {
        Self::new()
    }
}

impl IcuBreakService {
    /// Creates the service.
    pub fn new() -> Self {
        Self {
            grapheme: GraphemeClusterSegmenter::new(),
            word: WordSegmenter::new_auto(WordBreakInvariantOptions::default()),
            sentence: SentenceSegmenter::new(SentenceBreakInvariantOptions::default()),
            line: LineSegmenter::new_auto(LineBreakOptions::default()),
        }
    }
}

impl BreakService for IcuBreakService {
    fn graphemes(&self, text: &str) -> Vec<usize> {
        let mut out: Vec<usize> = self.grapheme.segment_str(text).collect();
        normalize_boundaries(&mut out, text.len());
        out
    }

    fn words(&self, text: &str) -> Option<Vec<WordSegment>> {
        let mut boundaries: Vec<usize> = self.word.segment_str(text).collect();
        normalize_boundaries(&mut boundaries, text.len());
        Some(
            boundaries
                .windows(2)
                .map(|w| WordSegment {
                    range: w[0]..w[1],
                    is_word: !text[w[0]..w[1]].chars().all(char::is_whitespace),
                })
                .collect(),
        )
    }

    fn sentences(&self, text: &str) -> Vec<usize> {
        let mut out: Vec<usize> = self.sentence.segment_str(text).collect();
        normalize_boundaries(&mut out, text.len());
        out
    }

    fn line_breaks(&self, text: &str) -> Vec<usize> {
        self.line
            .segment_str(text)
            .filter(|&b| b > 0 && b < text.len())
            .collect()
    }
}

/// Makes sure a boundary list starts at 0 and ends at `len`.
fn normalize_boundaries(list: &mut Vec<usize>, len: usize) {
    if list.first() != Some(&0) {
        list.insert(0, 0);
    }
    if list.last() != Some(&len) {
        list.push(len);
    }
    list.dedup();
}
