// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::ops::Range;

use super::engine::EditEngine;

/// Hook called after a character is typed, for quote substitution,
/// capitalization and similar corrections.
///
/// Edits made through the [`AutoCorrectDoc`] belong to the same undo step as
/// the typed character.
pub trait AutoCorrect {
    /// `ch` was typed and now ends at byte `offset` of the current
    /// paragraph.
    fn char_inserted(&mut self, doc: &mut AutoCorrectDoc<'_>, offset: usize, ch: char);
}

/// Access to the paragraph an autocorrect hook works on.
pub struct AutoCorrectDoc<'a> {
    engine: &'a mut EditEngine,
    para: usize,
}

impl core::fmt::Debug for AutoCorrectDoc<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AutoCorrectDoc")
            .field("para", &self.para)
            .finish_non_exhaustive()
    }
}

impl<'a> AutoCorrectDoc<'a> {
    pub(crate) fn new(engine: &'a mut EditEngine, para: usize) -> Self {
        Self { engine, para }
    }

    /// Index of the paragraph.
    pub fn paragraph(&self) -> usize {
        self.para
    }

    /// Text of the paragraph.
    pub fn text(&self) -> &str {
        self.engine.doc.node(self.para).map_or("", |n| n.text())
    }

    /// Replaces `range` of the paragraph with `text`. Returns `false` and
    /// changes nothing when the range is out of bounds or not on character
    /// boundaries.
    pub fn replace(&mut self, range: Range<usize>, text: &str) -> bool {
        let current = self.text();
        if range.start > range.end
            || range.end > current.len()
            || !current.is_char_boundary(range.start)
            || !current.is_char_boundary(range.end)
        {
            return false;
        }
        self.engine.imp_remove_chars(self.para, range.start, range.end);
        let inserted = self.engine.imp_insert_str(self.para, range.start, text);
        !inserted.truncated
    }
}
