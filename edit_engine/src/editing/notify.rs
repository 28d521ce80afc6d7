// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::ops::Range;

/// Coarse change events for hosts (accessibility, outline views, spell
/// checking).
///
/// Events are delivered when the outermost operation finishes. At most one
/// [`Notification::TextModified`] is sent per operation, after the
/// structural events of that operation.
#[derive(Clone, Debug, PartialEq)]
pub enum Notification {
    /// The text or attributes changed.
    TextModified,
    /// A paragraph was inserted at the given index.
    ParagraphInserted(usize),
    /// The paragraph at the given index was removed.
    ParagraphDeleted(usize),
    /// Paragraphs were moved before `dest`, counted before the move.
    ParagraphsMoved {
        /// The moved paragraphs.
        range: Range<usize>,
        /// Destination index.
        dest: usize,
    },
    /// The paragraph attributes or style of a paragraph changed.
    ParagraphAttributesChanged(usize),
    /// A format pass changed the total text height.
    TextHeightChanged,
}
