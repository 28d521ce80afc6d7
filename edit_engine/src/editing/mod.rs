// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The editing engine: mutations, undo, views and IME composition.

mod autocorrect;
mod engine;
mod ime;
mod mutate;
mod notify;
mod sync;
mod undo;
mod view;

use crate::document::EditPaM;
use crate::field::FieldKind;

pub use autocorrect::{AutoCorrect, AutoCorrectDoc};
pub use engine::{EditEngine, EngineServices, Generation};
pub use ime::ImeAttr;
pub use notify::Notification;
pub use undo::UndoKind;
pub use view::{EditView, ViewId};

/// A cursor movement requested for a view.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CursorMove {
    /// One cell to the left on screen.
    Left,
    /// One cell to the right on screen.
    Right,
    /// One cell back in logical order.
    Backward,
    /// One cell forward in logical order.
    Forward,
    /// To the start of the previous word.
    WordLeft,
    /// To the start of the next word.
    WordRight,
    /// One line up.
    Up,
    /// One line down.
    Down,
    /// To the start of the line.
    LineStart,
    /// To the end of the line.
    LineEnd,
    /// To the start of the paragraph.
    ParagraphStart,
    /// To the end of the paragraph.
    ParagraphEnd,
    /// To the start of the document.
    DocumentStart,
    /// To the end of the document.
    DocumentEnd,
    /// Up by most of the visible height.
    PageUp,
    /// Down by most of the visible height.
    PageDown,
}

/// Direction of a delete.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DeleteDirection {
    /// Delete before the caret (backspace).
    Backward,
    /// Delete after the caret.
    Forward,
}

/// Extent of a delete.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum DeleteGranularity {
    /// One character backward or one cell forward.
    #[default]
    Character,
    /// The rest of the word. At a word boundary, the whole adjacent word.
    Word,
    /// The rest of the paragraph.
    Paragraph,
}

/// A delete request.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DeleteMode {
    /// Which side of the caret to delete.
    pub direction: DeleteDirection,
    /// How much to delete.
    pub granularity: DeleteGranularity,
}

impl DeleteMode {
    /// Backspace.
    pub const BACKSPACE: Self = Self {
        direction: DeleteDirection::Backward,
        granularity: DeleteGranularity::Character,
    };
    /// Delete.
    pub const DELETE: Self = Self {
        direction: DeleteDirection::Forward,
        granularity: DeleteGranularity::Character,
    };
}

/// A placeholder inserted as a single character.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Feature {
    /// A tab.
    Tab,
    /// A manual line break within the paragraph.
    LineBreak,
    /// A field; its value comes from the engine's field resolver.
    Field(FieldKind),
}

/// Result of a text insertion.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Inserted {
    /// Position after the inserted text.
    pub end: EditPaM,
    /// Some text was dropped because a paragraph or the document was full.
    ///
    /// A full paragraph drops the rest of its line; text after the next
    /// paragraph separator still goes into the following paragraph. A full
    /// document drops everything after the last paragraph that fit.
    pub truncated: bool,
}

/// How two paragraphs are joined.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum JoinMode {
    /// The left paragraph keeps its style and paragraph attributes.
    Forward,
    /// Delete at the start of the right paragraph: the left paragraph may
    /// take the right one's style and paragraph attributes, see
    /// [`EngineConfig::backward_join_adopts_style`](crate::EngineConfig::backward_join_adopts_style).
    Backward,
}
