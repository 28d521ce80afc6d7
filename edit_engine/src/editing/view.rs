// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Views: independent selections over one shared document.

use alloc::string::String;

use peniko::kurbo::{Point, Rect};

use crate::cursor::{CursorFlags, CursorGranularity};
use crate::document::{EditPaM, EditSelection};
use crate::error::Error;

use super::autocorrect::AutoCorrectDoc;
use super::engine::EditEngine;
use super::undo::UndoKind;
use super::{CursorMove, DeleteDirection, DeleteGranularity, DeleteMode, Feature};

slotmap::new_key_type! {
    /// Handle to a view owned by an [`EditEngine`].
    pub struct ViewId;
}

/// Per view editing state.
#[derive(Clone, Debug, PartialEq)]
pub struct EditView {
    pub(crate) selection: EditSelection,
    /// Remembered x for vertical movement.
    travel_x: Option<f32>,
    bidi_level: Option<u8>,
    insert_mode: bool,
    visible_height: f32,
    /// The caret sits at the end of a wrapped line rather than the start of
    /// the next one.
    at_line_end: bool,
}

impl EditView {
    fn new(start: EditPaM) -> Self {
        Self {
            selection: EditSelection::caret(start),
            travel_x: None,
            bidi_level: None,
            insert_mode: true,
            visible_height: 0.0,
            at_line_end: false,
        }
    }

    /// The selection.
    pub fn selection(&self) -> EditSelection {
        self.selection
    }

    /// Returns `true` in insert mode, `false` in overwrite mode.
    pub fn insert_mode(&self) -> bool {
        self.insert_mode
    }

    /// Horizontal position kept across vertical moves.
    pub fn travel_x(&self) -> Option<f32> {
        self.travel_x
    }

    /// BiDi level the caret is attached to after a visual move.
    pub fn bidi_level(&self) -> Option<u8> {
        self.bidi_level
    }

    /// Height of the visible area, used for page moves.
    pub fn visible_height(&self) -> f32 {
        self.visible_height
    }

    /// Places a caret at `start` and forgets movement state.
    pub(crate) fn reset(&mut self, start: EditPaM) {
        self.set_caret(start);
    }

    fn set_caret(&mut self, pam: EditPaM) {
        self.selection = EditSelection::caret(pam);
        self.forget_movement();
    }

    fn forget_movement(&mut self) {
        self.travel_x = None;
        self.bidi_level = None;
        self.at_line_end = false;
    }
}

impl EditEngine {
    fn view_ref(&self, id: ViewId) -> Result<&EditView, Error> {
        self.views.get(id).ok_or_else(Error::invalid_view)
    }

    fn view_mut(&mut self, id: ViewId) -> Result<&mut EditView, Error> {
        self.views.get_mut(id).ok_or_else(Error::invalid_view)
    }

    /// Places a caret in view `id` and bumps the generation.
    pub(crate) fn set_view_caret(&mut self, id: ViewId, pam: EditPaM) {
        if let Some(view) = self.views.get_mut(id) {
            view.set_caret(pam);
            self.generation.nudge();
        }
    }

    // --- MARK: Lifecycle ---

    /// Creates a view with a caret at the document start.
    pub fn create_view(&mut self) -> ViewId {
        let start = self.doc.start_pam();
        let id = self.views.insert(EditView::new(start));
        log::debug!("view {id:?} created, {} views", self.views.len());
        id
    }

    /// Removes a view. Returns `false` if it did not exist.
    pub fn remove_view(&mut self, id: ViewId) -> bool {
        let removed = self.views.remove(id).is_some();
        if removed {
            log::debug!("view {id:?} removed, {} views", self.views.len());
        }
        removed
    }

    /// The view with handle `id`.
    pub fn view(&self, id: ViewId) -> Option<&EditView> {
        self.views.get(id)
    }

    /// Replaces the selection of view `id`.
    pub fn set_selection(&mut self, id: ViewId, selection: EditSelection) -> Result<(), Error> {
        self.doc.check_position(selection.anchor())?;
        self.doc.check_position(selection.focus())?;
        let view = self.view_mut(id)?;
        view.selection = selection;
        view.forget_movement();
        self.generation.nudge();
        Ok(())
    }

    /// Switches view `id` between insert and overwrite mode.
    pub fn set_insert_mode(&mut self, id: ViewId, insert_mode: bool) -> Result<(), Error> {
        self.view_mut(id)?.insert_mode = insert_mode;
        Ok(())
    }

    /// Sets the height of the area view `id` shows.
    pub fn set_visible_height(&mut self, id: ViewId, height: f32) -> Result<(), Error> {
        self.view_mut(id)?.visible_height = height;
        Ok(())
    }

    /// Text selected in view `id`.
    pub fn view_selected_text(&self, id: ViewId) -> Result<String, Error> {
        let selection = self.view_ref(id)?.selection;
        Ok(self.get_selected(selection))
    }

    // --- MARK: Editing ---

    /// Replaces the selection of view `id` with `text`, as typing or
    /// pasting does.
    ///
    /// In overwrite mode a caret first removes the cell after it. A single
    /// typed character merges with the previous typing for undo and runs
    /// the autocorrect hook.
    pub fn view_insert_text(&mut self, id: ViewId, text: &str) -> Result<EditPaM, Error> {
        let view = self.view_ref(id)?;
        let (selection, insert_mode) = (view.selection, view.insert_mode);
        let mut chars = text.chars();
        let typed = match (chars.next(), chars.next()) {
            (Some(c), None) if !matches!(c, '\r' | '\n' | '\u{2028}' | '\u{2029}') => Some(c),
            _ => None,
        };
        let kind = if typed.is_some() {
            UndoKind::Typing
        } else {
            UndoKind::Insert
        };

        self.begin_op(kind);
        let (start, end) = self.doc.ordered(selection);
        let (para, offset) = self.imp_delete_range(start, end);
        if !insert_mode && selection.is_caret() {
            let pam = self.doc.pam(para, offset);
            let next = self.navigator().logical_right(pam, CursorGranularity::Cell);
            if let Some((next_para, next_offset)) = self.doc.resolve(next) {
                if next_para == para {
                    self.imp_remove_chars(para, offset, next_offset);
                }
            }
        }
        let inserted = self.imp_insert_str(para, offset, text);
        let mut caret = inserted.end;
        if let (Some(ch), false) = (typed, inserted.truncated) {
            caret = self.run_autocorrect(caret, ch);
        }
        self.set_view_caret(id, caret);
        self.end_op();
        Ok(caret)
    }

    /// Calls the autocorrect hook for a character typed right before
    /// `caret`. Returns the caret after any corrections.
    fn run_autocorrect(&mut self, caret: EditPaM, ch: char) -> EditPaM {
        let Some(mut hook) = self.services.autocorrect.take() else {
            return caret;
        };
        let Some((para, offset)) = self.doc.resolve(caret) else {
            self.services.autocorrect = Some(hook);
            return caret;
        };
        let mut tracked = caret;
        let before = self.doc.node(para).map_or(0, |n| n.len());
        {
            let mut doc = AutoCorrectDoc::new(self, para);
            hook.char_inserted(&mut doc, offset, ch);
        }
        self.services.autocorrect = Some(hook);
        // Corrections before the caret change the paragraph length; the
        // caret keeps its distance from the paragraph end.
        let after = self.doc.node(para).map_or(0, |n| n.len());
        if after != before {
            let from_end = before - offset;
            tracked = self.doc.pam(para, after.saturating_sub(from_end));
        }
        tracked
    }

    /// Replaces the selection of view `id` with a paragraph break.
    pub fn view_insert_paragraph(&mut self, id: ViewId) -> Result<EditPaM, Error> {
        let selection = self.view_ref(id)?.selection;
        self.begin_op(UndoKind::Split);
        let (start, end) = self.doc.ordered(selection);
        let (para, offset) = self.imp_delete_range(start, end);
        let caret = match self.imp_split(para, offset) {
            Some(next) => self.doc.pam(next, 0),
            None => self.doc.pam(para, offset),
        };
        self.set_view_caret(id, caret);
        self.end_op();
        Ok(caret)
    }

    /// Replaces the selection of view `id` with a feature.
    pub fn view_insert_feature(&mut self, id: ViewId, feature: Feature) -> Result<EditPaM, Error> {
        let selection = self.view_ref(id)?.selection;
        self.begin_op(UndoKind::Feature);
        let start = self.delete_range(selection);
        let caret = self.insert_feature(start, feature);
        self.set_view_caret(id, caret);
        self.end_op();
        Ok(caret)
    }

    /// Deletes in view `id`: the selection when there is one, else the
    /// amount `mode` asks for next to the caret.
    ///
    /// Deleting a word at a word boundary removes the whole previous or
    /// next word. At a paragraph edge the paragraphs are joined; a backward
    /// join applies the backward join style policy.
    pub fn view_delete(&mut self, id: ViewId, mode: DeleteMode) -> Result<EditPaM, Error> {
        let selection = self.view_ref(id)?.selection;
        if !selection.is_caret() {
            let caret = self.delete_range(selection);
            self.set_view_caret(id, caret);
            return Ok(caret);
        }
        let pam = selection.focus();
        let (para, offset) = self.locate(pam);
        let len = self.doc.node(para).map_or(0, |n| n.len());
        let backward = mode.direction == DeleteDirection::Backward;

        self.begin_op(UndoKind::Delete);
        let (caret_para, caret_offset) = if backward && offset == 0 {
            // A hidden neighbour is never merged into visible text.
            match para.checked_sub(1) {
                Some(left) if self.para_visible(left) => self
                    .imp_connect(left, true)
                    .map_or((para, 0), |junction| (left, junction)),
                _ => (para, 0),
            }
        } else if !backward && offset >= len {
            if self.para_visible(para + 1) {
                self.imp_connect(para, false);
            }
            (para, offset)
        } else {
            let target = {
                let nav = self.navigator();
                match (mode.granularity, backward) {
                    (DeleteGranularity::Character, true) => {
                        nav.logical_left(pam, CursorGranularity::Character)
                    }
                    (DeleteGranularity::Character, false) => {
                        nav.logical_right(pam, CursorGranularity::Cell)
                    }
                    (DeleteGranularity::Word, true) => match nav.start_of_word(pam) {
                        start if start == pam => nav.word_left(pam),
                        start => start,
                    },
                    (DeleteGranularity::Word, false) => match nav.end_of_word(pam) {
                        end if end == pam => nav.word_right(pam),
                        end => end,
                    },
                    (DeleteGranularity::Paragraph, true) => nav.para_start(pam),
                    (DeleteGranularity::Paragraph, false) => nav.para_end(pam),
                }
            };
            let target = match self.doc.resolve(target) {
                Some((p, o)) if p == para => o,
                _ if backward => 0,
                _ => len,
            };
            let (start, end) = (offset.min(target), offset.max(target));
            self.imp_remove_chars(para, start, end);
            (para, start)
        };
        let caret = self.doc.pam(caret_para, caret_offset);
        self.set_view_caret(id, caret);
        self.end_op();
        Ok(caret)
    }

    /// Undoes the last step and places the caret of view `id` where it
    /// happened.
    pub fn view_undo(&mut self, id: ViewId) -> Result<EditPaM, Error> {
        self.view_ref(id)?;
        let caret = self.try_undo()?;
        self.set_view_caret(id, caret);
        Ok(caret)
    }

    /// Redoes the last undone step in view `id`.
    pub fn view_redo(&mut self, id: ViewId) -> Result<EditPaM, Error> {
        self.view_ref(id)?;
        let caret = self.try_redo()?;
        self.set_view_caret(id, caret);
        Ok(caret)
    }

    // --- MARK: Movement ---

    /// Moves the caret of view `id`. With `extend` the anchor stays and the
    /// selection grows or shrinks.
    pub fn view_move_cursor(
        &mut self,
        id: ViewId,
        movement: CursorMove,
        extend: bool,
    ) -> Result<EditPaM, Error> {
        let view = self.view_ref(id)?.clone();
        let focus = view.selection.focus();
        let (first, last) = self.doc.ordered(view.selection);
        let collapse = !extend && !view.selection.is_caret();
        let (first, last) = (self.doc.pam(first.0, first.1), self.doc.pam(last.0, last.1));
        let overwrite = !view.insert_mode;

        let mut travel_x = None;
        let mut level = None;
        let mut at_line_end = false;
        let target = {
            let nav = self.navigator();
            match movement {
                CursorMove::Left | CursorMove::Backward if collapse => first,
                CursorMove::Right | CursorMove::Forward if collapse => last,
                CursorMove::Left => {
                    let (pam, l) = nav.visual_left(focus, view.bidi_level, overwrite);
                    level = Some(l);
                    pam
                }
                CursorMove::Right => {
                    let (pam, l) = nav.visual_right(focus, view.bidi_level, overwrite);
                    level = Some(l);
                    pam
                }
                CursorMove::Backward => nav.logical_left(focus, CursorGranularity::Cell),
                CursorMove::Forward => nav.logical_right(focus, CursorGranularity::Cell),
                CursorMove::WordLeft => nav.word_left(focus),
                CursorMove::WordRight => nav.word_right(focus),
                CursorMove::Up | CursorMove::Down => {
                    let (pam, x) = if movement == CursorMove::Up {
                        nav.up(focus, view.travel_x, view.at_line_end)
                    } else {
                        nav.down(focus, view.travel_x, view.at_line_end)
                    };
                    travel_x = Some(x);
                    pam
                }
                CursorMove::LineStart => nav.line_start(focus, view.at_line_end),
                CursorMove::LineEnd => {
                    let (pam, end) = nav.line_end(focus, view.at_line_end);
                    at_line_end = end;
                    pam
                }
                CursorMove::ParagraphStart => nav.para_start(focus),
                CursorMove::ParagraphEnd => nav.para_end(focus),
                CursorMove::DocumentStart => nav.doc_start(),
                CursorMove::DocumentEnd => nav.doc_end(),
                CursorMove::PageUp | CursorMove::PageDown => {
                    travel_x = view.travel_x;
                    nav.page_move(
                        focus,
                        view.visible_height,
                        movement == CursorMove::PageDown,
                    )
                }
            }
        };

        let view = self.view_mut(id)?;
        view.selection = if extend {
            view.selection.extend_to(target)
        } else {
            EditSelection::caret(target)
        };
        view.travel_x = travel_x;
        view.bidi_level = level;
        view.at_line_end = at_line_end;
        self.generation.nudge();
        Ok(target)
    }

    /// Caret rectangle of view `id` in paper coordinates. In overwrite mode
    /// it covers the cell after the caret.
    pub fn view_cursor_rect(&mut self, id: ViewId) -> Result<Rect, Error> {
        let view = self.view_ref(id)?.clone();
        let focus = view.selection.focus();
        let rect = {
            let nav = self.navigator();
            if !view.insert_mode && view.selection.is_caret() {
                nav.unit_rect(focus)
            } else {
                let flags = CursorFlags {
                    start_of_line: false,
                    end_of_line: view.at_line_end,
                };
                nav.position_to_rect(focus, flags, view.bidi_level)
            }
        };
        Ok(self.to_physical(rect))
    }

    /// Moves the caret of view `id` to the position under `point`, in
    /// paper coordinates.
    pub fn set_cursor_at_point(
        &mut self,
        id: ViewId,
        point: Point,
        extend: bool,
    ) -> Result<EditPaM, Error> {
        self.view_ref(id)?;
        let pam = self.position_at_point(point);
        let view = self.view_mut(id)?;
        view.selection = if extend {
            view.selection.extend_to(pam)
        } else {
            EditSelection::caret(pam)
        };
        view.forget_movement();
        self.generation.nudge();
        Ok(pam)
    }

    fn select_in_view(&mut self, id: ViewId, selection: EditSelection) -> Result<EditSelection, Error> {
        let view = self.view_mut(id)?;
        view.selection = selection;
        view.forget_movement();
        self.generation.nudge();
        Ok(selection)
    }

    /// Selects the word at the caret of view `id`.
    pub fn view_select_word(&mut self, id: ViewId) -> Result<EditSelection, Error> {
        let focus = self.view_ref(id)?.selection.focus();
        let selection = self.navigator().select_word(focus);
        self.select_in_view(id, selection)
    }

    /// Selects the sentence at the caret of view `id`.
    pub fn view_select_sentence(&mut self, id: ViewId) -> Result<EditSelection, Error> {
        let focus = self.view_ref(id)?.selection.focus();
        let selection = self.navigator().select_sentence(focus);
        self.select_in_view(id, selection)
    }

    /// Selects the whole document in view `id`.
    pub fn select_all(&mut self, id: ViewId) -> Result<EditSelection, Error> {
        let selection = EditSelection::new(self.doc.start_pam(), self.doc.end_pam());
        self.select_in_view(id, selection)
    }
}
