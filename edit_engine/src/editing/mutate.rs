// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Primitive edits and the public editing operations built on them.
//!
//! Every primitive changes the document, records its undo step, invalidates
//! the affected paragraphs and remaps stored positions. Public operations
//! wrap primitives in an operation so undo grouping and notifications see
//! one user level step.

use alloc::{string::String, vec, vec::Vec};
use core::ops::Range;

use crate::attributes::{CharAttr, CharAttrKind, CharAttribs, ParaAttribs, FIELD_CHAR};
use crate::document::{move_block, ContentNode, EditDoc, EditPaM, EditSelection};
use crate::error::Error;
use crate::field::FieldPlaceholder;
use crate::layout::{neutral_break, ParaPortion};
use crate::style::StyleId;

use super::engine::EditEngine;
use super::notify::Notification;
use super::sync::RemapEvent;
use super::undo::{EditUndo, UndoGroup, UndoKind};
use super::{Feature, Inserted, JoinMode};

const LINE_SEPARATOR: char = '\u{2028}';
const PARAGRAPH_SEPARATOR: char = '\u{2029}';

/// Splits text at paragraph separators: `"\r\n"`, `'\r'`, `'\n'` and
/// U+2029.
fn paragraphs(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if matches!(c, '\r' | '\n' | PARAGRAPH_SEPARATOR) {
            out.push(&text[start..i]);
            start = i + c.len_utf8();
            if c == '\r' && chars.peek().is_some_and(|&(_, n)| n == '\n') {
                chars.next();
                start += 1;
            }
        }
    }
    out.push(&text[start..]);
    out
}

/// Direction of undo replay.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Replay {
    Undo,
    Redo,
}

impl EditEngine {
    fn record(&mut self, action: EditUndo) {
        self.undo.record(action);
    }

    // --- MARK: Primitives ---

    pub(crate) fn imp_insert_text(&mut self, para: usize, offset: usize, text: &str) {
        if text.is_empty() {
            return;
        }
        let (Some(id), Some(node)) = (self.doc.id(para), self.doc.node_mut(para)) else {
            return;
        };
        debug_assert!(node.text().is_char_boundary(offset), "offset inside a character");
        node.insert_text(offset, text);
        self.record(EditUndo::InsertChars {
            para,
            offset,
            text: text.into(),
        });
        self.invalidate(para, offset);
        self.remap_positions(RemapEvent::Inserted {
            node: id,
            offset,
            len: text.len(),
        });
        self.modified = true;
    }

    pub(crate) fn imp_remove_chars(&mut self, para: usize, start: usize, end: usize) -> String {
        let (Some(id), Some(node)) = (self.doc.id(para), self.doc.node_mut(para)) else {
            return String::new();
        };
        let end = end.min(node.len());
        if start >= end || !node.text().is_char_boundary(start) || !node.text().is_char_boundary(end)
        {
            debug_assert!(start >= end, "removal {start}..{end} splits a character");
            return String::new();
        }
        let attribs = node
            .char_attribs()
            .touches(start, end)
            .then(|| node.char_attribs().clone());
        let text = node.remove_text(start, end);
        self.record(EditUndo::RemoveChars {
            para,
            offset: start,
            text: text.clone(),
            attribs,
        });
        self.invalidate(para, start);
        self.remap_positions(RemapEvent::Removed {
            node: id,
            start,
            end,
        });
        self.modified = true;
        text
    }

    pub(crate) fn imp_insert_feature(&mut self, para: usize, offset: usize, attr: CharAttr) -> usize {
        let (Some(id), Some(node)) = (self.doc.id(para), self.doc.node_mut(para)) else {
            return 0;
        };
        let len = node.insert_feature(offset, attr.clone());
        if len == 0 {
            return 0;
        }
        self.record(EditUndo::InsertFeature { para, offset, attr });
        self.invalidate(para, offset);
        self.remap_positions(RemapEvent::Inserted {
            node: id,
            offset,
            len,
        });
        self.modified = true;
        len
    }

    /// Splits paragraph `para` at `offset`. Returns the index of the new
    /// paragraph, or `None` when the document is full.
    pub(crate) fn imp_split(&mut self, para: usize, offset: usize) -> Option<usize> {
        if self.doc.len() >= self.config.max_paragraphs {
            log::warn!(
                "paragraph limit of {} reached, split refused",
                self.config.max_paragraphs
            );
            return None;
        }
        let keep_ending = self.config.keep_ending_attribs;
        let id = self.doc.id(para)?;
        let node = self.doc.node_mut(para)?;
        let attribs = node.char_attribs().clone();
        let right = node.split_off(offset, keep_ending);
        let new_id = self.doc.insert_node(para + 1, right);
        let mut portion = ParaPortion::new();
        portion.visible = self.portions[para].visible;
        self.portions.insert(para + 1, portion);
        self.record(EditUndo::SplitPara {
            para,
            offset,
            attribs,
        });
        self.invalidate(para, offset);
        self.remap_positions(RemapEvent::Split {
            node: id,
            offset,
            new_node: new_id,
        });
        self.pending_notification(Notification::ParagraphInserted(para + 1));
        self.modified = true;
        Some(para + 1)
    }

    /// Appends paragraph `left + 1` to paragraph `left`. Returns the offset
    /// of the junction.
    pub(crate) fn imp_connect(&mut self, left: usize, backward: bool) -> Option<usize> {
        if left + 1 >= self.doc.len() {
            return None;
        }
        let left_id = self.doc.id(left)?;
        let (right_id, right) = self.doc.remove_node(left + 1)?;
        self.portions.remove(left + 1);
        let adopted = backward && self.config.backward_join_adopts_style;
        let node = self.doc.node_mut(left)?;
        let offset = node.len();
        let action = EditUndo::Connect {
            left,
            offset,
            left_attribs: node.char_attribs().clone(),
            right_attribs: right.char_attribs().clone(),
            left_para: node.para_attribs().clone(),
            left_style: node.style().cloned(),
            right_para: right.para_attribs().clone(),
            right_style: right.style().cloned(),
            adopted,
        };
        if adopted {
            node.set_para_attribs(right.para_attribs().clone());
            node.set_style(right.style().cloned());
        }
        node.append(right);
        self.record(action);
        self.invalidate(left, offset);
        self.remap_positions(RemapEvent::Joined {
            left: left_id,
            right: right_id,
            offset,
        });
        self.pending_notification(Notification::ParagraphDeleted(left + 1));
        if adopted {
            self.pending_notification(Notification::ParagraphAttributesChanged(left));
        }
        self.modified = true;
        Some(offset)
    }

    pub(crate) fn imp_insert_node(&mut self, index: usize, node: ContentNode) -> Option<usize> {
        if self.doc.len() >= self.config.max_paragraphs {
            log::warn!(
                "paragraph limit of {} reached, insertion refused",
                self.config.max_paragraphs
            );
            return None;
        }
        let index = index.min(self.doc.len());
        self.record(EditUndo::InsertNode {
            index,
            node: node.clone(),
        });
        self.doc.insert_node(index, node);
        self.portions.insert(index, ParaPortion::new());
        self.pending_notification(Notification::ParagraphInserted(index));
        self.modified = true;
        Some(index)
    }

    /// Removes paragraph `index`. The last remaining paragraph is never
    /// removed.
    pub(crate) fn imp_remove_node(&mut self, index: usize) -> Option<ContentNode> {
        let (id, node) = self.doc.remove_node(index)?;
        self.portions.remove(index);
        self.record(EditUndo::RemoveNode {
            index,
            node: node.clone(),
        });
        self.remap_positions(RemapEvent::NodeRemoved { node: id, index });
        self.pending_notification(Notification::ParagraphDeleted(index));
        self.modified = true;
        Some(node)
    }

    pub(crate) fn imp_move(&mut self, range: Range<usize>, dest: usize) -> bool {
        if !self.doc.move_nodes(range.clone(), dest) {
            return false;
        }
        move_block(&mut self.portions, range.clone(), dest);
        let moved = if dest > range.end {
            dest - range.len()..dest
        } else {
            dest..dest + range.len()
        };
        for para in moved {
            self.invalidate(para, 0);
        }
        self.record(EditUndo::MoveParagraphs {
            range: range.clone(),
            dest,
        });
        self.pending_notification(Notification::ParagraphsMoved { range, dest });
        self.modified = true;
        true
    }

    pub(crate) fn imp_set_char_attribs(&mut self, para: usize, attribs: CharAttribs) {
        let Some(node) = self.doc.node_mut(para) else {
            return;
        };
        if *node.char_attribs() == attribs {
            return;
        }
        let before = node.char_attribs().clone();
        node.set_char_attribs(attribs.clone());
        self.record(EditUndo::SetCharAttribs {
            para,
            before,
            after: attribs,
        });
        self.invalidate(para, 0);
        self.modified = true;
    }

    pub(crate) fn imp_set_para_attribs(
        &mut self,
        para: usize,
        attribs: ParaAttribs,
        style: Option<StyleId>,
    ) {
        let Some(node) = self.doc.node_mut(para) else {
            return;
        };
        let before = (node.para_attribs().clone(), node.style().cloned());
        if before.0 == attribs && before.1 == style {
            return;
        }
        node.set_para_attribs(attribs.clone());
        node.set_style(style.clone());
        self.record(EditUndo::SetParaAttribs {
            para,
            before,
            after: (attribs, style),
        });
        self.invalidate(para, 0);
        self.pending_notification(Notification::ParagraphAttributesChanged(para));
        self.modified = true;
    }

    fn pending_notification(&mut self, notification: Notification) {
        self.queue_notification(notification);
    }

    /// Removes `start..end`, where both ends are `(paragraph, offset)` in
    /// document order, joining the outer paragraphs. Returns the start.
    pub(crate) fn imp_delete_range(
        &mut self,
        start: (usize, usize),
        end: (usize, usize),
    ) -> (usize, usize) {
        let ((sp, so), (ep, eo)) = (start, end);
        if sp == ep {
            self.imp_remove_chars(sp, so, eo);
            return start;
        }
        for _ in sp + 1..ep {
            self.imp_remove_node(sp + 1);
        }
        self.imp_remove_chars(sp + 1, 0, eo);
        let len = self.doc.node(sp).map_or(so, ContentNode::len);
        self.imp_remove_chars(sp, so, len);
        self.imp_connect(sp, false);
        start
    }

    /// Inserts text that may contain paragraph separators, tabs and manual
    /// line breaks.
    pub(crate) fn imp_insert_str(&mut self, para: usize, offset: usize, text: &str) -> Inserted {
        let (mut para, mut offset) = (para, offset);
        let mut truncated = false;
        let segments = paragraphs(text);
        for (i, segment) in segments.iter().enumerate() {
            if i > 0 {
                match self.imp_split(para, offset) {
                    Some(next) => (para, offset) = (next, 0),
                    None => {
                        truncated = true;
                        break;
                    }
                }
            }
            let (end, cut) = self.imp_insert_line(para, offset, segment);
            offset = end;
            truncated |= cut;
        }
        Inserted {
            end: self.doc.pam(para, offset),
            truncated,
        }
    }

    /// Inserts one paragraph worth of text, turning tabs and line
    /// separators into features. Returns the end offset and whether text
    /// was dropped at the paragraph length limit.
    ///
    /// At the limit the text is cut at a neutral break and the rest of this
    /// line is discarded. Text after the next paragraph separator is still
    /// inserted by the caller into the following paragraph.
    fn imp_insert_line(&mut self, para: usize, offset: usize, text: &str) -> (usize, bool) {
        let mut offset = offset;
        let mut rest = text;
        while !rest.is_empty() {
            let split = rest
                .find(['\t', LINE_SEPARATOR])
                .unwrap_or(rest.len());
            let plain: String = rest[..split].chars().filter(|&c| c != FIELD_CHAR).collect();
            let available = self.available(para);
            if plain.len() > available {
                let cut = neutral_break(&plain, available);
                log::warn!(
                    "paragraph length limit of {} reached, insertion truncated",
                    self.config.max_paragraph_len
                );
                self.imp_insert_text(para, offset, &plain[..cut]);
                return (offset + cut, true);
            }
            self.imp_insert_text(para, offset, &plain);
            offset += plain.len();
            let Some(feature) = rest[split..].chars().next() else {
                break;
            };
            if feature.len_utf8() > self.available(para) {
                return (offset, true);
            }
            let attr = if feature == '\t' {
                CharAttr::Tab
            } else {
                CharAttr::LineBreak
            };
            offset += self.imp_insert_feature(para, offset, attr);
            rest = &rest[split + feature.len_utf8()..];
        }
        (offset, false)
    }

    /// Bytes paragraph `para` can still take.
    fn available(&self, para: usize) -> usize {
        let len = self.doc.node(para).map_or(0, ContentNode::len);
        self.config.max_paragraph_len.saturating_sub(len)
    }

    fn feature_attr(&self, para: usize, offset: usize, feature: Feature) -> CharAttr {
        match feature {
            Feature::Tab => CharAttr::Tab,
            Feature::LineBreak => CharAttr::LineBreak,
            Feature::Field(kind) => {
                let value = self.services.fields.expand(&kind, para, offset);
                CharAttr::Field(FieldPlaceholder::new(kind, value))
            }
        }
    }

    // --- MARK: Text operations ---

    /// Inserts `text` at `pam`.
    ///
    /// `'\n'`, `'\r'`, `"\r\n"` and U+2029 split paragraphs; tabs and U+2028
    /// become features; stray U+FFFC characters are dropped. Text beyond the
    /// paragraph length limit is cut at a neutral break point and the rest
    /// of that paragraph's text is dropped; text after the next paragraph
    /// break continues in the new paragraph.
    pub fn insert_text(&mut self, pam: EditPaM, text: &str) -> Inserted {
        let (para, offset) = self.locate(pam);
        self.begin_op(UndoKind::Insert);
        let inserted = self.imp_insert_str(para, offset, text);
        self.end_op();
        inserted
    }

    /// Checked form of [`insert_text`](Self::insert_text). Returns a
    /// capacity error when any text was dropped; the text that fit stays
    /// inserted.
    pub fn try_insert_text(&mut self, pam: EditPaM, text: &str) -> Result<Inserted, Error> {
        self.doc.check_position(pam)?;
        let inserted = self.insert_text(pam, text);
        if inserted.truncated {
            return Err(Error::capacity(self.config.max_paragraph_len));
        }
        Ok(inserted)
    }

    /// Deletes the text covered by `selection` and returns the start. A
    /// caret is returned unchanged.
    pub fn delete_range(&mut self, selection: EditSelection) -> EditPaM {
        if selection.is_caret() {
            return self.doc.clamp(selection.focus());
        }
        let (start, end) = self.doc.ordered(selection);
        self.begin_op(UndoKind::Delete);
        let (para, offset) = self.imp_delete_range(start, end);
        self.end_op();
        self.doc.pam(para, offset)
    }

    /// Checked form of [`delete_range`](Self::delete_range).
    pub fn try_delete_range(&mut self, selection: EditSelection) -> Result<EditPaM, Error> {
        self.doc.check_position(selection.anchor())?;
        self.doc.check_position(selection.focus())?;
        Ok(self.delete_range(selection))
    }

    /// Splits the paragraph at `pam`. Returns the start of the new
    /// paragraph, or `pam` when the paragraph limit is reached.
    pub fn split_paragraph(&mut self, pam: EditPaM) -> EditPaM {
        let (para, offset) = self.locate(pam);
        self.begin_op(UndoKind::Split);
        let next = self.imp_split(para, offset);
        self.end_op();
        match next {
            Some(next) => self.doc.pam(next, 0),
            None => self.doc.pam(para, offset),
        }
    }

    /// Joins paragraph `left + 1` onto paragraph `left`. Returns the
    /// junction, or `None` when `left` is the last paragraph.
    pub fn join_paragraphs(&mut self, left: usize, mode: JoinMode) -> Option<EditPaM> {
        self.begin_op(UndoKind::Join);
        let offset = self.imp_connect(left, mode == JoinMode::Backward);
        self.end_op();
        offset.map(|offset| self.doc.pam(left, offset))
    }

    /// Inserts a feature at `pam` and returns the position after it, or
    /// `pam` when the paragraph is full.
    pub fn insert_feature(&mut self, pam: EditPaM, feature: Feature) -> EditPaM {
        let (para, offset) = self.locate(pam);
        let attr = self.feature_attr(para, offset, feature);
        let len = attr.feature_char().map_or(0, char::len_utf8);
        if len > self.available(para) {
            log::warn!("paragraph length limit reached, feature refused");
            return self.doc.pam(para, offset);
        }
        self.begin_op(UndoKind::Feature);
        let len = self.imp_insert_feature(para, offset, attr);
        self.end_op();
        self.doc.pam(para, offset + len)
    }

    /// Removes `count` characters after `pam` within its paragraph and
    /// returns them.
    pub fn remove_chars(&mut self, pam: EditPaM, count: usize) -> String {
        let (para, offset) = self.locate(pam);
        let Some(node) = self.doc.node(para) else {
            return String::new();
        };
        let end = node.text()[offset..]
            .char_indices()
            .nth(count)
            .map_or(node.len(), |(i, _)| offset + i);
        self.begin_op(UndoKind::Delete);
        let removed = self.imp_remove_chars(para, offset, end);
        self.end_op();
        removed
    }

    // --- MARK: Attributes ---

    fn for_each_para_range(
        &self,
        selection: EditSelection,
    ) -> Vec<(usize, Range<usize>)> {
        let ((sp, so), (ep, eo)) = self.doc.ordered(selection);
        (sp..=ep)
            .map(|para| {
                let len = self.doc.node(para).map_or(0, ContentNode::len);
                let start = if para == sp { so } else { 0 };
                let end = if para == ep { eo } else { len };
                (para, start..end)
            })
            .collect()
    }

    /// Applies a character attribute to `selection`. On a caret, sets the
    /// formatting typed text at that position picks up. Features cannot be
    /// applied this way.
    pub fn set_char_attrib(&mut self, selection: EditSelection, attr: CharAttr) {
        if attr.is_feature() {
            debug_assert!(false, "features are inserted with insert_feature");
            return;
        }
        self.begin_op(UndoKind::Attributes);
        for (para, range) in self.for_each_para_range(selection) {
            if let Some(node) = self.doc.node(para) {
                let mut attribs = node.char_attribs().clone();
                attribs.set(range, attr.clone());
                self.imp_set_char_attribs(para, attribs);
            }
        }
        self.end_op();
    }

    /// Removes character attributes of `kind` from `selection`.
    pub fn remove_char_attribs(&mut self, selection: EditSelection, kind: CharAttrKind) {
        self.begin_op(UndoKind::Attributes);
        for (para, range) in self.for_each_para_range(selection) {
            if let Some(node) = self.doc.node(para) {
                let mut attribs = node.char_attribs().clone();
                attribs.remove_kind(range, kind);
                self.imp_set_char_attribs(para, attribs);
            }
        }
        self.end_op();
    }

    /// Replaces the paragraph attributes of paragraph `para`.
    pub fn set_para_attribs(&mut self, para: usize, attribs: ParaAttribs) {
        let Some(style) = self.doc.node(para).map(|n| n.style().cloned()) else {
            return;
        };
        self.begin_op(UndoKind::Attributes);
        self.imp_set_para_attribs(para, attribs, style);
        self.end_op();
    }

    /// Sets the named style of paragraph `para`.
    pub fn set_style(&mut self, para: usize, style: Option<StyleId>) {
        let Some(attribs) = self.doc.node(para).map(|n| n.para_attribs().clone()) else {
            return;
        };
        self.begin_op(UndoKind::Attributes);
        self.imp_set_para_attribs(para, attribs, style);
        self.end_op();
    }

    // --- MARK: Paragraphs ---

    /// Inserts a paragraph holding `text` before paragraph `index`.
    /// Paragraph separators in `text` are dropped. Returns the start of the
    /// new paragraph, or `None` when the document is full.
    pub fn insert_paragraph(&mut self, index: usize, text: &str) -> Option<EditPaM> {
        self.begin_op(UndoKind::Paragraphs);
        let index = self.imp_insert_node(index, ContentNode::default());
        if let Some(index) = index {
            let text: String = paragraphs(text).concat();
            self.imp_insert_line(index, 0, &text);
        }
        self.end_op();
        index.map(|index| self.doc.pam(index, 0))
    }

    /// Removes paragraph `index`. The last paragraph cannot be removed.
    pub fn remove_paragraph(&mut self, index: usize) -> bool {
        self.begin_op(UndoKind::Paragraphs);
        let removed = self.imp_remove_node(index).is_some();
        self.end_op();
        removed
    }

    /// Moves the paragraphs in `range` before paragraph `dest`, counted
    /// before the move.
    pub fn move_paragraphs(&mut self, range: Range<usize>, dest: usize) -> bool {
        self.begin_op(UndoKind::Paragraphs);
        let moved = self.imp_move(range, dest);
        self.end_op();
        moved
    }

    // --- MARK: Whole document ---

    /// Removes all text, history and any composition. Views keep existing
    /// with a caret at the start.
    pub fn clear(&mut self) {
        if self.ime.take().is_some() {
            log::debug!("composition cancelled by clear");
        }
        self.undo.clear();
        self.begin_op(UndoKind::SetText);
        self.doc = EditDoc::new();
        self.portions = vec![ParaPortion::new()];
        let start = self.doc.start_pam();
        for view in self.views.values_mut() {
            view.reset(start);
        }
        self.modified = true;
        self.end_op();
    }

    /// Replaces the whole text. Clears history.
    pub fn set_text(&mut self, text: &str) {
        self.clear();
        self.undo.set_replaying(true);
        self.begin_op(UndoKind::SetText);
        self.imp_insert_str(0, 0, text);
        self.end_op();
        self.undo.set_replaying(false);
    }

    // --- MARK: Undo ---

    /// Undoes the last step. Returns the caret position after it, or `None`
    /// when there is nothing to undo or a composition is active.
    pub fn undo(&mut self) -> Option<EditPaM> {
        self.try_undo().ok()
    }

    /// Redoes the last undone step.
    pub fn redo(&mut self) -> Option<EditPaM> {
        self.try_redo().ok()
    }

    /// Checked form of [`undo`](Self::undo).
    pub fn try_undo(&mut self) -> Result<EditPaM, Error> {
        if self.ime.is_some() {
            return Err(Error::composition_active());
        }
        let group = self.undo.pop_undo().ok_or_else(Error::nothing_to_undo)?;
        let position = self.replay(&group, Replay::Undo);
        self.undo.push_redo(group);
        Ok(position)
    }

    /// Checked form of [`redo`](Self::redo).
    pub fn try_redo(&mut self) -> Result<EditPaM, Error> {
        if self.ime.is_some() {
            return Err(Error::composition_active());
        }
        let group = self.undo.pop_redo().ok_or_else(Error::nothing_to_undo)?;
        let position = self.replay(&group, Replay::Redo);
        self.undo.push_undone(group);
        Ok(position)
    }

    fn replay(&mut self, group: &UndoGroup, direction: Replay) -> EditPaM {
        log::debug!(
            "{direction:?} of {:?} with {} steps",
            group.kind,
            group.actions.len()
        );
        self.undo.set_replaying(true);
        self.begin_op(group.kind);
        let position = match direction {
            Replay::Undo => {
                for action in group.actions.iter().rev() {
                    self.revert(action);
                }
                group.actions.first().map(EditUndo::undo_position)
            }
            Replay::Redo => {
                for action in &group.actions {
                    self.reapply(action);
                }
                group.actions.last().map(EditUndo::redo_position)
            }
        };
        self.end_op();
        self.undo.set_replaying(false);
        let (para, offset) = position.unwrap_or((0, 0));
        self.doc.pam(para, offset)
    }

    fn revert(&mut self, action: &EditUndo) {
        match action {
            EditUndo::InsertChars { para, offset, text } => {
                self.imp_remove_chars(*para, *offset, offset + text.len());
            }
            EditUndo::RemoveChars {
                para,
                offset,
                text,
                attribs,
            } => {
                self.imp_insert_text(*para, *offset, text);
                if let Some(attribs) = attribs {
                    self.imp_set_char_attribs(*para, attribs.clone());
                }
            }
            EditUndo::InsertFeature { para, offset, attr } => {
                let len = attr.feature_char().map_or(0, char::len_utf8);
                self.imp_remove_chars(*para, *offset, offset + len);
            }
            EditUndo::SplitPara {
                para, attribs, ..
            } => {
                self.imp_connect(*para, false);
                self.imp_set_char_attribs(*para, attribs.clone());
            }
            EditUndo::Connect {
                left,
                offset,
                left_attribs,
                right_attribs,
                left_para,
                left_style,
                right_para,
                right_style,
                ..
            } => {
                if self.imp_split(*left, *offset).is_some() {
                    self.imp_set_char_attribs(*left, left_attribs.clone());
                    self.imp_set_char_attribs(left + 1, right_attribs.clone());
                    self.imp_set_para_attribs(*left, left_para.clone(), left_style.clone());
                    self.imp_set_para_attribs(left + 1, right_para.clone(), right_style.clone());
                }
            }
            EditUndo::InsertNode { index, .. } => {
                self.imp_remove_node(*index);
            }
            EditUndo::RemoveNode { index, node } => {
                self.imp_insert_node(*index, node.clone());
            }
            EditUndo::MoveParagraphs { range, dest } => {
                let len = range.len();
                if *dest > range.end {
                    self.imp_move(dest - len..*dest, range.start);
                } else {
                    self.imp_move(*dest..dest + len, range.end);
                }
            }
            EditUndo::SetCharAttribs { para, before, .. } => {
                self.imp_set_char_attribs(*para, before.clone());
            }
            EditUndo::SetParaAttribs { para, before, .. } => {
                self.imp_set_para_attribs(*para, before.0.clone(), before.1.clone());
            }
        }
    }

    fn reapply(&mut self, action: &EditUndo) {
        match action {
            EditUndo::InsertChars { para, offset, text } => {
                self.imp_insert_text(*para, *offset, text);
            }
            EditUndo::RemoveChars {
                para, offset, text, ..
            } => {
                self.imp_remove_chars(*para, *offset, offset + text.len());
            }
            EditUndo::InsertFeature { para, offset, attr } => {
                self.imp_insert_feature(*para, *offset, attr.clone());
            }
            EditUndo::SplitPara { para, offset, .. } => {
                self.imp_split(*para, *offset);
            }
            EditUndo::Connect { left, adopted, .. } => {
                let adopt = self.config.backward_join_adopts_style;
                self.config.backward_join_adopts_style = *adopted;
                self.imp_connect(*left, *adopted);
                self.config.backward_join_adopts_style = adopt;
            }
            EditUndo::InsertNode { index, node } => {
                self.imp_insert_node(*index, node.clone());
            }
            EditUndo::RemoveNode { index, .. } => {
                self.imp_remove_node(*index);
            }
            EditUndo::MoveParagraphs { range, dest } => {
                self.imp_move(range.clone(), *dest);
            }
            EditUndo::SetCharAttribs { para, after, .. } => {
                self.imp_set_char_attribs(*para, after.clone());
            }
            EditUndo::SetParaAttribs { para, after, .. } => {
                self.imp_set_para_attribs(*para, after.0.clone(), after.1.clone());
            }
        }
    }
}
